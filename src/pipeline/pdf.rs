//! PDF reading via pdfium: text layer per page, raster images of scanned pages.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and is not safe to drive from async code. All pdfium work runs in
//! `tokio::task::spawn_blocking` so Tokio worker threads never stall.
//!
//! ## Scanned pages
//!
//! A page whose text layer is blank is almost always a scan. When OCR
//! fallback is on, such pages are rasterised in the same pdfium session at
//! `dpi` (capped at `max_rendered_pixels` on the longest edge) and handed
//! back to the caller for vision-model OCR.

use crate::config::SolverConfig;
use crate::error::ExamQaError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, info};

/// Everything read from one PDF in a single pdfium session.
#[derive(Debug)]
pub struct PdfScan {
    /// Text layer of every page, in page order. Blank for scanned pages.
    pub page_texts: Vec<String>,
    /// `(page_index_0based, image)` for pages that need OCR.
    pub scans: Vec<(usize, DynamicImage)>,
}

/// Read the text layer of every page, rasterising blank pages when
/// `config.ocr_fallback` is set.
pub async fn read_pdf(
    bytes: Vec<u8>,
    name: &str,
    config: &SolverConfig,
) -> Result<PdfScan, ExamQaError> {
    let name = name.to_string();
    let password = config.password.clone();
    let render = config
        .ocr_fallback
        .then_some((config.dpi, config.max_rendered_pixels));

    tokio::task::spawn_blocking(move || {
        read_pdf_blocking(&bytes, &name, password.as_deref(), render)
    })
    .await
    .map_err(|e| ExamQaError::Internal(format!("PDF task panicked: {}", e)))?
}

/// Bind to pdfium: `PDFIUM_LIB_PATH` when set, otherwise the system library.
pub fn bind_pdfium() -> Result<Pdfium, ExamQaError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(path) if !path.is_empty() => Pdfium::bind_to_library(path),
        _ => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| ExamQaError::PdfiumBindingFailed(format!("{:?}", e)))?;
    Ok(Pdfium::new(bindings))
}

/// Blocking implementation of [`read_pdf`].
fn read_pdf_blocking(
    bytes: &[u8],
    name: &str,
    password: Option<&str>,
    render: Option<(u32, u32)>,
) -> Result<PdfScan, ExamQaError> {
    let pdfium = bind_pdfium()?;

    let document = pdfium
        .load_pdf_from_byte_slice(bytes, password)
        .map_err(|e| load_error(e, name, password.is_some()))?;

    let pages = document.pages();
    info!("PDF '{}' loaded: {} pages", name, pages.len());

    // PDF user space is 72 points per inch.
    let render_config = render.map(|(dpi, max_px)| {
        PdfRenderConfig::new()
            .scale_page_by_factor(dpi as f32 / 72.0)
            .set_maximum_width(to_pixels(max_px))
            .set_maximum_height(to_pixels(max_px))
    });

    let mut page_texts = Vec::with_capacity(pages.len() as usize);
    let mut scans = Vec::new();

    for (idx, page) in pages.iter().enumerate() {
        let text = page
            .text()
            .map(|t| t.all())
            .unwrap_or_default();

        if text.trim().is_empty() {
            if let Some(ref rc) = render_config {
                let bitmap = page.render_with_config(rc).map_err(|e| {
                    ExamQaError::RasterisationFailed {
                        page: idx + 1,
                        detail: format!("{:?}", e),
                    }
                })?;
                let image = bitmap.as_image();
                debug!(
                    "Page {} has no text layer; rendered {}x{} px for OCR",
                    idx + 1,
                    image.width(),
                    image.height()
                );
                scans.push((idx, image));
            } else {
                debug!("Page {} has no text layer; OCR fallback disabled", idx + 1);
            }
        }

        page_texts.push(text);
    }

    Ok(PdfScan { page_texts, scans })
}

/// pdfium sizes are `i32`; anything larger than `i32::MAX` is "no limit".
fn to_pixels(px: u32) -> i32 {
    i32::try_from(px).unwrap_or(i32::MAX)
}

/// Map a pdfium load failure onto the password / corruption errors.
fn load_error(e: PdfiumError, name: &str, had_password: bool) -> ExamQaError {
    let err_str = format!("{:?}", e);
    if err_str.contains("Password") || err_str.contains("password") {
        if had_password {
            ExamQaError::WrongPassword {
                name: name.to_string(),
            }
        } else {
            ExamQaError::PasswordRequired {
                name: name.to_string(),
            }
        }
    } else {
        ExamQaError::CorruptPdf {
            name: name.to_string(),
            detail: err_str,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_limits_never_go_negative() {
        assert_eq!(to_pixels(2000), 2000);
        assert_eq!(to_pixels(i32::MAX as u32), i32::MAX);
        assert_eq!(to_pixels(u32::MAX), i32::MAX);
    }
}
