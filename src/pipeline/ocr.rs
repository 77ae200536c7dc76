//! Vision-model OCR: send a page image to the LLM and get plain text back.
//!
//! The message layout is the system OCR prompt followed by a user turn that
//! carries only the image. VLM APIs require a user turn to respond to; the
//! image carries all the content, so its text is empty.

use crate::config::SolverConfig;
use crate::error::ExamQaError;
use crate::pipeline::encode;
use crate::pipeline::llm::{chat_with_retry, ocr_options};
use crate::pipeline::postprocess::clean_ocr_text;
use crate::prompts::DEFAULT_OCR_PROMPT;
use edgequake_llm::{ChatMessage, ImageData, LLMProvider};
use futures::stream::{self, StreamExt};
use image::DynamicImage;
use std::sync::Arc;
use tracing::{info, warn};

/// Transcribe one image. `page_num` is 1-indexed and only used for
/// logging and errors.
pub async fn ocr_image(
    provider: &Arc<dyn LLMProvider>,
    page_num: usize,
    image_data: ImageData,
    config: &SolverConfig,
) -> Result<String, ExamQaError> {
    let system_prompt = config.ocr_prompt.as_deref().unwrap_or(DEFAULT_OCR_PROMPT);
    let messages = vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user_with_images("", vec![image_data]),
    ];
    let options = ocr_options(config);
    let label = format!("OCR page {}", page_num);

    let reply = chat_with_retry(provider, &messages, &options, config, &label)
        .await
        .map_err(|f| f.into_ocr_error(page_num))?;

    Ok(clean_ocr_text(&reply.content))
}

/// Encode and transcribe several page images, at most `config.concurrency`
/// at a time. Results come back in the order of `pages`.
pub async fn ocr_pages(
    provider: &Arc<dyn LLMProvider>,
    pages: Vec<(usize, DynamicImage)>,
    config: &SolverConfig,
) -> Vec<(usize, Result<String, ExamQaError>)> {
    info!("OCR of {} scanned pages", pages.len());

    stream::iter(pages.into_iter().map(|(idx, img)| {
        let provider = Arc::clone(provider);
        let config = config.clone();
        async move {
            let page_num = idx + 1;
            let result = match encode::encode_png(&img) {
                Ok(data) => ocr_image(&provider, page_num, data, &config).await,
                Err(e) => {
                    warn!("Failed to encode page {}: {}", page_num, e);
                    Err(ExamQaError::RasterisationFailed {
                        page: page_num,
                        detail: format!("Image encoding failed: {}", e),
                    })
                }
            };
            (idx, result)
        }
    }))
    .buffered(ocr_concurrency(config))
    .collect()
    .await
}

/// In-flight OCR calls. `buffered(0)` would never poll its input, so a
/// hand-built config with `concurrency: 0` still gets one call at a time.
fn ocr_concurrency(config: &SolverConfig) -> usize {
    config.concurrency.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_concurrency_still_makes_progress() {
        let config = SolverConfig {
            concurrency: 0,
            ..SolverConfig::default()
        };
        assert_eq!(ocr_concurrency(&config), 1);
    }

    #[test]
    fn concurrency_is_passed_through() {
        let config = SolverConfig::builder().concurrency(6).build().unwrap();
        assert_eq!(ocr_concurrency(&config), 6);
    }
}
