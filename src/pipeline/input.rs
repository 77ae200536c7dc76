//! Input resolution: turn a user-supplied path or URL into a [`Document`].
//!
//! Local files get their content type from the extension; downloads take it
//! from the `Content-Type` response header. Either may be missing, in which
//! case [`crate::document::detect_kind`] sniffs the magic bytes later.

use crate::document::{content_type_for_path, Document};
use crate::error::ExamQaError;
use std::path::PathBuf;
use tracing::{debug, info};

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to an in-memory document.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<Document, ExamQaError> {
    if input.trim().is_empty() {
        return Err(ExamQaError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        resolve_local(input).await
    }
}

/// Read a local file, guessing its content type from the extension.
async fn resolve_local(path_str: &str) -> Result<Document, ExamQaError> {
    let path = PathBuf::from(path_str);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ExamQaError::PermissionDenied { path });
        }
        Err(_) => return Err(ExamQaError::FileNotFound { path }),
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path_str.to_string());
    let mut doc = Document::new(bytes, name);
    if let Some(ct) = content_type_for_path(&path) {
        doc = doc.with_content_type(ct);
    }

    debug!(
        "Resolved local file: {} ({} bytes, {:?})",
        path.display(),
        doc.bytes.len(),
        doc.content_type
    );
    Ok(doc)
}

/// Download a URL into memory.
async fn download_url(url: &str, timeout_secs: u64) -> Result<Document, ExamQaError> {
    info!("Downloading document from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ExamQaError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            ExamQaError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            ExamQaError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(ExamQaError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let header_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let filename = extract_filename(url);

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ExamQaError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes ({:?})", bytes.len(), header_type);

    let content_type = header_type
        .or_else(|| content_type_for_path(std::path::Path::new(&filename)).map(str::to_string));
    let mut doc = Document::new(bytes.to_vec(), filename);
    if let Some(ct) = content_type {
        doc = doc.with_content_type(ct);
    }
    Ok(doc)
}

/// Extract a reasonable filename from the URL path.
fn extract_filename(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/paper.pdf"));
        assert!(is_url("http://example.com/scan.png"));
        assert!(!is_url("/tmp/paper.pdf"));
        assert!(!is_url("paper.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn test_extract_filename() {
        assert_eq!(extract_filename("https://x.org/papers/maths.pdf"), "maths.pdf");
        assert_eq!(extract_filename("https://x.org/papers/"), "downloaded");
        assert_eq!(extract_filename("https://x.org/download"), "downloaded");
    }

    #[test]
    fn resolve_local_reads_bytes_and_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.pdf");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"%PDF-1.4 test").unwrap();

        let doc = tokio_test::block_on(resolve_input(path.to_str().unwrap(), 5)).unwrap();
        assert_eq!(doc.name, "paper.pdf");
        assert_eq!(doc.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(doc.bytes, b"%PDF-1.4 test");
    }

    #[test]
    fn resolve_missing_file() {
        let err = tokio_test::block_on(resolve_input("/definitely/not/here.pdf", 5)).unwrap_err();
        assert!(matches!(err, ExamQaError::FileNotFound { .. }));
    }

    #[test]
    fn resolve_blank_input() {
        let err = tokio_test::block_on(resolve_input("  ", 5)).unwrap_err();
        assert!(matches!(err, ExamQaError::InvalidInput { .. }));
    }
}
