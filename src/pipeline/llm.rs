//! LLM calls with timeout, retry and exponential backoff.
//!
//! Both OCR (an image in, text out) and answering (a question in, an answer
//! out) are one chat request each. They share this loop so that timeouts and
//! backoff behave the same way: `retry_backoff_ms * 2^(attempt - 1)` between
//! attempts, i.e. 500 ms → 1 s → 2 s with the defaults.

use crate::config::SolverConfig;
use crate::error::ExamQaError;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, warn};

/// A successful chat completion.
#[derive(Debug, Clone)]
pub struct LlmReply {
    pub content: String,
    pub input_tokens: usize,
    pub output_tokens: usize,
    pub duration_ms: u64,
    pub retries: u32,
}

/// All attempts failed; `detail` is the last error seen.
#[derive(Debug, Clone)]
pub struct LlmFailure {
    pub retries: u32,
    pub detail: String,
}

impl LlmFailure {
    /// The error reported when answering ran out of retries.
    pub fn into_answer_error(self) -> ExamQaError {
        ExamQaError::AnswerFailed {
            retries: self.retries,
            detail: self.detail,
        }
    }

    /// The error reported when OCR of `page` (1-indexed) ran out of retries.
    pub fn into_ocr_error(self, page: usize) -> ExamQaError {
        ExamQaError::OcrFailed {
            page,
            retries: self.retries,
            detail: self.detail,
        }
    }
}

/// Send `messages` to the provider, retrying transient failures.
///
/// `label` identifies the call in logs ("page 3", "answer").
pub async fn chat_with_retry(
    provider: &Arc<dyn LLMProvider>,
    messages: &[ChatMessage],
    options: &CompletionOptions,
    config: &SolverConfig,
    label: &str,
) -> Result<LlmReply, LlmFailure> {
    let start = Instant::now();

    let (response, retries) = retry_with_backoff(config, label, || async move {
        provider
            .chat(messages, Some(options))
            .await
            .map_err(|e| e.to_string())
    })
    .await?;

    let duration = start.elapsed();
    debug!(
        "{}: {} input tokens, {} output tokens, {:?}",
        label, response.prompt_tokens, response.completion_tokens, duration
    );
    Ok(LlmReply {
        content: response.content,
        input_tokens: response.prompt_tokens,
        output_tokens: response.completion_tokens,
        duration_ms: duration.as_millis() as u64,
        retries,
    })
}

/// Run `call` until it succeeds or `config.max_retries` retries are used up.
///
/// Each attempt is bounded by `config.api_timeout_secs`. On success returns
/// the value and the number of retries it took.
pub async fn retry_with_backoff<T, F, Fut>(
    config: &SolverConfig,
    label: &str,
    mut call: F,
) -> Result<(T, u32), LlmFailure>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, String>>,
{
    let call_timeout = Duration::from_secs(config.api_timeout_secs);
    let mut last_err: Option<String> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = backoff_ms(config.retry_backoff_ms, attempt);
            warn!(
                "{}: retry {}/{} after {}ms",
                label, attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match timeout(call_timeout, call()).await {
            Ok(Ok(value)) => return Ok((value, attempt)),
            Ok(Err(err_msg)) => {
                warn!("{}: attempt {} failed: {}", label, attempt + 1, err_msg);
                last_err = Some(err_msg);
            }
            Err(_) => {
                let err_msg = format!("timed out after {}s", config.api_timeout_secs);
                warn!("{}: attempt {} {}", label, attempt + 1, err_msg);
                last_err = Some(err_msg);
            }
        }
    }

    Err(LlmFailure {
        retries: config.max_retries,
        detail: last_err.unwrap_or_else(|| "Unknown error".to_string()),
    })
}

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt - 1)`,
/// saturating at `u64::MAX`.
fn backoff_ms(base: u64, attempt: u32) -> u64 {
    if base == 0 {
        return 0;
    }
    2u64.checked_pow(attempt.saturating_sub(1))
        .and_then(|factor| base.checked_mul(factor))
        .unwrap_or(u64::MAX)
}

/// Build `CompletionOptions` for answering.
pub fn answer_options(config: &SolverConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: Some(config.max_tokens),
        ..Default::default()
    }
}

/// Build `CompletionOptions` for OCR: always deterministic, and never cut
/// short by the answer-length budget.
pub fn ocr_options(config: &SolverConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(0.0),
        max_tokens: Some(config.max_tokens.max(4096)),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config(max_retries: u32) -> SolverConfig {
        SolverConfig::builder()
            .max_retries(max_retries)
            .retry_backoff_ms(0)
            .build()
            .unwrap()
    }

    /// A call that fails `failures` times, then returns "ok".
    fn flaky(
        failures: u32,
        calls: &mut u32,
    ) -> impl FnMut() -> std::future::Ready<Result<&'static str, String>> + '_ {
        move || {
            *calls += 1;
            if *calls <= failures {
                std::future::ready(Err(format!("HTTP 503 (attempt {})", calls)))
            } else {
                std::future::ready(Ok("ok"))
            }
        }
    }

    #[tokio::test]
    async fn succeeds_first_time_without_retries() {
        let mut calls = 0;
        let (value, retries) = retry_with_backoff(&fast_config(3), "t", flaky(0, &mut calls))
            .await
            .unwrap();
        assert_eq!(value, "ok");
        assert_eq!(retries, 0);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn retries_are_counted() {
        let mut calls = 0;
        let (value, retries) = retry_with_backoff(&fast_config(3), "t", flaky(2, &mut calls))
            .await
            .unwrap();
        assert_eq!(value, "ok");
        assert_eq!(retries, 2);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn exhaustion_reports_last_error() {
        let mut calls = 0;
        let failure = retry_with_backoff(&fast_config(2), "t", flaky(u32::MAX, &mut calls))
            .await
            .unwrap_err();
        assert_eq!(failure.retries, 2);
        assert_eq!(failure.detail, "HTTP 503 (attempt 3)");
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn zero_retries_means_one_attempt() {
        let mut calls = 0;
        let failure = retry_with_backoff(&fast_config(0), "t", flaky(1, &mut calls))
            .await
            .unwrap_err();
        assert_eq!(failure.retries, 0);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn slow_attempts_time_out() {
        let config = SolverConfig::builder()
            .max_retries(0)
            .api_timeout_secs(1)
            .build()
            .unwrap();
        let failure = retry_with_backoff(&config, "t", || async {
            sleep(Duration::from_secs(30)).await;
            Ok::<_, String>(())
        })
        .await
        .unwrap_err();
        assert_eq!(failure.detail, "timed out after 1s");
    }

    #[tokio::test]
    async fn exhausted_answer_maps_to_answer_failed() {
        let mut calls = 0;
        let err = retry_with_backoff(&fast_config(3), "answer", flaky(u32::MAX, &mut calls))
            .await
            .map_err(LlmFailure::into_answer_error)
            .unwrap_err();
        assert!(
            matches!(err, ExamQaError::AnswerFailed { retries: 3, ref detail } if detail.contains("503")),
            "got: {err}"
        );
        assert!(err.is_answer_error());
    }

    #[tokio::test]
    async fn exhausted_ocr_maps_to_ocr_failed() {
        let mut calls = 0;
        let err = retry_with_backoff(&fast_config(1), "OCR page 4", flaky(u32::MAX, &mut calls))
            .await
            .map_err(|f| f.into_ocr_error(4))
            .unwrap_err();
        assert!(matches!(err, ExamQaError::OcrFailed { page: 4, retries: 1, .. }));
        assert!(err.is_extraction_error());
    }

    #[test]
    fn backoff_doubles() {
        assert_eq!(backoff_ms(500, 1), 500);
        assert_eq!(backoff_ms(500, 2), 1000);
        assert_eq!(backoff_ms(500, 3), 2000);
    }

    #[test]
    fn backoff_saturates_instead_of_overflowing() {
        assert_eq!(backoff_ms(0, 65), 0);
        assert_eq!(backoff_ms(0, u32::MAX), 0);
        assert_eq!(backoff_ms(500, 64), u64::MAX);
        assert_eq!(backoff_ms(500, u32::MAX), u64::MAX);
    }

    #[test]
    fn answer_options_follow_config() {
        let config = SolverConfig::default();
        let opts = answer_options(&config);
        assert_eq!(opts.temperature, Some(0.2));
        assert_eq!(opts.max_tokens, Some(2048));
    }

    #[test]
    fn ocr_options_are_deterministic() {
        let config = SolverConfig::builder().temperature(1.5).build().unwrap();
        let opts = ocr_options(&config);
        assert_eq!(opts.temperature, Some(0.0));
        assert_eq!(opts.max_tokens, Some(4096));
    }
}
