//! Answer generation: one question in, one natural-language answer out.
//!
//! [`Answerer`] is the seam the pipeline calls; [`LlmAnswerer`] is the
//! default, a single chat completion per question through `edgequake-llm`
//! with the shared retry loop from [`crate::pipeline::llm`].

use crate::config::SolverConfig;
use crate::error::ExamQaError;
use crate::output::Answer;
use crate::pipeline::llm::{answer_options, chat_with_retry, LlmFailure};
use crate::prompts::{answer_request, DEFAULT_ANSWER_PROMPT};
use crate::provider::resolve_provider;
use edgequake_llm::{ChatMessage, LLMProvider};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

/// Produces an answer for one question.
pub trait Answerer: Send + Sync {
    fn answer(&self, question: &str) -> impl Future<Output = Result<Answer, ExamQaError>> + Send;
}

/// Answers questions with an LLM chat completion.
pub struct LlmAnswerer {
    provider: Arc<dyn LLMProvider>,
    config: SolverConfig,
}

impl LlmAnswerer {
    pub fn new(provider: Arc<dyn LLMProvider>, config: SolverConfig) -> Self {
        Self { provider, config }
    }

    /// Resolve the provider from `config` and build an answerer around it.
    pub fn from_config(config: SolverConfig) -> Result<Self, ExamQaError> {
        let provider = resolve_provider(&config)?;
        Ok(Self::new(provider, config))
    }

    fn messages(&self, question: &str) -> Vec<ChatMessage> {
        let system_prompt = self
            .config
            .answer_prompt
            .as_deref()
            .unwrap_or(DEFAULT_ANSWER_PROMPT);
        vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(answer_request(question)),
        ]
    }
}

impl Answerer for LlmAnswerer {
    async fn answer(&self, question: &str) -> Result<Answer, ExamQaError> {
        debug!("Answering question ({} chars)", question.chars().count());
        let messages = self.messages(question);
        let options = answer_options(&self.config);

        let reply = chat_with_retry(&self.provider, &messages, &options, &self.config, "answer")
            .await
            .map_err(LlmFailure::into_answer_error)?;

        info!(
            "Answer ready: {} output tokens in {}ms",
            reply.output_tokens, reply.duration_ms
        );

        Ok(Answer {
            question: question.to_string(),
            text: reply.content.trim().to_string(),
            input_tokens: reply.input_tokens,
            output_tokens: reply.output_tokens,
            duration_ms: reply.duration_ms,
            retries: reply.retries,
        })
    }
}
