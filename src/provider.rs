//! LLM provider resolution.
//!
//! The four-level fallback chain lets library users and CLI users each set
//! exactly as much or as little as they need:
//!
//! 1. **Pre-built provider** (`config.provider`): used as-is.
//! 2. **Named provider + model** (`config.provider_name`): built through
//!    [`ProviderFactory::create_llm_provider`], which reads the matching API
//!    key (`OPENAI_API_KEY`, …) from the environment.
//! 3. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
//! 4. **Auto-detection**: OpenAI when `OPENAI_API_KEY` is set, otherwise
//!    whatever [`ProviderFactory::from_env`] finds first.

use crate::config::{SolverConfig, DEFAULT_MODEL};
use crate::error::ExamQaError;
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::debug;

/// Resolve the LLM provider, from most-specific to least-specific.
pub fn resolve_provider(config: &SolverConfig) -> Result<Arc<dyn LLMProvider>, ExamQaError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| ExamQaError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

/// Instantiate a named provider with the given model.
fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, ExamQaError> {
    debug!("Creating LLM provider '{}' with model '{}'", provider_name, model);
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        ExamQaError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}
