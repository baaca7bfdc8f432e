//! Content Generation Service — the boundary adapter around the
//! text-completion collaborator.
//!
//! Contract: a generation call either yields text or a typed
//! `GenerationError`. No collaborator failure (timeout, 5xx, malformed
//! response) ever escapes this module as a raw error, and nothing here
//! mutates persistent state — callers persist the outcome.
//!
//! Pluggable via the `ContentGenerator` trait held in `AppState` as
//! `Arc<dyn ContentGenerator>`, so jobs and handlers can be exercised with a
//! stub generator in tests.

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::generation::prompts::{COMPANY_NAME_INSTRUCTIONS, JOB_TITLE_INSTRUCTIONS};
use crate::llm_client::LlmClient;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("{0}")]
    Collaborator(String),

    #[error("generator returned empty content")]
    EmptyContent,
}

/// Supporting context for one generation call. `cv_text` may be empty — that
/// means "no resume context", never an error.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub job_description: String,
    pub cv_text: String,
}

impl GenerationContext {
    /// Renders the user-turn message the prompt instructions operate on.
    pub fn user_message(&self) -> String {
        if self.cv_text.trim().is_empty() {
            format!(
                "Here is the job description I'm applying to:\n\n{}\n\n\
                No resume text is available; use only the applicant profile from the instructions.",
                self.job_description
            )
        } else {
            format!(
                "Here is the job description I'm applying to:\n\n{}\n\n\
                Here is my resume, please refer to it when generating the content:\n\n{}",
                self.job_description, self.cv_text
            )
        }
    }
}

#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// Runs one generation with the given prompt as instructions against the
    /// supporting context. Never panics; every failure is a `GenerationError`.
    async fn generate(
        &self,
        prompt: &str,
        context: &GenerationContext,
    ) -> Result<String, GenerationError>;
}

/// Production generator backed by the shared `LlmClient`.
pub struct LlmContentGenerator {
    llm: LlmClient,
}

impl LlmContentGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl ContentGenerator for LlmContentGenerator {
    async fn generate(
        &self,
        prompt: &str,
        context: &GenerationContext,
    ) -> Result<String, GenerationError> {
        let content = self
            .llm
            .ask(prompt, &context.user_message())
            .await
            .map_err(|e| GenerationError::Collaborator(e.to_string()))?;

        if content.trim().is_empty() {
            return Err(GenerationError::EmptyContent);
        }
        Ok(content)
    }
}

/// Best-effort company name extraction. Falls back to "Unknown Company" so a
/// flaky extraction call never blocks the generation flow.
pub async fn extract_company_name(llm: &LlmClient, job_description: &str) -> String {
    single_shot_extract(llm, COMPANY_NAME_INSTRUCTIONS, job_description, "Unknown Company").await
}

/// Best-effort job title extraction. Falls back to "Unknown Position".
pub async fn extract_job_title(llm: &LlmClient, job_description: &str) -> String {
    single_shot_extract(llm, JOB_TITLE_INSTRUCTIONS, job_description, "Unknown Position").await
}

async fn single_shot_extract(
    llm: &LlmClient,
    instructions: &str,
    job_description: &str,
    fallback: &str,
) -> String {
    let user_message = format!("Job description:\n\n{job_description}");
    match llm.ask(instructions, &user_message).await {
        Ok(text) => text.trim().to_string(),
        Err(e) => {
            warn!("Extraction call failed, using fallback '{fallback}': {e}");
            fallback.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_embeds_both_texts() {
        let ctx = GenerationContext {
            job_description: "We need a Rust engineer.".to_string(),
            cv_text: "Ten years of systems programming.".to_string(),
        };
        let msg = ctx.user_message();
        assert!(msg.contains("We need a Rust engineer."));
        assert!(msg.contains("Ten years of systems programming."));
    }

    #[test]
    fn test_empty_cv_means_no_resume_context() {
        let ctx = GenerationContext {
            job_description: "We need a Rust engineer.".to_string(),
            cv_text: "   ".to_string(),
        };
        let msg = ctx.user_message();
        assert!(msg.contains("No resume text is available"));
        assert!(!msg.contains("Here is my resume"));
    }
}
