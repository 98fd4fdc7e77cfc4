// Profile extraction and radar scoring pipeline.
// Sequences: prompt templating -> LLM gateway -> tolerant JSON parse ->
// normalize (extraction) or validate (scoring). The two operations share
// the lower-level pieces but diverge on purpose in error policy: extracted
// profiles are repaired, radar scores are rejected on any violation.
//
// Stateless per request apart from the prompt cache. Cancellation from an
// outer request deadline propagates by dropping the future, which aborts
// the in-flight gateway call.

pub mod parser;
pub mod profile;
pub mod prompts;
pub mod radar;

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::llm_client::{LlmError, LlmGateway};

use parser::ScanMode;
use profile::Profile;
use prompts::PromptStore;
use radar::RadarResult;

/// CV text is cut to this many characters before prompt substitution.
/// Keeps prompts inside the completion budget for very long résumés.
pub const MAX_CV_CHARS: usize = 10_000;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Prompt loading failed: {0}")]
    TemplateLoad(String),

    #[error("LLM oracle unavailable: {0}")]
    OracleUnavailable(#[from] LlmError),

    #[error("No JSON found in {operation} response")]
    NoJsonFound { operation: &'static str },

    #[error("Failed to parse LLM response for {operation}")]
    JsonParse {
        operation: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid radar data: {0} must be an array")]
    MalformedRadar(&'static str),

    #[error("Invalid radar data: must have exactly 8 {0}")]
    Cardinality(&'static str),

    #[error("Invalid score at index {index}: must be a number between 1 and 10, got {value}")]
    ScoreRange { index: usize, value: serde_json::Value },

    #[error("Failed to serialize profile for scoring prompt")]
    ProfileSerialize(#[source] serde_json::Error),
}

/// Orchestrates the two oracle-backed operations. Holds the template store
/// and the gateway; carries no per-request state, so one instance serves
/// all requests concurrently.
pub struct ProfilePipeline {
    gateway: Arc<dyn LlmGateway>,
    prompts: PromptStore,
    scan_mode: ScanMode,
}

impl ProfilePipeline {
    pub fn new(gateway: Arc<dyn LlmGateway>, prompts: PromptStore, scan_mode: ScanMode) -> Self {
        Self {
            gateway,
            prompts,
            scan_mode,
        }
    }

    /// Extracts a canonical Profile from raw CV text.
    ///
    /// Failure short-circuits at the failing stage; the normalizer itself
    /// never fails, so any well-formed JSON object from the oracle yields
    /// a Profile.
    pub async fn extract_profile(&self, cv_text: &str) -> Result<Profile, PipelineError> {
        info!("Starting LLM profile extraction");

        let cv_text = truncate_chars(cv_text, MAX_CV_CHARS);
        let prompt = self.prompts.extraction_prompt(cv_text).await?;
        let response = self.gateway.complete(&prompt).await?;
        let parsed = parser::parse_json_response(&response, "profile extraction", self.scan_mode)?;
        let profile = profile::normalize_profile(&parsed);

        info!("Profile extraction completed successfully");
        Ok(profile)
    }

    /// Scores a Profile into the fixed eight-axis radar.
    ///
    /// Unlike extraction, the oracle's payload is validated strictly and
    /// the first contract violation is returned as-is.
    pub async fn generate_radar_scores(
        &self,
        profile: &Profile,
    ) -> Result<RadarResult, PipelineError> {
        info!("Starting LLM radar score generation");

        let prompt = self.prompts.scoring_prompt(profile).await?;
        let response = self.gateway.complete(&prompt).await?;
        let parsed = parser::parse_json_response(&response, "radar scoring", self.scan_mode)?;
        let radar = radar::validate_radar(&parsed)?;

        info!("Radar score generation completed successfully");
        Ok(radar)
    }
}

/// Character-bounded prefix without intermediate allocation.
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
