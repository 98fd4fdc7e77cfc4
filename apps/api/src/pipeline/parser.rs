//! Tolerant extraction of a JSON object from free-text LLM output.
//!
//! Models wrap JSON in prose and markdown no matter how firmly the prompt
//! forbids it. The default scan takes the substring between the first `{`
//! and the last `}` and parses that. This is index arithmetic, not a
//! balanced scan: a stray `}` after the real object widens the span and the
//! parse fails. Downstream behavior depends on these exact semantics, so
//! the stricter depth-tracking scan is opt-in via config, never the default.

use serde_json::Value;
use tracing::debug;

use crate::pipeline::PipelineError;

/// Strategy for locating the JSON object span inside a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanMode {
    /// First `{` to last `}`, inclusive.
    #[default]
    FirstLast,
    /// First `{` to its matching close brace, string-aware.
    Balanced,
}

/// Extracts and parses the JSON object embedded in `response`.
///
/// `operation` tags the resulting error so extraction failures and scoring
/// failures stay distinguishable in logs. The raw response is logged at
/// debug level on failure and never carried inside the error itself.
pub fn parse_json_response(
    response: &str,
    operation: &'static str,
    mode: ScanMode,
) -> Result<Value, PipelineError> {
    let span = match mode {
        ScanMode::FirstLast => first_last_span(response),
        ScanMode::Balanced => balanced_span(response),
    };

    let Some(json_str) = span else {
        debug!("Raw response: {response}");
        return Err(PipelineError::NoJsonFound { operation });
    };

    serde_json::from_str(json_str).map_err(|source| {
        debug!("Raw response: {response}");
        PipelineError::JsonParse { operation, source }
    })
}

fn first_last_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        // `}` before the first `{`. The index arithmetic slices an empty
        // string here, which then fails to parse.
        return Some("");
    }
    Some(&text[start..=end])
}

fn balanced_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
