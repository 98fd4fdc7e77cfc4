//! Strict validation of oracle-produced radar scores.
//!
//! Scores feed a fixed eight-axis chart, so the contract is enforced and
//! violations are rejected outright. Nothing here repairs data; the repair
//! policy lives in `profile`, not in scoring.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pipeline::PipelineError;

/// Number of chart axes. Labels and scores must both have exactly this
/// cardinality.
pub const RADAR_AXES: usize = 8;

/// Inclusive score bounds.
pub const MIN_SCORE: f64 = 1.0;
pub const MAX_SCORE: f64 = 10.0;

/// The fixed competency categories in chart axis order, paired with their
/// display weights. Weights are metadata for the frontend and play no part
/// in score computation or validation.
pub const RADAR_CATEGORIES: [(&str, f64); RADAR_AXES] = [
    ("Years of Experience", 1.0),
    ("Technical Skills", 1.2),
    ("Soft Skills", 0.8),
    ("College Tier", 0.7),
    ("Company Reputation", 0.9),
    ("Relevant Experience", 1.1),
    ("Certifications/Awards", 0.6),
    ("Job Stability", 0.8),
];

/// Validated competency assessment: one score per category, positionally
/// aligned with `labels`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarResult {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

/// Checks a parsed oracle payload against the radar contract.
///
/// Checks run in a fixed order and the first violation wins: shape of
/// `labels`, shape of `scores`, cardinality of each, then every score
/// numeric and inside [1, 10]. Valid input round-trips without reordering.
pub fn validate_radar(raw: &Value) -> Result<RadarResult, PipelineError> {
    let labels = match raw.get("labels") {
        Some(Value::Array(items)) => items,
        _ => return Err(PipelineError::MalformedRadar("labels")),
    };

    let scores = match raw.get("scores") {
        Some(Value::Array(items)) => items,
        _ => return Err(PipelineError::MalformedRadar("scores")),
    };

    if labels.len() != RADAR_AXES {
        return Err(PipelineError::Cardinality("labels"));
    }

    if scores.len() != RADAR_AXES {
        return Err(PipelineError::Cardinality("scores"));
    }

    let mut checked = Vec::with_capacity(RADAR_AXES);
    for (index, value) in scores.iter().enumerate() {
        let score = value
            .as_f64()
            .filter(|s| (MIN_SCORE..=MAX_SCORE).contains(s))
            .ok_or_else(|| PipelineError::ScoreRange {
                index,
                value: value.clone(),
            })?;
        checked.push(score);
    }

    Ok(RadarResult {
        labels: labels
            .iter()
            .map(|label| match label {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        scores: checked,
    })
}
