//! Canonical Profile shape and the total normalizer that produces it.
//!
//! Extraction output is repaired, never rejected: whatever the model
//! returned, normalization yields a well-typed Profile by substituting
//! defaults field by field. Content quality is not checked here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default college tier when the extracted value is missing or unparsable.
pub const DEFAULT_COLLEGE_TIER: u8 = 5;

/// Structured résumé data produced by the extraction pipeline.
///
/// Field names follow the wire format consumed by the chart frontend, so
/// everything serializes camelCase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub years_of_experience: u32,
    /// Skill name to proficiency. Entries pass through unrepaired, so a
    /// value here may be any JSON; only the top-level shape is guaranteed.
    pub technical_skills: Map<String, Value>,
    pub soft_skills: Vec<String>,
    pub education: Education,
    pub past_companies: Vec<String>,
    pub certifications: Vec<String>,
    /// One entry per past role. Cardinality is not cross-checked against
    /// `past_companies`.
    pub job_tenure_years: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub college_name: String,
    pub tier: u8,
}

impl Default for Education {
    fn default() -> Self {
        Self {
            college_name: String::new(),
            tier: DEFAULT_COLLEGE_TIER,
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            years_of_experience: 0,
            technical_skills: Map::new(),
            soft_skills: Vec::new(),
            education: Education::default(),
            past_companies: Vec::new(),
            certifications: Vec::new(),
            job_tenure_years: Vec::new(),
        }
    }
}

/// Repairs a loosely-typed extracted value into a canonical Profile.
///
/// Total over any JSON value, `null` and wrong shapes included. Missing or
/// mistyped fields become defaults; years floor at 0; the college tier
/// clamps into 1..=10 with 5 when unparsable.
pub fn normalize_profile(raw: &Value) -> Profile {
    let education = raw.get("education");

    Profile {
        years_of_experience: lenient_int(raw.get("yearsOfExperience"))
            .unwrap_or(0)
            .clamp(0, i64::from(u32::MAX)) as u32,
        technical_skills: match raw.get("technicalSkills") {
            Some(Value::Object(skills)) => skills.clone(),
            _ => Map::new(),
        },
        soft_skills: string_seq(raw.get("softSkills")),
        education: Education {
            college_name: education
                .and_then(|e| e.get("collegeName"))
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            tier: lenient_int(education.and_then(|e| e.get("tier")))
                .unwrap_or(i64::from(DEFAULT_COLLEGE_TIER))
                .clamp(1, 10) as u8,
        },
        past_companies: string_seq(raw.get("pastCompanies")),
        certifications: string_seq(raw.get("certifications")),
        job_tenure_years: tenure_seq(raw.get("jobTenureYears")),
    }
}

/// Integer reading in the spirit of a lenient text parse: numbers truncate
/// toward zero, strings count leading digits ("5 years" reads as 5).
fn lenient_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => parse_leading_int(s),
        _ => None,
    }
}

fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1i64, rest),
        None => (1i64, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

fn string_seq(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_owned))
            .collect(),
        _ => Vec::new(),
    }
}

fn tenure_seq(value: Option<&Value>) -> Vec<f64> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_f64)
            .map(|years| years.max(0.0))
            .collect(),
        _ => Vec::new(),
    }
}
