//! Bounds checking for client-supplied profile data.
//!
//! Two entry points: manual-entry payloads are checked and echoed back,
//! scoring payloads are checked and built into a complete `Profile` with
//! defaults for absent fields. Unlike extraction normalization, both
//! REJECT out-of-bounds values; repair is reserved for oracle output.
//! That includes the integer fields: years and tier must arrive as JSON
//! integers, so numeric strings and fractional values are violations
//! here even though normalization would coerce them.

use serde_json::{Map, Value};

use crate::pipeline::profile::{Education, Profile, DEFAULT_COLLEGE_TIER};

const MAX_YEARS_OF_EXPERIENCE: i64 = 50;
const MIN_PROFICIENCY: f64 = 1.0;
const MAX_PROFICIENCY: f64 = 10.0;

const KNOWN_FIELDS: [&str; 7] = [
    "yearsOfExperience",
    "technicalSkills",
    "softSkills",
    "education",
    "pastCompanies",
    "certifications",
    "jobTenureYears",
];

/// Validates a manual-entry payload. Every field is optional; present
/// fields must be well-typed and in bounds. Fails on the first violation.
pub fn validate_manual_data(raw: &Value) -> Result<Value, String> {
    let object = as_object(raw)?;
    reject_unknown_fields(object)?;

    if let Some(years) = object.get("yearsOfExperience") {
        check_years(years)?;
    }
    if let Some(skills) = object.get("technicalSkills") {
        check_technical_skills(skills)?;
    }
    if let Some(value) = object.get("softSkills") {
        check_string_array("softSkills", value)?;
    }
    if let Some(education) = object.get("education") {
        check_education(education)?;
    }
    if let Some(value) = object.get("pastCompanies") {
        check_string_array("pastCompanies", value)?;
    }
    if let Some(value) = object.get("certifications") {
        check_string_array("certifications", value)?;
    }
    if let Some(value) = object.get("jobTenureYears") {
        check_tenures(value)?;
    }

    Ok(raw.clone())
}

/// Validates a scoring-request payload into a complete `Profile`, filling
/// defaults for absent fields.
pub fn validate_profile_payload(raw: &Value) -> Result<Profile, String> {
    let object = as_object(raw)?;
    reject_unknown_fields(object)?;

    let years_of_experience = match object.get("yearsOfExperience") {
        Some(value) => check_years(value)?,
        None => 0,
    };

    let technical_skills = match object.get("technicalSkills") {
        Some(value) => check_technical_skills(value)?.clone(),
        None => Map::new(),
    };

    let soft_skills = match object.get("softSkills") {
        Some(value) => check_string_array("softSkills", value)?,
        None => Vec::new(),
    };

    let education = match object.get("education") {
        Some(value) => check_education(value)?,
        None => Education::default(),
    };

    let past_companies = match object.get("pastCompanies") {
        Some(value) => check_string_array("pastCompanies", value)?,
        None => Vec::new(),
    };

    let certifications = match object.get("certifications") {
        Some(value) => check_string_array("certifications", value)?,
        None => Vec::new(),
    };

    let job_tenure_years = match object.get("jobTenureYears") {
        Some(value) => check_tenures(value)?,
        None => Vec::new(),
    };

    Ok(Profile {
        years_of_experience,
        technical_skills,
        soft_skills,
        education,
        past_companies,
        certifications,
        job_tenure_years,
    })
}

fn as_object(raw: &Value) -> Result<&Map<String, Value>, String> {
    raw.as_object()
        .ok_or_else(|| "payload must be an object".to_string())
}

fn reject_unknown_fields(object: &Map<String, Value>) -> Result<(), String> {
    for key in object.keys() {
        if !KNOWN_FIELDS.contains(&key.as_str()) {
            return Err(format!("{key} is not allowed"));
        }
    }
    Ok(())
}

fn check_years(value: &Value) -> Result<u32, String> {
    value
        .as_i64()
        .filter(|y| (0..=MAX_YEARS_OF_EXPERIENCE).contains(y))
        .map(|y| y as u32)
        .ok_or_else(|| {
            format!("yearsOfExperience must be an integer between 0 and {MAX_YEARS_OF_EXPERIENCE}")
        })
}

fn check_technical_skills(value: &Value) -> Result<&Map<String, Value>, String> {
    let skills = value
        .as_object()
        .ok_or_else(|| "technicalSkills must be an object".to_string())?;

    for (name, proficiency) in skills {
        let in_range = proficiency
            .as_f64()
            .map(|p| (MIN_PROFICIENCY..=MAX_PROFICIENCY).contains(&p))
            .unwrap_or(false);
        if !in_range {
            return Err(format!(
                "technicalSkills.{name} must be a number between 1 and 10"
            ));
        }
    }

    Ok(skills)
}

fn check_string_array(field: &str, value: &Value) -> Result<Vec<String>, String> {
    let items = value
        .as_array()
        .ok_or_else(|| format!("{field} must be an array"))?;

    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_owned)
                .ok_or_else(|| format!("{field} must contain only strings"))
        })
        .collect()
}

fn check_education(value: &Value) -> Result<Education, String> {
    let object = value
        .as_object()
        .ok_or_else(|| "education must be an object".to_string())?;

    for key in object.keys() {
        if key != "collegeName" && key != "tier" {
            return Err(format!("education.{key} is not allowed"));
        }
    }

    let college_name = match object.get("collegeName") {
        Some(name) => name
            .as_str()
            .ok_or_else(|| "education.collegeName must be a string".to_string())?
            .to_string(),
        None => String::new(),
    };

    let tier = match object.get("tier") {
        Some(value) => {
            value
                .as_i64()
                .filter(|t| (1..=10).contains(t))
                .ok_or_else(|| "education.tier must be an integer between 1 and 10".to_string())?
                as u8
        }
        None => DEFAULT_COLLEGE_TIER,
    };

    Ok(Education { college_name, tier })
}

fn check_tenures(value: &Value) -> Result<Vec<f64>, String> {
    let items = value
        .as_array()
        .ok_or_else(|| "jobTenureYears must be an array".to_string())?;

    items
        .iter()
        .map(|item| {
            item.as_f64()
                .filter(|years| *years >= 0.0)
                .ok_or_else(|| {
                    "jobTenureYears must contain only non-negative numbers".to_string()
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_manual_data_accepts_full_payload() {
        let payload = json!({
            "yearsOfExperience": 6,
            "technicalSkills": {"Python": 8, "Go": 7.5},
            "softSkills": ["communication"],
            "education": {"collegeName": "State U", "tier": 3},
            "pastCompanies": ["Acme"],
            "certifications": ["AWS SAA"],
            "jobTenureYears": [2, 3.5],
        });
        let echoed = validate_manual_data(&payload).unwrap();
        assert_eq!(echoed, payload);
    }

    #[test]
    fn test_manual_data_accepts_empty_object() {
        assert!(validate_manual_data(&json!({})).is_ok());
    }

    #[test]
    fn test_manual_data_rejects_non_object() {
        assert!(validate_manual_data(&json!("profile")).is_err());
        assert!(validate_manual_data(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_manual_data_rejects_unknown_field() {
        let err = validate_manual_data(&json!({"favoriteColor": "blue"})).unwrap_err();
        assert_eq!(err, "favoriteColor is not allowed");
    }

    #[test]
    fn test_years_bounds() {
        assert!(validate_manual_data(&json!({"yearsOfExperience": 0})).is_ok());
        assert!(validate_manual_data(&json!({"yearsOfExperience": 50})).is_ok());
        assert!(validate_manual_data(&json!({"yearsOfExperience": 51})).is_err());
        assert!(validate_manual_data(&json!({"yearsOfExperience": -1})).is_err());
        assert!(validate_manual_data(&json!({"yearsOfExperience": "5"})).is_err());
        assert!(validate_manual_data(&json!({"yearsOfExperience": 2.5})).is_err());
    }

    #[test]
    fn test_skill_proficiency_bounds() {
        assert!(validate_manual_data(&json!({"technicalSkills": {"Rust": 10}})).is_ok());
        assert!(validate_manual_data(&json!({"technicalSkills": {"Rust": 11}})).is_err());
        assert!(validate_manual_data(&json!({"technicalSkills": {"Rust": 0.5}})).is_err());
        let err =
            validate_manual_data(&json!({"technicalSkills": {"Rust": "expert"}})).unwrap_err();
        assert_eq!(err, "technicalSkills.Rust must be a number between 1 and 10");
    }

    #[test]
    fn test_string_arrays_reject_mixed_elements() {
        assert!(validate_manual_data(&json!({"softSkills": ["a", 1]})).is_err());
        assert!(validate_manual_data(&json!({"pastCompanies": "Acme"})).is_err());
    }

    #[test]
    fn test_education_bounds() {
        assert!(validate_manual_data(&json!({"education": {"tier": 1}})).is_ok());
        assert!(validate_manual_data(&json!({"education": {"tier": 0}})).is_err());
        assert!(validate_manual_data(&json!({"education": {"tier": 11}})).is_err());
        assert!(validate_manual_data(&json!({"education": {"campus": "north"}})).is_err());
        assert!(validate_manual_data(&json!({"education": {"collegeName": 7}})).is_err());
    }

    #[test]
    fn test_tenures_reject_negatives() {
        assert!(validate_manual_data(&json!({"jobTenureYears": [0, 1.5]})).is_ok());
        assert!(validate_manual_data(&json!({"jobTenureYears": [-0.5]})).is_err());
        assert!(validate_manual_data(&json!({"jobTenureYears": ["two"]})).is_err());
    }

    #[test]
    fn test_profile_payload_fills_defaults() {
        let profile = validate_profile_payload(&json!({})).unwrap();
        assert_eq!(profile, Profile::default());
    }

    #[test]
    fn test_profile_payload_keeps_valid_values() {
        let profile = validate_profile_payload(&json!({
            "yearsOfExperience": 8,
            "technicalSkills": {"Python": 9},
            "education": {"collegeName": "Tech", "tier": 2},
            "jobTenureYears": [3, 5],
        }))
        .unwrap();

        assert_eq!(profile.years_of_experience, 8);
        assert_eq!(profile.technical_skills["Python"], json!(9));
        assert_eq!(profile.education.college_name, "Tech");
        assert_eq!(profile.education.tier, 2);
        assert_eq!(profile.job_tenure_years, vec![3.0, 5.0]);
        assert!(profile.soft_skills.is_empty());
    }

    #[test]
    fn test_profile_payload_rejects_instead_of_clamping() {
        // Scoring input is validated, not repaired
        assert!(validate_profile_payload(&json!({"yearsOfExperience": 51})).is_err());
        assert!(validate_profile_payload(&json!({"education": {"tier": 0}})).is_err());
        assert!(validate_profile_payload(&json!({"technicalSkills": {"Go": 12}})).is_err());
    }

    #[test]
    fn test_profile_payload_defaults_education_when_absent() {
        let profile = validate_profile_payload(&json!({"yearsOfExperience": 1})).unwrap();
        assert_eq!(profile.education.college_name, "");
        assert_eq!(profile.education.tier, DEFAULT_COLLEGE_TIER);
    }
}
