//! Axum route handlers for the Radar API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::pipeline::radar::{RadarResult, RADAR_AXES, RADAR_CATEGORIES};
use crate::profile::validation::validate_profile_payload;
use crate::state::AppState;

const CATEGORY_DESCRIPTIONS: [&str; RADAR_AXES] = [
    "Total professional work experience",
    "Proficiency in technical competencies",
    "Communication, leadership, and interpersonal skills",
    "Quality and reputation of educational institution",
    "Quality and reputation of past employers",
    "Experience matching the target role/domain",
    "Professional certifications and achievements",
    "Consistency and tenure in previous roles",
];

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarScoresResponse {
    pub success: bool,
    pub radar_data: RadarResult,
    pub generated_at: String,
    pub profile_summary: ProfileSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub total_skills: usize,
    pub years_experience: u32,
    pub companies_worked: usize,
    pub certifications_count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/generate-radar-scores
///
/// Validates the submitted profile and asks the LLM oracle to score it
/// across the eight radar categories.
pub async fn handle_generate_radar_scores(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RadarScoresResponse>, AppError> {
    let Json(body) =
        payload.map_err(|_| AppError::BadRequest("Invalid JSON format".to_string()))?;

    // The profile may arrive nested under "profile" or as the body itself.
    let raw_profile = body.get("profile").cloned().unwrap_or(body);

    let profile =
        validate_profile_payload(&raw_profile).map_err(|message| AppError::Validation {
            error: "Invalid profile data",
            details: vec![message],
        })?;

    info!("Starting radar chart score generation");

    let radar_data = state
        .pipeline
        .generate_radar_scores(&profile)
        .await
        .map_err(|err| AppError::pipeline("Failed to generate radar chart scores", err))?;

    info!("Radar chart scores generated successfully");

    Ok(Json(RadarScoresResponse {
        success: true,
        radar_data,
        generated_at: Utc::now().to_rfc3339(),
        profile_summary: ProfileSummary {
            total_skills: profile.technical_skills.len(),
            years_experience: profile.years_of_experience,
            companies_worked: profile.past_companies.len(),
            certifications_count: profile.certifications.len(),
        },
    }))
}

/// GET /api/radar-config
///
/// Static chart configuration: the eight categories with their weights,
/// the score range, and rendering hints for the frontend chart library.
pub async fn handle_radar_config() -> Json<Value> {
    let categories: Vec<Value> = RADAR_CATEGORIES
        .iter()
        .zip(CATEGORY_DESCRIPTIONS)
        .map(|(&(name, weight), description)| {
            json!({ "name": name, "description": description, "weight": weight })
        })
        .collect();

    Json(json!({
        "success": true,
        "config": {
            "categories": categories,
            "scoreRange": { "min": 1, "max": 10 },
            "chartOptions": {
                "responsive": true,
                "scales": {
                    "r": { "beginAtZero": true, "max": 10, "ticks": { "stepSize": 2 } }
                }
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_radar_config_lists_all_categories_in_order() {
        let Json(body) = handle_radar_config().await;

        let categories = body["config"]["categories"].as_array().unwrap();
        assert_eq!(categories.len(), RADAR_AXES);
        assert_eq!(categories[0]["name"], "Years of Experience");
        assert_eq!(categories[0]["weight"], 1.0);
        assert_eq!(categories[7]["name"], "Job Stability");
        assert_eq!(
            categories[3]["description"],
            "Quality and reputation of educational institution"
        );
    }

    #[tokio::test]
    async fn test_radar_config_score_range_and_chart_options() {
        let Json(body) = handle_radar_config().await;

        assert_eq!(body["success"], true);
        assert_eq!(body["config"]["scoreRange"]["min"], 1);
        assert_eq!(body["config"]["scoreRange"]["max"], 10);
        assert_eq!(
            body["config"]["chartOptions"]["scales"]["r"]["ticks"]["stepSize"],
            2
        );
    }

    #[test]
    fn test_profile_summary_uses_wire_field_names() {
        let summary = ProfileSummary {
            total_skills: 4,
            years_experience: 6,
            companies_worked: 2,
            certifications_count: 1,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["totalSkills"], 4);
        assert_eq!(json["yearsExperience"], 6);
        assert_eq!(json["companiesWorked"], 2);
        assert_eq!(json["certificationsCount"], 1);
    }
}
