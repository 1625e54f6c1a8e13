//! AI agency summary handler
//!
//! Looks the agency up, builds the deterministic prompt, and forwards it
//! to the configured chat completion provider. Unknown agencies return
//! 404 before any provider traffic; provider failures surface as gateway
//! errors with no retry.

use std::collections::HashMap;
use std::time::Instant;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::extractors::AppJson;
use crate::AppState;
use ecfr_common::{
    cfr,
    db::models::Title,
    db::Repository,
    errors::{AppError, Result},
    metrics,
    summary::{build_agency_prompt, parse_summary_content, SYSTEM_PROMPT},
};

/// Request body for `POST /ai/agency-summary`
#[derive(Debug, Deserialize, Validate)]
pub struct AgencySummaryRequest {
    /// Slug of the agency to summarize
    #[validate(length(min = 1, max = 200))]
    pub slug: String,
}

/// Generated summary response
#[derive(Debug, Serialize)]
pub struct AgencySummaryResponse {
    pub slug: String,
    pub summary: String,
    pub key_responsibilities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regulatory_scope: Option<String>,
    pub model: String,
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

/// Generate an AI summary for the agency identified by slug
pub async fn agency_summary(
    State(state): State<AppState>,
    AppJson(request): AppJson<AgencySummaryRequest>,
) -> Result<Json<AgencySummaryResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("slug".to_string()),
    })?;

    let repo = Repository::new(state.db.clone());

    // Unknown agency short-circuits before any provider call
    let agency = repo
        .find_agency_by_slug(&request.slug)
        .await?
        .ok_or_else(|| AppError::AgencyNotFound {
            slug: request.slug.clone(),
        })?;

    let refs = cfr::decode_references(agency.cfr_references.as_ref());
    let titles: HashMap<i32, Title> = repo
        .find_titles(&cfr::referenced_titles(&refs))
        .await?
        .into_iter()
        .map(|title| (title.title_number, title))
        .collect();
    let enriched = cfr::enrich_references(refs, &titles);

    let prompt = build_agency_prompt(&agency.name, agency.display_name.as_deref(), &enriched);

    let start = Instant::now();
    let result = state.summarizer.complete(SYSTEM_PROMPT, &prompt).await;
    metrics::record_summary(
        start.elapsed().as_secs_f64(),
        state.summarizer.model_name(),
        result.is_ok(),
    );

    let content = result?;
    let parsed = parse_summary_content(&content);

    tracing::info!(
        slug = %agency.slug,
        model = %state.summarizer.model_name(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Agency summary generated"
    );

    Ok(Json(AgencySummaryResponse {
        slug: agency.slug,
        summary: parsed.summary,
        key_responsibilities: parsed.key_responsibilities,
        regulatory_scope: parsed.regulatory_scope,
        model: state.summarizer.model_name().to_string(),
        generated_at: chrono::Utc::now(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::http::StatusCode;
    use ecfr_common::config::AppConfig;
    use ecfr_common::db::models::Agency;
    use ecfr_common::db::DbPool;
    use ecfr_common::summary::{MockSummarizer, Summarizer};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn state_with(db: DbPool, mock: Arc<MockSummarizer>) -> AppState {
        AppState {
            config: Arc::new(AppConfig::default()),
            db,
            summarizer: mock as Arc<dyn Summarizer>,
        }
    }

    fn sample_agency(slug: &str) -> Agency {
        let ts = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Agency {
            id: 1,
            name: "Environmental Protection Agency".to_string(),
            display_name: Some("EPA".to_string()),
            slug: slug.to_string(),
            children: None,
            cfr_references: None,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[tokio::test]
    async fn test_unknown_agency_is_404_with_no_provider_call() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<Agency>::new()])
            .into_connection();
        let mock = Arc::new(MockSummarizer::new("unused"));
        let state = state_with(DbPool::from_connection(db), mock.clone());

        let request = AgencySummaryRequest {
            slug: "no-such-agency".to_string(),
        };
        let err = agency_summary(State(state), AppJson(request))
            .await
            .expect_err("unknown slug must not produce a summary");

        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(matches!(err, AppError::AgencyNotFound { ref slug } if slug == "no-such-agency"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_known_agency_calls_provider_once() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_agency("environmental-protection-agency")]])
            .into_connection();
        let mock = Arc::new(MockSummarizer::new(
            r#"{"summary": "Protects the environment.", "key_responsibilities": ["Air quality"]}"#,
        ));
        let state = state_with(DbPool::from_connection(db), mock.clone());

        let request = AgencySummaryRequest {
            slug: "environmental-protection-agency".to_string(),
        };
        let Json(response) = agency_summary(State(state), AppJson(request))
            .await
            .expect("summary should succeed");

        assert_eq!(mock.call_count(), 1);
        assert_eq!(response.slug, "environmental-protection-agency");
        assert_eq!(response.summary, "Protects the environment.");
        assert_eq!(response.key_responsibilities, vec!["Air quality"]);
    }

    #[test]
    fn test_request_validation_rejects_empty_slug() {
        let request = AgencySummaryRequest {
            slug: String::new(),
        };
        assert!(request.validate().is_err());

        let request = AgencySummaryRequest {
            slug: "epa".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_response_omits_absent_scope() {
        let response = AgencySummaryResponse {
            slug: "epa".to_string(),
            summary: "text".to_string(),
            key_responsibilities: Vec::new(),
            regulatory_scope: None,
            model: "mock".to_string(),
            generated_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("regulatory_scope").is_none());
        assert_eq!(json["slug"], "epa");
    }
}
