//! Agency browsing and search handlers

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::AppState;
use ecfr_common::{
    cfr::{self, EnrichedCfrReference},
    db::models::{Agency, Title},
    db::Repository,
    errors::Result,
    metrics,
};

/// Optional filters accepted by `GET /agencies`
#[derive(Debug, Default, Deserialize)]
pub struct AgencyFilter {
    /// Exact slug match
    pub slug: Option<String>,

    /// Case-insensitive name substring match
    pub name: Option<String>,
}

/// Agency as returned by the API, CFR references enriched with title info
#[derive(Debug, Serialize)]
pub struct AgencyResponse {
    pub id: i32,
    pub name: String,
    pub display_name: Option<String>,
    pub slug: String,
    pub children: Option<serde_json::Value>,
    pub cfr_references: Vec<EnrichedCfrReference>,
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
}

/// Treat blank or whitespace-only parameters as absent.
///
/// The browser client sends empty query fields while the user is still
/// typing; an empty filter imposes no constraint.
fn normalize_filter(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// List agencies with optional slug/name filtering.
///
/// Both filters combined return the intersection. Every returned agency
/// carries its CFR references enriched from the `titles` table, resolved
/// with a single batched lookup across the whole result set.
pub async fn list_agencies(
    State(state): State<AppState>,
    Query(filter): Query<AgencyFilter>,
) -> Result<Json<Vec<AgencyResponse>>> {
    let slug = normalize_filter(filter.slug.as_deref());
    let name = normalize_filter(filter.name.as_deref());

    metrics::record_agency_query(slug.is_some() || name.is_some());

    let repo = Repository::new(state.db.clone());
    let agencies = repo.find_agencies(slug, name).await?;

    // Decode reference JSON once, then resolve every referenced title in
    // one query instead of per agency.
    let decoded: Vec<(Agency, Vec<cfr::CfrReference>)> = agencies
        .into_iter()
        .map(|agency| {
            let refs = cfr::decode_references(agency.cfr_references.as_ref());
            (agency, refs)
        })
        .collect();

    let mut wanted: Vec<i32> = decoded
        .iter()
        .flat_map(|(_, refs)| cfr::referenced_titles(refs))
        .collect();
    wanted.sort_unstable();
    wanted.dedup();

    let titles: HashMap<i32, Title> = repo
        .find_titles(&wanted)
        .await?
        .into_iter()
        .map(|title| (title.title_number, title))
        .collect();

    let response: Vec<AgencyResponse> = decoded
        .into_iter()
        .map(|(agency, refs)| AgencyResponse {
            id: agency.id,
            name: agency.name,
            display_name: agency.display_name,
            slug: agency.slug,
            children: agency.children,
            cfr_references: cfr::enrich_references(refs, &titles),
            created_at: agency.created_at,
            updated_at: agency.updated_at,
        })
        .collect();

    tracing::debug!(
        count = response.len(),
        slug = ?slug,
        name = ?name,
        "Agency query served"
    );

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_filter_drops_blank_values() {
        assert_eq!(normalize_filter(None), None);
        assert_eq!(normalize_filter(Some("")), None);
        assert_eq!(normalize_filter(Some("   ")), None);
        assert_eq!(normalize_filter(Some("epa")), Some("epa"));
        assert_eq!(normalize_filter(Some("  epa ")), Some("epa"));
    }
}
