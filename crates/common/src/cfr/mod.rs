//! CFR reference handling
//!
//! Agency rows carry a `cfr_references` JSONB column written by the
//! ingestion pipeline. Entries are loosely shaped: most carry a numeric
//! `title` (and usually a `chapter`), older rows carry only a `citation`
//! string like "Title 40 Chapter I". This module decodes both forms and
//! enriches references with metadata from the `titles` table.

use crate::db::models::Title;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// A single CFR title/chapter reference as stored on an agency row.
///
/// Unknown keys are preserved through `extra` so the API returns the
/// ingested reference unmodified apart from enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfrReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub citation: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CfrReference {
    /// Resolve the CFR title number for this reference.
    ///
    /// Prefers the explicit `title` field, falls back to parsing the
    /// `citation` string.
    pub fn title_number(&self) -> Option<i32> {
        self.title
            .or_else(|| self.citation.as_deref().and_then(parse_citation_title))
    }
}

/// A CFR reference augmented with metadata from the `titles` table.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedCfrReference {
    #[serde(flatten)]
    pub reference: CfrReference,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_amended_on: Option<chrono::NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_issue_date: Option<chrono::NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub up_to_date_as_of: Option<chrono::NaiveDate>,
}

/// Parse a title number out of a citation string like "Title 40 Chapter I".
pub fn parse_citation_title(citation: &str) -> Option<i32> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let re = PATTERN.get_or_init(|| {
        Regex::new(r"[Tt]itle\s+(\d+)").expect("citation pattern is valid")
    });

    re.captures(citation)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Decode the raw `cfr_references` JSONB column into typed references.
///
/// The column is nullable and the ingestion pipeline has written both
/// arrays and nulls over time; anything that is not an array of objects
/// decodes to an empty list rather than failing the whole agency row.
pub fn decode_references(raw: Option<&serde_json::Value>) -> Vec<CfrReference> {
    match raw {
        Some(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// Collect the distinct title numbers referenced by a set of references.
pub fn referenced_titles(refs: &[CfrReference]) -> Vec<i32> {
    let mut titles: Vec<i32> = refs.iter().filter_map(CfrReference::title_number).collect();
    titles.sort_unstable();
    titles.dedup();
    titles
}

/// Attach title metadata to each reference that resolves to a known title.
///
/// References to titles absent from the map pass through unenriched.
pub fn enrich_references(
    refs: Vec<CfrReference>,
    titles: &HashMap<i32, Title>,
) -> Vec<EnrichedCfrReference> {
    refs.into_iter()
        .map(|reference| {
            let info = reference.title_number().and_then(|n| titles.get(&n));
            EnrichedCfrReference {
                title_name: info.map(|t| t.title_name.clone()),
                latest_amended_on: info.and_then(|t| t.latest_amended_on),
                latest_issue_date: info.and_then(|t| t.latest_issue_date),
                up_to_date_as_of: info.and_then(|t| t.up_to_date_as_of),
                reference,
            }
        })
        .collect()
}
