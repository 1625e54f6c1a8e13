//! Word-count lookup handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::AppState;
use ecfr_common::{
    db::models::WordCount,
    db::Repository,
    errors::{AppError, Result},
};

/// Aggregate word-count view for a CFR title
#[derive(Debug, Serialize)]
pub struct TitleWordCountResponse {
    pub title: i32,
    pub total_word_count: i64,
    pub chapter_count: usize,
    pub chapters: Vec<ChapterWordCount>,
}

/// Per-chapter word-count row
#[derive(Debug, Serialize)]
pub struct ChapterWordCount {
    pub id: i32,
    pub chapter_identifier: String,
    pub chapter_heading: Option<String>,
    pub word_count: i32,
    pub character_count: Option<i32>,
    pub is_reserved: bool,
    pub downloaded_at: chrono::NaiveDateTime,
}

impl From<WordCount> for ChapterWordCount {
    fn from(row: WordCount) -> Self {
        Self {
            id: row.id,
            chapter_identifier: row.chapter_identifier,
            chapter_heading: row.chapter_heading,
            word_count: row.word_count,
            character_count: row.character_count,
            is_reserved: row.is_reserved,
            downloaded_at: row.downloaded_at,
        }
    }
}

/// Fold chapter rows into the title aggregate.
///
/// Returns `None` for an empty row set: a title with no recorded counts is
/// not-found, never a zero total.
fn aggregate(title: i32, rows: Vec<WordCount>) -> Option<TitleWordCountResponse> {
    if rows.is_empty() {
        return None;
    }

    let total_word_count = rows.iter().map(|row| row.word_count as i64).sum();
    let chapters: Vec<ChapterWordCount> = rows.into_iter().map(Into::into).collect();

    Some(TitleWordCountResponse {
        title,
        total_word_count,
        chapter_count: chapters.len(),
        chapters,
    })
}

/// Word counts for every chapter of a title, with the title total
pub async fn title_word_counts(
    State(state): State<AppState>,
    Path(title): Path<i32>,
) -> Result<Json<TitleWordCountResponse>> {
    let repo = Repository::new(state.db.clone());
    let rows = repo.word_counts_for_title(title).await?;

    aggregate(title, rows)
        .map(Json)
        .ok_or(AppError::WordCountNotFound { title })
}

/// Word count for a single (title, chapter) pair
pub async fn chapter_word_count(
    State(state): State<AppState>,
    Path((title, chapter)): Path<(i32, String)>,
) -> Result<Json<ChapterWordCount>> {
    let repo = Repository::new(state.db.clone());

    let row = repo
        .find_word_count(title, &chapter)
        .await?
        .ok_or_else(|| AppError::NotFound {
            resource_type: "word count".to_string(),
            id: format!("title {} chapter {}", title, chapter),
        })?;

    Ok(Json(row.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i32, chapter: &str, words: i32) -> WordCount {
        WordCount {
            id,
            title: 40,
            chapter_identifier: chapter.to_string(),
            chapter_heading: None,
            word_count: words,
            character_count: None,
            is_reserved: false,
            downloaded_at: chrono::NaiveDateTime::default(),
        }
    }

    #[test]
    fn test_aggregate_sums_chapters() {
        let response = aggregate(40, vec![row(1, "I", 1000), row(2, "II", 250)]).unwrap();
        assert_eq!(response.title, 40);
        assert_eq!(response.total_word_count, 1250);
        assert_eq!(response.chapter_count, 2);
        assert_eq!(response.chapters[0].chapter_identifier, "I");
    }

    #[test]
    fn test_aggregate_empty_is_not_found() {
        assert!(aggregate(99, Vec::new()).is_none());
    }

    #[test]
    fn test_aggregate_never_fabricates_zero() {
        // A missing title must map to None, not a zero-count response
        let response = aggregate(7, vec![row(1, "I", 0)]);
        assert!(response.is_some());
        assert_eq!(response.unwrap().total_word_count, 0);
        assert!(aggregate(7, Vec::new()).is_none());
    }
}
