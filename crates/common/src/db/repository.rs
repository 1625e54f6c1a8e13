//! Repository pattern for database operations
//!
//! The service is read-only: every method here is a parameterized SELECT
//! over the ingested tables. Query construction is split out into plain
//! functions so the generated SQL can be asserted in tests without a
//! database.

use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::Result;
use sea_orm::sea_query::{extension::postgres::PgExpr, Expr};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Select,
};

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

/// Build the agency listing query for the given optional filters.
///
/// Slug matches exactly; name matches as a case-insensitive substring.
/// Supplying both intersects them. Results are ordered by name, matching
/// the public API contract.
pub fn agency_query(slug: Option<&str>, name: Option<&str>) -> Select<AgencyEntity> {
    let mut query = AgencyEntity::find();

    if let Some(slug) = slug {
        query = query.filter(AgencyColumn::Slug.eq(slug));
    }

    if let Some(name) = name {
        query = query.filter(
            Expr::col((AgencyEntity, AgencyColumn::Name)).ilike(format!("%{}%", name)),
        );
    }

    query.order_by_asc(AgencyColumn::Name)
}

/// Build the per-title word-count query, ordered by chapter identifier.
pub fn word_count_query(title: i32) -> Select<WordCountEntity> {
    WordCountEntity::find()
        .filter(WordCountColumn::Title.eq(title))
        .order_by_asc(WordCountColumn::ChapterIdentifier)
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Agency Operations
    // ========================================================================

    /// List agencies, optionally filtered by exact slug and/or name substring
    pub async fn find_agencies(
        &self,
        slug: Option<&str>,
        name: Option<&str>,
    ) -> Result<Vec<Agency>> {
        agency_query(slug, name)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Find a single agency by its unique slug
    pub async fn find_agency_by_slug(&self, slug: &str) -> Result<Option<Agency>> {
        AgencyEntity::find()
            .filter(AgencyColumn::Slug.eq(slug))
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Title Operations
    // ========================================================================

    /// Fetch title metadata for a set of title numbers in one query
    pub async fn find_titles(&self, numbers: &[i32]) -> Result<Vec<Title>> {
        if numbers.is_empty() {
            return Ok(Vec::new());
        }

        TitleEntity::find()
            .filter(TitleColumn::TitleNumber.is_in(numbers.iter().copied()))
            .order_by_asc(TitleColumn::TitleNumber)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Word Count Operations
    // ========================================================================

    /// All chapter word-count rows for a title, ordered by chapter
    pub async fn word_counts_for_title(&self, title: i32) -> Result<Vec<WordCount>> {
        word_count_query(title)
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Word-count row for a single (title, chapter) pair
    pub async fn find_word_count(
        &self,
        title: i32,
        chapter_identifier: &str,
    ) -> Result<Option<WordCount>> {
        WordCountEntity::find()
            .filter(WordCountColumn::Title.eq(title))
            .filter(WordCountColumn::ChapterIdentifier.eq(chapter_identifier))
            .one(self.conn())
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    fn sql(query: Select<AgencyEntity>) -> String {
        query.build(DbBackend::Postgres).to_string()
    }

    #[test]
    fn test_unfiltered_query_returns_all_ordered_by_name() {
        let sql = sql(agency_query(None, None));
        assert!(!sql.contains("WHERE"));
        assert!(sql.contains(r#"ORDER BY "agencies"."name" ASC"#));
    }

    #[test]
    fn test_slug_filter_is_exact_match() {
        let sql = sql(agency_query(Some("epa"), None));
        assert!(sql.contains(r#""agencies"."slug" = 'epa'"#));
        assert!(!sql.contains("ILIKE"));
    }

    #[test]
    fn test_name_filter_is_case_insensitive_substring() {
        let sql = sql(agency_query(None, Some("environ")));
        assert!(sql.contains(r#"ILIKE '%environ%'"#));
    }

    #[test]
    fn test_combined_filters_intersect() {
        let sql = sql(agency_query(Some("epa"), Some("environ")));
        assert!(sql.contains(r#""agencies"."slug" = 'epa'"#));
        assert!(sql.contains("ILIKE"));
        assert!(sql.contains(" AND "));
    }

    #[test]
    fn test_word_count_query_orders_by_chapter() {
        let sql = word_count_query(40).build(DbBackend::Postgres).to_string();
        assert!(sql.contains(r#""ecfr_chapter_wordcount"."title" = 40"#));
        assert!(sql.contains(r#"ORDER BY "ecfr_chapter_wordcount"."chapter_identifier" ASC"#));
    }
}
