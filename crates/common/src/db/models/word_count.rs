//! Chapter word-count entity
//!
//! Maps the `ecfr_chapter_wordcount` table. One row per (title, chapter),
//! produced by the title download pipeline.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ecfr_chapter_wordcount")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// CFR title number
    pub title: i32,

    /// Chapter number like I, II, III
    #[sea_orm(column_type = "Text")]
    pub chapter_identifier: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub chapter_heading: Option<String>,

    pub word_count: i32,

    pub character_count: Option<i32>,

    pub is_reserved: bool,

    pub downloaded_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
