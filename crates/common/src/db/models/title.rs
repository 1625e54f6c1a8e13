//! CFR title entity
//!
//! Maps the `titles` table. Used only to enrich agency CFR references
//! with title names and currency dates.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "titles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub title_number: i32,

    #[sea_orm(column_type = "Text")]
    pub title_name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub title_abbreviation: Option<String>,

    pub chapter_count: i32,

    pub is_reserved: bool,

    pub latest_amended_on: Option<Date>,

    pub latest_issue_date: Option<Date>,

    pub up_to_date_as_of: Option<Date>,

    pub created_at: DateTime,

    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
