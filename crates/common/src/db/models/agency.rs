//! Agency entity
//!
//! Maps the `agencies` table written by the ingestion pipeline. The API
//! never inserts or updates rows; there is no ActiveModel usage outside
//! of what SeaORM derives.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "agencies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(column_type = "Text")]
    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub display_name: Option<String>,

    /// Unique, stable identifier assigned at ingestion
    #[sea_orm(column_type = "Text", unique)]
    pub slug: String,

    /// Child agencies as ingested, opaque to the API
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub children: Option<Json>,

    /// CFR title/chapter references, decoded by `crate::cfr`
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub cfr_references: Option<Json>,

    pub created_at: DateTime,

    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
