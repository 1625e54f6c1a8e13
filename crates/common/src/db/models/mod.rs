//! SeaORM entity models
//!
//! Read-only mappings of the tables owned by the ingestion pipeline.

mod agency;
mod title;
mod word_count;

pub use agency::{
    Column as AgencyColumn, Entity as AgencyEntity, Model as Agency,
};

pub use title::{
    Column as TitleColumn, Entity as TitleEntity, Model as Title,
};

pub use word_count::{
    Column as WordCountColumn, Entity as WordCountEntity, Model as WordCount,
};
