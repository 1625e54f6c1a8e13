//! API handlers module

pub mod agencies;
pub mod health;
pub mod summary;
pub mod word_counts;
