//! eCFR Atlas Common Library
//!
//! Shared code for the agency metadata service:
//! - Database entities and repository
//! - CFR reference handling
//! - Summary provider client abstraction
//! - Error types and handling
//! - Configuration management
//! - Metrics helpers

pub mod cfr;
pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod summary;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{DbPool, Repository};
pub use errors::{AppError, Result};
pub use summary::Summarizer;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default chat model for agency summaries
pub const DEFAULT_SUMMARY_MODEL: &str = "gpt-3.5-turbo";

/// CFR references beyond this count are omitted from summary prompts
pub const MAX_PROMPT_CFR_REFS: usize = 10;
