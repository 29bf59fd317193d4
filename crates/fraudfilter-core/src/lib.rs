//! FraudFilter Core
//!
//! Core types and error handling shared across FraudFilter components.
//!
//! This crate provides:
//! - The canonical review record and its verdict
//! - Product-level summaries and the per-request accounting report
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    AnalysisReport, DetectionStatus, Label, ProductInfo, ProductSummary, RecordFailure, Review,
    ReviewId, Verdict,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{Label, ProductSummary, Review, ReviewId, Verdict};
}
