//! The trade-record transform pipeline.
//!
//! - [`stages`] - numeric normalization, ingredient extraction, USD derivation
//! - [`filter`] - human-use keyword filter and interactive selections
//! - [`aggregate`] - top-N groupby/sum rankings and display formatting
//! - [`pipeline`] - orchestration from workbook bytes to a filtered table

pub mod aggregate;
pub mod filter;
pub mod pipeline;
pub mod stages;
