//! M8 Analytics - event ROI and conversion analytics for financial advisors.
//!
//! Loads marketing events exported from the M8 Business Suite backend,
//! aggregates them into summary, per-event, monthly and per-type metrics,
//! and renders the results as Markdown, JSON or CSV.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod loader;
pub mod models;
pub mod report;
pub mod session;

pub use analysis::{aggregate, aggregate_window};
pub use models::{AnalyticsResult, Event};
