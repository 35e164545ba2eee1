//! Report rendering.
//!
//! Formatting of currency and percentages happens here and nowhere else;
//! the analytics themselves carry raw numbers.

pub mod csv;
pub mod generator;

pub use self::csv::generate_csv_report;
pub use generator::*;
