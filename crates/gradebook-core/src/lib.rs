//! gradebook-core: rubric model, grade calculation, and grade reports.
//!
//! This crate defines the rubric data model, the grade calculation kernel,
//! and the engine and report types that the rest of gradebook builds on.

pub mod config;
pub mod engine;
pub mod error;
pub mod grading;
pub mod model;
pub mod parser;
pub mod report;
pub mod results;
pub mod settings;
pub mod statistics;

pub use engine::{grade_grid, GradingEngine};
pub use error::SettingsError;
pub use grading::{aggregate_grid_totals, final_grade, GradeOutcome, GridTotals};
pub use settings::{GradingSettings, SettingsOverride};
