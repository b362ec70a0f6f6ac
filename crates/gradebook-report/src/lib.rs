//! Export formats for gradebook grade reports.
//!
//! JSON persistence lives with [`gradebook_core::report::GradeReport`]; this
//! crate renders the same report as a standalone HTML grade sheet or a CSV
//! table for spreadsheets.

pub mod csv;
pub mod html;
