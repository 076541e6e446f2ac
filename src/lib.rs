//! rimport: bulk-import research achievements from CSV
//!
//! Turns spreadsheet rows into create requests against the achievement
//! management API, one row at a time, and reports what went through.

pub mod cli;
pub mod core;
pub mod import;
