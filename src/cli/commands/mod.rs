//! CLI command implementations

pub mod completions;
pub mod config;
pub mod entities;
pub mod import;
pub mod init;
pub mod mapping;
pub mod template;
