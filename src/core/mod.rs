//! Core module - fundamental types and utilities

pub mod config;
pub mod entity;
pub mod project;

pub use config::{Config, ConfigError};
pub use entity::{EntityType, EntityTypeError};
pub use project::{Project, ProjectError};
