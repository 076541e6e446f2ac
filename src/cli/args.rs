//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    completions::CompletionsArgs, config::ConfigCommands, entities::EntitiesArgs,
    import::ImportArgs, init::InitArgs, mapping::MappingArgs, template::TemplateArgs,
};
use crate::core::EntityType;

#[derive(Parser)]
#[command(name = "rimport")]
#[command(author, version, about = "Bulk-import research achievements from CSV files")]
#[command(long_about = "Bulk-import research achievements (papers, patents, projects, software copyrights, competitions, conferences, cooperations, resources) from CSV files into the achievement management API.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output (per-row results, debug logging)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a .rimport/ workspace with a starter config
    Init(InitArgs),

    /// Import a CSV file, one create request per row
    Import(ImportArgs),

    /// Write a header-only CSV template for an entity type
    Template(TemplateArgs),

    /// List the supported entity types and their endpoints
    Entities(EntitiesArgs),

    /// Show the column mapping applied to an entity type
    Mapping(MappingArgs),

    /// View and edit configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON (for scripting)
    Json,
}

impl OutputFormat {
    pub fn is_json(&self) -> bool {
        matches!(self, OutputFormat::Json)
    }
}

/// clap value parser for entity type arguments
pub fn parse_entity_type(s: &str) -> Result<EntityType, String> {
    s.parse::<EntityType>().map_err(|e| e.to_string())
}
