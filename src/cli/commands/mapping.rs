//! `rimport mapping` command - Show column mappings

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::args::parse_entity_type;
use crate::cli::GlobalOpts;
use crate::core::{Config, EntityType};
use crate::import::{FieldMapping, FieldRule};

#[derive(clap::Args, Debug)]
pub struct MappingArgs {
    /// Entity type whose mapping to show
    #[arg(value_parser = parse_entity_type)]
    pub entity_type: EntityType,

    /// Ignore overrides from config files
    #[arg(long)]
    pub builtin: bool,
}

pub fn run(args: MappingArgs, global: &GlobalOpts) -> Result<()> {
    let table = if args.builtin {
        crate::import::MappingTable::builtin()
    } else {
        Config::load().into_diagnostic()?.mapping_table()
    };

    let empty = FieldMapping::new();
    let mapping = table.mapping(args.entity_type).unwrap_or(&empty);

    if global.format.is_json() {
        println!("{}", serde_json::to_string_pretty(mapping).into_diagnostic()?);
        return Ok(());
    }

    if mapping.is_empty() {
        println!(
            "{} {} has no column mapping; every column is sent under its own name",
            style("→").blue(),
            style(args.entity_type.as_str()).cyan()
        );
        return Ok(());
    }

    for (column, rule) in mapping.iter() {
        match rule {
            FieldRule::Rename(target) => println!(
                "  {:<24} {} {}",
                style(column).cyan(),
                style("→").dim(),
                style(target).green()
            ),
            FieldRule::Skip => {
                println!("  {:<24} {}", style(column).cyan(), style("(skipped)").dim())
            }
            FieldRule::Keep => {
                println!("  {:<24} {}", style(column).cyan(), style("(kept)").dim())
            }
        }
    }

    if !global.quiet {
        println!();
        println!(
            "{}",
            style("Columns not listed are sent under their own name. Blank cells are never sent.")
                .dim()
        );
    }

    Ok(())
}
