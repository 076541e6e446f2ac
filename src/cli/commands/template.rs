//! `rimport template` command - Write a header-only CSV template

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;

use crate::cli::args::parse_entity_type;
use crate::cli::GlobalOpts;
use crate::core::EntityType;
use crate::import::render_template;

#[derive(clap::Args, Debug)]
pub struct TemplateArgs {
    /// Entity type to generate the template for
    #[arg(value_parser = parse_entity_type)]
    pub entity_type: EntityType,

    /// Write to this file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Comma-separated header names (default: the entity's standard fields)
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Omit the UTF-8 byte-order mark when writing to a file
    #[arg(long)]
    pub no_bom: bool,
}

pub fn run(args: TemplateArgs, global: &GlobalOpts) -> Result<()> {
    let fields: Vec<String> = if args.fields.is_empty() {
        args.entity_type
            .sample_fields()
            .iter()
            .map(|f| f.to_string())
            .collect()
    } else {
        args.fields
            .iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect()
    };

    if fields.is_empty() {
        return Err(miette::miette!("Template needs at least one field"));
    }

    match &args.output {
        Some(path) => {
            let csv = render_template(&fields, !args.no_bom).into_diagnostic()?;
            fs::write(path, csv).into_diagnostic()?;
            if !global.quiet {
                println!(
                    "{} Wrote {} template ({} columns) to {}",
                    style("✓").green(),
                    style(args.entity_type.as_str()).cyan(),
                    fields.len(),
                    style(path.display()).yellow()
                );
            }
        }
        None => {
            let csv = render_template(&fields, false).into_diagnostic()?;
            print!("{}", csv);

            // Hint goes to stderr so redirected output stays a clean CSV
            if !global.quiet {
                eprintln!();
                eprintln!(
                    "{} Template generated. Redirect to file: rimport template {} > {}_template.csv",
                    style("→").blue(),
                    args.entity_type.as_str(),
                    args.entity_type.as_str()
                );
            }
        }
    }

    Ok(())
}
