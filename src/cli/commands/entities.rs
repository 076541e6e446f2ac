//! `rimport entities` command - List supported entity types

use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::json;

use crate::cli::GlobalOpts;
use crate::core::{Config, EntityType};

#[derive(clap::Args, Debug)]
pub struct EntitiesArgs {
    /// Show full endpoint URLs using the configured API base
    #[arg(long)]
    pub urls: bool,
}

pub fn run(args: EntitiesArgs, global: &GlobalOpts) -> Result<()> {
    let base = if args.urls {
        let config = Config::load().into_diagnostic()?;
        config.api_url().trim_end_matches('/').to_string()
    } else {
        String::new()
    };

    if global.format.is_json() {
        let list: Vec<_> = EntityType::all()
            .iter()
            .map(|entity| {
                json!({
                    "type": entity.as_str(),
                    "name": entity.display_name(),
                    "endpoint": format!("{}{}", base, entity.endpoint()),
                    "fields": entity.sample_fields(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&list).into_diagnostic()?);
        return Ok(());
    }

    if !global.quiet {
        println!(
            "{:<22} {:<28} {}",
            style("TYPE").bold(),
            style("ENDPOINT").bold(),
            style("NAME").bold()
        );
    }
    for entity in EntityType::all() {
        println!(
            "{:<22} {:<28} {}",
            style(entity.as_str()).cyan(),
            format!("{}{}", base, entity.endpoint()),
            entity.display_name()
        );
    }

    Ok(())
}
