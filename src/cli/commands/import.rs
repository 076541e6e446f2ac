//! `rimport import` command - Import achievements from a CSV file

use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::{json, Value};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::cli::args::parse_entity_type;
use crate::cli::GlobalOpts;
use crate::core::{Config, EntityType};
use crate::import::{
    import_bytes_with, prepare_bytes, read_file, Driver, HttpSubmitter, ImportOutcome,
    ImportReport, ParseError, PreparedRow, Transformer,
};

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Entity type to import (papers, projects, patents, software-copyrights,
    /// competitions, conferences, cooperations, resources)
    #[arg(value_parser = parse_entity_type)]
    pub entity_type: EntityType,

    /// CSV file to import (UTF-8, first row = headers)
    pub file: PathBuf,

    /// Transform rows and print the request bodies without sending them
    #[arg(long)]
    pub dry_run: bool,

    /// API base URL (overrides config and RIMPORT_API_URL)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Bearer token (overrides config and RIMPORT_TOKEN)
    #[arg(long)]
    pub token: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

pub async fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    if !args.file.exists() {
        return Err(miette::miette!("File not found: {}", args.file.display()));
    }

    let mut config = Config::load().into_diagnostic()?;
    config.merge(Config {
        api_url: args.api_url.clone(),
        token: args.token.clone(),
        timeout_secs: args.timeout,
        ..Default::default()
    });

    let entity = args.entity_type;
    let text_output = !global.format.is_json();

    if text_output && !global.quiet {
        println!(
            "{} Importing {} ({}) from {}{}",
            style("→").blue(),
            style(entity.display_name()).cyan(),
            entity.as_str(),
            style(args.file.display()).yellow(),
            if args.dry_run {
                style(" (dry run)").dim().to_string()
            } else {
                String::new()
            }
        );
        println!();
    }

    let bytes = match read_file(&args.file) {
        Ok(bytes) => bytes,
        Err(e) => return Err(parse_failed(&e, global)),
    };
    let transformer = Transformer::new(config.mapping_table());

    if args.dry_run {
        let prepared = match prepare_bytes(entity, &bytes, &transformer) {
            Ok(prepared) => prepared,
            Err(e) => return Err(parse_failed(&e, global)),
        };
        return print_dry_run(entity, &config, &prepared, global);
    }

    let token = config.token().map(str::to_string).ok_or_else(|| {
        miette::miette!(
            help = "pass --token, set RIMPORT_TOKEN, or run `rimport config set token <TOKEN>`",
            "API token required to import"
        )
    })?;

    let submitter =
        HttpSubmitter::new(config.api_url(), Some(token), config.timeout()).into_diagnostic()?;
    let driver = Driver::new(submitter);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after the current row");
            ctrl_c.cancel();
        }
    });

    let verbose = global.verbose && text_output;
    let report = import_bytes_with(
        entity,
        &bytes,
        &transformer,
        &driver,
        &cancel,
        |row, outcome| {
            if verbose {
                print_outcome(row, outcome);
            }
        },
    )
    .await;

    print_report(&report, global);

    if report.failed_count > 0 {
        return Err(miette::miette!(
            "Import completed with {} failed row(s)",
            report.failed_count
        ));
    }
    if report.cancelled {
        return Err(miette::miette!(
            "Import cancelled, {} row(s) not attempted",
            report.not_attempted
        ));
    }
    if report.has_failures() {
        return Err(miette::miette!("CSV parse failed, nothing was imported"));
    }

    Ok(())
}

/// Print the parse-failure report and build the command error
fn parse_failed(e: &ParseError, global: &GlobalOpts) -> miette::Report {
    print_report(&ImportReport::parse_failure(e), global);
    miette::miette!("CSV parse failed: {}", e)
}

fn print_outcome(row: usize, outcome: &ImportOutcome) {
    match outcome {
        ImportOutcome::Success => println!("{} Row {}: created", style("✓").green(), row),
        ImportOutcome::Failure(message) => println!("{} {}", style("✗").red(), message),
    }
}

fn print_report(report: &ImportReport, global: &GlobalOpts) {
    if global.format.is_json() {
        match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("{} {}", style("✗").red(), e),
        }
        return;
    }

    if global.quiet && !report.has_failures() {
        return;
    }

    println!();
    println!("{}", style("─".repeat(50)).dim());
    println!("{}", style("Import Summary").bold());
    println!("{}", style("─".repeat(50)).dim());
    report.print();
}

fn print_dry_run(
    entity: EntityType,
    config: &Config,
    prepared: &[PreparedRow],
    global: &GlobalOpts,
) -> Result<()> {
    let invalid = prepared.iter().filter(|row| row.payload.is_err()).count();

    if global.format.is_json() {
        let rows: Vec<Value> = prepared
            .iter()
            .map(|row| match &row.payload {
                Ok(record) => json!({ "row": row.row_number, "body": record }),
                Err(e) => json!({ "row": row.row_number, "error": e.to_string() }),
            })
            .collect();
        let out = json!({
            "endpoint": format!("{}{}", config.api_url().trim_end_matches('/'), entity.endpoint()),
            "rows": rows,
        });
        println!("{}", serde_json::to_string_pretty(&out).into_diagnostic()?);
    } else {
        for row in prepared {
            match &row.payload {
                Ok(record) => println!(
                    "{} Row {}: Would POST {}",
                    style("○").dim(),
                    row.row_number,
                    serde_json::to_string(record).into_diagnostic()?
                ),
                Err(e) => println!("{} 第{}行: {}", style("✗").red(), row.row_number, e),
            }
        }

        if !global.quiet {
            println!();
            println!(
                "{}",
                style(format!(
                    "Dry run complete. {} row(s) ready, {} invalid. Nothing was sent to {}.",
                    prepared.len() - invalid,
                    invalid,
                    config.api_url()
                ))
                .yellow()
            );
        }
    }

    if invalid > 0 {
        return Err(miette::miette!("{} row(s) could not be prepared", invalid));
    }

    Ok(())
}
