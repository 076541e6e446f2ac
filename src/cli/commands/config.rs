//! `rimport config` command - Configuration management
//!
//! Provides commands to view and modify rimport configuration.

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::GlobalOpts;
use crate::core::project::Project;
use crate::core::Config;

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration values
    Show(ShowArgs),

    /// Set a configuration value
    Set(SetArgs),

    /// Unset (remove) a configuration value
    Unset(UnsetArgs),

    /// Show paths to configuration files
    Path,

    /// List all available configuration keys
    Keys,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Show only this key's value
    pub key: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Configuration key (e.g., api_url, token, mappings.papers.venue.rename)
    pub key: String,

    /// Value to set
    pub value: String,

    /// Set in global (user) config instead of workspace config
    #[arg(long, short = 'g')]
    pub global: bool,
}

#[derive(clap::Args, Debug)]
pub struct UnsetArgs {
    /// Configuration key to remove
    pub key: String,

    /// Remove from global (user) config instead of workspace config
    #[arg(long, short = 'g')]
    pub global: bool,
}

/// Valid configuration keys
const VALID_KEYS: &[(&str, &str)] = &[
    ("api_url", "Base URL of the achievement API"),
    ("token", "Bearer token sent with create requests"),
    ("timeout_secs", "Per-request timeout in seconds"),
    (
        "mappings.<entity>.<column>",
        "Column override: `skip`, `keep`, or `rename: <field>`",
    ),
];

/// Run a config subcommand
pub fn run(cmd: ConfigCommands, _global: &GlobalOpts) -> Result<()> {
    match cmd {
        ConfigCommands::Show(args) => run_show(args),
        ConfigCommands::Set(args) => run_set(args),
        ConfigCommands::Unset(args) => run_unset(args),
        ConfigCommands::Path => run_path(),
        ConfigCommands::Keys => run_keys(),
    }
}

fn run_show(args: ShowArgs) -> Result<()> {
    let config = Config::load().into_diagnostic()?;

    if let Some(key) = &args.key {
        let value = get_config_value(&config, key);
        return match value {
            Some(v) => {
                println!("{}", v);
                Ok(())
            }
            None => Err(miette::miette!("Key '{}' is not set", key)),
        };
    }

    println!("{}", style("Effective Configuration").bold().underlined());
    println!();

    print_config_value("api_url", Some(config.api_url()));
    print_config_value("token", config.token().map(mask_secret).as_deref());
    print_config_value(
        "timeout_secs",
        Some(config.timeout().as_secs().to_string().as_str()),
    );

    let overrides = serde_yml::to_string(&config.mappings).into_diagnostic()?;
    if config.mappings != Default::default() {
        println!("  {}:", style("mappings").cyan());
        for line in overrides.lines() {
            println!("    {}", line);
        }
    }

    println!();
    println!("{}", style("Config Sources (in priority order):").dim());
    println!("  1. Command-line flags (--api-url, --token, --timeout)");
    println!("  2. Environment variables (RIMPORT_API_URL, RIMPORT_TOKEN, RIMPORT_TIMEOUT_SECS)");
    println!("  3. Workspace config (.rimport/config.yaml)");
    println!("  4. Global config (~/.config/rimport/config.yaml)");

    Ok(())
}

fn run_set(args: SetArgs) -> Result<()> {
    let config_path = if args.global {
        get_global_config_path()?
    } else {
        get_project_config_path()?
    };

    write_config_value(&config_path, &args.key, &args.value)?;

    let shown = if args.key == "token" {
        mask_secret(&args.value)
    } else {
        args.value.clone()
    };
    let scope = if args.global { "global" } else { "workspace" };
    println!(
        "{} Set {} {} {} in {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        style("→").dim(),
        style(shown).yellow(),
        scope
    );

    Ok(())
}

/// Set one key in a config file, leaving the file untouched on any error
fn write_config_value(config_path: &Path, key: &str, value: &str) -> Result<()> {
    let mut config_map = read_config_map(config_path)?;
    set_nested_value(&mut config_map, key, yaml_scalar(key, value))?;

    // Refuse to write something the loader would reject
    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    serde_yml::from_str::<Config>(&yaml)
        .map_err(|e| miette::miette!("Invalid value for '{}': {}", key, e))?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).into_diagnostic()?;
    }
    fs::write(config_path, yaml).into_diagnostic()?;
    Ok(())
}

fn run_unset(args: UnsetArgs) -> Result<()> {
    let config_path = if args.global {
        get_global_config_path()?
    } else {
        get_project_config_path()?
    };

    if !config_path.exists() {
        return Err(miette::miette!(
            "Config file does not exist: {}",
            config_path.display()
        ));
    }

    let mut config_map = read_config_map(&config_path)?;
    if !unset_nested_value(&mut config_map, &args.key) {
        return Err(miette::miette!("Key '{}' not found in config", args.key));
    }

    let yaml = serde_yml::to_string(&config_map).into_diagnostic()?;
    fs::write(&config_path, yaml).into_diagnostic()?;

    let scope = if args.global { "global" } else { "workspace" };
    println!(
        "{} Removed {} from {} config",
        style("✓").green(),
        style(&args.key).cyan(),
        scope
    );

    Ok(())
}

fn run_path() -> Result<()> {
    let global_path = get_global_config_path()?;

    println!("{}", style("Configuration file paths:").bold());
    println!();
    println!("  {} {}", style("Global:").cyan(), global_path.display());
    print_exists(global_path.exists(), 9);

    println!();
    match Project::discover() {
        Ok(project) => {
            let path = project.config_path();
            println!("  {} {}", style("Workspace:").cyan(), path.display());
            print_exists(path.exists(), 12);
        }
        Err(_) => println!(
            "  {} {}",
            style("Workspace:").cyan(),
            style("(not in an rimport workspace)").dim()
        ),
    }

    Ok(())
}

fn run_keys() -> Result<()> {
    println!("{}", style("Available configuration keys:").bold());
    println!();

    for (key, description) in VALID_KEYS {
        println!("  {:<28} {}", style(key).cyan(), style(description).dim());
    }

    println!();
    println!(
        "{}",
        style("Use 'rimport config set <key> <value>' to set a value.").dim()
    );

    Ok(())
}

// Helper functions

fn print_exists(exists: bool, indent: usize) {
    let label = if exists {
        style("(exists)").green()
    } else {
        style("(not created)").dim()
    };
    println!("  {}{}", " ".repeat(indent), label);
}

fn get_global_config_path() -> Result<PathBuf> {
    Config::global_config_path()
        .ok_or_else(|| miette::miette!("Could not determine global config directory"))
}

/// Workspace config path; falls back to ./.rimport/config.yaml outside a workspace
fn get_project_config_path() -> Result<PathBuf> {
    match Project::discover() {
        Ok(project) => Ok(project.config_path()),
        Err(_) => Ok(std::env::current_dir()
            .into_diagnostic()?
            .join(crate::core::project::WORKSPACE_DIR)
            .join("config.yaml")),
    }
}

fn read_config_map(path: &Path) -> Result<serde_yml::Value> {
    if !path.exists() {
        return Ok(serde_yml::Value::Mapping(Default::default()));
    }

    let content = fs::read_to_string(path).into_diagnostic()?;
    let parsed: serde_yml::Value = serde_yml::from_str(&content).map_err(|e| {
        miette::miette!(
            help = "fix the file by hand; it was left unchanged",
            "Invalid config file {}: {}",
            path.display(),
            e
        )
    })?;

    match parsed {
        serde_yml::Value::Mapping(_) => Ok(parsed),
        // Empty or comment-only file
        serde_yml::Value::Null => Ok(serde_yml::Value::Mapping(Default::default())),
        _ => Err(miette::miette!(
            "Invalid config file {}: expected a mapping of keys at the top level",
            path.display()
        )),
    }
}

fn get_config_value(config: &Config, key: &str) -> Option<String> {
    match key {
        "api_url" => Some(config.api_url().to_string()),
        "token" => config.token().map(str::to_string),
        "timeout_secs" => Some(config.timeout().as_secs().to_string()),
        _ => None,
    }
}

fn print_config_value(key: &str, value: Option<&str>) {
    if let Some(v) = value {
        println!("  {}: {}", style(key).cyan(), style(v).yellow());
    } else {
        println!("  {}: {}", style(key).cyan(), style("(not set)").dim());
    }
}

/// Keep only the first few characters of a secret
fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

/// Numeric keys are stored as numbers, everything else as strings
fn yaml_scalar(key: &str, value: &str) -> serde_yml::Value {
    if key == "timeout_secs" {
        if let Ok(n) = value.trim().parse::<u64>() {
            return serde_yml::Value::Number(n.into());
        }
    }
    serde_yml::Value::String(value.to_string())
}

fn set_nested_value(root: &mut serde_yml::Value, key: &str, value: serde_yml::Value) -> Result<()> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((last, parents)) = parts.split_last() else {
        return Err(miette::miette!("Empty configuration key"));
    };

    let mut current = root;
    for part in parents {
        let serde_yml::Value::Mapping(map) = current else {
            return Err(miette::miette!("'{}' is not a section in the config", part));
        };
        let entry = map
            .entry(serde_yml::Value::String(part.to_string()))
            .or_insert_with(|| serde_yml::Value::Mapping(Default::default()));
        // `skip` / `keep` scalars become a section when a nested key is set
        if !entry.is_mapping() {
            *entry = serde_yml::Value::Mapping(Default::default());
        }
        current = entry;
    }

    match current {
        serde_yml::Value::Mapping(map) => {
            map.insert(serde_yml::Value::String(last.to_string()), value);
            Ok(())
        }
        _ => Err(miette::miette!("Cannot set '{}'", key)),
    }
}

fn unset_nested_value(root: &mut serde_yml::Value, key: &str) -> bool {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((last, parents)) = parts.split_last() else {
        return false;
    };

    let mut current = root;
    for part in parents {
        match current.get_mut(*part) {
            Some(next) => current = next,
            None => return false,
        }
    }

    match current {
        serde_yml::Value::Mapping(map) => map.remove(*last).is_some(),
        _ => false,
    }
}
