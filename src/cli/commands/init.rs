//! `rimport init` command - Create an import workspace

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::core::project::{Project, ProjectError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
    }

    match Project::init(&path) {
        Ok(project) => {
            println!(
                "{} Initialized rimport workspace at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!();
            println!("Next steps:");
            println!(
                "  {} Store your API token",
                style("rimport config set token <TOKEN>").yellow()
            );
            println!(
                "  {} Get a CSV template",
                style("rimport template papers -o papers.csv").yellow()
            );
            println!(
                "  {} Import it",
                style("rimport import papers papers.csv").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} rimport workspace already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}
