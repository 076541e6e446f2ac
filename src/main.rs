use clap::Parser;
use miette::Result;
use rimport::cli::{Cli, Commands, GlobalOpts};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(&global);

    match cli.command {
        Commands::Init(args) => rimport::cli::commands::init::run(args),
        Commands::Import(args) => rimport::cli::commands::import::run(args, &global).await,
        Commands::Template(args) => rimport::cli::commands::template::run(args, &global),
        Commands::Entities(args) => rimport::cli::commands::entities::run(args, &global),
        Commands::Mapping(args) => rimport::cli::commands::mapping::run(args, &global),
        Commands::Config(cmd) => rimport::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => rimport::cli::commands::completions::run(args),
    }
}

/// Log to stderr; RUST_LOG wins over the --verbose / --quiet defaults
fn init_tracing(global: &GlobalOpts) {
    let default = if global.verbose {
        "rimport=debug"
    } else if global.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
