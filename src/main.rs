use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pagecraft::cli::OutputFormat;
use pagecraft::cli::commands;

#[derive(Parser)]
#[command(name = "pagecraft")]
#[command(
    version,
    about = "Build page hierarchies from outlines and navigation menus from page titles"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, global = true, help = "Enable debug logging")]
    verbose: bool,

    #[arg(long, short, global = true, conflicts_with = "verbose", help = "Only log errors")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize pagecraft in the current directory
    Init {
        #[arg(long, help = "Reinitialize an existing project")]
        force: bool,
        #[arg(long, help = "Menu root label (default: Services)")]
        domain: Option<String>,
    },

    /// Create pages from an indented outline
    Pages {
        #[arg(help = "Outline file, or '-' for stdin")]
        input: PathBuf,
        #[arg(long, help = "Preview the page tree without creating anything")]
        dry_run: bool,
        #[arg(long, help = "Attach top-level lines under this existing page id")]
        parent: Option<i64>,
    },

    /// Classify pages and rebuild the navigation menu
    Menu {
        #[arg(long, help = "Menu name (default from config)")]
        name: Option<String>,
        #[arg(long, help = "Menu root label (default from config)")]
        domain: Option<String>,
        #[arg(long, help = "Show the menu without saving it")]
        dry_run: bool,
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show the category assigned to each page
    Classify {
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Inspect classification rule tables
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum RulesAction {
    /// Print the effective rule table as TOML
    Show {
        #[arg(long, help = "Rule table file (default from config, else built-in)")]
        file: Option<PathBuf>,
    },
    /// Validate a rule table
    Check {
        #[arg(long, help = "Rule table file (default from config, else built-in)")]
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'g', long, help = "Show global config file only")]
        global: bool,
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mpagecraft encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    // Logs go to stderr so stdout stays clean for trees and JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Init { force, domain } => {
            commands::init::run(force, domain)?;
        }
        Commands::Pages {
            input,
            dry_run,
            parent,
        } => {
            commands::pages::run(commands::pages::PagesOptions {
                input,
                dry_run,
                parent,
            })?;
        }
        Commands::Menu {
            name,
            domain,
            dry_run,
            format,
        } => {
            commands::menu::run(commands::menu::MenuOptions {
                name,
                domain,
                dry_run,
                format,
            })?;
        }
        Commands::Classify { format } => {
            commands::classify::run(format)?;
        }
        Commands::Rules { action } => match action {
            RulesAction::Show { file } => commands::rules::show(file)?,
            RulesAction::Check { file } => commands::rules::check(file)?,
        },
        Commands::Config { action } => match action {
            ConfigAction::Show { global, format } => {
                commands::config::show(global, format)?;
            }
            ConfigAction::Path => {
                commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                if global {
                    commands::config::init_global(force)?;
                } else {
                    commands::config::init_project(force)?;
                }
            }
        },
    }

    Ok(())
}
