//! # DataViz Studio CLI (`dvz`)
//!
//! The `dvz` binary extracts business files, renders presentations, and
//! serves the HTTP API.
//!
//! ## Usage
//!
//! ```bash
//! dvz --config ./config/dvz.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `dvz parse <paths..>` | Extract files and print the batch as JSON |
//! | `dvz render <analysis.json>` | Render analysis JSON to an HTML presentation |
//! | `dvz build <paths..>` | Extract, analyze and render in one step |
//! | `dvz themes` | List themes, palettes and features |
//! | `dvz serve` | Start the HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! # Inspect what was extracted from a folder of reports
//! dvz parse ./reports --output batch.json
//!
//! # Build a dark-themed deck with only metrics and recommendations
//! dvz build ./reports --theme dark --palette ocean --features metrics,recommendations
//!
//! # Re-render an edited analysis
//! dvz render analysis.json --output deck.html
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use dataviz_studio::commands::{self, RenderOptions};
use dataviz_studio::config::{self, LoggingConfig};
use dataviz_studio::progress::ProgressMode;
use dataviz_studio::server;

/// DataViz Studio CLI: business files in, HTML presentations out.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/dvz.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "dvz",
    about = "DataViz Studio: turn spreadsheets, PDFs, documents and decks into HTML presentations",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/dvz.toml`. A missing file means built-in defaults.
    #[arg(long, global = true, default_value = "./config/dvz.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Render flags shared by `render` and `build`.
#[derive(clap::Args)]
struct RenderArgs {
    /// Theme identifier (see `dvz themes`).
    #[arg(long)]
    theme: Option<String>,

    /// Palette identifier (see `dvz themes`).
    #[arg(long)]
    palette: Option<String>,

    /// Comma-separated feature identifiers; omit for all features.
    #[arg(long, value_delimiter = ',')]
    features: Option<Vec<String>>,

    /// Output HTML file (default: DataViz-Presentation.html).
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl From<RenderArgs> for RenderOptions {
    fn from(args: RenderArgs) -> Self {
        RenderOptions {
            theme: args.theme,
            palette: args.palette,
            features: args.features,
            output: args.output,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract files and print the resulting documents as JSON.
    ///
    /// Directories are walked recursively for supported files. A file that
    /// fails to extract is reported in the output, not fatal.
    Parse {
        /// Files or directories to extract.
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Write JSON to this file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Progress on stderr: off, human or json. Default: human on a TTY.
        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// Render an analysis JSON file to an HTML presentation.
    Render {
        /// Analysis JSON (title, summary, keyMetrics, insights, recommendations).
        analysis: PathBuf,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Extract, analyze and render in one step.
    Build {
        /// Files or directories to include.
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Free-form guidance passed to the analyzer.
        #[arg(long)]
        instructions: Option<String>,

        #[command(flatten)]
        render: RenderArgs,

        #[arg(long, value_enum)]
        progress: Option<ProgressMode>,
    },

    /// List themes, palettes and presentation features.
    Themes,

    /// Start the HTTP server on `[server].bind`.
    Serve,
}

fn init_tracing(logging: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dataviz_studio=info"));

    if logging.is_json() {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Themes = cli.command {
        commands::run_themes();
        return Ok(());
    }

    let cfg = config::load_config(&cli.config)?;
    init_tracing(&cfg.logging);

    match cli.command {
        Commands::Parse {
            paths,
            output,
            progress,
        } => {
            let progress = progress.unwrap_or_else(ProgressMode::default_for_tty);
            commands::run_parse(&paths, output.as_deref(), progress)?;
        }
        Commands::Render { analysis, render } => {
            commands::run_render(&cfg, &analysis, &render.into())?;
        }
        Commands::Build {
            paths,
            instructions,
            render,
            progress,
        } => {
            let progress = progress.unwrap_or_else(ProgressMode::default_for_tty);
            commands::run_build(
                &cfg,
                &paths,
                instructions.as_deref(),
                &render.into(),
                progress,
            )
            .await?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Themes => {}
    }

    Ok(())
}
