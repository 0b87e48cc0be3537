//! agora CLI: acceptability analysis of social-media reply trees.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use agora::analyzer::Analyzer;
use agora::config::AnalyzerConfig;
use agora::post::PostId;
use agora::services::ThreadFile;

#[derive(Parser)]
#[command(name = "agora", version, about = "Argument acceptability of reply trees")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the conversation stored in a thread file and print the result as JSON.
    Analyze {
        /// Thread file (JSON with `root`, `thread` and optional `related`).
        file: PathBuf,

        /// Analyze this post instead of the file's root.
        #[arg(long)]
        root: Option<PostId>,

        /// Graft topically related posts from the file's `related` section.
        #[arg(long)]
        related: bool,

        /// Print compact JSON instead of pretty-printed.
        #[arg(long)]
        compact: bool,
    },

    /// Print the effective configuration as TOML.
    Config,
}

fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig> {
    match path {
        Some(path) => Ok(AnalyzerConfig::load(path)?),
        None => Ok(AnalyzerConfig::default()),
    }
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            file,
            root,
            related,
            compact,
        } => {
            if related {
                config.related.enabled = true;
            }
            let source = ThreadFile::load(&file)?;
            let root = root.unwrap_or_else(|| source.root_id());

            let analysis = Analyzer::new(config).analyze(&source, root)?;
            let exported = analysis.export();
            let json = if compact {
                serde_json::to_string(&exported).into_diagnostic()?
            } else {
                serde_json::to_string_pretty(&exported).into_diagnostic()?
            };
            println!("{json}");
        }

        Commands::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
