//! # Repo Scout CLI (`rscout`)
//!
//! The `rscout` binary analyzes a public or private GitHub repository and
//! prints what it finds: metadata, language breakdown, the full file tree,
//! extracted functions and classes, and detected frameworks.
//!
//! ## Usage
//!
//! ```bash
//! rscout --config ./scout.toml analyze <repo-url>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rscout analyze <repo>` | Fetch, walk, and analyze one repository |
//!
//! ## Examples
//!
//! ```bash
//! # Analyze by full URL
//! rscout analyze https://github.com/pallets/flask
//!
//! # Owner/repo shorthand works too
//! rscout analyze pallets/flask
//!
//! # Authenticated run (higher rate limits, private repos)
//! rscout analyze pallets/flask --token ghp_xxx
//!
//! # Machine-readable artifact on stdout
//! rscout analyze pallets/flask --json
//!
//! # Write the artifact to a file and print the summary
//! rscout analyze pallets/flask --output flask.json
//! ```
//!
//! Without `--token`, the `GITHUB_TOKEN` environment variable is used when
//! set. Unauthenticated runs work but hit GitHub's 60-requests-per-hour
//! ceiling quickly on non-trivial repositories.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use repo_scout::{analyzer, config, report};

/// Repo Scout, a rate-limit-aware GitHub repository introspection engine.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. Missing file means built-in defaults.
#[derive(Parser)]
#[command(
    name = "rscout",
    about = "Repo Scout, a rate-limit-aware GitHub repository introspection engine",
    version,
    long_about = "Repo Scout fetches repository metadata from the GitHub REST API, walks the \
    entire file tree, extracts functions and classes from source files, and flags likely \
    frameworks. Rate-limit responses are waited out up to a configurable bound; failed \
    requests degrade the result instead of aborting the run."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./scout.toml`. API and walker settings are read from
    /// this file; a missing file falls back to built-in defaults.
    #[arg(long, global = true, default_value = "./scout.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Analyze a GitHub repository.
    ///
    /// Fetches metadata, languages, and the readme, walks the whole tree
    /// through the contents API, extracts code elements, and detects
    /// frameworks. Prints a summary, or the full JSON artifact with
    /// `--json`.
    Analyze {
        /// Repository URL (`https://github.com/owner/repo`) or `owner/repo`.
        repo: String,

        /// GitHub API token. Falls back to the `GITHUB_TOKEN` environment
        /// variable when omitted.
        #[arg(long)]
        token: Option<String>,

        /// Print the full analysis artifact as JSON instead of the summary.
        #[arg(long)]
        json: bool,

        /// Write the JSON artifact to this path.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Analyze {
            repo,
            token,
            json,
            output,
        } => {
            let token = token.or_else(|| std::env::var("GITHUB_TOKEN").ok());
            let analyzer = analyzer::Analyzer::new(&repo, token, &cfg)?;
            let analysis = analyzer.analyze().await;

            if analysis.stats.any_failures() {
                eprintln!(
                    "warning: {} listings and {} downloads failed; results are partial",
                    analysis.stats.dir_failures, analysis.stats.file_failures
                );
            }

            let artifact = serde_json::to_string_pretty(&analysis)
                .context("failed to serialize analysis artifact")?;

            if let Some(path) = output {
                std::fs::write(&path, &artifact)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                eprintln!("Wrote {}", path.display());
            }

            if json {
                println!("{artifact}");
            } else {
                report::print_summary(&analysis);
            }
        }
    }

    Ok(())
}
