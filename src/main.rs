//! repodigest CLI - GitHub repository digests for LLM prompts
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use repodigest::{summarize, Config, DigestBuilder, GitHubClient};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "repodigest")]
#[command(author, version, about = "Summarise a GitHub repository into an LLM-ready system description", long_about = None)]
struct Cli {
    /// Path to a repodigest.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a digest of a GitHub repository
    Digest {
        /// Repository URL, e.g. https://github.com/owner/repo
        url: String,
        /// Character budget for file summaries
        #[arg(long)]
        budget: Option<usize>,
        /// GitHub token (overrides config and environment)
        #[arg(long)]
        token: Option<String>,
        /// Write the digest to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the structural summary of a local file
    Summarise {
        /// File to summarise
        file: PathBuf,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only the digest
    let log_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Digest {
            url,
            budget,
            token,
            output,
        } => {
            let mut config = match &cli.config {
                Some(path) => Config::load_from(path)?,
                None => Config::load()?,
            };
            if token.is_some() {
                config.github.token = token;
            }
            if let Err(e) = config.require_token() {
                eprintln!(
                    "{} {}; unauthenticated requests are heavily rate limited",
                    "warning:".yellow().bold(),
                    e
                );
            }

            let mut options = config.digest_options();
            if let Some(budget) = budget {
                options.char_budget = budget;
            }

            let client = GitHubClient::with_settings(&config.github.api_url, config.token(), config.timeout())?;
            let builder = DigestBuilder::new(client, options);

            eprintln!("Analysing: {}", url);
            let digest = match builder.collect(&url).await {
                Ok(digest) => digest,
                Err(e) => {
                    eprintln!("{} {}", "error:".red().bold(), e);
                    std::process::exit(1);
                }
            };

            let document = digest.render();
            match output {
                Some(path) => {
                    std::fs::write(&path, &document)?;
                    eprintln!("Wrote {}", path.display());
                }
                None => print!("{}", document),
            }

            eprintln!(
                "{} {} files summarised, {} skipped, {} characters{}",
                "done:".green().bold(),
                digest.files_summarized,
                digest.files_skipped,
                digest.total_chars,
                if digest.budget_exhausted {
                    " (budget reached)"
                } else {
                    ""
                }
            );
        }
        Commands::Summarise { file } => {
            let bytes = std::fs::read(&file)?;
            let content = String::from_utf8_lossy(&bytes);
            print!("{}", summarize(&file.to_string_lossy(), &content));
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "repodigest", &mut std::io::stdout());
        }
    }

    Ok(())
}
