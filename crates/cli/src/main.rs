//! PubMed assistant CLI
//!
//! Main entry point for the `pubmed` command-line tool: adaptive yes/no
//! answers, cited literature syntheses, citation exports, citation links
//! and MeSH lookups.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use commands::{CiteCommand, LinksCommand, MeshCommand, QaCommand, SynthCommand};
use pubmed_core::logging::{self, LogFormat};
use pubmed_core::{config::AppConfig, AppResult};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// PubMed assistant - evidence-backed answers and literature syntheses
#[derive(Parser, Debug)]
#[command(name = "pubmed")]
#[command(about = "Evidence-backed answers and literature syntheses from PubMed", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "PUBMED_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "PUBMED_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// LLM provider (openai, ollama)
    #[arg(short, long, global = true, env = "PUBMED_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "LLM_MODEL")]
    model: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a biomedical yes/no question
    Qa(QaCommand),

    /// Synthesize the literature on a question, or summarize one paper
    Synth(SynthCommand),

    /// Format citations for PubMed articles
    Cite(CiteCommand),

    /// List citing, cited or similar articles for a PMID
    Links(LinksCommand),

    /// Look up a MeSH descriptor
    Mesh(MeshCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let config = AppConfig::load()?.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    let log_format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    logging::init_logging(config.log_level.as_deref(), config.no_color, log_format)?;

    tracing::info!("PubMed assistant starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            interrupt.cancel();
        }
    });

    let command_name = match &cli.command {
        Commands::Qa(_) => "qa",
        Commands::Synth(_) => "synth",
        Commands::Cite(_) => "cite",
        Commands::Links(_) => "links",
        Commands::Mesh(_) => "mesh",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Qa(cmd) => cmd.execute(&config, &cancel, cli.json).await,
        Commands::Synth(cmd) => cmd.execute(&config, &cancel, cli.json).await,
        Commands::Cite(cmd) => cmd.execute(&config, &cancel, cli.json).await,
        Commands::Links(cmd) => cmd.execute(&config, &cancel, cli.json).await,
        Commands::Mesh(cmd) => cmd.execute(&config, &cancel, cli.json).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!(kind = ?e.kind(), "Command failed: {}", e),
    }

    result
}
