mod config;

use anyhow::Context;
use clap::{Parser, Subcommand};
use config::AppConfig;
use owo_colors::OwoColorize;
use pl_core::types::{AnalysisResult, InsightReport};
use pl_serve::AppState;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "pl", version, about = "Process discovery and LLM review for event logs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP API.
    Serve,
    /// Analyze a local .csv or .xes event log and print the result as JSON.
    Analyze {
        file: PathBuf,
        /// Skip the LLM review.
        #[arg(long)]
        no_insights: bool,
        /// Replace the generated graph summary sent to the LLM.
        #[arg(long)]
        summary: Option<String>,
    },
    /// Print the OpenAPI document.
    Openapi,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Serve => serve(setup()?).await,
        Command::Analyze {
            file,
            no_insights,
            summary,
        } => analyze(setup()?, file, no_insights, summary).await,
        Command::Openapi => {
            println!("{}", pl_serve::openapi::generate_spec());
            Ok(())
        }
    }
}

fn setup() -> anyhow::Result<AppConfig> {
    let config = AppConfig::load_with_dotenv().context("failed to load configuration")?;
    init_tracing()?;
    Ok(config)
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("PROCLENS_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let upload_dir = config.server.resolved_upload_dir();
    std::fs::create_dir_all(&upload_dir)
        .with_context(|| format!("failed to create upload dir {}", upload_dir.display()))?;

    let analyzer = pl_serve::build_analyzer(&config.llm).context("failed to build LLM client")?;
    let state = AppState::new(Arc::new(analyzer), &config.server);
    tracing::info!(
        model = %config.llm.model,
        llm = %config.llm.api_base_url,
        upload_dir = %upload_dir.display(),
        "starting proclens"
    );
    pl_serve::serve(state, config.server.socket_addr())
        .await
        .context("server error")
}

async fn analyze(
    config: AppConfig,
    file: PathBuf,
    no_insights: bool,
    summary: Option<String>,
) -> anyhow::Result<()> {
    let filename = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let analyzer = pl_serve::build_analyzer(&config.llm).context("failed to build LLM client")?;

    eprintln!("{} {}", "Analyzing".green().bold(), file.display());
    let graph = analyzer
        .discover_file(&file, &filename)
        .with_context(|| format!("failed to analyze {}", file.display()))?;
    eprintln!(
        "{} {} activities, {} transitions",
        "Discovered".green().bold(),
        graph.nodes.len(),
        graph.links.len()
    );

    let llm_insights = if no_insights {
        InsightReport::unavailable()
    } else {
        eprintln!("{} with {}", "Reviewing".cyan().bold(), config.llm.model);
        let summary = summary.unwrap_or_else(|| graph.describe());
        analyzer.review(&graph, Some(&summary)).await
    };

    let result = AnalysisResult {
        process_graph: graph,
        llm_insights,
    };
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
