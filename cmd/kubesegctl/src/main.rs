use anyhow::Context;
use clap::{Parser, Subcommand};
use pkg_analysis::{
    NoopSummarizer, Summarizer, TemplateSummarizer, analyze_drift, analyze_gaps, annotate_flows,
    find_unprotected_flows, suggest_policies,
};
use pkg_constants::paths::DEFAULT_CONFIG;
use pkg_loader::{DataPaths, Dataset};
use pkg_types::config::{KubesegConfigFile, OutputFormat, load_config_file};
use pkg_types::document::PolicyDocument;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod output;

#[derive(Parser)]
#[command(name = "kubesegctl", about = "Network segmentation analysis for Kubernetes flows and policies")]
struct Cli {
    /// Path to YAML config file
    #[arg(long, short, default_value = DEFAULT_CONFIG)]
    config: String,

    /// Directory holding flows, policies and intents
    #[arg(long)]
    data_dir: Option<String>,

    /// Output format (json or yaml)
    #[arg(long, short)]
    output: Option<OutputFormat>,

    /// Log filter, e.g. `debug` or `pkg_analysis=debug`. Overrides RUST_LOG.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Risky flows, unprotected flows and suggested policies
    Gaps {
        /// Skip the templated narrative text
        #[arg(long)]
        no_narrative: bool,
    },
    /// Intents without policies, policies without intents
    Drift,
    /// Every observed flow with its risk and protection status
    Flows,
    /// Suggested least-privilege policies as YAML documents
    Suggest,
    /// Render the declared policies as policy documents
    Render,
}

/// `--log-level` wins over RUST_LOG and must parse.
fn log_filter(level: Option<&str>) -> anyhow::Result<EnvFilter> {
    match level {
        Some(level) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid --log-level '{}'", level)),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))),
    }
}

fn init_logging(level: Option<&str>) -> anyhow::Result<()> {
    let filter = log_filter(level)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref())?;

    // Load config file (returns defaults if file not found)
    let file_cfg: KubesegConfigFile = load_config_file(&cli.config)?;
    info!("Config file: {}", cli.config);

    // Merge: CLI args > config file > defaults
    let format = cli.output.or(file_cfg.output).unwrap_or_default();
    let scoring = file_cfg.scoring.clone().unwrap_or_default();
    let paths = DataPaths::resolve(cli.data_dir, &file_cfg);

    info!("  Flows:     {}", paths.flows.display());
    info!("  Policies:  {}", paths.policies.display());
    info!("  Intents:   {}", paths.intents.display());
    let weights: Vec<String> = scoring
        .weights
        .named()
        .map(|(name, weight)| format!("{}={}", name, weight))
        .collect();
    info!("  Weights:   {}", weights.join(", "));

    let data = Dataset::load(&paths)?;

    let rendered = match cli.command {
        Commands::Gaps { no_narrative } => {
            let summarizer: &dyn Summarizer = if no_narrative {
                &NoopSummarizer
            } else {
                &TemplateSummarizer
            };
            info!("Narrative: {}", summarizer.name());
            let report = analyze_gaps(&data.flows, &data.policies, &scoring, summarizer);
            output::render(format, &output::Envelope::now("gaps", &report))?
        }
        Commands::Drift => {
            let report = analyze_drift(&data.intents, &data.policies);
            output::render(format, &output::Envelope::now("drift", &report))?
        }
        Commands::Flows => {
            let flows = annotate_flows(&data.flows, &data.policies, &scoring);
            output::render(format, &output::Envelope::now("flows", &flows))?
        }
        Commands::Suggest => {
            let unprotected = find_unprotected_flows(&data.flows, &data.policies);
            output::suggestions(&suggest_policies(&unprotected))?
        }
        Commands::Render => {
            let documents: Vec<PolicyDocument> =
                data.policies.iter().map(PolicyDocument::from_policy).collect();
            output::render(format, &documents)?
        }
    };

    print!("{}", rendered);
    Ok(())
}
