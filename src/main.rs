use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use depscope::app::engine::EngineConfig;
use depscope::app::pipeline::PipelineConfig;
use depscope::domain::analyzer::AnalyzerOptions;
use depscope::{adapters, cli};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "depscope",
    version,
    about = "Dependency-structure analyzer: cycles, layering violations, coupling metrics"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TuningArgs {
    /// Layering rules JSON file (array of {id, from_pattern, to_pattern, allowed})
    #[arg(long)]
    rules: Option<PathBuf>,
    /// Extraction worker count (default: available parallelism)
    #[arg(long)]
    workers: Option<usize>,
    /// Bound of the pending-unit and result queues
    #[arg(long)]
    queue_bound: Option<usize>,
    /// Per-unit processing budget in milliseconds (0 disables)
    #[arg(long)]
    unit_timeout_ms: Option<u64>,
    /// Exclude reference targets under this qualified-name prefix (repeatable)
    #[arg(long = "exclude")]
    excluded: Vec<String>,
    /// Report self-edges as degenerate 1-node cycles
    #[arg(long)]
    self_cycles: bool,
}

impl TuningArgs {
    fn into_config(self) -> Result<EngineConfig> {
        let mut pipeline = PipelineConfig::default();
        if let Some(workers) = self.workers {
            pipeline.workers = workers;
        }
        if let Some(queue_bound) = self.queue_bound {
            pipeline.queue_bound = queue_bound;
        }
        if let Some(unit_timeout_ms) = self.unit_timeout_ms {
            pipeline.unit_timeout_ms = unit_timeout_ms;
        }
        pipeline.excluded_prefixes = self.excluded;

        let rules = match &self.rules {
            Some(path) => adapters::json::load_rules(path)?,
            None => Vec::new(),
        };

        Ok(EngineConfig {
            pipeline,
            rules,
            analyzer: AnalyzerOptions {
                count_self_edge_cycles: self.self_cycles,
            },
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest resolved units and print the analysis report
    Analyze {
        /// Resolver-produced units JSON file
        units: PathBuf,
        #[command(flatten)]
        tuning: TuningArgs,
        /// Emit the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the analysis and serve results over HTTP
    Serve {
        /// Resolver-produced units JSON file
        units: PathBuf,
        #[command(flatten)]
        tuning: TuningArgs,
        /// Listen address
        #[arg(long, default_value = "127.0.0.1:4188")]
        addr: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            units,
            tuning,
            json,
        } => cli::analyze(&units, tuning.into_config()?, json).await,
        Commands::Serve {
            units,
            tuning,
            addr,
        } => cli::serve(&units, tuning.into_config()?, addr).await,
    }
}
