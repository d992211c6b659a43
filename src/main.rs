//! posting-bench - measure posting list sizes under several codecs
//!
//! ```bash
//! posting-bench ./data ""                          # latest block
//! posting-bench ./data 01BX5ZZKBKACTAV9WEVGEMMVRZ --encoder ./s4bp128d4 --json-output report.json
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};

use posting_bench::{run_benchmark, BenchmarkConfig, BlockDirectorySource, FailurePolicy};

#[derive(Parser)]
#[command(name = "posting-bench")]
#[command(version, about = "Compare posting list sizes of an index block under several codecs")]
struct Cli {
    /// Storage directory holding the blocks
    storage: PathBuf,

    /// Block to read; an empty string selects the latest block
    block_id: String,

    /// Posting lists measured at the same time
    #[arg(long)]
    max_concurrency: Option<usize>,

    /// External block-packing encoder, called as `<encoder> <input> <output>`
    #[arg(long)]
    encoder: Option<PathBuf>,

    /// Parent directory of the encoder's work directories
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// Record failing lists and keep going instead of aborting
    #[arg(long)]
    skip_failures: bool,

    /// JSON benchmark config; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write the report as JSON to this path
    #[arg(long)]
    json_output: Option<PathBuf>,
}

impl Cli {
    fn benchmark_config(&self) -> Result<BenchmarkConfig> {
        let mut config = match &self.config {
            Some(path) => BenchmarkConfig::load(path).with_context(|| format!("Failed to load config {:?}", path))?,
            None => BenchmarkConfig::default(),
        };
        if let Some(max_concurrency) = self.max_concurrency {
            config.max_concurrency = max_concurrency;
        }
        if let Some(encoder) = &self.encoder {
            config.external_encoder = Some(encoder.clone());
        }
        if let Some(temp_dir) = &self.temp_dir {
            config.temp_dir = Some(temp_dir.clone());
        }
        if self.skip_failures {
            config.failure_policy = FailurePolicy::SkipAndCount;
        }
        config.is_valid().context("Invalid benchmark config")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env().filter(None, LevelFilter::Info).init();

    let cli = Cli::parse();
    let config = cli.benchmark_config()?;

    let source = BlockDirectorySource::open(&cli.storage, &cli.block_id)
        .with_context(|| format!("Failed to open block `{}` in storage {:?}", cli.block_id, cli.storage))?;
    info!("Reading postings from {:?}", source.block_dir());

    let report = run_benchmark(&source, &config).context("Failed to evaluate posting lists")?;
    print!("{}", report);

    if let Some(path) = &cli.json_output {
        report.save_json(path).with_context(|| format!("Failed to write report to {:?}", path))?;
        info!("Report written to {:?}", path);
    }
    Ok(())
}
