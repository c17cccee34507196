//! synth-tape: generate and inspect synthetic L2 market tapes
//!
//! ```text
//! synth-tape generate --out-dir data/parts --layout separated --seed 7
//! synth-tape peek data/parts/part-000.npz -n 30 --filter trade_buy
//! ```

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use container::{npy, ContainerReader, ContainerWriter, DATA_KEY};
use simulation::depth::DepthProfile;
use simulation::inspect::{filter_records, format_record, EventFilter, TapeSummary};
use simulation::{build_tape, check_order, telemetry, write_tape, GeneratorConfig, Layout};
use std::fs;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "synth-tape")]
#[command(about = "Deterministic synthetic L2 market tape generator", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a tape and write it as .npz containers
    Generate(GenerateArgs),
    /// Print the first rows and a summary of a container
    Peek(PeekArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// JSON file with generation parameters (missing fields use defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory, created if missing
    #[arg(long, default_value = "data/parts")]
    out_dir: PathBuf,

    /// concatenated | separated
    #[arg(long, default_value = "concatenated")]
    layout: Layout,

    /// Store entries uncompressed
    #[arg(long)]
    no_compress: bool,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long)]
    n_steps: Option<u64>,

    #[arg(long)]
    levels: Option<usize>,

    /// flat | linear | exp (unknown selectors fall back to flat)
    #[arg(long)]
    depth_profile: Option<DepthProfile>,

    #[arg(long)]
    trade_prob: Option<f64>,

    #[arg(long)]
    max_trades_per_step: Option<u32>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

#[derive(Args)]
struct PeekArgs {
    /// Container path
    path: PathBuf,

    /// Array key inside the container
    #[arg(long, default_value = DATA_KEY)]
    key: String,

    /// Rows to print
    #[arg(short, long, default_value_t = 15)]
    n: usize,

    /// Event filter (repeatable; rows matching any filter are kept)
    #[arg(long = "filter")]
    filters: Vec<EventFilter>,
}

fn main() -> Result<()> {
    telemetry::init_tracing(telemetry::DEFAULT_FILTER);

    let cli = Cli::parse();
    match cli.command {
        Command::Generate(args) => generate(args),
        Command::Peek(args) => peek(args),
    }
}

fn load_config(args: &GenerateArgs) -> Result<GeneratorConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            GeneratorConfig::from_json(&json)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => GeneratorConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(n_steps) = args.n_steps {
        config.n_steps = n_steps;
    }
    if let Some(levels) = args.levels {
        config.levels = levels;
    }
    if let Some(profile) = args.depth_profile {
        config.depth_profile = profile;
    }
    if let Some(trade_prob) = args.trade_prob {
        config.trade_prob = trade_prob;
    }
    if let Some(max_trades) = args.max_trades_per_step {
        config.max_trades_per_step = max_trades;
    }

    config.validate().context("invalid generation parameters")?;
    Ok(config)
}

fn generate(args: GenerateArgs) -> Result<()> {
    let config = load_config(&args)?;
    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    info!(
        layout = %args.layout,
        out_dir = %args.out_dir.display(),
        compress = !args.no_compress,
        "Generating tape"
    );

    let parts = build_tape(&config, args.layout)?;
    for part in &parts {
        check_order(&part.records).with_context(|| format!("{} is out of order", part.name))?;
    }

    let writer = ContainerWriter::new(&args.out_dir, !args.no_compress);
    let reports = write_tape(&parts, &writer)
        .with_context(|| format!("writing containers to {}", args.out_dir.display()))?;

    for report in &reports {
        println!(
            "{}  {} records  {} bytes  sha256:{}",
            report.path.display(),
            report.records,
            report.bytes,
            report.sha256
        );
    }
    Ok(())
}

fn peek(args: PeekArgs) -> Result<()> {
    let mut reader = ContainerReader::open(&args.path)
        .with_context(|| format!("opening {}", args.path.display()))?;
    let records = reader.read(&args.key)?;
    let selected = filter_records(&records, &args.filters);

    println!("file : {}", args.path.display());
    println!("dtype: {}", npy::descr().format_ascii()?);
    println!("shape: ({},)", records.len());

    if !args.filters.is_empty() {
        let names: Vec<String> = args.filters.iter().map(|f| f.to_string()).collect();
        println!("filter: {} ({} rows)", names.join(" | "), selected.len());
        if selected.is_empty() {
            warn!("No rows match the event filter");
            bail!(
                "no rows match filter '{}'. Available: {}",
                names.join(", "),
                EventFilter::available()
            );
        }
    }

    println!("first {} rows:", args.n.min(selected.len()));
    for (i, record) in selected.iter().take(args.n).enumerate() {
        println!("{}", format_record(i, record));
    }
    println!();
    println!("{}", TapeSummary::from_records(&selected));
    Ok(())
}
