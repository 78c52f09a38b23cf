use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;
use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use vcache::config::{HierarchyConfig, DEFAULT_LINE_SIZE};
use vcache::error::ConfigError;
use vcache::io::load_trace;
use vcache::simulator::{Simulator, SimulatorOptions};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Text,
}

#[derive(Parser, Debug)]
#[command(version, about = "Multilevel cache simulator measuring cache line utilization")]
struct Args {
    #[arg(help = "Trace file of fixed width memory access records")]
    trace: PathBuf,

    #[arg(long, help = "JSON hierarchy configuration, instead of --size and --associativity")]
    config: Option<PathBuf>,

    #[arg(short = 'c', long = "size", help = "Capacity in bytes of each level, innermost first")]
    sizes: Vec<u64>,

    #[arg(short = 'a', long = "associativity", help = "Associativity of each level (1 for direct mapped)")]
    associativities: Vec<u32>,

    #[arg(short = 'n', long, help = "Number of cache levels, checked against the size and associativity lists")]
    levels: Option<usize>,

    #[arg(short = 'b', long, help = "Cache line size in bytes [default: 64]")]
    line_size: Option<u32>,

    #[arg(short = 'f', long, default_value_t = 0, help = "Begin simulating after this many records")]
    fast_forward: u64,

    #[arg(short = 'e', long, help = "Maximum number of records to simulate after fast forwarding")]
    execute: Option<u64>,

    #[arg(long, help = "Don't simulate loads")]
    no_loads: bool,

    #[arg(long, help = "Don't simulate stores")]
    no_stores: bool,

    #[arg(short, long, help = "Write the report here instead of stdout")]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    #[arg(short, long)]
    performance: bool,
}

impl Args {
    /// Builds the hierarchy description from either the config file or the per-level lists
    fn hierarchy_config(&self) -> Result<HierarchyConfig> {
        if let Some(path) = &self.config {
            if !self.sizes.is_empty() || !self.associativities.is_empty() {
                bail!("Give either --config or --size/--associativity, not both");
            }
            let file = File::open(path).with_context(|| format!("Couldn't open the config file at path {}", path.display()))?;
            let mut config = HierarchyConfig::from_json(BufReader::new(file))?;
            if let Some(line_size) = self.line_size {
                config.line_size = line_size;
            }
            return Ok(config);
        }
        if let Some(expected) = self.levels {
            if expected != self.sizes.len() || expected != self.associativities.len() {
                return Err(ConfigError::DeclaredLevelMismatch {
                    expected,
                    capacities: self.sizes.len(),
                    associativities: self.associativities.len(),
                }
                .into());
            }
        }
        let line_size = self.line_size.unwrap_or(DEFAULT_LINE_SIZE);
        Ok(HierarchyConfig::from_lists(line_size, &self.sizes, &self.associativities)?)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let start = Instant::now();
    let args = Args::parse();
    let config = args.hierarchy_config()?;
    debug!("Parsed input configuration: {config:?}");
    let options = SimulatorOptions {
        track_loads: !args.no_loads,
        track_stores: !args.no_stores,
        fast_forward: args.fast_forward,
        execute_limit: args.execute,
    };
    let mut simulator = Simulator::new(&config, options)?;
    let trace_file = File::open(&args.trace).with_context(|| format!("Couldn't open the trace file at path {}", args.trace.display()))?;
    let trace = load_trace(trace_file).context("Couldn't load the trace file")?;
    let report = simulator.simulate(&trace)?;
    let rendered = match args.format {
        Format::Json => serde_json::to_string_pretty(&report).context("Couldn't serialise the output")? + "\n",
        Format::Text => report.to_string(),
    };
    match &args.output {
        Some(path) => fs::write(path, rendered).with_context(|| format!("Couldn't write the report to {}", path.display()))?,
        None => print!("{rendered}"),
    }
    info!(
        "{} lines still resident across {} levels",
        simulator.hierarchy().resident_line_count(),
        simulator.hierarchy().level_count()
    );
    if args.performance {
        let simulation_time = simulator.get_execution_time();
        let total_time = start.elapsed();
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!("Total execution time (includes initial parsing, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    Ok(())
}
