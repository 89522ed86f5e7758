use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::fs;
use std::io;
use std::path::PathBuf;

use topolab::config::RunConfig;
use topolab::engine::{EmulationEngine, NetnsEngine, RecordingEngine};
use topolab::orchestrator;

/// Build an emulated network from loopback, link and path files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run configuration YAML file; flags given on the command line take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Node file: `<nodeId> <loopbackAddress>` per line
    #[arg(short, long)]
    loopbacks: Option<PathBuf>,

    /// Link file: `<nodeId> <peerId> <interfaceIndex> <linkAddress> <loopbackOfPeer>` per line
    #[arg(short = 'i', long)]
    links: Option<PathBuf>,

    /// Path file: `<nodeId> <interfaceIndex> <gatewayAddress> <destinationAddress>` per line
    #[arg(short, long)]
    paths: Option<PathBuf>,

    /// Activate tracing with tcpdump on every interface
    #[arg(short, long)]
    traces: bool,

    /// Use IPv4 address and route commands instead of IPv6
    #[arg(long)]
    ipv4: bool,

    /// Directory receiving capture files (emptied when tracing)
    #[arg(long)]
    capture_dir: Option<PathBuf>,

    /// Prefix for network namespace names
    #[arg(long)]
    namespace_prefix: Option<String>,

    /// Skip the interactive session
    #[arg(long)]
    no_cli: bool,

    /// Record the engine calls instead of creating namespaces
    #[arg(long)]
    dry_run: bool,

    /// Write the recorded plan as JSON (with --dry-run)
    #[arg(long, requires = "dry_run")]
    plan_output: Option<PathBuf>,
}

impl Args {
    /// Merge the optional YAML configuration with command-line flags.
    fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };

        if let Some(path) = &self.loopbacks {
            config.loopbacks_file = path.clone();
        }
        if let Some(path) = &self.links {
            config.links_file = path.clone();
        }
        if let Some(path) = &self.paths {
            config.paths_file = path.clone();
        }
        if let Some(dir) = &self.capture_dir {
            config.capture_dir = dir.clone();
        }
        if let Some(prefix) = &self.namespace_prefix {
            config.namespace_prefix = prefix.clone();
        }
        config.trace_enabled |= self.traces;
        config.use_ipv4 |= self.ipv4;
        if self.no_cli || self.dry_run {
            config.interactive = false;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = args.run_config()?;
    info!("Loopbacks file: {:?}", config.loopbacks_file);
    info!("Links file: {:?}", config.links_file);
    info!("Paths file: {:?}", config.paths_file);
    info!("USE IPV4 {}", config.use_ipv4);

    if args.dry_run {
        let mut engine = RecordingEngine::new();
        run_with(&config, &mut engine)?;

        for (host, command) in engine.executed() {
            println!("{} {}", host, command);
        }
        if let Some(path) = &args.plan_output {
            let plan = serde_json::to_string_pretty(engine.calls())?;
            fs::write(path, plan)
                .wrap_err_with(|| format!("Failed to write plan to '{}'", path.display()))?;
            info!("Plan written to {:?}", path);
        }
        return Ok(());
    }

    let mut engine = NetnsEngine::new(&config.namespace_prefix);
    run_with(&config, &mut engine)?;
    info!("Emulated network stopped");
    Ok(())
}

fn run_with(config: &RunConfig, engine: &mut dyn EmulationEngine) -> Result<()> {
    let stdin = io::stdin();
    orchestrator::run(config, engine, stdin.lock(), io::stdout())
        .wrap_err("Topology run failed")?;
    Ok(())
}
