//! `KubeXY` command line entrypoint
//!
//! Starts exactly one feeder for the shared pod registry (the Kubernetes reconciler, or the demo
//! simulator with `--demo`) and serves the registry over HTTP.  See binary --help for all options.
mod server;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use kx_core::k8s::KubePodLister;
use kx_core::prelude::*;
use kx_core::reconciler::Reconciler;
use kx_core::simulator::Simulator;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::*;

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Options {
    /// Path to a kubeconfig file; in-cluster or default discovery is used when omitted.
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Replace namespace, node and pod names with generated ones.
    #[arg(long)]
    anonymize: bool,

    /// Simulate a working cluster instead of connecting to one.
    #[arg(long)]
    demo: bool,

    #[arg(long, default_value_t = 6)]
    demo_nodes: usize,

    #[arg(long, default_value_t = 5)]
    demo_namespaces: usize,

    #[arg(long, default_value_t = 15)]
    demo_pods: usize,

    /// Delay between simulation steps, in units of 10ms (higher is slower).
    #[arg(long, default_value_t = 500)]
    demo_speed: u64,

    /// Seconds between two pod list refreshes.
    #[arg(long, default_value_t = 5)]
    poll_interval: u64,

    /// Seed for the demo simulator and name generator; random if omitted.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Directory of static viewer assets served at `/`.
    #[arg(long, default_value = "html")]
    static_dir: PathBuf,

    #[arg(short, long, default_value = "info")]
    verbosity: String,
}

impl Options {
    fn demo_config(&self) -> DemoConfig {
        DemoConfig {
            pods: self.demo_pods,
            nodes: self.demo_nodes,
            namespaces: self.demo_namespaces,
            step_delay: DemoConfig::step_delay_from_speed(self.demo_speed),
        }
    }

    fn reconciler_config(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            interval: Duration::from_secs(self.poll_interval),
            anonymize: self.anonymize,
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

async fn build_feeder(args: &Options, registry: PodRegistry) -> Result<Box<dyn PodFeeder>> {
    let mut rng = args.rng();
    let namer = RandomNameGenerator::new(&mut rng);

    if args.demo {
        let simulator = Simulator::new(registry, args.demo_config(), namer, rng)?;
        return Ok(Box::new(simulator));
    }

    let lister = KubePodLister::connect(args.kubeconfig.as_deref()).await?;
    let config = args.reconciler_config();
    let anonymize = config.anonymize;
    let mut reconciler = Reconciler::new(registry, lister, config);
    if anonymize {
        reconciler = reconciler.with_anonymizer(Box::new(namer));
    }
    Ok(Box::new(reconciler))
}

#[tokio::main]
async fn main() -> EmptyResult {
    let args = Options::parse();
    logging::setup(&args.verbosity);
    info!("KubeXY started, configuration {args:?}");

    let registry = PodRegistry::new();
    let mut feeder = build_feeder(&args, registry.clone()).await?;
    feeder.start().await?;

    tokio::spawn(async move {
        let name = feeder.name();
        if let Err(err) = feeder.run().await {
            error!("{name} stopped: {err:#}");
        }
    });

    let server_config = server::ServerConfig::new(args.port, &args.static_dir);
    server::build(SnapshotExporter::new(registry), &server_config).launch().await?;
    Ok(())
}

#[cfg(test)]
mod tests;
