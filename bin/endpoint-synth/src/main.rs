use anyhow::{Context, Result};
use clap::Parser;
use endpoint_api::v1alpha1::StackSpec;
use endpoint_core::synthesize_stack;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod config;

use config::{Config, LogFormat};

fn main() -> Result<()> {
    let config = Config::parse();
    init_tracing(&config);

    if config.schema {
        let schema = schemars::schema_for!(StackSpec);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let path = config
        .document
        .context("No stack document given, pass a path or set ENDPOINT_CONFIG")?;
    info!("Reading stack document {}", path.display());

    let document = std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let spec = StackSpec::from_yaml(&document).with_context(|| format!("Failed to parse {}", path.display()))?;
    debug!("Stack {} declares {} networks", spec.name, spec.networks.len());

    let graph = synthesize_stack(&spec).with_context(|| format!("Failed to synthesize stack {}", spec.name))?;
    println!("{}", graph.to_json()?);

    Ok(())
}

/// Logs go to stderr so the graph on stdout stays parseable
fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.log_format == LogFormat::Json {
        builder.json().init();
    } else {
        builder.init();
    }
}
