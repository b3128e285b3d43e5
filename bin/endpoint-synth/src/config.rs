use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Build the endpoint resource graph of a stack document
#[derive(Parser, Debug)]
#[command(name = "endpoint-synth")]
#[command(about = "Synthesize the VPC endpoint resource graph of a stack document")]
pub struct Config {
    /// Stack document to synthesize
    #[arg(env = "ENDPOINT_CONFIG", required_unless_present = "schema")]
    pub document: Option<PathBuf>,

    /// Print the stack document schema instead of synthesizing
    #[arg(long)]
    pub schema: bool,

    /// Log output format, written to stderr
    #[arg(long, env = "ENDPOINT_LOG_FORMAT", value_enum, ignore_case = true, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}
