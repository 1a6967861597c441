//! Logstash configuration CLI library

pub mod commands;
pub mod error;

pub use error::{Error, Result};

use clap::{Parser, Subcommand};
use logstash_common::telemetry::LogFormat;

/// Resolve and render Logstash configuration
#[derive(Parser, Debug)]
#[command(name = "logstash-config")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log output format (text or json)
    #[arg(long, global = true, env = "LOGSTASH_LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a full configuration pass for a Logstash manifest
    Render(commands::render::RenderArgs),
    /// Compare two pipelines.yml files element by element
    DiffPipelines(commands::diff_pipelines::DiffPipelinesArgs),
}

impl Cli {
    /// Run the CLI command
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Render(args) => commands::render::run(args).await,
            Commands::DiffPipelines(args) => commands::diff_pipelines::run(args),
        }
    }
}
