//! Logstash configuration CLI
//!
//! Renders the settings, pipelines and config digest a Logstash resource
//! resolves to, either offline from manifests or against a live cluster.

use clap::Parser;

use logstash_cli::{Cli, Result};
use logstash_common::telemetry::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format)?;
    cli.run().await
}
