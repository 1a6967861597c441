//! Render command
//!
//! Runs one configuration pass for a Logstash manifest and writes the
//! generated `logstash.yml` and `pipelines.yml`. Referenced Secrets and
//! ConfigMaps come from a manifest file when `--references` is given,
//! otherwise from the cluster.

use std::path::{Path, PathBuf};

use clap::Args;
use kube::ResourceExt;
use tracing::{info, warn};

use logstash_common::crd::{Logstash, LogstashStatus};
use logstash_common::kube_utils::create_client;
use logstash_common::{CONFIG_FILE_NAME, HTTP_PORT, PIPELINES_FILE_NAME};
use logstash_config::{
    reconcile, KubeReferenceClient, ReconcileParams, ReconciledConfig, ReferenceClient,
    StaticReferences,
};

use super::{read_file, write_file};
use crate::{Error, Result};

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Logstash manifest to render
    #[arg(short, long)]
    pub file: PathBuf,

    /// Manifest of the Secrets and ConfigMaps the resource references.
    /// Reads them from the cluster when omitted.
    #[arg(short, long)]
    pub references: Option<PathBuf>,

    /// Kubeconfig used when reading references from the cluster
    #[arg(long, env = "LOGSTASH_KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Directory for the rendered files; prints them when omitted
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Override the API TLS posture instead of reading it from the services
    #[arg(long)]
    pub tls: Option<bool>,
}

pub async fn run(args: RenderArgs) -> Result<()> {
    let logstash = load_logstash(&args.file)?;
    let client = reference_client(&args).await?;

    let mut params = ReconcileParams::new(&logstash, client.as_ref());
    if let Some(use_tls) = args.tls {
        params = params.with_tls(use_tls);
    }

    let result = match reconcile(&params).await {
        Ok(result) => result,
        Err(err) => {
            let status = LogstashStatus::degraded(&err).observed(logstash.metadata.generation);
            warn!(logstash = %logstash.name_any(), error = %err, "configuration pass failed");
            eprint!("{}", serde_yaml::to_string(&status)?);
            return Err(err.into());
        }
    };

    match &args.output_dir {
        Some(dir) => write_outputs(dir, &result)?,
        None => print_outputs(&result),
    }

    let status = LogstashStatus::ready(result.digest.to_string())
        .observed(logstash.metadata.generation);
    println!("{}", serde_yaml::to_string(&status)?);
    for (key, value) in result.annotations() {
        println!("# annotation {}: {}", key, value);
    }
    println!("# readiness probe: {} on port {}", result.probe_scheme, HTTP_PORT);
    Ok(())
}

fn load_logstash(path: &Path) -> Result<Logstash> {
    let content = read_file(path)?;
    serde_yaml::from_str(&content).map_err(|e| Error::invalid_manifest(path, e.to_string()))
}

async fn reference_client(args: &RenderArgs) -> Result<Box<dyn ReferenceClient>> {
    match &args.references {
        Some(path) => {
            let content = read_file(path)?;
            let origin = path.display().to_string();
            Ok(Box::new(StaticReferences::from_manifests(&origin, &content)?))
        }
        None => {
            let client = create_client(args.kubeconfig.as_deref()).await?;
            Ok(Box::new(KubeReferenceClient::new(client)))
        }
    }
}

fn write_outputs(dir: &Path, result: &ReconciledConfig) -> Result<()> {
    let settings_path = dir.join(CONFIG_FILE_NAME);
    let pipelines_path = dir.join(PIPELINES_FILE_NAME);
    write_file(&settings_path, &result.settings.rendered)?;
    write_file(&pipelines_path, &result.pipelines.rendered)?;
    info!(
        settings = %settings_path.display(),
        pipelines = %pipelines_path.display(),
        "wrote rendered configuration"
    );
    Ok(())
}

fn print_outputs(result: &ReconciledConfig) {
    println!("# {}", CONFIG_FILE_NAME);
    print!("{}", String::from_utf8_lossy(&result.settings.rendered));
    println!("---");
    println!("# {}", PIPELINES_FILE_NAME);
    print!("{}", String::from_utf8_lossy(&result.pipelines.rendered));
    println!("---");
}
