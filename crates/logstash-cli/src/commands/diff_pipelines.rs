//! Diff-pipelines command

use std::path::PathBuf;

use clap::Args;
use logstash_config::{PipelinesConfig, PipelinesDiff};

use super::read_file;
use crate::Result;

#[derive(Args, Debug)]
pub struct DiffPipelinesArgs {
    /// Left pipelines.yml
    pub left: PathBuf,
    /// Right pipelines.yml
    pub right: PathBuf,
}

pub fn run(args: DiffPipelinesArgs) -> Result<()> {
    let left = PipelinesConfig::parse(read_file(&args.left)?.as_bytes())?;
    let right = PipelinesConfig::parse(read_file(&args.right)?.as_bytes())?;

    match left.diff(&right) {
        Ok(()) => {
            println!("pipelines are identical ({} defined)", left.len());
            Ok(())
        }
        Err(diff) => {
            if let PipelinesDiff::Content { indices, .. } = &diff {
                for index in indices {
                    println!("  pipeline {} differs", index);
                }
            }
            Err(diff.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn args(dir: &tempfile::TempDir, left: &str, right: &str) -> DiffPipelinesArgs {
        let left_path = dir.path().join("left.yml");
        let right_path = dir.path().join("right.yml");
        std::fs::write(&left_path, left).unwrap();
        std::fs::write(&right_path, right).unwrap();
        DiffPipelinesArgs {
            left: left_path,
            right: right_path,
        }
    }

    #[test]
    fn identical_files_pass() {
        let dir = tempfile::tempdir().unwrap();
        let content = "- pipeline.id: main\n  pipeline.workers: 2\n";
        assert!(run(args(&dir, content, content)).is_ok());
    }

    #[test]
    fn key_order_does_not_matter() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run(args(
            &dir,
            "- pipeline.id: main\n  pipeline.workers: 2\n",
            "- pipeline.workers: 2\n  pipeline.id: main\n",
        ))
        .is_ok());
    }

    #[test]
    fn different_lengths_fail() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(args(
            &dir,
            "- pipeline.id: a\n",
            "- pipeline.id: a\n- pipeline.id: b\n",
        ))
        .unwrap_err();
        assert!(matches!(
            err,
            Error::PipelinesDiffer(PipelinesDiff::Length { left: 1, right: 2 })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = run(DiffPipelinesArgs {
            left: PathBuf::from("/nonexistent/left.yml"),
            right: PathBuf::from("/nonexistent/right.yml"),
        })
        .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
