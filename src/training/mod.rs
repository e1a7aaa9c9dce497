//! Launchers for the external training entry points.
//!
//! Training itself is owned by the external frameworks; this module only
//! checks the inputs exist, builds the command line and waits for it.

mod jobs;

pub use jobs::{ClassifierJob, DetectorJob};

use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;
use tracing::{error, info};

use crate::data::error::DatasetError;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("classifier expects {expected} classes but the dataset has {found}")]
    ClassCount { expected: usize, found: usize },

    #[error("training input not found: {0:?}")]
    MissingInput(PathBuf),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Failed { program: String, status: String },
}

/// Render a command for logs and `--dry-run` output.
pub fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|part| part.to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run the command to completion with inherited stdio.
pub fn launch(mut cmd: Command) -> Result<(), TrainingError> {
    let program = cmd.get_program().to_string_lossy().to_string();
    info!("Launching: {}", describe(&cmd));

    let status = cmd
        .status()
        .map_err(|source| TrainingError::Spawn {
            program: program.clone(),
            source,
        })?;

    if !status.success() {
        error!("{} exited with {}", program, status);
        return Err(TrainingError::Failed {
            program,
            status: status.to_string(),
        });
    }

    info!("{} finished successfully", program);
    Ok(())
}
