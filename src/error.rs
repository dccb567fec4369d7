//! # Error Types
//!
//! `BuildError` covers everything that can stop a build between the clean step and the
//! pipeline report. `ConfigError` covers loading and validating the settings file.
//! The CLI maps any of these to a non-zero exit code.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::pipeline::BuildOutcome;
use crate::targets::Platform;

/// Failures of a single build invocation.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("platform {0} has no output folder")]
    UnsupportedPlatform(Platform),

    #[error("output target {0:?} must be a relative path inside the output base")]
    InvalidOutputTarget(String),

    #[error("failed to clean output folder {path:?}: {source}")]
    Clean {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create output folder {path:?}: {source}")]
    OutputFolder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no build pipeline configured (set \"pipeline.executable\" in the settings file)")]
    PipelineNotConfigured,

    #[error("build pipeline could not run: {0:#}")]
    Pipeline(anyhow::Error),

    #[error("build failed")]
    PipelineFailed,

    #[error("build pipeline returned an unexpected outcome: {0:?}")]
    UnexpectedOutcome(BuildOutcome),
}

/// Failures while reading the settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading settings {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in settings: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("settings validation failed: {0}")]
    Validation(String),
}
