//! # Build Pipeline
//!
//! The engine's build pipeline is an external collaborator. Everything this tool knows about
//! it is the `BuildPipeline` trait: hand over a `BuildRequest`, block until a `BuildReport`
//! comes back. This lets the orchestrator run against a scripted mock in tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::config::Settings;
use crate::error::BuildError;
use crate::orchestrator::LOG_TAG;
use crate::targets::{Platform, PlatformGroup, ScriptingBackend};

/// File name of the serialized request handed to the engine, placed in the output base.
pub const REQUEST_FILE_NAME: &str = "build-request.json";

/// Flags forwarded to the engine alongside the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Drop the engine's incremental build cache before building.
    pub clean_build_cache: bool,
    /// Export a Gradle project instead of packaging an APK (Android only).
    pub export_android_project: bool,
}

/// Everything the engine needs to produce one artifact. Built fresh for every invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub scenes: Vec<String>,
    pub output_path: PathBuf,
    pub platform: Platform,
    pub platform_group: PlatformGroup,
    pub scripting_backend: ScriptingBackend,
    pub options: BuildOptions,
    pub output_is_directory: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildOutcome {
    Succeeded,
    Failed,
    Cancelled,
}

/// What the pipeline reports back once the build has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub outcome: BuildOutcome,
    /// Total artifact size in bytes. Zero unless the build succeeded.
    pub total_size: u64,
}

/// Abstraction over the engine's build pipeline.
pub trait BuildPipeline {
    /// Submit a request and block until the engine is done with it.
    ///
    /// `Err` means the pipeline could not be driven at all (missing executable, unwritable
    /// request file). A build that ran and failed is an `Ok` report with `Failed`.
    fn build(&self, request: &BuildRequest) -> Result<BuildReport>;
}

/// The real pipeline: runs the engine as a child process.
///
/// The engine receives the request as a JSON file via `--build-request <file>`, after any
/// configured arguments. Exit status 0 means success.
#[derive(Debug, Clone)]
pub struct CommandPipeline {
    pub executable: PathBuf,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    /// Where the request file is written.
    pub request_dir: PathBuf,
}

impl CommandPipeline {
    pub fn from_settings(settings: &Settings) -> Result<Self, BuildError> {
        let pipeline = settings.pipeline.as_ref().ok_or(BuildError::PipelineNotConfigured)?;
        Ok(Self {
            executable: pipeline.executable.clone(),
            args: pipeline.args.clone(),
            working_dir: pipeline.working_dir.clone(),
            request_dir: settings.output_base.clone(),
        })
    }

    /// Writes the request with an absolute output path, so a different engine working
    /// directory still lands the artifact in our output tree.
    fn write_request_file(&self, request: &BuildRequest) -> Result<PathBuf> {
        let mut request = request.clone();
        request.output_path = std::path::absolute(&request.output_path)
            .with_context(|| format!("Failed to make {:?} absolute", request.output_path))?;

        fs::create_dir_all(&self.request_dir)
            .with_context(|| format!("Failed to create {:?}", self.request_dir))?;
        let request_file = std::path::absolute(self.request_dir.join(REQUEST_FILE_NAME))?;
        let json = serde_json::to_string_pretty(&request)?;
        fs::write(&request_file, json)
            .with_context(|| format!("Failed to write build request {:?}", request_file))?;
        Ok(request_file)
    }
}

impl BuildPipeline for CommandPipeline {
    fn build(&self, request: &BuildRequest) -> Result<BuildReport> {
        let request_file = self.write_request_file(request)?;

        let mut command = Command::new(&self.executable);
        command.args(&self.args).arg("--build-request").arg(&request_file);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }

        info!("{} Running build pipeline {:?}", LOG_TAG, self.executable);
        debug!("{} Command: {:?}", LOG_TAG, command);

        let status = command
            .status()
            .with_context(|| format!("Failed to execute {:?}", self.executable))?;

        let outcome = if status.success() {
            BuildOutcome::Succeeded
        } else if status.code().is_none() {
            // Terminated by a signal rather than exiting.
            BuildOutcome::Cancelled
        } else {
            debug!("{} Pipeline exit code: {:?}", LOG_TAG, status.code());
            BuildOutcome::Failed
        };

        let total_size = match outcome {
            BuildOutcome::Succeeded => measure_artifact(&request.output_path, request.output_is_directory),
            _ => 0,
        };

        Ok(BuildReport { outcome, total_size })
    }
}

/// Size of a build artifact in bytes: the file's length, or the sum over every file below a
/// directory target. A missing artifact measures as zero.
pub fn measure_artifact(path: &Path, is_directory: bool) -> u64 {
    if !path.exists() {
        warn!("{} Artifact {:?} not found after build", LOG_TAG, path);
        return 0;
    }

    if !is_directory {
        return fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    }

    WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|meta| meta.len())
        .sum()
}

/// A scripted pipeline for tests. Records every request and answers with a fixed report.
#[allow(dead_code)]
#[derive(Debug)]
pub struct MockPipeline {
    pub requests: Mutex<Vec<BuildRequest>>,
    pub report: BuildReport,
}

impl MockPipeline {
    #[allow(dead_code)]
    pub fn new(outcome: BuildOutcome, total_size: u64) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            report: BuildReport { outcome, total_size },
        }
    }

    #[allow(dead_code)]
    pub fn succeeding(total_size: u64) -> Self {
        Self::new(BuildOutcome::Succeeded, total_size)
    }

    #[allow(dead_code)]
    pub fn submitted(&self) -> Vec<BuildRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl BuildPipeline for MockPipeline {
    fn build(&self, request: &BuildRequest) -> Result<BuildReport> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        Ok(self.report)
    }
}
