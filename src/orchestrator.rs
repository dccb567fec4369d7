//! # Build Orchestrator
//!
//! The straight-line sequence behind every build command:
//! 1. Clean the platform output folder (`clean_platform_output`).
//! 2. Resolve the artifact path and make sure its folder exists (`resolve_output_target`).
//! 3. Assemble a `BuildRequest` and hand it to the pipeline.
//! 4. Turn the pipeline's report into a `BuildSummary` or a `BuildError`.
//!
//! Nothing here is global: the scripting backend travels inside the request, so two builds
//! in a row never see each other's settings.

use std::fs;
use std::path::{Component, Path, PathBuf};

use log::{debug, error, info, warn};

use crate::config::Settings;
use crate::error::BuildError;
use crate::invariants;
use crate::pipeline::{BuildOptions, BuildOutcome, BuildPipeline, BuildRequest};
use crate::targets::{BuildTarget, Platform};

/// Prefix of every diagnostic this tool logs.
pub const LOG_TAG: &str = "[Game Builder]";

/// Asset folder the iOS Xcode export expects before the engine writes launch images into it.
pub const IOS_LAUNCH_IMAGE_DIR: &str = "Unity-iPhone/Images.xcassets/LaunchImage.launchimage";

/// What a successful build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub output_path: PathBuf,
    pub total_size: u64,
}

pub fn build_android_package(settings: &Settings, pipeline: &impl BuildPipeline) -> Result<BuildSummary, BuildError> {
    perform_build(settings, pipeline, &BuildTarget::android_apk(&settings.application_name))
}

pub fn build_windows_executable(settings: &Settings, pipeline: &impl BuildPipeline) -> Result<BuildSummary, BuildError> {
    perform_build(settings, pipeline, &BuildTarget::windows(&settings.application_name))
}

pub fn export_android_project(settings: &Settings, pipeline: &impl BuildPipeline) -> Result<BuildSummary, BuildError> {
    perform_build(settings, pipeline, &BuildTarget::android_project(&settings.application_name))
}

/// Runs one build end to end and blocks until the pipeline is done.
///
/// Failures are logged with the tool's tag *and* returned, so the CLI can turn them into
/// an exit code.
pub fn perform_build(
    settings: &Settings,
    pipeline: &impl BuildPipeline,
    target: &BuildTarget,
) -> Result<BuildSummary, BuildError> {
    info!("{} Starting build: {} ({})", LOG_TAG, target.name, target.platform);

    if target.clean {
        clean_platform_output(&settings.output_base, target.platform)?;
    }

    let output_path = resolve_output_target(
        &settings.output_base,
        target.platform,
        &target.output_target,
        target.output_is_directory,
    )?;

    let request = BuildRequest {
        scenes: list_build_scenes(settings),
        output_path,
        platform: target.platform,
        platform_group: target.group,
        scripting_backend: target.backend,
        options: BuildOptions {
            clean_build_cache: true,
            export_android_project: target.export_android_project,
        },
        output_is_directory: target.output_is_directory,
    };

    if request.options.export_android_project && target.platform != Platform::Android {
        warn!("{} Android project export requested for {}; the engine will ignore it", LOG_TAG, target.platform);
    }
    debug!(
        "{} Scripting backend for {:?}: {}",
        LOG_TAG, request.platform_group, request.scripting_backend
    );

    let report = pipeline.build(&request).map_err(BuildError::Pipeline)?;

    match report.outcome {
        BuildOutcome::Succeeded => {
            info!("{} Build succeed, size: {} bytes", LOG_TAG, report.total_size);
            Ok(BuildSummary {
                output_path: request.output_path,
                total_size: report.total_size,
            })
        }
        BuildOutcome::Failed => {
            error!("{} Build failed", LOG_TAG);
            Err(BuildError::PipelineFailed)
        }
        other => {
            warn!("{} Build ended with outcome {:?}", LOG_TAG, other);
            Err(BuildError::UnexpectedOutcome(other))
        }
    }
}

/// `{base}/{platform subfolder}`, or `None` for platforms without an output layout.
pub fn resolve_output_folder(base: &Path, platform: Platform) -> Option<PathBuf> {
    platform.subfolder().map(|sub| base.join(sub))
}

/// Deletes the platform output folder and everything in it.
///
/// Returns whether anything was deleted. A platform without an output folder and a folder
/// that does not exist yet are both no-ops.
pub fn clean_platform_output(base: &Path, platform: Platform) -> Result<bool, BuildError> {
    let Some(folder) = resolve_output_folder(base, platform) else {
        debug!("{} No output folder for {}, skipping clean", LOG_TAG, platform);
        return Ok(false);
    };

    if !folder.is_dir() {
        return Ok(false);
    }

    info!("{} Cleaning {:?}", LOG_TAG, folder);
    fs::remove_dir_all(&folder).map_err(|source| BuildError::Clean { path: folder, source })?;
    Ok(true)
}

/// Computes `{base}/{relative_target}` and prepares the folders the engine expects to exist.
///
/// The platform output folder is created if absent; iOS targets additionally get the
/// launch-image asset folder inside the result path. Any creation failure aborts the build.
pub fn resolve_output_target(
    base: &Path,
    platform: Platform,
    relative_target: &str,
    is_directory: bool,
) -> Result<PathBuf, BuildError> {
    let folder = resolve_output_folder(base, platform).ok_or(BuildError::UnsupportedPlatform(platform))?;

    if !is_plain_relative(relative_target) {
        return Err(BuildError::InvalidOutputTarget(relative_target.to_string()));
    }
    let result = base.join(relative_target);

    info!(
        "{} result path: {:?} (directory: {}), platform folder: {:?}, platform full path: {:?}",
        LOG_TAG,
        result,
        is_directory,
        folder,
        std::path::absolute(&folder).unwrap_or_else(|_| folder.clone())
    );

    if !folder.is_dir() {
        fs::create_dir_all(&folder).map_err(|source| BuildError::OutputFolder {
            path: folder.clone(),
            source,
        })?;
    }

    if platform == Platform::Ios {
        let launch_images = result.join(IOS_LAUNCH_IMAGE_DIR);
        if !launch_images.is_dir() {
            fs::create_dir_all(&launch_images).map_err(|source| BuildError::OutputFolder {
                path: launch_images.clone(),
                source,
            })?;
        }
    }

    invariants::check(
        result.starts_with(base),
        "Orchestrator",
        "output target stays under the output base",
    );

    Ok(result)
}

/// No root, no prefix, no `..`, and names at least one entry below the base.
fn is_plain_relative(target: &str) -> bool {
    let path = Path::new(target);
    path.components().any(|c| matches!(c, Component::Normal(_)))
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// The scenes that go into every build, in load order.
pub fn list_build_scenes(settings: &Settings) -> Vec<String> {
    let scenes = settings.scenes.clone();
    invariants::check(!scenes.is_empty(), "Orchestrator", "build scene list is not empty");
    scenes
}

pub fn print_debug_info(settings: &Settings) {
    for scene in list_build_scenes(settings) {
        info!("{} Pre Build Scene: {}", LOG_TAG, scene);
    }
}
