//! # gamebuild: The Main Entry Point
//!
//! This module handles Command Line Interface (CLI) parsing, logging initialization,
//! settings loading and dispatching commands to the build orchestrator.
//!
//! Every build command blocks until the engine's build pipeline finishes. A failed build
//! exits with status 1 so CI jobs notice.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{LevelFilter, error};
use simplelog::{Config, SimpleLogger};

mod config;
mod error;
mod invariants;
mod orchestrator;
mod pipeline;
mod targets;

use config::Settings;
use orchestrator::{BuildSummary, LOG_TAG};
use pipeline::CommandPipeline;
use targets::{BuildTarget, Platform, PlatformGroup, ScriptingBackend};

/// The primary Command Line Interface (CLI) configuration.
#[derive(Parser)]
#[command(name = "gamebuild")]
#[command(about = "Build orchestrator for DemoGame player builds", long_about = None)]
struct Cli {
    /// The sub-command to execute (build-android-apk, build-windows, etc.).
    #[command(subcommand)]
    command: Option<Commands>,

    /// Settings file (JSON). Defaults to ./gamebuild.json, then the user config directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the output base directory (default: `Build`).
    #[arg(long, global = true)]
    output_base: Option<PathBuf>,

    /// Turn on verbose logging.
    ///
    /// - `-v`: Debug
    /// - `-vv`: Trace
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the Android APK with IL2CPP into `Build/Android/<app>.apk`.
    BuildAndroidApk,
    /// Build the Windows 64-bit player with IL2CPP into `Build/Windows/<app>.exe`.
    BuildWindows,
    /// Export an Android Gradle project with IL2CPP into `Build/Android/<app>/`.
    ExportAndroidProject,
    /// Log the scenes that go into every build.
    PrintDebugInfo,
    /// Run a one-off build with an explicit configuration.
    Build {
        #[arg(long, value_enum)]
        platform: Platform,

        /// Player-settings group (defaults to the platform's own group).
        #[arg(long, value_enum)]
        group: Option<PlatformGroup>,

        #[arg(long, value_enum, default_value = "il2cpp")]
        backend: ScriptingBackend,

        /// Output path relative to the output base, e.g. `iOS/DemoGame`.
        #[arg(long)]
        output: String,

        /// The output is a directory (exported project) rather than a single file.
        #[arg(long)]
        directory: bool,

        /// Keep the existing platform output folder.
        #[arg(long)]
        no_clean: bool,

        /// Export a Gradle project instead of an APK (Android only).
        #[arg(long)]
        export_android_project: bool,
    },
    /// Print the effective settings as JSON.
    ShowConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Determine log level based on verbosity flag
    let log_level = match cli.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    // Logging failure shouldn't stop a build
    let _ = SimpleLogger::init(log_level, Config::default());

    let Some(command) = cli.command else {
        // Default behavior if no command: print the help message
        use clap::CommandFactory;
        let _ = Cli::command().print_help();
        return ExitCode::SUCCESS;
    };

    match run(command, cli.config, cli.output_base) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{} {:#}", LOG_TAG, e);
            ExitCode::FAILURE
        }
    }
}

/// Settings from the file lookup, with `--output-base` applied on top and re-validated.
fn load_settings(config: Option<PathBuf>, output_base: Option<PathBuf>) -> Result<Settings> {
    let mut settings = Settings::load(config.as_deref())?;
    if let Some(base) = output_base {
        settings.output_base = base;
        settings.validate()?;
    }
    Ok(settings)
}

fn run(command: Commands, config: Option<PathBuf>, output_base: Option<PathBuf>) -> Result<()> {
    let settings = load_settings(config, output_base)?;

    match command {
        Commands::BuildAndroidApk => {
            let pipeline = CommandPipeline::from_settings(&settings)?;
            report(orchestrator::build_android_package(&settings, &pipeline)?);
        }
        Commands::BuildWindows => {
            let pipeline = CommandPipeline::from_settings(&settings)?;
            report(orchestrator::build_windows_executable(&settings, &pipeline)?);
        }
        Commands::ExportAndroidProject => {
            let pipeline = CommandPipeline::from_settings(&settings)?;
            report(orchestrator::export_android_project(&settings, &pipeline)?);
        }
        Commands::PrintDebugInfo => orchestrator::print_debug_info(&settings),
        Commands::Build {
            platform,
            group,
            backend,
            output,
            directory,
            no_clean,
            export_android_project,
        } => {
            let pipeline = CommandPipeline::from_settings(&settings)?;
            let target = BuildTarget {
                name: "Custom",
                platform,
                group: group.unwrap_or_else(|| platform.default_group()),
                backend,
                output_target: output,
                clean: !no_clean,
                output_is_directory: directory,
                export_android_project,
            };
            report(orchestrator::perform_build(&settings, &pipeline, &target)?);
        }
        Commands::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}

fn report(summary: BuildSummary) {
    println!("{} ({} bytes)", summary.output_path.display(), summary.total_size);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn named_commands_parse() {
        for name in ["build-android-apk", "build-windows", "export-android-project", "print-debug-info"] {
            let cli = Cli::try_parse_from(["gamebuild", name]).unwrap();
            assert!(cli.command.is_some(), "{name}");
        }
    }

    #[test]
    fn custom_build_parses_enums() {
        let cli = Cli::try_parse_from([
            "gamebuild", "build", "--platform", "ios", "--backend", "mono", "--output", "iOS/DemoGame", "--directory",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Build { platform, group, backend, output, directory, no_clean, .. }) => {
                assert_eq!(platform, Platform::Ios);
                assert_eq!(group, None);
                assert_eq!(backend, ScriptingBackend::Mono);
                assert_eq!(output, "iOS/DemoGame");
                assert!(directory);
                assert!(!no_clean);
            }
            _ => panic!("expected build command"),
        }
    }

    #[test]
    fn output_base_override_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ci.json");
        std::fs::write(&path, r#"{ "application_name": "Sandbox", "output_base": "FromFile" }"#).unwrap();

        let settings = load_settings(Some(path.clone()), Some(PathBuf::from("Out"))).unwrap();
        assert_eq!(settings.output_base, PathBuf::from("Out"));
        assert_eq!(settings.application_name, "Sandbox");

        let settings = load_settings(Some(path), None).unwrap();
        assert_eq!(settings.output_base, PathBuf::from("FromFile"));
    }

    #[test]
    fn empty_output_base_override_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ci.json");
        std::fs::write(&path, "{}").unwrap();

        let err = load_settings(Some(path), Some(PathBuf::new())).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<error::ConfigError>(),
            Some(error::ConfigError::Validation(_))
        ));
    }

    #[test]
    fn every_log_line_is_tagged() {
        let sources = [
            ("main.rs", include_str!("main.rs")),
            ("config.rs", include_str!("config.rs")),
            ("invariants.rs", include_str!("invariants.rs")),
            ("orchestrator.rs", include_str!("orchestrator.rs")),
            ("pipeline.rs", include_str!("pipeline.rs")),
            ("targets.rs", include_str!("targets.rs")),
        ];

        for (file, source) in sources {
            for level in ["error", "warn", "info", "debug", "trace"] {
                let call = format!("{}!(", level);
                for (at, _) in source.match_indices(&call) {
                    let args = source[at + call.len()..].trim_start();
                    let tagged = args.starts_with("\"{} ") && args.contains("LOG_TAG");
                    assert!(tagged, "untagged {}! in {} at byte {}", level, file, at);
                }
            }
        }
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from(["gamebuild", "build-windows", "-vv", "--output-base", "Out"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output_base, Some(PathBuf::from("Out")));
    }
}
