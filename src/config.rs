//! # Settings
//!
//! Optional JSON settings file. Every field has a default matching the stock DemoGame
//! layout, so the tool works without one, except that actually building needs an engine
//! executable under `pipeline`.
//!
//! Lookup order:
//! 1. `--config <file>` on the command line.
//! 2. `gamebuild.json` in the current directory.
//! 3. `config.json` in the per-user config directory (e.g. `~/.config/gamebuild`).
//! 4. Built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::orchestrator::LOG_TAG;

pub const DEFAULT_APPLICATION_NAME: &str = "DemoGame";
pub const DEFAULT_OUTPUT_BASE: &str = "Build";
pub const DEFAULT_SCENE: &str = "Assets/Scene/SampleScene.unity";
pub const LOCAL_CONFIG_FILE: &str = "gamebuild.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base name of the produced artifacts (`DemoGame.apk`, `DemoGame.exe`...).
    pub application_name: String,
    /// Root of all platform output folders.
    pub output_base: PathBuf,
    /// Scenes included in the build, in load order.
    pub scenes: Vec<String>,
    pub pipeline: Option<PipelineSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
            output_base: PathBuf::from(DEFAULT_OUTPUT_BASE),
            scenes: vec![DEFAULT_SCENE.to_string()],
            pipeline: None,
        }
    }
}

/// How to launch the engine's build pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub executable: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

impl Settings {
    /// Resolves and loads the settings file following the lookup order above.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match settings_path(explicit, Path::new("."), user_config_path()) {
            Some(path) => Self::from_file(&path),
            None => {
                debug!("{} No settings file found, using defaults", LOG_TAG);
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("{} Loaded settings from {:?}", LOG_TAG, path);
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.application_name.trim().is_empty() {
            return Err(ConfigError::Validation("application_name cannot be empty".to_string()));
        }
        if self.output_base.as_os_str().is_empty() {
            return Err(ConfigError::Validation("output_base cannot be empty".to_string()));
        }
        if self.scenes.is_empty() {
            return Err(ConfigError::Validation("at least one scene is required".to_string()));
        }
        if let Some(pipeline) = &self.pipeline {
            if pipeline.executable.as_os_str().is_empty() {
                return Err(ConfigError::Validation("pipeline.executable cannot be empty".to_string()));
            }
        }
        Ok(())
    }
}

/// Picks the settings file: the explicit path wins unconditionally, then `gamebuild.json`
/// in `local_dir`, then the user file. `None` means built-in defaults.
pub fn settings_path(explicit: Option<&Path>, local_dir: &Path, user: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = local_dir.join(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    user.filter(|path| path.is_file())
}

/// `<user config dir>/config.json`, if the platform has a home directory.
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "gamebuild").map(|dirs| dirs.config_dir().join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn defaults_match_stock_layout() {
        let settings = Settings::default();
        assert_eq!(settings.application_name, "DemoGame");
        assert_eq!(settings.output_base, PathBuf::from("Build"));
        assert_eq!(settings.scenes, vec!["Assets/Scene/SampleScene.unity".to_string()]);
        assert!(settings.pipeline.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "pipeline": { "executable": "/opt/engine/Editor" } }"#).unwrap();
        assert_eq!(settings.application_name, "DemoGame");
        let pipeline = settings.pipeline.unwrap();
        assert_eq!(pipeline.executable, PathBuf::from("/opt/engine/Editor"));
        assert!(pipeline.args.is_empty());
        assert!(pipeline.working_dir.is_none());
    }

    #[test]
    fn rejects_empty_scene_list() {
        let err = Settings::from_json(r#"{ "scenes": [] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = Settings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidJson(_)));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.json");
        fs::write(&path, r#"{ "application_name": "Sandbox", "output_base": "Out" }"#).unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.application_name, "Sandbox");
        assert_eq!(settings.output_base, PathBuf::from("Out"));
    }

    #[test]
    fn lookup_prefers_explicit_then_local_then_user() {
        let local_dir = tempdir().unwrap();
        let user_dir = tempdir().unwrap();
        let explicit = local_dir.path().join("ci.json");
        let local = local_dir.path().join(LOCAL_CONFIG_FILE);
        let user = user_dir.path().join("config.json");

        // Nothing on disk: defaults, even though a user path is known.
        assert_eq!(settings_path(None, local_dir.path(), Some(user.clone())), None);
        assert_eq!(settings_path(None, local_dir.path(), None), None);

        fs::write(&user, "{}").unwrap();
        assert_eq!(settings_path(None, local_dir.path(), Some(user.clone())), Some(user.clone()));

        fs::write(&local, "{}").unwrap();
        assert_eq!(settings_path(None, local_dir.path(), Some(user.clone())), Some(local.clone()));

        // An explicit path is used even when it does not exist, so the load reports it.
        assert_eq!(
            settings_path(Some(&explicit), local_dir.path(), Some(user.clone())),
            Some(explicit.clone())
        );
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("absent.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
