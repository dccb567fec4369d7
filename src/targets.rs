//! # Build Targets
//!
//! The vocabulary shared by the CLI, the orchestrator and the pipeline: which platform we
//! build for, which platform group its player settings live in, which scripting backend
//! compiles the game scripts, and the fixed presets behind the named build commands.
//!
//! Serialized names match the engine's own identifiers (`StandaloneWindows64`, `IL2CPP`...)
//! because the request is handed verbatim to the external build pipeline.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Subfolder of the output base used for Android builds.
pub const ANDROID_SUBFOLDER: &str = "Android";
/// Subfolder of the output base used for Windows builds.
pub const WINDOWS_SUBFOLDER: &str = "Windows";
/// Subfolder of the output base used for iOS builds.
pub const IOS_SUBFOLDER: &str = "iOS";

/// A platform the engine can build a player for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Platform {
    #[value(name = "android")]
    Android,
    #[serde(rename = "StandaloneWindows64")]
    #[value(name = "windows64")]
    StandaloneWindows64,
    #[serde(rename = "iOS")]
    #[value(name = "ios")]
    Ios,
    #[serde(rename = "WebGL")]
    #[value(name = "webgl")]
    WebGl,
    #[serde(rename = "StandaloneLinux64")]
    #[value(name = "linux64")]
    StandaloneLinux64,
}

impl Platform {
    /// Folder name under the output base, or `None` when this tool has no output layout
    /// for the platform.
    pub fn subfolder(self) -> Option<&'static str> {
        match self {
            Platform::Android => Some(ANDROID_SUBFOLDER),
            Platform::StandaloneWindows64 => Some(WINDOWS_SUBFOLDER),
            Platform::Ios => Some(IOS_SUBFOLDER),
            Platform::WebGl | Platform::StandaloneLinux64 => None,
        }
    }

    /// The player-settings group a platform belongs to.
    pub fn default_group(self) -> PlatformGroup {
        match self {
            Platform::Android => PlatformGroup::Android,
            Platform::StandaloneWindows64 | Platform::StandaloneLinux64 => PlatformGroup::Standalone,
            Platform::Ios => PlatformGroup::Ios,
            Platform::WebGl => PlatformGroup::WebGl,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Android => "Android",
            Platform::StandaloneWindows64 => "StandaloneWindows64",
            Platform::Ios => "iOS",
            Platform::WebGl => "WebGL",
            Platform::StandaloneLinux64 => "StandaloneLinux64",
        };
        f.write_str(name)
    }
}

/// Player-settings group. The scripting backend is chosen per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum PlatformGroup {
    Android,
    Standalone,
    #[serde(rename = "iOS")]
    #[value(name = "ios")]
    Ios,
    #[serde(rename = "WebGL")]
    #[value(name = "webgl")]
    WebGl,
}

/// How the project's scripts are turned into native code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum ScriptingBackend {
    /// Ahead-of-time translation to C++.
    #[serde(rename = "IL2CPP")]
    #[value(name = "il2cpp")]
    Il2Cpp,
    /// JIT / interpreted runtime.
    Mono,
}

impl fmt::Display for ScriptingBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptingBackend::Il2Cpp => f.write_str("IL2CPP"),
            ScriptingBackend::Mono => f.write_str("Mono"),
        }
    }
}

/// One buildable artifact: the fixed configuration behind a named build command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    pub name: &'static str,
    pub platform: Platform,
    pub group: PlatformGroup,
    pub backend: ScriptingBackend,
    /// Output path relative to the output base.
    pub output_target: String,
    pub clean: bool,
    pub output_is_directory: bool,
    /// Emit a Gradle project instead of a packaged APK.
    pub export_android_project: bool,
}

impl BuildTarget {
    /// `Android/{app}.apk`, IL2CPP.
    pub fn android_apk(application_name: &str) -> Self {
        Self {
            name: "Android APK (IL2CPP)",
            platform: Platform::Android,
            group: PlatformGroup::Android,
            backend: ScriptingBackend::Il2Cpp,
            output_target: format!("{}/{}.apk", ANDROID_SUBFOLDER, application_name),
            clean: true,
            output_is_directory: false,
            export_android_project: false,
        }
    }

    /// `Windows/{app}.exe`, IL2CPP.
    pub fn windows(application_name: &str) -> Self {
        Self {
            name: "Windows (IL2CPP)",
            platform: Platform::StandaloneWindows64,
            group: PlatformGroup::Standalone,
            backend: ScriptingBackend::Il2Cpp,
            output_target: format!("{}/{}.exe", WINDOWS_SUBFOLDER, application_name),
            clean: true,
            output_is_directory: false,
            export_android_project: false,
        }
    }

    /// `Android/{app}` as an exported Gradle project, IL2CPP.
    pub fn android_project(application_name: &str) -> Self {
        Self {
            name: "Android Project (IL2CPP)",
            platform: Platform::Android,
            group: PlatformGroup::Android,
            backend: ScriptingBackend::Il2Cpp,
            output_target: format!("{}/{}", ANDROID_SUBFOLDER, application_name),
            clean: true,
            output_is_directory: true,
            export_android_project: true,
        }
    }
}
