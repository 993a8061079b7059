//! Installation configuration
//!
//! `UvConfig` is an immutable value owned by the installer and the command
//! builder. It is resolved once, with the following precedence: an explicit
//! override, then the `UVKIT_*` environment variables, then the OS default.
//! Empty values are ignored at every level.

use crate::platform::Platform;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the installation directory
pub const INSTALL_DIR_ENV: &str = "UVKIT_INSTALL_DIR";
/// Environment variable that overrides the install script URL
pub const SCRIPT_URL_ENV: &str = "UVKIT_SCRIPT_URL";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "UvConfigFile")]
pub struct UvConfig {
    install_dir: PathBuf,
    script_url: Option<String>,
    platform: Platform,
}

/// Shape accepted when the config is embedded in a host's settings file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UvConfigFile {
    install_dir: Option<PathBuf>,
    script_url: Option<String>,
    platform: Option<Platform>,
}

impl From<UvConfigFile> for UvConfig {
    fn from(file: UvConfigFile) -> Self {
        let platform = file.platform.unwrap_or_default();
        let mut config = UvConfig::for_platform(platform, file.install_dir);
        if let Some(url) = file.script_url {
            config = config.with_script_url(url);
        }
        config
    }
}

impl UvConfig {
    /// Create a config for the current platform. `None` or an empty path
    /// selects the OS default directory.
    pub fn new<P: Into<PathBuf>>(install_dir: Option<P>) -> Self {
        Self::for_platform(Platform::current(), install_dir)
    }

    fn for_platform<P: Into<PathBuf>>(platform: Platform, install_dir: Option<P>) -> Self {
        let install_dir = install_dir
            .map(Into::into)
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| platform.default_install_dir(|key| env::var(key).ok()));
        Self {
            install_dir,
            script_url: None,
            platform,
        }
    }

    /// Build a config from the `UVKIT_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let platform = Platform::current();
        let install_dir = lookup(INSTALL_DIR_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| platform.default_install_dir(&lookup));

        let mut config = Self {
            install_dir,
            script_url: None,
            platform,
        };
        if let Some(url) = lookup(SCRIPT_URL_ENV) {
            config = config.with_script_url(url);
        }
        config
    }

    /// Override the installation directory; an empty path is ignored
    pub fn with_install_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        let dir = dir.into();
        if !dir.as_os_str().is_empty() {
            self.install_dir = dir;
        }
        self
    }

    /// Fetch the install script from a mirror instead of astral.sh
    pub fn with_script_url<S: Into<String>>(mut self, url: S) -> Self {
        let url = url.into();
        if !url.is_empty() {
            self.script_url = Some(url);
        }
        self
    }

    /// Pin the platform. The default directory is not re-derived.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// URL the installer will fetch
    pub fn script_url(&self) -> &str {
        self.script_url
            .as_deref()
            .unwrap_or_else(|| self.platform.script_url())
    }

    /// Resolve `{install_dir}/{name}{suffix}`
    pub fn executable_path(&self, name: &str) -> PathBuf {
        self.install_dir.join(self.platform.executable_name(name))
    }
}

impl Default for UvConfig {
    fn default() -> Self {
        Self::new(None::<PathBuf>)
    }
}
