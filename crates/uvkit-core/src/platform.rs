//! Platform detection and the per-OS constants the installer depends on.

use serde::Deserialize;
use std::path::PathBuf;

/// Install script served for POSIX hosts
pub const POSIX_SCRIPT_URL: &str = "https://astral.sh/uv/install.sh";
/// Install script served for Windows hosts
pub const WINDOWS_SCRIPT_URL: &str = "https://astral.sh/uv/install.ps1";

/// Directory name placed under the temp root when no install dir is configured
const DEFAULT_DIR_NAME: &str = "uvkit";
const POSIX_DEFAULT_DIR: &str = "/tmp/uvkit";
const WINDOWS_FALLBACK_TEMP: &str = "C:\\temp";

/// Operating system family, as far as installation is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Posix,
}

impl Platform {
    /// Get the current platform
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    /// Suffix appended to executable names
    pub fn exe_suffix(&self) -> &'static str {
        match self {
            Platform::Windows => ".exe",
            Platform::Posix => "",
        }
    }

    /// Append the platform executable suffix to a logical name
    pub fn executable_name(&self, name: &str) -> String {
        format!("{}{}", name, self.exe_suffix())
    }

    pub fn script_url(&self) -> &'static str {
        match self {
            Platform::Windows => WINDOWS_SCRIPT_URL,
            Platform::Posix => POSIX_SCRIPT_URL,
        }
    }

    /// Interpreter program and the arguments that precede the script body
    pub fn interpreter(&self) -> (&'static str, &'static [&'static str]) {
        match self {
            Platform::Windows => ("powershell", &["-ExecutionPolicy", "Bypass", "-Command"]),
            Platform::Posix => ("sh", &["-c"]),
        }
    }

    /// Resolve the default installation directory.
    ///
    /// `lookup` reads an environment variable; on Windows `TEMP` wins over
    /// `TMP`, and empty values are treated as unset.
    pub fn default_install_dir<F>(&self, lookup: F) -> PathBuf
    where
        F: Fn(&str) -> Option<String>,
    {
        match self {
            Platform::Windows => {
                let temp = ["TEMP", "TMP"]
                    .iter()
                    .filter_map(|key| lookup(key))
                    .find(|value| !value.is_empty())
                    .unwrap_or_else(|| WINDOWS_FALLBACK_TEMP.to_string());
                PathBuf::from(temp).join(DEFAULT_DIR_NAME)
            }
            Platform::Posix => PathBuf::from(POSIX_DEFAULT_DIR),
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::current()
    }
}
