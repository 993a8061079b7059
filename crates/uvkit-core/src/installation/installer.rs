//! Idempotent installer for `uv` and `uvx`

use crate::command::{CommandBuilder, ManagedExecutable};
use crate::config::UvConfig;
use crate::errors::{InstallError, InstallResult};
use reqwest::Client;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// Variable that tells the install script where to put the binaries
pub const INSTALL_DIR_VAR: &str = "UV_UNMANAGED_INSTALL";

/// Which path a successful install took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// `uvx` was already present; nothing was downloaded or run
    AlreadyInstalled,
    /// The install script was fetched and ran successfully
    Installed,
}

#[derive(Debug, Clone)]
pub struct Installer {
    config: UvConfig,
    client: Client,
}

impl Installer {
    pub fn new(config: UvConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Use a caller-configured HTTP client (timeouts, proxies, TLS)
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn config(&self) -> &UvConfig {
        &self.config
    }

    /// Command builder over the same installation directory
    pub fn commands(&self) -> CommandBuilder {
        CommandBuilder::new(self.config.clone())
    }

    /// The file whose presence marks a completed install
    pub fn marker_path(&self) -> PathBuf {
        self.config.executable_path(ManagedExecutable::Uvx.name())
    }

    /// Check for an existing install without touching the network.
    ///
    /// Only "not found" means "not installed"; any other stat failure is
    /// reported instead of being mistaken for a fresh machine.
    pub fn is_installed(&self) -> InstallResult<bool> {
        let path = self.marker_path();
        path.try_exists()
            .map_err(|source| InstallError::Stat { path, source })
    }

    /// Install `uv` and `uvx` into the configured directory unless `uvx` is
    /// already there.
    pub async fn install(&self) -> InstallResult<InstallOutcome> {
        let install_dir = self.config.install_dir();
        log::info!("Installing uv to {}", install_dir.display());

        let marker = self.marker_path();
        let present = tokio::fs::try_exists(&marker)
            .await
            .map_err(|source| InstallError::Stat {
                path: marker.clone(),
                source,
            })?;
        if present {
            log::info!("uvx is already installed at {}", install_dir.display());
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        tokio::fs::create_dir_all(install_dir)
            .await
            .map_err(|source| InstallError::CreateDir {
                path: install_dir.to_path_buf(),
                source,
            })?;

        let script = self.fetch_script().await?;
        self.run_script(script).await?;

        log::info!("Successfully installed uv to {}", install_dir.display());
        Ok(InstallOutcome::Installed)
    }

    async fn fetch_script(&self) -> InstallResult<Vec<u8>> {
        let url = self.config.script_url();
        log::info!("Downloading install script from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| InstallError::Download {
                url: url.to_string(),
                source,
            })?;

        // Anything but 200 is a failed download, 204 and 206 included
        if response.status() != reqwest::StatusCode::OK {
            return Err(InstallError::DownloadStatus {
                url: url.to_string(),
                status: response.status(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| InstallError::ReadScript {
                url: url.to_string(),
                source,
            })?;
        log::debug!("Fetched install script ({} bytes)", bytes.len());
        Ok(bytes.to_vec())
    }

    async fn run_script(&self, script: Vec<u8>) -> InstallResult<()> {
        let (program, leading_args) = self.config.platform().interpreter();
        let env = installer_environment(std::env::vars_os(), self.config.install_dir());

        let output = Command::new(program)
            .args(leading_args)
            .arg(script_arg(script))
            .env_clear()
            .envs(&env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| InstallError::Spawn {
                interpreter: program.to_string(),
                source,
            })?;

        let stdout_str = String::from_utf8_lossy(&output.stdout);
        let stderr_str = String::from_utf8_lossy(&output.stderr);
        log::debug!("uv installation stdout: {}", stdout_str);
        log::debug!("uv installation stderr: {}", stderr_str);

        if !output.status.success() {
            return Err(InstallError::ScriptFailed {
                code: output.status.code(),
                stderr: stderr_str.trim().to_string(),
            });
        }
        Ok(())
    }
}

/// The full environment handed to the install script: every variable of
/// `base` plus [`INSTALL_DIR_VAR`] pointing at `install_dir`.
pub fn installer_environment<I>(base: I, install_dir: &Path) -> BTreeMap<OsString, OsString>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut env: BTreeMap<OsString, OsString> = base.into_iter().collect();
    env.insert(INSTALL_DIR_VAR.into(), install_dir.as_os_str().to_os_string());
    env
}

#[cfg(unix)]
fn script_arg(script: Vec<u8>) -> OsString {
    use std::os::unix::ffi::OsStringExt;
    OsString::from_vec(script)
}

#[cfg(not(unix))]
fn script_arg(script: Vec<u8>) -> OsString {
    String::from_utf8_lossy(&script).into_owned().into()
}
