use super::context::CancelContext;
use crate::config::UvConfig;
use crate::errors::CommandError;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output, Stdio};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, ChildStderr, ChildStdout, Command};

/// One of the two binaries provisioned by the installer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagedExecutable {
    Uv,
    Uvx,
}

impl ManagedExecutable {
    pub const ALL: [ManagedExecutable; 2] = [ManagedExecutable::Uv, ManagedExecutable::Uvx];

    /// Logical name, without the platform suffix
    pub fn name(&self) -> &'static str {
        match self {
            ManagedExecutable::Uv => "uv",
            ManagedExecutable::Uvx => "uvx",
        }
    }
}

impl fmt::Display for ManagedExecutable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Factory for `uv` / `uvx` command handles rooted at one installation directory
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    config: UvConfig,
}

impl CommandBuilder {
    pub fn new(config: UvConfig) -> Self {
        Self { config }
    }

    /// Shorthand for a builder over an explicit directory on the current platform
    pub fn from_dir<P: Into<PathBuf>>(install_dir: P) -> Self {
        Self::new(UvConfig::new(Some(install_dir)))
    }

    pub fn config(&self) -> &UvConfig {
        &self.config
    }

    pub fn install_dir(&self) -> &Path {
        self.config.install_dir()
    }

    /// Full path of a managed executable, whether or not it exists
    pub fn path(&self, exe: ManagedExecutable) -> PathBuf {
        self.config.executable_path(exe.name())
    }

    pub fn uv_path(&self) -> PathBuf {
        self.path(ManagedExecutable::Uv)
    }

    pub fn uvx_path(&self) -> PathBuf {
        self.path(ManagedExecutable::Uvx)
    }

    pub fn build<I, S>(&self, exe: ManagedExecutable, args: I) -> ManagedCommand
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(self.path(exe));
        cmd.args(args);
        ManagedCommand {
            inner: cmd,
            context: None,
        }
    }

    pub fn build_with_context<I, S>(
        &self,
        exe: ManagedExecutable,
        ctx: &CancelContext,
        args: I,
    ) -> ManagedCommand
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = self.build(exe, args);
        command.context = Some(ctx.clone());
        command
    }

    pub fn uv<I, S>(&self, args: I) -> ManagedCommand
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.build(ManagedExecutable::Uv, args)
    }

    pub fn uv_with_context<I, S>(&self, ctx: &CancelContext, args: I) -> ManagedCommand
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.build_with_context(ManagedExecutable::Uv, ctx, args)
    }

    pub fn uvx<I, S>(&self, args: I) -> ManagedCommand
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.build(ManagedExecutable::Uvx, args)
    }

    pub fn uvx_with_context<I, S>(&self, ctx: &CancelContext, args: I) -> ManagedCommand
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.build_with_context(ManagedExecutable::Uvx, ctx, args)
    }
}

/// A not-yet-run invocation of a managed executable.
///
/// When bound to a [`CancelContext`], the child is killed and reaped as soon
/// as the context fires and the run reports [`CommandError::Cancelled`].
#[derive(Debug)]
pub struct ManagedCommand {
    inner: Command,
    context: Option<CancelContext>,
}

impl ManagedCommand {
    pub fn program(&self) -> &OsStr {
        self.inner.as_std().get_program()
    }

    pub fn args(&self) -> Vec<&OsStr> {
        self.inner.as_std().get_args().collect()
    }

    pub fn context(&self) -> Option<&CancelContext> {
        self.context.as_ref()
    }

    pub fn as_std(&self) -> &std::process::Command {
        self.inner.as_std()
    }

    /// Access the underlying command to set cwd, env or stdio
    pub fn command_mut(&mut self) -> &mut Command {
        &mut self.inner
    }

    /// Start the process without waiting for it. The returned child stays
    /// bound to this command's context.
    pub fn spawn(mut self) -> Result<ManagedChild, CommandError> {
        if let Some(reason) = self.context.as_ref().and_then(|ctx| ctx.reason()) {
            return Err(CommandError::Cancelled(reason));
        }
        if self.context.is_some() {
            self.inner.kill_on_drop(true);
        }
        log::debug!("Spawning {}", Path::new(self.program()).display());
        let child = self.inner.spawn().map_err(CommandError::Spawn)?;
        Ok(ManagedChild {
            child,
            context: self.context,
        })
    }

    /// Run to completion and return the exit status
    pub async fn status(self) -> Result<ExitStatus, CommandError> {
        self.spawn()?.wait().await
    }

    /// Run to completion, capturing stdout and stderr
    pub async fn output(mut self) -> Result<Output, CommandError> {
        self.inner.stdout(Stdio::piped()).stderr(Stdio::piped());
        let mut child = self.spawn()?;

        let stdout = tokio::spawn(read_to_end(child.stdout()));
        let stderr = tokio::spawn(read_to_end(child.stderr()));

        let status = match child.wait().await {
            Ok(status) => status,
            Err(err) => {
                // Grandchildren may still hold the pipes open
                stdout.abort();
                stderr.abort();
                return Err(err);
            }
        };

        Ok(Output {
            status,
            stdout: join_reader(stdout).await?,
            stderr: join_reader(stderr).await?,
        })
    }
}

/// A running managed executable, still bound to its [`CancelContext`]
#[derive(Debug)]
pub struct ManagedChild {
    child: Child,
    context: Option<CancelContext>,
}

impl ManagedChild {
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Take the piped stdout, if it was configured
    pub fn stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    /// Take the piped stderr, if it was configured
    pub fn stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /// Wait for exit, killing the process if the context fires first
    pub async fn wait(&mut self) -> Result<ExitStatus, CommandError> {
        match &self.context {
            None => self.child.wait().await.map_err(CommandError::Wait),
            Some(ctx) => {
                tokio::select! {
                    status = self.child.wait() => status.map_err(CommandError::Wait),
                    reason = ctx.done() => {
                        terminate(&mut self.child).await;
                        Err(CommandError::Cancelled(reason))
                    }
                }
            }
        }
    }

    /// Kill the process and reap it
    pub async fn kill(&mut self) -> Result<(), CommandError> {
        self.child.kill().await.map_err(CommandError::Wait)
    }
}

async fn terminate(child: &mut Child) {
    let pid = child.id();
    log::warn!("Context fired, killing process {:?}", pid);
    if let Err(e) = child.kill().await {
        log::warn!("Failed to kill process {:?}: {}", pid, e);
    }
}

async fn read_to_end<R>(reader: Option<R>) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

async fn join_reader(
    handle: tokio::task::JoinHandle<std::io::Result<Vec<u8>>>,
) -> Result<Vec<u8>, CommandError> {
    handle
        .await
        .map_err(|e| CommandError::Wait(std::io::Error::other(e)))?
        .map_err(CommandError::Wait)
}
