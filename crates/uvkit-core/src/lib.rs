//! On-demand provisioning of Astral's `uv` and `uvx`.
//!
//! The crate has two halves:
//!
//! - **Installation**: [`Installer`] checks the configured directory for an
//!   existing `uvx` and otherwise downloads and runs the platform install
//!   script, steering it into that directory.
//! - **Command building**: [`CommandBuilder`] hands out [`ManagedCommand`]
//!   handles for `uv` and `uvx`, optionally bound to a [`CancelContext`] that
//!   kills the process when cancelled or past its deadline.
//!
//! Both halves read the installation directory from the same [`UvConfig`].
//!
//! ```ignore
//! use uvkit_core::{CancelContext, Installer, UvConfig};
//! use std::time::Duration;
//!
//! let installer = Installer::new(UvConfig::from_env());
//! installer.install().await?;
//!
//! let ctx = CancelContext::new().with_timeout(Duration::from_secs(2));
//! let status = installer.commands().uv_with_context(&ctx, ["run", "sleep", "5"]).status().await;
//! ```

pub mod command;
pub mod config;
pub mod errors;
pub mod installation;
pub mod platform;

pub use command::{
    CancelContext, CancelReason, CommandBuilder, ManagedChild, ManagedCommand, ManagedExecutable,
};
pub use config::UvConfig;
pub use errors::{CommandError, InstallError, InstallResult};
pub use installation::{InstallOutcome, Installer};
pub use platform::Platform;

#[cfg(test)]
pub mod test_utils;
