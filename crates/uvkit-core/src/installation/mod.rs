//! Installation of the `uv` toolchain
//!
//! The installer fetches Astral's platform install script and runs it with
//! `UV_UNMANAGED_INSTALL` pointing at the configured directory. Presence of
//! `uvx` in that directory is the only signal used to skip the install.

mod installer;


pub use installer::{installer_environment, InstallOutcome, Installer, INSTALL_DIR_VAR};
