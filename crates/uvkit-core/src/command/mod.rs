//! Command handles for the managed `uv` and `uvx` executables.
//!
//! Building a command never touches the filesystem: the program path is
//! derived from the configured installation directory, and a missing binary
//! only surfaces when the handle is run.

mod builder;
mod context;

pub use builder::{CommandBuilder, ManagedChild, ManagedCommand, ManagedExecutable};
pub use context::{CancelContext, CancelReason};
