//! Slipway deployment orchestrator.
//!
//! Receives versioned-release deployment commands and drives the platform
//! through the calls that realize them: setup (next revision + retention
//! cleanup), deploy and rollback resizes, blue-green route updates,
//! resource discovery, instance sync, and plugin runs.
//!
//! # Components
//!
//! - **`executor`**: envelope validation, dispatch, response boundary
//! - **`setup`**, **`deploy`**, **`routes`**, **`discovery`**, **`plugin`**:
//!   one handler module per command family
//! - **`error`**: the executor error taxonomy

pub mod error;
pub mod executor;
pub mod plugin;

mod deploy;
mod discovery;
mod routes;
mod setup;

pub use error::{ExecutorError, ExecutorResult};
pub use executor::Executor;
pub use plugin::{PluginRunner, RecordingPluginRunner, ShellPluginRunner};
