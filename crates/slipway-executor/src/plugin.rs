//! Plugin execution inside a scratch working directory.
//!
//! The plugin mechanism itself (artifact download, manifest templating)
//! lives with the calling platform; slipway only provides the run seam
//! and guarantees the scratch directory is removed on every exit path.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

use slipway_core::{ResponsePayload, RunPluginPayload};
use slipway_platform::LogSink;

use crate::error::{ExecutorError, ExecutorResult};

pub trait PluginRunner: Send + Sync {
    fn run(&self, plugin: &str, args: &[String], workdir: &Path) -> io::Result<String>;
}

/// Runs the plugin as a child process with the scratch directory as its
/// working directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellPluginRunner;

impl PluginRunner for ShellPluginRunner {
    fn run(&self, plugin: &str, args: &[String], workdir: &Path) -> io::Result<String> {
        let output = Command::new(plugin).args(args).current_dir(workdir).output()?;
        if !output.status.success() {
            return Err(io::Error::other(format!(
                "{plugin} exited with {}",
                output.status
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Records invocations and returns canned output; used by tests and by
/// offline simulation, where running real plugins is off the table.
#[derive(Debug, Default)]
pub struct RecordingPluginRunner {
    runs: Mutex<Vec<(String, Vec<String>, PathBuf)>>,
    fail_with: Option<String>,
}

impl RecordingPluginRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            runs: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn runs(&self) -> Vec<(String, Vec<String>, PathBuf)> {
        self.runs.lock().unwrap().clone()
    }
}

impl PluginRunner for RecordingPluginRunner {
    fn run(&self, plugin: &str, args: &[String], workdir: &Path) -> io::Result<String> {
        self.runs
            .lock()
            .unwrap()
            .push((plugin.to_string(), args.to_vec(), workdir.to_path_buf()));
        match &self.fail_with {
            Some(message) => Err(io::Error::other(message.clone())),
            None => Ok(format!("{plugin} ok")),
        }
    }
}

pub(crate) fn run<P: PluginRunner>(
    runner: &P,
    log: &dyn LogSink,
    payload: &RunPluginPayload,
) -> ExecutorResult<(String, ResponsePayload)> {
    // Dropped on every exit path below, removing the directory.
    let scratch = tempfile::tempdir()?;
    log.append(&format!(
        "running plugin {} in {}",
        payload.plugin,
        scratch.path().display()
    ));
    let output = runner
        .run(&payload.plugin, &payload.args, scratch.path())
        .map_err(|e| ExecutorError::Plugin(e.to_string()))?;
    Ok((output, ResponsePayload::Empty))
}
