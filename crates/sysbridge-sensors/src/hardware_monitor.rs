//! External hardware-monitor process.
//!
//! The monitor is an executable that prints a JSON hardware tree on stdout
//! and exits. Any failure here means "hardware tree unavailable" for the
//! cycle; it is never fatal to the aggregator.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::model::{HardwareNode, HardwareTree};
use crate::{Error, Result};

/// Runner for the external hardware monitor.
#[derive(Debug, Clone)]
pub struct HardwareMonitor {
    path: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl HardwareMonitor {
    /// Creates a runner for the executable at `path`.
    pub fn new<P: AsRef<Path>>(path: P, timeout: Duration) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            args: Vec::new(),
            timeout,
        }
    }

    /// Sets the arguments passed to the executable.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Returns the executable path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Runs the monitor and decodes its output.
    pub async fn read(&self) -> Result<HardwareTree> {
        if !self.path.exists() {
            return Err(Error::HardwareMonitorNotFound(
                self.path.display().to_string(),
            ));
        }

        debug!("Hardware monitor path: {}", self.path.display());
        let child = Command::new(&self.path)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Dropping the future on timeout drops the child, which kills it.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| Error::HardwareMonitorTimeout(self.timeout))??;

        if !output.status.success() {
            return Err(Error::HardwareMonitorExit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        debug!("Hardware monitor returned {} bytes", output.stdout.len());
        HardwareTree::from_slice(&output.stdout)
    }

    /// Runs the monitor, mapping every failure to `None`.
    pub async fn read_tree(&self) -> Option<Vec<HardwareNode>> {
        match self.read().await {
            Ok(tree) => {
                let nodes = tree.into_nodes();
                if nodes.is_none() {
                    warn!("Hardware monitor output has no hardware list");
                }
                nodes
            }
            Err(e) => {
                warn!("Hardware monitor unavailable: {}", e);
                None
            }
        }
    }
}
