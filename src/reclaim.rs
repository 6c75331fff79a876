//! Freeing a port held by a stale process
//!
//! The server only needs one thing from the outside world here: given a port,
//! terminate whatever is listening on it and report whether that worked.
//! [`PortReclaimer`] is that contract; [`LsofReclaimer`] implements it with
//! `lsof` and `kill`.

use std::future::Future;

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::ReclaimError;

/// Terminates the process holding a TCP port
pub trait PortReclaimer {
    /// Best-effort kill of every process listening on `port`
    fn reclaim(&self, port: u16) -> impl Future<Output = Result<(), ReclaimError>> + Send;
}

/// Finds listeners with `lsof` and sends them `SIGKILL` with `kill -9`
#[derive(Debug, Default, Clone, Copy)]
pub struct LsofReclaimer;

impl PortReclaimer for LsofReclaimer {
    async fn reclaim(&self, port: u16) -> Result<(), ReclaimError> {
        let output = Command::new("lsof")
            .arg("-t")
            .arg(format!("-iTCP:{port}"))
            .arg("-sTCP:LISTEN")
            .output()
            .await
            .map_err(|source| ReclaimError::Unavailable {
                command: "lsof",
                source,
            })?;

        let pids = parse_pids(&String::from_utf8_lossy(&output.stdout));
        if pids.is_empty() {
            return Err(ReclaimError::NoHolder { port });
        }

        for pid in pids {
            debug!(pid, port, "sending SIGKILL to port holder");
            let status = Command::new("kill")
                .arg("-9")
                .arg(pid.to_string())
                .status()
                .await
                .map_err(|source| ReclaimError::Unavailable {
                    command: "kill",
                    source,
                })?;
            if !status.success() {
                return Err(ReclaimError::Kill { pid, status });
            }
            info!(pid, port, "killed process holding port");
        }
        Ok(())
    }
}

/// Parse `lsof -t` output: one PID per line, duplicates dropped, our own PID skipped
fn parse_pids(stdout: &str) -> Vec<u32> {
    let own = std::process::id();
    let mut pids: Vec<u32> = stdout
        .lines()
        .filter_map(|line| line.trim().parse().ok())
        .filter(|pid| *pid != own)
        .collect();
    pids.sort_unstable();
    pids.dedup();
    pids
}
