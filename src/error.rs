use std::io;
use std::net::SocketAddr;
use std::process::ExitStatus;

use thiserror::Error;

/// Fatal errors raised before the server starts accepting connections
#[derive(Error, Debug)]
pub enum StartupError {
    /// Binding failed for a reason other than the address being in use
    #[error("could not bind {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// The port was in use and its holder could not be terminated
    #[error("Could not kill process on port {port}. Please kill it manually.")]
    Reclaim {
        port: u16,
        #[source]
        source: ReclaimError,
    },

    /// The single bind retry after reclaiming the port failed
    #[error("could not bind {addr} after killing the process holding it")]
    Retry {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
}

/// Errors from discovering or terminating the process holding a port
#[derive(Error, Debug)]
pub enum ReclaimError {
    /// A required external command could not be run
    #[error("`{command}` is not available")]
    Unavailable {
        command: &'static str,
        #[source]
        source: io::Error,
    },

    /// Nothing is listening on the port
    #[error("no process found listening on port {port}")]
    NoHolder { port: u16 },

    /// `kill` ran but did not succeed
    #[error("kill -9 {pid} failed ({status})")]
    Kill { pid: u32, status: ExitStatus },
}
