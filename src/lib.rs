//! devserve - a local static file server for front-end development assets.
//!
//! Files are served from a fixed root directory. Paths that do not resolve fall
//! back to a default document so client-side routed apps work, and a port held
//! by a stale process is reclaimed once before giving up.

pub mod config;
pub mod error;
pub mod files;
pub mod mime;
pub mod reclaim;
pub mod server;

pub use config::ServerConfig;
pub use error::{ReclaimError, StartupError};
pub use reclaim::{LsofReclaimer, PortReclaimer};
pub use server::{Server, shutdown_signal};
