//! Server configuration, fixed for the lifetime of the process

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::mime::MimeTable;

pub const DEFAULT_PORT: u16 = 1420;
pub const DEFAULT_DOCUMENT: &str = "index.html";

/// How long to wait after killing a port's holder before binding again
pub const RECLAIM_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    pub addr: SocketAddr,
    /// Directory all request paths are joined to
    pub root: PathBuf,
    /// Served for `/` and for paths that do not resolve
    pub default_document: String,
    pub mime: MimeTable,
    pub reclaim_grace: Duration,
    /// Treat resolved paths outside `root` as missing
    pub confine_to_root: bool,
}

impl ServerConfig {
    /// Configuration serving `root` on all interfaces at [`DEFAULT_PORT`]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            root: root.into(),
            default_document: DEFAULT_DOCUMENT.to_string(),
            mime: MimeTable::with_defaults(),
            reclaim_grace: RECLAIM_GRACE,
            confine_to_root: false,
        }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Path of the default document beneath the root
    pub fn default_document_path(&self) -> PathBuf {
        self.root.join(&self.default_document)
    }
}
