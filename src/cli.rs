use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use devserve::ServerConfig;
use devserve::config::{DEFAULT_DOCUMENT, DEFAULT_PORT};

/// Serve a directory of front-end assets for local development.
///
/// Unknown paths fall back to the default document, so client-side routes
/// load the app. If the port is taken, the process holding it is killed once.
#[derive(Parser, Debug)]
#[command(name = "devserve")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, env = "DEVSERVE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Address to bind
    #[arg(long, env = "DEVSERVE_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Directory to serve files from
    #[arg(short, long, env = "DEVSERVE_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Document served for `/` and for paths that do not exist
    #[arg(short, long, env = "DEVSERVE_DEFAULT_DOC", default_value = DEFAULT_DOCUMENT)]
    pub default_document: String,

    /// Extra content type mapping, e.g. `wasm=application/wasm` (repeatable)
    #[arg(long = "mime-type", value_name = "EXT=TYPE", value_parser = parse_mime_type)]
    pub mime_types: Vec<(String, String)>,

    /// Treat paths that resolve outside the root as missing
    #[arg(long, env = "DEVSERVE_CONFINE")]
    pub confine_to_root: bool,
}

impl Args {
    /// Build the server configuration, resolving the root to an absolute path
    pub fn into_config(self) -> anyhow::Result<ServerConfig> {
        let root = std::fs::canonicalize(&self.root)
            .with_context(|| format!("root directory {} is not accessible", self.root.display()))?;
        anyhow::ensure!(root.is_dir(), "root {} is not a directory", root.display());

        let mut config = ServerConfig::new(root);
        config.addr = SocketAddr::new(self.host, self.port);
        config.default_document = self.default_document;
        config.confine_to_root = self.confine_to_root;
        for (ext, content_type) in &self.mime_types {
            config
                .mime
                .insert(ext, content_type)
                .with_context(|| format!("invalid content type for .{ext}: {content_type:?}"))?;
        }
        Ok(config)
    }
}

fn parse_mime_type(s: &str) -> Result<(String, String), String> {
    let (ext, content_type) = s
        .split_once('=')
        .ok_or_else(|| format!("expected EXT=TYPE, got `{s}`"))?;
    let ext = ext.trim().trim_start_matches('.');
    let content_type = content_type.trim();
    if ext.is_empty() || content_type.is_empty() {
        return Err(format!("expected EXT=TYPE, got `{s}`"));
    }
    Ok((ext.to_string(), content_type.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_with_defaults() {
        let args = Args::try_parse_from(["devserve"]).unwrap();
        assert_eq!(args.port, 1420);
        assert!(args.host.is_unspecified());
        assert_eq!(args.root, PathBuf::from("."));
        assert_eq!(args.default_document, "index.html");
        assert!(args.mime_types.is_empty());
        assert!(!args.confine_to_root);
    }

    #[test]
    fn cli_parses_overrides() {
        let args = Args::try_parse_from([
            "devserve",
            "--port",
            "8080",
            "--host",
            "127.0.0.1",
            "--root",
            "ui",
            "--default-document",
            "app.html",
            "--mime-type",
            ".wasm=application/wasm",
            "--mime-type",
            "map=application/json",
            "--confine-to-root",
        ])
        .unwrap();
        assert_eq!(args.port, 8080);
        assert_eq!(args.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(args.root, PathBuf::from("ui"));
        assert_eq!(args.default_document, "app.html");
        assert_eq!(
            args.mime_types,
            vec![
                ("wasm".to_string(), "application/wasm".to_string()),
                ("map".to_string(), "application/json".to_string()),
            ]
        );
        assert!(args.confine_to_root);
    }

    #[test]
    fn cli_rejects_malformed_mime_type() {
        assert!(Args::try_parse_from(["devserve", "--mime-type", "wasm"]).is_err());
        assert!(Args::try_parse_from(["devserve", "--mime-type", "=text/plain"]).is_err());
    }

    #[test]
    fn into_config_makes_root_absolute() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args::try_parse_from([
            "devserve",
            "--port",
            "0",
            "--root",
            dir.path().to_str().unwrap(),
            "--mime-type",
            "wasm=application/wasm",
        ])
        .unwrap();

        let config = args.into_config().unwrap();
        assert!(config.root.is_absolute());
        assert_eq!(config.root, std::fs::canonicalize(dir.path()).unwrap());
        assert_eq!(config.port(), 0);
        assert_eq!(config.mime.get("wasm").unwrap(), "application/wasm");
    }

    #[test]
    fn into_config_rejects_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let args =
            Args::try_parse_from(["devserve", "--root", missing.to_str().unwrap()]).unwrap();
        assert!(args.into_config().is_err());
    }
}
