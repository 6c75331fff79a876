//! Request path resolution and the file handler

use std::borrow::Cow;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use tracing::{debug, warn};

use crate::config::ServerConfig;
use crate::mime;

/// Map a request path onto the filesystem.
///
/// `/` maps to the default document. Anything else is percent-decoded and
/// joined to the root with `.` and `..` folded lexically, which can climb out
/// of the root. Returns `None` only when `confine_to_root` is set and the
/// joined path has left the root.
pub fn resolve(config: &ServerConfig, request_path: &str) -> Option<PathBuf> {
    if request_path == "/" {
        return Some(config.default_document_path());
    }

    let decoded = percent_decode_str(request_path)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(request_path));

    let mut path = config.root.clone();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                path.pop();
            }
            segment => path.push(segment),
        }
    }

    if config.confine_to_root && !path.starts_with(&config.root) {
        return None;
    }
    Some(path)
}

/// Axum fallback handler serving every method and path from the root
pub async fn serve_file(State(config): State<Arc<ServerConfig>>, uri: Uri) -> Response {
    let Some(path) = resolve(&config, uri.path()) else {
        debug!(path = uri.path(), "request escapes root, serving default document");
        return serve_default_document(&config).await;
    };

    match tokio::fs::read(&path).await {
        Ok(body) => ok(config.mime.for_path(&path), body),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "not found, serving default document");
            serve_default_document(&config).await
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read file");
            server_error(&err)
        }
    }
}

async fn serve_default_document(config: &ServerConfig) -> Response {
    let path = config.default_document_path();
    match tokio::fs::read(&path).await {
        Ok(body) => ok(HeaderValue::from_static(mime::HTML), body),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read default document");
            server_error(&err)
        }
    }
}

fn ok(content_type: HeaderValue, body: Vec<u8>) -> Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], body).into_response()
}

fn server_error(err: &io::Error) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Server Error: {}", error_code(err)),
    )
        .into_response()
}

/// Short POSIX-style name for an I/O failure, e.g. `ENOENT`
pub fn error_code(err: &io::Error) -> Cow<'static, str> {
    if let Some(name) = err.raw_os_error().and_then(errno_name) {
        return Cow::Borrowed(name);
    }

    let name = match err.kind() {
        io::ErrorKind::NotFound => "ENOENT",
        io::ErrorKind::PermissionDenied => "EACCES",
        io::ErrorKind::IsADirectory => "EISDIR",
        io::ErrorKind::NotADirectory => "ENOTDIR",
        io::ErrorKind::InvalidInput => "EINVAL",
        kind => {
            return match err.raw_os_error() {
                Some(code) => Cow::Owned(format!("E{code}")),
                None => Cow::Owned(format!("{kind:?}")),
            };
        }
    };
    Cow::Borrowed(name)
}

/// Errno values below 28 are numbered the same on Linux and the BSDs
#[cfg(unix)]
fn errno_name(code: i32) -> Option<&'static str> {
    let name = match code {
        1 => "EPERM",
        2 => "ENOENT",
        4 => "EINTR",
        5 => "EIO",
        6 => "ENXIO",
        12 => "ENOMEM",
        13 => "EACCES",
        16 => "EBUSY",
        20 => "ENOTDIR",
        21 => "EISDIR",
        22 => "EINVAL",
        23 => "ENFILE",
        24 => "EMFILE",
        27 => "EFBIG",
        _ => return None,
    };
    Some(name)
}

#[cfg(not(unix))]
fn errno_name(_code: i32) -> Option<&'static str> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig::new("/srv/ui")
    }

    #[test]
    fn root_resolves_to_default_document() {
        assert_eq!(
            resolve(&config(), "/").unwrap(),
            PathBuf::from("/srv/ui/index.html")
        );
    }

    #[test]
    fn nested_paths_join_to_root() {
        assert_eq!(
            resolve(&config(), "/assets/app.js").unwrap(),
            PathBuf::from("/srv/ui/assets/app.js")
        );
        assert_eq!(
            resolve(&config(), "//assets/./app.js").unwrap(),
            PathBuf::from("/srv/ui/assets/app.js")
        );
    }

    #[test]
    fn paths_are_percent_decoded() {
        assert_eq!(
            resolve(&config(), "/my%20notes.txt").unwrap(),
            PathBuf::from("/srv/ui/my notes.txt")
        );
        // invalid UTF-8 after decoding keeps the raw path
        assert_eq!(
            resolve(&config(), "/%FF.bin").unwrap(),
            PathBuf::from("/srv/ui/%FF.bin")
        );
    }

    #[test]
    fn dot_dot_climbs_out_of_root_unless_confined() {
        let mut config = config();
        assert_eq!(
            resolve(&config, "/../../etc/passwd").unwrap(),
            PathBuf::from("/etc/passwd")
        );
        assert_eq!(
            resolve(&config, "/a/../b.css").unwrap(),
            PathBuf::from("/srv/ui/b.css")
        );

        config.confine_to_root = true;
        assert!(resolve(&config, "/../../etc/passwd").is_none());
        assert!(resolve(&config, "/%2e%2e/secret").is_none());
        assert_eq!(
            resolve(&config, "/a/../b.css").unwrap(),
            PathBuf::from("/srv/ui/b.css")
        );
    }

    #[test]
    fn error_codes_use_errno_names() {
        let not_found = io::Error::from(io::ErrorKind::NotFound);
        assert_eq!(error_code(&not_found), "ENOENT");

        let denied = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(error_code(&denied), "EACCES");

        assert_eq!(error_code(&io::Error::other("boom")), "Other");
    }

    #[cfg(unix)]
    #[test]
    fn os_errors_map_to_their_errno_name() {
        assert_eq!(error_code(&io::Error::from_raw_os_error(5)), "EIO");
        assert_eq!(error_code(&io::Error::from_raw_os_error(1)), "EPERM");
        assert_eq!(error_code(&io::Error::from_raw_os_error(21)), "EISDIR");
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn unnamed_os_errors_fall_back_to_the_number() {
        // ENOLINK has no ErrorKind of its own
        assert_eq!(error_code(&io::Error::from_raw_os_error(67)), "E67");
    }
}
