//! Extension to content-type lookup

use std::collections::HashMap;
use std::path::Path;

use axum::http::HeaderValue;
use axum::http::header::InvalidHeaderValue;

/// Served for unknown or missing extensions
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Served for the default-document fallback
pub const HTML: &str = "text/html";

const DEFAULTS: &[(&str, &str)] = &[
    ("html", "text/html"),
    ("js", "text/javascript"),
    ("css", "text/css"),
    ("json", "application/json"),
    ("png", "image/png"),
    ("jpg", "image/jpg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("ico", "image/x-icon"),
];

/// Maps lower-cased file extensions (no leading dot) to content types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MimeTable {
    types: HashMap<String, HeaderValue>,
}

impl Default for MimeTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl MimeTable {
    /// An empty table; every lookup yields [`OCTET_STREAM`]
    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// The table a dev front-end usually needs: html, js, css, json and common images
    pub fn with_defaults() -> Self {
        let mut table = Self::empty();
        for (ext, content_type) in DEFAULTS {
            table
                .types
                .insert((*ext).to_string(), HeaderValue::from_static(*content_type));
        }
        table
    }

    /// Add or replace the content type for `ext`.
    ///
    /// A leading dot is stripped and the extension is lower-cased, so `".PNG"`
    /// and `"png"` name the same entry.
    pub fn insert(&mut self, ext: &str, content_type: &str) -> Result<(), InvalidHeaderValue> {
        let value = HeaderValue::from_str(content_type)?;
        self.types.insert(normalize(ext), value);
        Ok(())
    }

    /// Content type registered for `ext`, if any
    pub fn get(&self, ext: &str) -> Option<&HeaderValue> {
        self.types.get(&normalize(ext))
    }

    /// Content type for a file path, falling back to [`OCTET_STREAM`]
    pub fn for_path(&self, path: &Path) -> HeaderValue {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| self.get(ext))
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(OCTET_STREAM))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

fn normalize(ext: &str) -> String {
    ext.trim_start_matches('.').to_ascii_lowercase()
}
