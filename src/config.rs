//! Environment configuration
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `SCHOOLS_DATA_PATH` | JSON dataset in the source format | bundled sample |
//! | `PORT` | HTTP port of the API server | 5000 |
//! | `SCHOOLS_API_URL` | base URL of a remote engine | none |
//! | `SCHOOLS_USE_STATIC` | `true`/`1` forces the in-memory backend | false |

use crate::repository::SchoolRepository;
use anyhow::Result;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 5000;

/// Which façade implementation to build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Engine runs in-process over the configured (or bundled) dataset
    Static,
    /// Calls are forwarded to a remote engine at this base URL
    Remote(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub data_path: Option<PathBuf>,
    pub port: u16,
    pub remote_url: Option<String>,
    pub use_static: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_path: None,
            port: DEFAULT_PORT,
            remote_url: None,
            use_static: false,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key → value source; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            data_path: get("SCHOOLS_DATA_PATH").map(PathBuf::from),
            port: get("PORT")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(DEFAULT_PORT),
            remote_url: get("SCHOOLS_API_URL").map(|u| u.trim_end_matches('/').to_string()),
            use_static: get("SCHOOLS_USE_STATIC")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
                .unwrap_or(false),
        }
    }

    pub fn backend(&self) -> Backend {
        match (&self.remote_url, self.use_static) {
            (Some(url), false) => Backend::Remote(url.clone()),
            _ => Backend::Static,
        }
    }

    /// Load the configured dataset, or the bundled one when no path is set
    pub fn load_repository(&self) -> Result<SchoolRepository> {
        match &self.data_path {
            Some(path) => SchoolRepository::from_json_file(path),
            None => SchoolRepository::bundled(),
        }
    }
}
