//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Environment variable naming the handler used to build a default command.
pub const HANDLER_ENV: &str = "_HANDLER";

/// Object store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store address, e.g. `s3://bucket/objects`.
    pub address: String,
    /// AWS region. Falls back to the ambient AWS configuration if not set.
    pub region: Option<String>,
    /// Optional endpoint URL (for MinIO, etc.).
    pub endpoint: Option<String>,
    /// Force path-style URLs (`endpoint/bucket/key`). Required for MinIO.
    #[serde(default)]
    pub force_path_style: bool,
}

impl StoreConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            region: None,
            endpoint: None,
            force_path_style: false,
        }
    }

    /// Validate the configuration without touching the network.
    pub fn validate(&self) -> Result<StoreAddress, String> {
        StoreAddress::parse(&self.address)
    }
}

/// A parsed store address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreAddress {
    /// `s3://bucket/prefix`. Objects live at `prefix/<id>`, or `<id>` when
    /// the prefix is empty.
    S3 {
        bucket: String,
        prefix: Option<String>,
    },
}

impl StoreAddress {
    /// Parse `scheme://host/path`. Only the `s3` scheme is recognized; the
    /// host names the bucket and the path is the key prefix. Userinfo, query
    /// and fragment are ignored.
    pub fn parse(address: &str) -> Result<Self, String> {
        let url = Url::parse(address).map_err(|e| format!("parsing store {address:?}: {e}"))?;

        match url.scheme() {
            "s3" => {
                let bucket = url
                    .host_str()
                    .filter(|host| !host.is_empty())
                    .ok_or_else(|| format!("store address {address:?}: missing bucket"))?;
                let prefix = url.path().trim_matches('/');
                Ok(StoreAddress::S3 {
                    bucket: bucket.to_string(),
                    prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
                })
            }
            other => Err(format!(
                "store address {address:?}: unsupported scheme {other:?}"
            )),
        }
    }
}

/// Runtime configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub store: StoreConfig,
    /// Parent directory for per-invocation scratch directories.
    /// Defaults to the OS temp directory.
    pub scratch_dir: Option<PathBuf>,
    /// Handler program name. Empty means no handler.
    #[serde(default)]
    pub handler: Option<String>,
}

impl RuntimeConfig {
    /// The configured handler, if any. Empty strings count as unset.
    pub fn handler(&self) -> Option<&str> {
        self.handler.as_deref().filter(|h| !h.is_empty())
    }

    /// Fill the handler from the process environment when not configured.
    pub fn with_handler_from_env(mut self) -> Self {
        if self.handler().is_none() {
            self.handler = std::env::var(HANDLER_ENV).ok().filter(|h| !h.is_empty());
        }
        self
    }
}
