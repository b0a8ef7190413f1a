//! Client settings.
//!
//! Every field has a default, so an empty document is a valid configuration.
//! The host can bundle a TOML file or pass the same keys as a JS object.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::upload::MAX_UPLOAD_BYTES;

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_REQUEST_TIMEOUT_MS: u32 = 20_000;

pub const SETTINGS_TEMPLATE: &str = r#"# ImageCropper client settings

# Backend origin (default: http://localhost:5000)
# api_base_url = "https://cropper.example.com"

# Blanket client-side request timeout in milliseconds (default: 20000)
# request_timeout_ms = 20000

# Largest accepted upload in bytes (default: 20 MiB)
# max_upload_bytes = 20971520

# OAuth client id for the identity provider button
# google_client_id = "1234.apps.googleusercontent.com"
"#;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid settings: {0}")]
    Parse(String),

    #[error("api_base_url must start with http:// or https://, got {0:?}")]
    InvalidBaseUrl(String),

    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub api_base_url: String,
    pub request_timeout_ms: u32,
    pub max_upload_bytes: usize,
    pub google_client_id: Option<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            google_client_id: None,
        }
    }
}

impl ApiSettings {
    /// Parse and validate settings from TOML.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let settings: ApiSettings =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validated()
    }

    /// Check invariants and normalize the base URL (no trailing slash).
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        let base = self.api_base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidBaseUrl(self.api_base_url));
        }
        self.api_base_url = base.trim_end_matches('/').to_string();

        if self.request_timeout_ms == 0 {
            return Err(ConfigError::ZeroLimit("request_timeout_ms"));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::ZeroLimit("max_upload_bytes"));
        }

        Ok(self)
    }

    /// Absolute URL of a backend path.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.api_base_url, path)
        } else {
            format!("{}/{}", self.api_base_url, path)
        }
    }
}
