//! Application settings.
//!
//! Built once at startup from the command line (see `main.rs`) and shared
//! read-only by every request handler.

use std::path::PathBuf;

use crate::consts::{
    DEFAULT_ADMIN_API_URL, DEFAULT_AUTH_SERVER, DEFAULT_GITHUB_EXAMPLE_URL, DEFAULT_ROOMS_API_URL,
};

/// Everything the launcher needs to talk to the identity provider and the APIs.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Public URL of this app, used to build the OAuth redirect URI.
    pub app_url: String,
    /// OAuth integration key.
    pub client_id: String,
    /// OAuth secret key.
    pub client_secret: String,
    /// Account server, e.g. `https://account-d.docusign.com`.
    pub auth_server: String,
    pub rooms_api_url: String,
    pub admin_api_url: String,
    /// Prefix for "view source" links.
    pub github_example_url: String,
    /// Prefix for documentation links. `None` hides them.
    pub documentation: Option<String>,
    /// Alternative example manifest. `None` uses the embedded one.
    pub manifest_path: Option<PathBuf>,
}

impl Settings {
    /// Redirect URI registered with the identity provider.
    pub fn redirect_uri(&self) -> String {
        format!("{}/ds/callback", self.app_url.trim_end_matches('/'))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_url: "http://localhost:3000".to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            auth_server: DEFAULT_AUTH_SERVER.to_string(),
            rooms_api_url: DEFAULT_ROOMS_API_URL.to_string(),
            admin_api_url: DEFAULT_ADMIN_API_URL.to_string(),
            github_example_url: DEFAULT_GITHUB_EXAMPLE_URL.to_string(),
            documentation: None,
            manifest_path: None,
        }
    }
}
