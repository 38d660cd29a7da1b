//! Project-wide constants.

use std::path::PathBuf;

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Minutes a credential must outlive "now" before a form is shown.
/// Long enough that the user can fill the form without the token expiring.
pub const FORM_BUFFER_MIN: u64 = 10;

/// Minutes a credential must outlive "now" on the submit path.
pub const SUBMIT_BUFFER_MIN: u64 = 3;

/// Route that asks the user to log in again.
pub const MUST_AUTHENTICATE: &str = "/ds/mustAuthenticate";

/// Flash shown when a submit had to be interrupted for re-authentication.
pub const REAUTH_FLASH: &str = "Sorry, you need to re-authenticate.";

/// Cookie that carries the session id.
pub const SESSION_COOKIE: &str = "scribe_session";

/// Sessions untouched for longer than this are swept.
pub const SESSION_TTL_HOURS: u64 = 24;

/// Form field every POST must echo back.
pub const CSRF_FIELD: &str = "csrf_token";

/// Default demo-environment endpoints.
pub const DEFAULT_AUTH_SERVER: &str = "https://account-d.docusign.com";
pub const DEFAULT_ROOMS_API_URL: &str = "https://demo.rooms.docusign.com/restapi";
pub const DEFAULT_ADMIN_API_URL: &str = "https://api-d.docusign.net/management";
pub const DEFAULT_GITHUB_EXAMPLE_URL: &str =
    "https://github.com/assapir/scribe/blob/main/src/workers/";

/// Default database path: `~/.scribe/scribe.db`.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".scribe")
        .join("scribe.db")
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
