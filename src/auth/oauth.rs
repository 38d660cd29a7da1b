use anyhow::{Context, Result, bail};
use base64::{
    Engine,
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
};
use rand::RngExt;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::Settings;
use crate::consts::now_ms;

const SCOPES: &str = "signature room_forms dtr.rooms.read dtr.rooms.write dtr.documents.read \
dtr.documents.write dtr.profile.read dtr.profile.write dtr.company.read dtr.company.write \
organization_read user_read";

/// Access token held in the session after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Expiration timestamp in milliseconds since epoch.
    pub expires: u64,
}

impl Credential {
    /// True when the token stays valid for more than `buffer_min` minutes.
    pub fn check_token(&self, buffer_min: u64) -> bool {
        self.check_token_at(now_ms(), buffer_min)
    }

    /// [`check_token`](Self::check_token) against an explicit clock.
    pub fn check_token_at(&self, now_ms: u64, buffer_min: u64) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        let deadline = now_ms.saturating_add(buffer_min.saturating_mul(60_000));
        self.expires > deadline
    }
}

/// PKCE verifier and challenge pair.
struct Pkce {
    verifier: String,
    challenge: String,
}

/// Generate a PKCE code verifier and S256 challenge.
fn generate_pkce() -> Pkce {
    let verifier = random_token();
    let hash = Sha256::digest(verifier.as_bytes());
    let challenge = URL_SAFE_NO_PAD.encode(hash);

    Pkce {
        verifier,
        challenge,
    }
}

/// 32 random bytes, URL-safe base64. Used for OAuth state, PKCE and CSRF.
pub fn random_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Check that a verifier hashes to the given S256 challenge.
pub fn verify_pkce(verifier: &str, challenge: &str) -> bool {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes())) == challenge
}

/// Build the authorization URL for the user to visit.
/// Returns (url, pkce_verifier); the caller keeps the verifier for the token exchange.
pub fn build_authorize_url(settings: &Settings, state: &str) -> (String, String) {
    let pkce = generate_pkce();
    let redirect_uri = settings.redirect_uri();

    let params = [
        ("response_type", "code"),
        ("scope", SCOPES),
        ("client_id", settings.client_id.as_str()),
        ("redirect_uri", redirect_uri.as_str()),
        ("state", state),
        ("code_challenge", &pkce.challenge),
        ("code_challenge_method", "S256"),
    ];

    let url = format!(
        "{}/oauth/auth?{}",
        settings.auth_server.trim_end_matches('/'),
        encode_pairs(&params)
    );
    (url, pkce.verifier)
}

/// Exchange an authorization code for a [`Credential`].
pub async fn exchange_code(settings: &Settings, code: &str, verifier: &str) -> Result<Credential> {
    let body = encode_pairs(&[
        ("grant_type", "authorization_code"),
        ("code", code),
        ("code_verifier", verifier),
    ]);
    let basic = STANDARD.encode(format!("{}:{}", settings.client_id, settings.client_secret));

    let client = reqwest::Client::new();
    let resp = client
        .post(format!(
            "{}/oauth/token",
            settings.auth_server.trim_end_matches('/')
        ))
        .header("authorization", format!("Basic {basic}"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(body)
        .send()
        .await
        .context("token request failed")?;

    if !resp.status().is_success() {
        let text = resp.text().await.unwrap_or_default();
        bail!("token exchange failed: {}", text);
    }

    let data: TokenResponse = resp.json().await?;

    Ok(Credential {
        access_token: data.access_token,
        refresh_token: data.refresh_token,
        expires: now_ms().saturating_add(data.expires_in.saturating_mul(1000)),
    })
}

/// Identity of the logged-in user and the accounts they can act on.
#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub accounts: Vec<AccountInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    pub account_id: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub account_name: String,
    pub base_uri: String,
}

impl UserInfo {
    /// The default account, or the first one when none is flagged.
    pub fn default_account(&self) -> Option<&AccountInfo> {
        self.accounts
            .iter()
            .find(|a| a.is_default)
            .or_else(|| self.accounts.first())
    }
}

/// Fetch the user's identity and account list.
pub async fn fetch_user_info(settings: &Settings, access_token: &str) -> Result<UserInfo> {
    let client = reqwest::Client::new();
    let resp = client
        .get(format!(
            "{}/oauth/userinfo",
            settings.auth_server.trim_end_matches('/')
        ))
        .header("authorization", format!("Bearer {access_token}"))
        .send()
        .await
        .context("userinfo request failed")?;

    if !resp.status().is_success() {
        let text = resp.text().await.unwrap_or_default();
        bail!("userinfo request failed: {}", text);
    }

    Ok(resp.json().await?)
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: u64,
}

fn encode_pairs(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoded(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Minimal URL encoding for query and form parameters.
pub fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            _ => {
                out.push_str(&format!("%{:02X}", b));
            }
        }
    }
    out
}
