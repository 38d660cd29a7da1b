//! Per-user state carried across requests.
//!
//! A [`SessionContext`] is loaded from a [`SessionStore`] at the start of a
//! request, handed by `&mut` through the controller chain, and saved back at
//! the end. Nothing else holds session state.

pub mod memory;
pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::auth::oauth::{Credential, random_token};

/// One entry of an envelope's document list, as kept for later examples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentItem {
    pub document_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: String,
}

/// Envelope documents carried forward after the list-documents example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeDocuments {
    pub envelope_id: String,
    pub documents: Vec<DocumentItem>,
}

/// Account identity established at login.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_id: String,
    pub account_name: String,
    /// Account base URI, without the `/restapi` suffix.
    pub base_path: String,
    pub user_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionContext {
    credential: Option<Credential>,
    account: Option<Account>,
    organization_id: Option<String>,
    envelope_id: Option<String>,
    envelope_documents: Option<EnvelopeDocuments>,
    pending_example: Option<String>,
    flash: Option<String>,
    csrf_token: Option<String>,
    oauth_state: Option<String>,
    pkce_verifier: Option<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the session holds nothing worth persisting.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    // --- Credential ---

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn access_token(&self) -> Option<&str> {
        self.credential.as_ref().map(|c| c.access_token.as_str())
    }

    /// Freshness check; a missing credential is never fresh.
    pub fn check_token(&self, buffer_min: u64) -> bool {
        self.credential
            .as_ref()
            .is_some_and(|c| c.check_token(buffer_min))
    }

    pub fn set_credential(&mut self, credential: Credential) {
        self.credential = Some(credential);
    }

    // --- Account ---

    pub fn account(&self) -> Option<&Account> {
        self.account.as_ref()
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account.as_ref().map(|a| a.account_id.as_str())
    }

    pub fn base_path(&self) -> Option<&str> {
        self.account.as_ref().map(|a| a.base_path.as_str())
    }

    /// Replace the account. Identifiers tied to the previous account are dropped.
    pub fn set_account(&mut self, account: Account) {
        if self.account_id() != Some(account.account_id.as_str()) {
            self.organization_id = None;
            self.envelope_id = None;
            self.envelope_documents = None;
        }
        self.account = Some(account);
    }

    pub fn organization_id(&self) -> Option<&str> {
        self.organization_id.as_deref()
    }

    pub fn set_organization_id(&mut self, organization_id: impl Into<String>) {
        self.organization_id = Some(organization_id.into());
    }

    /// Forget everything tied to the logged-in user.
    pub fn logout(&mut self) {
        self.credential = None;
        self.account = None;
        self.organization_id = None;
        self.envelope_id = None;
        self.envelope_documents = None;
        self.pending_example = None;
    }

    // --- Carried-forward example state ---

    pub fn envelope_id(&self) -> Option<&str> {
        self.envelope_id.as_deref()
    }

    pub fn set_envelope_id(&mut self, envelope_id: impl Into<String>) {
        self.envelope_id = Some(envelope_id.into());
    }

    pub fn envelope_documents(&self) -> Option<&EnvelopeDocuments> {
        self.envelope_documents.as_ref()
    }

    pub fn set_envelope_documents(&mut self, documents: EnvelopeDocuments) {
        self.envelope_documents = Some(documents);
    }

    // --- Pending operation ---

    /// Remember which example to resume after re-authentication.
    pub fn set_pending_example(&mut self, eg: impl Into<String>) {
        self.pending_example = Some(eg.into());
    }

    pub fn pending_example(&self) -> Option<&str> {
        self.pending_example.as_deref()
    }

    pub fn take_pending_example(&mut self) -> Option<String> {
        self.pending_example.take()
    }

    // --- Flash ---

    pub fn flash(&mut self, message: impl Into<String>) {
        self.flash = Some(message.into());
    }

    pub fn take_flash(&mut self) -> Option<String> {
        self.flash.take()
    }

    // --- CSRF ---

    /// The session's CSRF token, minted on first use.
    pub fn csrf_token(&mut self) -> String {
        self.csrf_token.get_or_insert_with(random_token).clone()
    }

    pub fn verify_csrf(&self, token: &str) -> bool {
        self.csrf_token
            .as_deref()
            .is_some_and(|expected| !token.is_empty() && expected == token)
    }

    // --- OAuth handshake ---

    pub fn begin_login(&mut self, state: String, verifier: String) {
        self.oauth_state = Some(state);
        self.pkce_verifier = Some(verifier);
    }

    /// Consume the handshake. Returns the PKCE verifier when `state` matches.
    pub fn finish_login(&mut self, state: &str) -> Option<String> {
        let expected = self.oauth_state.take()?;
        let verifier = self.pkce_verifier.take()?;
        (expected == state).then_some(verifier)
    }
}

/// Where sessions live between requests.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, id: &str) -> Result<Option<SessionContext>>;
    async fn save(&self, id: &str, session: &SessionContext) -> Result<()>;
    async fn remove(&self, id: &str) -> Result<()>;
}
