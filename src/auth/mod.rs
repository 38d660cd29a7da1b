pub mod oauth;

use anyhow::{Context, Result, anyhow};
use tracing::info;

use crate::config::Settings;
use crate::session::{Account, SessionContext};

/// Start an authorization-code login. Stores the state and PKCE verifier in
/// the session and returns the URL to send the user to.
pub fn login_url(settings: &Settings, session: &mut SessionContext) -> String {
    let state = oauth::random_token();
    let (url, verifier) = oauth::build_authorize_url(settings, &state);
    session.begin_login(state, verifier);
    url
}

/// Finish a login from the OAuth callback.
///
/// Exchanges the code, looks up the user's default account and stores both
/// in the session. Returns the example that was waiting for re-authentication,
/// if any.
pub async fn complete_login(
    settings: &Settings,
    session: &mut SessionContext,
    code: &str,
    state: &str,
) -> Result<Option<String>> {
    let verifier = session
        .finish_login(state)
        .ok_or_else(|| anyhow!("OAuth state mismatch"))?;

    let credential = oauth::exchange_code(settings, code, &verifier)
        .await
        .context("token exchange failed")?;
    let user = oauth::fetch_user_info(settings, &credential.access_token)
        .await
        .context("failed to fetch user info")?;
    let default = user
        .default_account()
        .ok_or_else(|| anyhow!("user {} has no accounts", user.email))?;

    info!(account_id = %default.account_id, "logged in");
    let account = Account {
        account_id: default.account_id.clone(),
        account_name: default.account_name.clone(),
        base_path: default.base_uri.clone(),
        user_name: user.name.clone(),
    };
    session.set_credential(credential);
    session.set_account(account);

    Ok(session.take_pending_example())
}

/// Forget the credential and everything tied to the account.
pub fn logout(session: &mut SessionContext) {
    session.logout();
}
