use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::api::admin::{self, UserProfiles};
use crate::api::{ApiClient, ApiError};

/// How far back the audit looks for modified users.
pub const AUDIT_WINDOW_DAYS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AuditUsersArgs {
    pub access_token: String,
    /// Admin REST base, e.g. `https://api-d.docusign.net/management`.
    pub base_path: String,
    pub account_id: String,
    pub organization_id: String,
    pub last_modified_since: NaiveDate,
}

/// Start of the audit window ending on `today`.
pub fn audit_window_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_days(Days::new(AUDIT_WINDOW_DAYS))
        .unwrap_or(today)
}

/// Profiles of every account user modified since `last_modified_since`.
pub async fn audit_users(args: AuditUsersArgs) -> Result<Vec<UserProfiles>, ApiError> {
    let client = ApiClient::new(&args.base_path, &args.access_token);
    let since = args.last_modified_since.format("%Y-%m-%d").to_string();

    let modified = admin::get_users(&client, &args.organization_id, &args.account_id, &since).await?;
    debug!(count = modified.users.len(), %since, "modified users");

    let mut profiles = Vec::with_capacity(modified.users.len());
    for email in modified.users.iter().filter_map(|u| u.email.as_deref()) {
        profiles.push(admin::get_user_profiles(&client, &args.organization_id, email).await?);
    }
    Ok(profiles)
}

/// First organization the user belongs to.
pub async fn get_organization_id(access_token: &str, base_path: &str) -> Result<String, ApiError> {
    let client = ApiClient::new(base_path, access_token);
    let orgs = admin::get_organizations(&client).await?;
    orgs.organizations
        .into_iter()
        .next()
        .map(|o| o.id)
        .ok_or(ApiError::Missing("organization"))
}
