use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::client::{ApiClient, ApiError, segment};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrganizationsResponse {
    #[serde(default)]
    pub organizations: Vec<Organization>,
}

/// A user as listed in an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationUser {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrganizationUsersResponse {
    #[serde(default)]
    pub users: Vec<OrganizationUser>,
}

/// Profile drill-down for one email address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfiles {
    #[serde(default)]
    pub users: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /v2/organizations`
pub async fn get_organizations(client: &ApiClient) -> Result<OrganizationsResponse, ApiError> {
    client.get_json("/v2/organizations", &[]).await
}

/// `GET /v2/organizations/{organizationId}/users`, filtered by account and
/// last modification date (`YYYY-MM-DD`).
pub async fn get_users(
    client: &ApiClient,
    organization_id: &str,
    account_id: &str,
    last_modified_since: &str,
) -> Result<OrganizationUsersResponse, ApiError> {
    let path = format!("/v2/organizations/{}/users", segment(organization_id));
    client
        .get_json(
            &path,
            &[
                ("account_id", account_id),
                ("last_modified_since", last_modified_since),
            ],
        )
        .await
}

/// `GET /v2.1/organizations/{organizationId}/users/dsprofile?email=...`
pub async fn get_user_profiles(
    client: &ApiClient,
    organization_id: &str,
    email: &str,
) -> Result<UserProfiles, ApiError> {
    let path = format!(
        "/v2.1/organizations/{}/users/dsprofile",
        segment(organization_id)
    );
    client.get_json(&path, &[("email", email)]).await
}
