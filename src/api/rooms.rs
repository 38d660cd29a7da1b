use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::client::{ApiClient, ApiError, segment};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummary {
    pub role_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_default_for_admin: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummaryList {
    #[serde(default)]
    pub roles: Vec<RoleSummary>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request body for room creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomForCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<i64>,
    pub transaction_side_id: String,
    pub field_data: FieldData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldData {
    pub data: Map<String, Value>,
}

/// Answer of room creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub room_id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /v2/accounts/{accountId}/roles`
pub async fn get_roles(client: &ApiClient, account_id: &str) -> Result<RoleSummaryList, ApiError> {
    let path = format!("/v2/accounts/{}/roles", segment(account_id));
    client.get_json(&path, &[]).await
}

/// `POST /v2/accounts/{accountId}/rooms`
pub async fn create_room(
    client: &ApiClient,
    account_id: &str,
    room: &RoomForCreate,
) -> Result<RoomSummary, ApiError> {
    let path = format!("/v2/accounts/{}/rooms", segment(account_id));
    client.post_json(&path, room).await
}
