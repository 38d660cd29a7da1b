use serde_json::{Map, Value, json};
use tracing::info;

use crate::api::rooms::{self, FieldData, RoleSummary, RoomForCreate, RoomSummary};
use crate::api::{ApiClient, ApiError};

#[derive(Debug, Clone)]
pub struct RoomWithDataArgs {
    pub access_token: String,
    /// Rooms REST base, e.g. `https://demo.rooms.docusign.com/restapi`.
    pub base_path: String,
    pub account_id: String,
    pub room_name: String,
}

/// Create a room pre-filled with listing data, owned by the default admin role.
pub async fn create_room_with_data(args: RoomWithDataArgs) -> Result<RoomSummary, ApiError> {
    let client = ApiClient::new(&args.base_path, &args.access_token);

    let roles = rooms::get_roles(&client, &args.account_id).await?;
    let role_id = default_admin_role(&roles.roles);

    let room = make_room_with_data(&args.room_name, role_id);
    let result = rooms::create_room(&client, &args.account_id, &room).await?;

    info!(room_id = result.room_id, "room with data created");
    Ok(result)
}

/// The role flagged as default for admins. If several are flagged the last wins.
pub fn default_admin_role(roles: &[RoleSummary]) -> Option<i64> {
    roles
        .iter()
        .rev()
        .find(|r| r.is_default_for_admin)
        .map(|r| r.role_id)
}

/// Room body with fixed listing data.
pub fn make_room_with_data(room_name: &str, role_id: Option<i64>) -> RoomForCreate {
    let data = json!({
        "address1": "123 EZ Street",
        "address2": "unit 10",
        "city": "Galaxian",
        "state": "US-HI",
        "postalCode": "11112",
        "companyRoomStatus": "5",
        "comments": "Lorem ipsum dolor sit amet, consectetur adipiscing elit, \
sed do eiusmod tempor incididunt ut labore et dolore magna aliqua. \
Ut enim ad minim veniam, quis nostrud exercitation ullamco laboris \
nisi ut aliquip ex ea commodo consequat. Duis aute irure dolor in \
reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla \
pariatur. Excepteur sint occaecat cupidatat non proident, sunt in \
culpa qui officia deserunt mollit anim id est laborum.",
    });
    let data: Map<String, Value> = match data {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    RoomForCreate {
        name: room_name.to_string(),
        role_id,
        transaction_side_id: "listbuy".to_string(),
        field_data: FieldData { data },
    }
}
