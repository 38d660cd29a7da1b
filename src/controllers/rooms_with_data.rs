use async_trait::async_trait;

use super::{Example, ExampleContext, ExampleError, FormInput};
use crate::manifest::ApiType;
use crate::render::FormField;
use crate::workers::rooms_with_data::{RoomWithDataArgs, create_room_with_data};

const ROOM_NAME: &str = "roomName";
const MAX_ROOM_NAME: usize = 100;

/// Rooms example 1: create a room pre-filled with data.
pub struct RoomWithDataExample;

#[async_trait]
impl Example for RoomWithDataExample {
    fn eg(&self) -> &'static str {
        "reg001"
    }

    fn number(&self) -> u32 {
        1
    }

    fn api(&self) -> ApiType {
        ApiType::Rooms
    }

    fn source_file(&self) -> &'static str {
        "rooms_with_data.rs"
    }

    fn fields(&self) -> Vec<FormField> {
        vec![FormField {
            name: ROOM_NAME,
            label: "Room name",
            required: true,
        }]
    }

    async fn run(
        &self,
        ctx: &mut ExampleContext<'_>,
        form: &FormInput,
    ) -> Result<String, ExampleError> {
        let args = RoomWithDataArgs {
            access_token: ctx.access_token()?,
            base_path: ctx.base_path(self.api())?,
            account_id: ctx.account_id()?,
            room_name: room_name(form)?,
        };
        let results = create_room_with_data(args).await?;
        Ok(serde_json::to_string(&results)?)
    }
}

fn room_name(form: &FormInput) -> Result<String, ExampleError> {
    let name = form.get(ROOM_NAME).map(|s| s.trim()).unwrap_or_default();
    if name.is_empty() {
        return Err(ExampleError::InvalidInput("room name is required".to_string()));
    }
    if name.chars().count() > MAX_ROOM_NAME {
        return Err(ExampleError::InvalidInput(format!(
            "room name must be at most {MAX_ROOM_NAME} characters"
        )));
    }
    Ok(name.to_string())
}
