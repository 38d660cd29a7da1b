use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use super::{Example, ExampleContext, ExampleError, FormInput};
use crate::manifest::ApiType;
use crate::workers::audit_users::{
    AuditUsersArgs, audit_users, audit_window_start, get_organization_id,
};

/// Admin example 5: audit recently modified users.
pub struct AuditUsersExample;

#[async_trait]
impl Example for AuditUsersExample {
    fn eg(&self) -> &'static str {
        "aeg005"
    }

    fn number(&self) -> u32 {
        5
    }

    fn api(&self) -> ApiType {
        ApiType::Admin
    }

    fn source_file(&self) -> &'static str {
        "audit_users.rs"
    }

    async fn run(
        &self,
        ctx: &mut ExampleContext<'_>,
        _form: &FormInput,
    ) -> Result<String, ExampleError> {
        let access_token = ctx.access_token()?;
        let base_path = ctx.base_path(self.api())?;

        let organization_id = match ctx.session.organization_id() {
            Some(id) => id.to_string(),
            None => {
                let id = get_organization_id(&access_token, &base_path).await?;
                debug!(organization_id = %id, "resolved organization");
                ctx.session.set_organization_id(id.clone());
                id
            }
        };

        let args = AuditUsersArgs {
            access_token,
            base_path,
            account_id: ctx.account_id()?,
            organization_id,
            last_modified_since: audit_window_start(Utc::now().date_naive()),
        };
        let results = audit_users(args).await?;

        // Apostrophes are stripped for display.
        Ok(serde_json::to_string(&results)?.replace('\'', ""))
    }
}
