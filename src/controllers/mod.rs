//! Form and submit controllers shared by every example.
//!
//! Examples implement the [`Example`] trait and are registered in an
//! [`ExampleRegistry`]. [`form_controller`] and [`submit_controller`] own the
//! common flow: credential freshness, prerequisite gating, one worker call,
//! and the success or error page. Each example only supplies its metadata
//! and [`Example::run`].

mod audit_users;
mod envelope_docs;
mod rooms_with_data;

pub use audit_users::AuditUsersExample;
pub use envelope_docs::{EnvelopeDocsExample, project_documents};
pub use rooms_with_data::RoomWithDataExample;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::ApiError;
use crate::config::Settings;
use crate::consts::{FORM_BUFFER_MIN, MUST_AUTHENTICATE, REAUTH_FLASH, SUBMIT_BUFFER_MIN};
use crate::manifest::{ApiType, ExampleInfo, Manifest};
use crate::render::{FormField, FormPage, Page, Prerequisite};
use crate::session::SessionContext;

/// Submitted form fields, CSRF token already checked and removed.
pub type FormInput = HashMap<String, String>;

/// Everything a controller may touch while handling one request.
pub struct ExampleContext<'a> {
    pub session: &'a mut SessionContext,
    pub settings: &'a Settings,
    pub manifest: &'a Manifest,
}

impl ExampleContext<'_> {
    pub fn access_token(&self) -> Result<String, ExampleError> {
        self.session
            .access_token()
            .map(str::to_string)
            .ok_or(ExampleError::Api(ApiError::Missing("access token")))
    }

    pub fn account_id(&self) -> Result<String, ExampleError> {
        self.session
            .account_id()
            .map(str::to_string)
            .ok_or(ExampleError::Api(ApiError::Missing("account")))
    }

    /// REST base for the given API, from the session account or the settings.
    pub fn base_path(&self, api: ApiType) -> Result<String, ExampleError> {
        match api {
            ApiType::ESignature => self
                .session
                .base_path()
                .map(|base| format!("{}/restapi", base.trim_end_matches('/')))
                .ok_or(ExampleError::Api(ApiError::Missing("account"))),
            ApiType::Rooms => Ok(self.settings.rooms_api_url.clone()),
            ApiType::Admin => Ok(self.settings.admin_api_url.clone()),
        }
    }
}

/// Why an example could not produce a result.
#[derive(Debug, Error)]
pub enum ExampleError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ExampleError {
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            ExampleError::Api(e) => Some(e),
            _ => None,
        }
    }

    /// The error page for this failure.
    pub fn to_page(&self) -> Page {
        Page::Error {
            err: self.to_string(),
            error_code: self
                .api()
                .and_then(ApiError::error_code)
                .map(str::to_string),
            error_message: self
                .api()
                .and_then(ApiError::error_message)
                .map(str::to_string),
        }
    }
}

/// What the HTTP layer should send back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Page(Page),
    Redirect(String),
}

/// One launcher example.
#[async_trait]
pub trait Example: Send + Sync {
    /// Route and resume identifier, e.g. `"eg006"`.
    fn eg(&self) -> &'static str;

    /// Number within its API group in the manifest.
    fn number(&self) -> u32;

    fn api(&self) -> ApiType;

    /// Worker source file shown on the form page.
    fn source_file(&self) -> &'static str;

    fn fields(&self) -> Vec<FormField> {
        Vec::new()
    }

    /// Session state the form needs from an earlier example.
    fn prerequisite(&self, _session: &SessionContext) -> Option<Prerequisite> {
        None
    }

    /// Build worker args, call the worker once, carry state forward, and
    /// return the serialized result.
    async fn run(
        &self,
        ctx: &mut ExampleContext<'_>,
        form: &FormInput,
    ) -> Result<String, ExampleError>;
}

/// Holds registered examples.
pub struct ExampleRegistry {
    examples: Vec<Arc<dyn Example>>,
}

impl ExampleRegistry {
    /// Create a registry with all built-in examples.
    pub fn new() -> Self {
        let examples: Vec<Arc<dyn Example>> = vec![
            Arc::new(EnvelopeDocsExample),
            Arc::new(RoomWithDataExample),
            Arc::new(AuditUsersExample),
        ];
        Self { examples }
    }

    pub fn get(&self, eg: &str) -> Option<Arc<dyn Example>> {
        self.examples.iter().find(|e| e.eg() == eg).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Example>> {
        self.examples.iter()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.examples.iter().map(|e| e.eg()).collect()
    }
}

impl Default for ExampleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Record the example for resumption and send the user to log in again.
fn require_authentication(example: &dyn Example, session: &mut SessionContext) -> Outcome {
    session.set_pending_example(example.eg());
    Outcome::Redirect(MUST_AUTHENTICATE.to_string())
}

fn example_info<'m>(example: &dyn Example, manifest: &'m Manifest) -> Result<&'m ExampleInfo, Page> {
    manifest
        .get_example_by_number(example.number(), example.api())
        .ok_or_else(|| Page::Error {
            err: format!(
                "example {} {} is missing from the manifest",
                example.api(),
                example.number()
            ),
            error_code: None,
            error_message: None,
        })
}

fn form_page(example: &dyn Example, info: &ExampleInfo, ctx: &mut ExampleContext<'_>) -> Page {
    let eg = example.eg();
    Page::Form(FormPage {
        eg: eg.to_string(),
        csrf_token: ctx.session.csrf_token(),
        title: info.example_name.clone(),
        page_title: info
            .page_title
            .clone()
            .unwrap_or_else(|| info.example_name.clone()),
        description: info.example_description.clone(),
        source_file: example.source_file().to_string(),
        source_url: format!("{}{}", ctx.settings.github_example_url, example.source_file()),
        documentation: ctx
            .settings
            .documentation
            .as_ref()
            .map(|doc| format!("{doc}{eg}")),
        fields: example.fields(),
        prerequisite: example.prerequisite(ctx.session),
        flash: ctx.session.take_flash(),
    })
}

/// GET handler body: long-buffer freshness check, then the form.
pub fn form_controller(example: &dyn Example, ctx: &mut ExampleContext<'_>) -> Outcome {
    if !ctx.session.check_token(FORM_BUFFER_MIN) {
        debug!(eg = example.eg(), "token needs refresh before showing form");
        return require_authentication(example, ctx.session);
    }

    match example_info(example, ctx.manifest) {
        Ok(info) => {
            let info = info.clone();
            Outcome::Page(form_page(example, &info, ctx))
        }
        Err(page) => Outcome::Page(page),
    }
}

/// POST handler body: short-buffer freshness check, one worker call, result page.
pub async fn submit_controller(
    example: &dyn Example,
    ctx: &mut ExampleContext<'_>,
    form: &FormInput,
) -> Outcome {
    if !ctx.session.check_token(SUBMIT_BUFFER_MIN) {
        debug!(eg = example.eg(), "token needs refresh before submit");
        ctx.session.flash(REAUTH_FLASH);
        return require_authentication(example, ctx.session);
    }

    let info = match example_info(example, ctx.manifest) {
        Ok(info) => info.clone(),
        Err(page) => return Outcome::Page(page),
    };

    if example
        .prerequisite(ctx.session)
        .is_some_and(|p| !p.satisfied)
    {
        return Outcome::Page(form_page(example, &info, ctx));
    }

    match example.run(ctx, form).await {
        Ok(json) => {
            info!(eg = example.eg(), "example completed");
            Outcome::Page(Page::ExampleDone {
                title: info.example_name,
                message: info.results_page_text,
                json,
            })
        }
        Err(e) => {
            warn!(eg = example.eg(), error = %e, "example failed");
            Outcome::Page(e.to_page())
        }
    }
}
