//! HTTP surface.
//!
//! Every handler loads the caller's [`SessionContext`], hands it to the
//! controllers by `&mut`, and saves it back before answering. New sessions
//! get a cookie on the way out once they hold some state.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Form, Path, Query, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::auth;
use crate::auth::oauth::random_token;
use crate::config::Settings;
use crate::consts::{CSRF_FIELD, SESSION_COOKIE};
use crate::controllers::{
    ExampleContext, ExampleRegistry, Outcome, form_controller, submit_controller,
};
use crate::manifest::Manifest;
use crate::render::{IndexEntry, Page, render};
use crate::session::{SessionContext, SessionStore};

/// Shared, read-only application state plus the session store.
pub struct AppState {
    pub settings: Settings,
    pub manifest: Manifest,
    pub examples: ExampleRegistry,
    pub sessions: Arc<dyn SessionStore>,
}

pub type SharedState = Arc<AppState>;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/ds/mustAuthenticate", get(must_authenticate))
        .route("/ds/login", get(login))
        .route("/ds/callback", get(callback))
        .route("/ds/logout", get(logout))
        .route("/{eg}", get(show_form).post(submit))
        .with_state(state)
}

/// Handler failure that is not an example error: storage trouble and the like.
pub struct AppError(anyhow::Error);

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %format!("{:#}", self.0), "request failed");
        let page = Page::Error {
            err: format!("{:#}", self.0),
            error_code: None,
            error_message: None,
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Html(render(&page))).into_response()
    }
}

type HandlerResult = Result<Response, AppError>;

/// A loaded session and whether the browser already knows its id.
struct RequestSession {
    id: String,
    data: SessionContext,
    is_new: bool,
}

impl RequestSession {
    async fn load(state: &AppState, headers: &HeaderMap) -> anyhow::Result<Self> {
        if let Some(id) = session_id(headers)
            && let Some(data) = state.sessions.load(&id).await?
        {
            return Ok(Self {
                id,
                data,
                is_new: false,
            });
        }
        Ok(Self {
            id: random_token(),
            data: SessionContext::new(),
            is_new: true,
        })
    }

    /// Persist the session and attach the cookie when needed. A new session
    /// that still holds nothing is neither stored nor announced.
    async fn finish(self, state: &AppState, response: impl IntoResponse) -> HandlerResult {
        if self.is_new && self.data.is_empty() {
            return Ok(response.into_response());
        }
        state.sessions.save(&self.id, &self.data).await?;
        let mut response = response.into_response();
        if self.is_new {
            let cookie = format!("{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax", self.id);
            response
                .headers_mut()
                .append(SET_COOKIE, HeaderValue::from_str(&cookie)?);
        }
        Ok(response)
    }
}

fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

fn outcome_response(outcome: Outcome) -> Response {
    match outcome {
        Outcome::Page(page) => Html(render(&page)).into_response(),
        Outcome::Redirect(to) => Redirect::to(&to).into_response(),
    }
}

fn not_found(eg: &str) -> Response {
    let page = Page::Error {
        err: format!("unknown example: {eg}"),
        error_code: None,
        error_message: None,
    };
    (StatusCode::NOT_FOUND, Html(render(&page))).into_response()
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

async fn index(State(state): State<SharedState>, headers: HeaderMap) -> HandlerResult {
    let mut session = RequestSession::load(&state, &headers).await?;
    let entries = state
        .examples
        .iter()
        .map(|e| IndexEntry {
            eg: e.eg().to_string(),
            api: e.api().to_string(),
            name: state
                .manifest
                .get_example_by_number(e.number(), e.api())
                .map(|info| info.example_name.clone())
                .unwrap_or_else(|| e.eg().to_string()),
        })
        .collect();
    let page = Page::Index {
        entries,
        user: session.data.account().map(|a| a.user_name.clone()),
        flash: session.data.take_flash(),
    };
    session.finish(&state, Html(render(&page))).await
}

async fn must_authenticate(State(state): State<SharedState>, headers: HeaderMap) -> HandlerResult {
    let mut session = RequestSession::load(&state, &headers).await?;
    let page = Page::MustAuthenticate {
        flash: session.data.take_flash(),
    };
    session.finish(&state, Html(render(&page))).await
}

async fn login(State(state): State<SharedState>, headers: HeaderMap) -> HandlerResult {
    let mut session = RequestSession::load(&state, &headers).await?;
    let url = auth::login_url(&state.settings, &mut session.data);
    session.finish(&state, Redirect::to(&url)).await
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

async fn callback(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> HandlerResult {
    let mut session = RequestSession::load(&state, &headers).await?;

    let (code, oauth_state) = match (params.code, params.state) {
        (Some(code), Some(oauth_state)) if params.error.is_none() => (code, oauth_state),
        _ => {
            warn!(error = ?params.error, "login was not completed");
            let page = Page::Error {
                err: "login was not completed".to_string(),
                error_code: params.error,
                error_message: params.error_description,
            };
            return session.finish(&state, Html(render(&page))).await;
        }
    };

    match auth::complete_login(&state.settings, &mut session.data, &code, &oauth_state).await {
        Ok(pending) => {
            let to = match pending {
                Some(eg) => {
                    info!(%eg, "resuming example after login");
                    format!("/{eg}")
                }
                None => "/".to_string(),
            };
            session.finish(&state, Redirect::to(&to)).await
        }
        Err(e) => {
            warn!(error = %format!("{e:#}"), "login failed");
            let page = Page::Error {
                err: format!("{e:#}"),
                error_code: None,
                error_message: None,
            };
            session.finish(&state, Html(render(&page))).await
        }
    }
}

async fn logout(State(state): State<SharedState>, headers: HeaderMap) -> HandlerResult {
    let mut session = RequestSession::load(&state, &headers).await?;
    auth::logout(&mut session.data);
    session.finish(&state, Redirect::to("/")).await
}

async fn show_form(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(eg): Path<String>,
) -> HandlerResult {
    let Some(example) = state.examples.get(&eg) else {
        return Ok(not_found(&eg));
    };
    let mut session = RequestSession::load(&state, &headers).await?;
    let mut ctx = ExampleContext {
        session: &mut session.data,
        settings: &state.settings,
        manifest: &state.manifest,
    };
    let outcome = form_controller(example.as_ref(), &mut ctx);
    session.finish(&state, outcome_response(outcome)).await
}

async fn submit(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path(eg): Path<String>,
    Form(mut form): Form<HashMap<String, String>>,
) -> HandlerResult {
    let Some(example) = state.examples.get(&eg) else {
        return Ok(not_found(&eg));
    };
    let mut session = RequestSession::load(&state, &headers).await?;

    let token = form.remove(CSRF_FIELD).unwrap_or_default();
    if !session.data.verify_csrf(&token) {
        warn!(%eg, "rejected submit with invalid CSRF token");
        let page = Page::Error {
            err: "invalid CSRF token".to_string(),
            error_code: None,
            error_message: None,
        };
        return session
            .finish(&state, (StatusCode::FORBIDDEN, Html(render(&page))))
            .await;
    }

    let mut ctx = ExampleContext {
        session: &mut session.data,
        settings: &state.settings,
        manifest: &state.manifest,
    };
    let outcome = submit_controller(example.as_ref(), &mut ctx, &form).await;
    session.finish(&state, outcome_response(outcome)).await
}
