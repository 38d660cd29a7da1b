use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use tower::ServiceExt;

use scribe::auth::oauth::Credential;
use scribe::config::Settings;
use scribe::consts::{MUST_AUTHENTICATE, REAUTH_FLASH, now_ms};
use scribe::controllers::ExampleRegistry;
use scribe::manifest::Manifest;
use scribe::server::{AppState, router};
use scribe::session::memory::MemorySessionStore;
use scribe::session::sqlite::SqliteSessionStore;
use scribe::session::{Account, SessionContext, SessionStore};

fn app(store: &Arc<MemorySessionStore>, settings: Settings) -> Router {
    router(Arc::new(AppState {
        settings,
        manifest: Manifest::embedded().unwrap(),
        examples: ExampleRegistry::new(),
        sessions: store.clone(),
    }))
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, cookie: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(COOKIE, cookie)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn location(resp: &Response<Body>) -> &str {
    resp.headers().get(LOCATION).unwrap().to_str().unwrap()
}

/// The `name=value` part of the session cookie, ready to send back.
fn session_cookie(resp: &Response<Body>) -> String {
    let raw = resp.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    raw.split(';').next().unwrap().to_string()
}

async fn body_text(resp: Response<Body>) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Store a logged-in session under `id` whose token has `minutes_left`.
async fn seed_session(store: &MemorySessionStore, id: &str, minutes_left: u64) -> String {
    let mut session = SessionContext::new();
    session.set_credential(Credential {
        access_token: "tok".to_string(),
        refresh_token: None,
        expires: now_ms() + minutes_left * 60_000,
    });
    session.set_account(Account {
        account_id: "acc".to_string(),
        account_name: "Main".to_string(),
        base_path: "http://127.0.0.1:9".to_string(),
        user_name: "Pat".to_string(),
    });
    let csrf = session.csrf_token();
    store.save(id, &session).await.unwrap();
    csrf
}

#[tokio::test]
async fn healthz_answers_ok() {
    let store = Arc::new(MemorySessionStore::new());
    let resp = app(&store, Settings::default())
        .oneshot(get("/healthz", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("ok"));
}

#[tokio::test]
async fn index_lists_examples() {
    let store = Arc::new(MemorySessionStore::new());
    let resp = app(&store, Settings::default())
        .oneshot(get("/", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    for eg in ["/eg006", "/reg001", "/aeg005"] {
        assert!(html.contains(eg), "index is missing {eg}");
    }
}

#[tokio::test]
async fn anonymous_requests_without_state_store_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sessions.db");
    let path_str = path.to_str().unwrap();
    let store = SqliteSessionStore::open(path_str).unwrap();
    let app = router(Arc::new(AppState {
        settings: Settings::default(),
        manifest: Manifest::embedded().unwrap(),
        examples: ExampleRegistry::new(),
        sessions: Arc::new(store),
    }));

    for uri in ["/", MUST_AUTHENTICATE, "/healthz"] {
        for _ in 0..20 {
            let resp = app.clone().oneshot(get(uri, None)).await.unwrap();
            assert!(resp.headers().get(SET_COOKIE).is_none(), "cookie set by {uri}");
        }
    }
    let resp = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/reg001")
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("roomName=x"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(resp.headers().get(SET_COOKIE).is_none());

    let conn = rusqlite::Connection::open(path_str).unwrap();
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn form_without_login_redirects_to_authenticate() {
    let store = Arc::new(MemorySessionStore::new());
    let resp = app(&store, Settings::default())
        .oneshot(get("/eg006", None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), MUST_AUTHENTICATE);

    let cookie = session_cookie(&resp);
    let id = cookie.strip_prefix("scribe_session=").unwrap();
    let session = store.load(id).await.unwrap().unwrap();
    assert_eq!(session.pending_example(), Some("eg006"));
}

#[tokio::test]
async fn unknown_example_is_not_found() {
    let store = Arc::new(MemorySessionStore::new());
    let resp = app(&store, Settings::default())
        .oneshot(get("/eg999", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn submit_without_csrf_token_is_forbidden() {
    let store = Arc::new(MemorySessionStore::new());
    seed_session(&store, "sid", 60).await;

    let resp = app(&store, Settings::default())
        .oneshot(post_form("/reg001", "scribe_session=sid", "roomName=Lakeside"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(body_text(resp).await.contains("invalid CSRF token"));
}

#[tokio::test]
async fn submit_with_stale_token_redirects_and_flashes() {
    let store = Arc::new(MemorySessionStore::new());
    let csrf = seed_session(&store, "sid", 2).await;

    let resp = app(&store, Settings::default())
        .oneshot(post_form(
            "/reg001",
            "scribe_session=sid",
            &format!("csrf_token={csrf}&roomName=Lakeside"),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), MUST_AUTHENTICATE);
    assert!(resp.headers().get(SET_COOKIE).is_none());

    let mut session = store.load("sid").await.unwrap().unwrap();
    assert_eq!(session.pending_example(), Some("reg001"));
    assert_eq!(session.take_flash().as_deref(), Some(REAUTH_FLASH));
}

#[tokio::test]
async fn must_authenticate_page_shows_flash_once() {
    let store = Arc::new(MemorySessionStore::new());
    let mut session = SessionContext::new();
    session.flash(REAUTH_FLASH);
    store.save("sid", &session).await.unwrap();
    let app = app(&store, Settings::default());

    let first = app
        .clone()
        .oneshot(get(MUST_AUTHENTICATE, Some("scribe_session=sid")))
        .await
        .unwrap();
    assert!(body_text(first).await.contains(REAUTH_FLASH));

    let second = app
        .oneshot(get(MUST_AUTHENTICATE, Some("scribe_session=sid")))
        .await
        .unwrap();
    assert!(!body_text(second).await.contains(REAUTH_FLASH));
}

#[tokio::test]
async fn login_callback_resumes_pending_example() {
    let mut server = mockito::Server::new_async().await;
    let _token = server
        .mock("POST", "/oauth/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"at-123","expires_in":28800}"#)
        .create_async()
        .await;
    let _userinfo = server
        .mock("GET", "/oauth/userinfo")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"name":"Pat Doe","accounts":[{"account_id":"acc-1","is_default":true,"base_uri":"https://demo.docusign.net"}]}"#,
        )
        .create_async()
        .await;

    let store = Arc::new(MemorySessionStore::new());
    let settings = Settings {
        auth_server: server.url(),
        ..Settings::default()
    };
    let app = app(&store, settings);

    // The form asks for login and remembers the example.
    let resp = app.clone().oneshot(get("/aeg005", None)).await.unwrap();
    assert_eq!(location(&resp), MUST_AUTHENTICATE);
    let cookie = session_cookie(&resp);

    let resp = app
        .clone()
        .oneshot(get("/ds/login", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let authorize = location(&resp).to_string();
    assert!(authorize.starts_with(&format!("{}/oauth/auth?", server.url())));
    let state = authorize
        .split('&')
        .find_map(|p| p.strip_prefix("state="))
        .unwrap()
        .to_string();

    let resp = app
        .clone()
        .oneshot(get(
            &format!("/ds/callback?code=the-code&state={state}"),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/aeg005");

    let resp = app.oneshot(get("/aeg005", Some(&cookie))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Audit users"));

    let id = cookie.strip_prefix("scribe_session=").unwrap();
    let session = store.load(id).await.unwrap().unwrap();
    assert_eq!(session.account_id(), Some("acc-1"));
    assert!(session.pending_example().is_none());
}

#[tokio::test]
async fn callback_with_wrong_state_shows_error() {
    let store = Arc::new(MemorySessionStore::new());
    let app = app(&store, Settings::default());

    let resp = app.clone().oneshot(get("/ds/login", None)).await.unwrap();
    let cookie = session_cookie(&resp);

    let resp = app
        .oneshot(get("/ds/callback?code=c&state=forged", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("state mismatch"));
}

#[tokio::test]
async fn callback_reports_provider_error() {
    let store = Arc::new(MemorySessionStore::new());
    let resp = app(&store, Settings::default())
        .oneshot(get(
            "/ds/callback?error=access_denied&error_description=denied",
            None,
        ))
        .await
        .unwrap();
    let html = body_text(resp).await;
    assert!(html.contains("access_denied"));
    assert!(html.contains("denied"));
}

#[tokio::test]
async fn logout_clears_credential() {
    let store = Arc::new(MemorySessionStore::new());
    seed_session(&store, "sid", 60).await;

    let resp = app(&store, Settings::default())
        .oneshot(get("/ds/logout", Some("scribe_session=sid")))
        .await
        .unwrap();
    assert_eq!(location(&resp), "/");

    let session = store.load("sid").await.unwrap().unwrap();
    assert!(session.access_token().is_none());
    assert!(session.account_id().is_none());
}
