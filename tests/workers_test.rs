use chrono::NaiveDate;
use mockito::Matcher;
use serde_json::json;

use scribe::api::ApiError;
use scribe::workers::audit_users::{AuditUsersArgs, audit_users, get_organization_id};
use scribe::workers::envelope_docs::{EnvelopeDocsArgs, get_documents};
use scribe::workers::rooms_with_data::{RoomWithDataArgs, create_room_with_data};

fn json_response(server: &mut mockito::ServerGuard, method: &str, path: &str) -> mockito::Mock {
    server
        .mock(method, path)
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_header("content-type", "application/json")
}

// ── Envelope documents ────────────────────────────────────────────

#[tokio::test]
async fn get_documents_returns_raw_result() {
    let mut server = mockito::Server::new_async().await;
    let mock = json_response(
        &mut server,
        "GET",
        "/restapi/v2.1/accounts/acc/envelopes/env-1/documents",
    )
    .with_body(
        r#"{"envelopeId":"env-1","envelopeDocuments":[
            {"documentId":"1","name":"Order","type":"content","uri":"/envelopes/env-1/documents/1"}
        ]}"#,
    )
    .create_async()
    .await;

    let result = get_documents(EnvelopeDocsArgs {
        access_token: "tok".to_string(),
        base_path: format!("{}/restapi", server.url()),
        account_id: "acc".to_string(),
        envelope_id: "env-1".to_string(),
    })
    .await
    .unwrap();

    mock.assert_async().await;
    assert_eq!(result.envelope_id.as_deref(), Some("env-1"));
    assert_eq!(result.envelope_documents.len(), 1);
    assert_eq!(
        serde_json::to_value(&result).unwrap()["envelopeDocuments"][0]["uri"],
        "/envelopes/env-1/documents/1"
    );
}

#[tokio::test]
async fn get_documents_propagates_structured_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/restapi/v2.1/accounts/acc/envelopes/missing/documents")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"errorCode":"ENVELOPE_DOES_NOT_EXIST","message":"The envelope specified either does not exist or you have no rights to the envelope."}"#,
        )
        .create_async()
        .await;

    let err = get_documents(EnvelopeDocsArgs {
        access_token: "tok".to_string(),
        base_path: format!("{}/restapi", server.url()),
        account_id: "acc".to_string(),
        envelope_id: "missing".to_string(),
    })
    .await
    .unwrap_err();

    assert!(matches!(err, ApiError::Response { status: 400, .. }));
    assert_eq!(err.error_code(), Some("ENVELOPE_DOES_NOT_EXIST"));
    assert!(err.error_message().unwrap().starts_with("The envelope"));
}

#[tokio::test]
async fn non_json_error_has_no_body() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/restapi/v2.1/accounts/acc/envelopes/env-1/documents")
        .with_status(503)
        .with_body("Service Unavailable")
        .create_async()
        .await;

    let err = get_documents(EnvelopeDocsArgs {
        access_token: "tok".to_string(),
        base_path: format!("{}/restapi", server.url()),
        account_id: "acc".to_string(),
        envelope_id: "env-1".to_string(),
    })
    .await
    .unwrap_err();

    assert!(err.body().is_none());
    assert!(err.error_code().is_none());
    assert!(err.error_message().is_none());
}

// ── Rooms ─────────────────────────────────────────────────────────

fn room_args(server: &mockito::ServerGuard) -> RoomWithDataArgs {
    RoomWithDataArgs {
        access_token: "tok".to_string(),
        base_path: server.url(),
        account_id: "acc".to_string(),
        room_name: "Lakeside".to_string(),
    }
}

#[tokio::test]
async fn create_room_uses_default_admin_role() {
    let mut server = mockito::Server::new_async().await;
    let roles = json_response(&mut server, "GET", "/v2/accounts/acc/roles")
        .with_body(
            r#"{"roles":[
                {"roleId":11,"name":"Agent","isDefaultForAdmin":false},
                {"roleId":22,"name":"Manager","isDefaultForAdmin":true},
                {"roleId":33,"name":"Viewer","isDefaultForAdmin":false}
            ],"resultSetSize":3}"#,
        )
        .create_async()
        .await;
    let create = json_response(&mut server, "POST", "/v2/accounts/acc/rooms")
        .match_body(Matcher::PartialJson(json!({
            "name": "Lakeside",
            "roleId": 22,
            "transactionSideId": "listbuy",
            "fieldData": {"data": {"address1": "123 EZ Street", "state": "US-HI"}}
        })))
        .with_status(201)
        .with_body(r#"{"roomId":9001,"name":"Lakeside","createdDate":"2026-10-16T00:00:00Z"}"#)
        .create_async()
        .await;

    let room = create_room_with_data(room_args(&server)).await.unwrap();

    roles.assert_async().await;
    create.assert_async().await;
    assert_eq!(room.room_id, 9001);
    assert_eq!(room.name, "Lakeside");
}

#[tokio::test]
async fn create_room_is_deterministic_for_fixed_args() {
    let mut server = mockito::Server::new_async().await;
    let _roles = json_response(&mut server, "GET", "/v2/accounts/acc/roles")
        .with_body(r#"{"roles":[{"roleId":22,"isDefaultForAdmin":true}]}"#)
        .expect(2)
        .create_async()
        .await;
    let create = json_response(&mut server, "POST", "/v2/accounts/acc/rooms")
        .match_body(Matcher::PartialJson(json!({"name": "Lakeside", "roleId": 22})))
        .with_body(r#"{"roomId":1,"name":"Lakeside"}"#)
        .expect(2)
        .create_async()
        .await;

    let first = create_room_with_data(room_args(&server)).await.unwrap();
    let second = create_room_with_data(room_args(&server)).await.unwrap();

    create.assert_async().await;
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn role_lookup_failure_skips_room_creation() {
    let mut server = mockito::Server::new_async().await;
    let _roles = server
        .mock("GET", "/v2/accounts/acc/roles")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"errorCode":"UNAUTHORIZED","message":"token expired"}"#)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/v2/accounts/acc/rooms")
        .expect(0)
        .create_async()
        .await;

    let err = create_room_with_data(room_args(&server)).await.unwrap_err();
    assert_eq!(err.error_code(), Some("UNAUTHORIZED"));
    create.assert_async().await;
}

// ── Admin ─────────────────────────────────────────────────────────

#[tokio::test]
async fn get_organization_id_takes_first() {
    let mut server = mockito::Server::new_async().await;
    let _orgs = json_response(&mut server, "GET", "/v2/organizations")
        .with_body(r#"{"organizations":[{"id":"org-1","name":"Main"},{"id":"org-2"}]}"#)
        .create_async()
        .await;

    let id = get_organization_id("tok", &server.url()).await.unwrap();
    assert_eq!(id, "org-1");
}

#[tokio::test]
async fn get_organization_id_without_organizations() {
    let mut server = mockito::Server::new_async().await;
    let _orgs = json_response(&mut server, "GET", "/v2/organizations")
        .with_body(r#"{"organizations":[]}"#)
        .create_async()
        .await;

    let err = get_organization_id("tok", &server.url()).await.unwrap_err();
    assert!(matches!(err, ApiError::Missing("organization")));
}

#[tokio::test]
async fn audit_users_fetches_profile_per_modified_user() {
    let mut server = mockito::Server::new_async().await;
    let users = json_response(&mut server, "GET", "/v2/organizations/org-1/users")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("account_id".to_string(), "acc".to_string()),
            Matcher::UrlEncoded("last_modified_since".to_string(), "2026-10-06".to_string()),
        ]))
        .with_body(
            r#"{"users":[
                {"id":"u1","user_name":"Ann","email":"ann@example.com"},
                {"id":"u2","user_name":"Bo","email":"bo@example.com"}
            ]}"#,
        )
        .create_async()
        .await;
    let ann = json_response(&mut server, "GET", "/v2.1/organizations/org-1/users/dsprofile")
        .match_query(Matcher::UrlEncoded("email".to_string(), "ann@example.com".to_string()))
        .with_body(r#"{"users":[{"user_name":"Ann","email":"ann@example.com"}]}"#)
        .create_async()
        .await;
    let bo = json_response(&mut server, "GET", "/v2.1/organizations/org-1/users/dsprofile")
        .match_query(Matcher::UrlEncoded("email".to_string(), "bo@example.com".to_string()))
        .with_body(r#"{"users":[{"user_name":"Bo","email":"bo@example.com"}]}"#)
        .create_async()
        .await;

    let profiles = audit_users(AuditUsersArgs {
        access_token: "tok".to_string(),
        base_path: server.url(),
        account_id: "acc".to_string(),
        organization_id: "org-1".to_string(),
        last_modified_since: NaiveDate::from_ymd_opt(2026, 10, 6).unwrap(),
    })
    .await
    .unwrap();

    users.assert_async().await;
    ann.assert_async().await;
    bo.assert_async().await;
    assert_eq!(profiles.len(), 2);
    assert_eq!(profiles[0].users[0]["user_name"], "Ann");
    assert_eq!(profiles[1].users[0]["user_name"], "Bo");
}

#[tokio::test]
async fn audit_users_with_no_modified_users() {
    let mut server = mockito::Server::new_async().await;
    let _users = json_response(&mut server, "GET", "/v2/organizations/org-1/users")
        .match_query(Matcher::Any)
        .with_body(r#"{"users":[]}"#)
        .create_async()
        .await;

    let profiles = audit_users(AuditUsersArgs {
        access_token: "tok".to_string(),
        base_path: server.url(),
        account_id: "acc".to_string(),
        organization_id: "org-1".to_string(),
        last_modified_since: NaiveDate::from_ymd_opt(2026, 10, 6).unwrap(),
    })
    .await
    .unwrap();
    assert!(profiles.is_empty());
}
