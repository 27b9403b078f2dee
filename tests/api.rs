use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use eventplanner_server::routes::create_routes;
use eventplanner_server::store::MemoryStore;
use eventplanner_server::AppState;

const SECRET: &str = "integration-test-secret";

fn app() -> Router {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), store, SECRET, 60);
    create_routes(state)
}

fn request(method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

async fn register(app: &Router, email: &str) -> String {
    let credentials = json!({ "email": email, "password": "hunter2!" });
    let (status, _) = send(
        app,
        request(Method::POST, "/auth/signup", None, Some(credentials.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        app,
        request(Method::POST, "/auth/login", None, Some(credentials)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["access_token"].as_str().unwrap().to_string()
}

async fn create_event(app: &Router, token: &str, title: &str, date: &str) -> i64 {
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/events/create",
            Some(token),
            Some(json!({
                "title": title,
                "description": "An event for the test suite",
                "date": date,
                "time": "18:00",
                "location": "HQ",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["event_id"].as_i64().unwrap()
}

async fn invite(app: &Router, token: &str, event_id: i64, email: &str) -> (StatusCode, Value) {
    send(
        app,
        request(
            Method::POST,
            "/events/invite",
            Some(token),
            Some(json!({ "event_id": event_id.to_string(), "email": email })),
        ),
    )
    .await
}

#[tokio::test]
async fn health_check_needs_no_auth() {
    let app = app();
    let (status, body) = send(&app, request(Method::GET, "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn duplicate_signup_is_a_conflict() {
    let app = app();
    let credentials = json!({ "email": "ana@example.com", "password": "hunter2!" });

    let (status, _) = send(
        &app,
        request(Method::POST, "/auth/signup", None, Some(credentials.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        request(Method::POST, "/auth/signup", None, Some(credentials)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = app();
    register(&app, "ana@example.com").await;

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "ana@example.com", "password": "wrong" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "hunter2!" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bearer_assertion_guards_event_routes() {
    let app = app();

    let (status, _) = send(&app, request(Method::GET, "/events/me", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        request(Method::GET, "/events/me", Some("not-a-token"), None),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn event_ids_start_at_one_and_increase() {
    let app = app();
    let ana = register(&app, "ana@example.com").await;

    let first = create_event(&app, &ana, "First", "2024-06-01").await;
    let second = create_event(&app, &ana, "Second", "2024-06-02").await;
    assert_eq!(first, 1);
    assert_eq!(second, 2);
}

#[tokio::test]
async fn create_rejects_malformed_dates() {
    let app = app();
    let ana = register(&app, "ana@example.com").await;

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/events/create",
            Some(&ana),
            Some(json!({
                "title": "Broken",
                "description": "Bad date",
                "date": "2024-13-01",
                "time": "18:00",
                "location": "HQ",
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn organizer_scenario_end_to_end() {
    let app = app();
    let ana = register(&app, "ana@example.com").await;
    let bob = register(&app, "bob@example.com").await;

    let event_id = create_event(&app, &ana, "Offsite", "2024-12-25").await;

    let (status, _) = invite(&app, &ana, event_id, "bob@example.com").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            &format!("/events/{}/respond", event_id),
            Some(&bob),
            Some(json!({ "response": "Going" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["response"], "Going");

    let (status, body) = send(
        &app,
        request(
            Method::GET,
            &format!("/events/{}/attendees", event_id),
            Some(&ana),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let summary = &body["data"]["response_summary"];
    assert_eq!(summary["Going"], 1);
    assert_eq!(summary["Maybe"], 0);
    assert_eq!(summary["Not Going"], 0);
    assert_eq!(summary["No Response"], 0);
    assert_eq!(body["data"]["total_attendees"], 1);
}

#[tokio::test]
async fn invite_enforces_authorization_and_uniqueness() {
    let app = app();
    let ana = register(&app, "ana@example.com").await;
    let bob = register(&app, "bob@example.com").await;
    register(&app, "carol@example.com").await;

    let event_id = create_event(&app, &ana, "Offsite", "2024-12-25").await;
    let (status, _) = invite(&app, &ana, event_id, "bob@example.com").await;
    assert_eq!(status, StatusCode::OK);

    // Only the organizer may invite.
    let (status, _) = invite(&app, &bob, event_id, "carol@example.com").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Repeat invite is a conflict.
    let (status, _) = invite(&app, &ana, event_id, "bob@example.com").await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Invitee must be registered.
    let (status, _) = invite(&app, &ana, event_id, "ghost@example.com").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Missing event.
    let (status, _) = invite(&app, &ana, 99, "carol@example.com").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Malformed event id in the payload.
    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/events/invite",
            Some(&ana),
            Some(json!({ "event_id": "abc", "email": "carol@example.com" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn respond_enforces_role_and_value_rules() {
    let app = app();
    let ana = register(&app, "ana@example.com").await;
    let bob = register(&app, "bob@example.com").await;
    let carol = register(&app, "carol@example.com").await;

    let event_id = create_event(&app, &ana, "Offsite", "2024-12-25").await;
    invite(&app, &ana, event_id, "bob@example.com").await;

    let respond = |token: String, value: &str| {
        let body = json!({ "response": value });
        request(
            Method::POST,
            &format!("/events/{}/respond", event_id),
            Some(&token),
            Some(body),
        )
    };

    // Value outside the three literals.
    let (status, _) = send(&app, respond(bob.clone(), "Attending")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // The organizer is implicitly attending.
    let (status, _) = send(&app, respond(ana.clone(), "Going")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Registered but never invited.
    let (status, _) = send(&app, respond(carol.clone(), "Going")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Responses overwrite; the latest wins.
    let (status, _) = send(&app, respond(bob.clone(), "Maybe")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, respond(bob.clone(), "Not Going")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        request(
            Method::GET,
            &format!("/events/{}/attendees", event_id),
            Some(&ana),
            None,
        ),
    )
    .await;
    let summary = &body["data"]["response_summary"];
    assert_eq!(summary["Maybe"], 0);
    assert_eq!(summary["Not Going"], 1);
}

#[tokio::test]
async fn attendee_report_is_organizer_only() {
    let app = app();
    let ana = register(&app, "ana@example.com").await;
    let bob = register(&app, "bob@example.com").await;

    let event_id = create_event(&app, &ana, "Offsite", "2024-12-25").await;
    invite(&app, &ana, event_id, "bob@example.com").await;

    let (status, _) = send(
        &app,
        request(
            Method::GET,
            &format!("/events/{}/attendees", event_id),
            Some(&bob),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn delete_is_organizer_only_and_hard() {
    let app = app();
    let ana = register(&app, "ana@example.com").await;
    let bob = register(&app, "bob@example.com").await;

    let event_id = create_event(&app, &ana, "Offsite", "2024-12-25").await;

    let (status, _) = send(
        &app,
        request(
            Method::DELETE,
            &format!("/events/{}", event_id),
            Some(&bob),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        request(
            Method::DELETE,
            &format!("/events/{}", event_id),
            Some(&ana),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        request(
            Method::GET,
            &format!("/events/{}/attendees", event_id),
            Some(&ana),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listings_reflect_membership() {
    let app = app();
    let ana = register(&app, "ana@example.com").await;
    let bob = register(&app, "bob@example.com").await;

    let anas = create_event(&app, &ana, "Ana's party", "2024-06-01").await;
    let bobs = create_event(&app, &bob, "Bob's dinner", "2024-06-02").await;
    invite(&app, &bob, bobs, "ana@example.com").await;

    let ids = |body: &Value| -> Vec<i64> {
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_i64().unwrap())
            .collect()
    };

    let (_, body) = send(&app, request(Method::GET, "/events/my-events", Some(&ana), None)).await;
    assert_eq!(ids(&body), vec![anas]);

    let (_, body) = send(&app, request(Method::GET, "/events/me", Some(&ana), None)).await;
    assert_eq!(ids(&body), vec![anas, bobs]);

    let (_, body) = send(&app, request(Method::GET, "/events/invited", Some(&ana), None)).await;
    assert_eq!(ids(&body), vec![bobs]);

    let invited = &body["data"][0];
    assert_eq!(invited["user_role"], "attendee");
    assert_eq!(invited["is_organizer"], false);
}

#[tokio::test]
async fn search_filters_and_validation() {
    let app = app();
    let ana = register(&app, "ana@example.com").await;
    let bob = register(&app, "bob@example.com").await;

    create_event(&app, &ana, "Rust meetup", "2024-06-01").await;
    let workshop = create_event(&app, &ana, "RUST workshop", "2024-07-01").await;
    let bobs = create_event(&app, &bob, "Garden party", "2024-07-02").await;
    invite(&app, &bob, bobs, "ana@example.com").await;

    // Malformed date fails up front.
    let (status, _) = send(
        &app,
        request(
            Method::GET,
            "/events/search?start_date=2024-13-01",
            Some(&ana),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Inverted range fails up front.
    let (status, _) = send(
        &app,
        request(
            Method::GET,
            "/events/search?start_date=2024-07-01&end_date=2024-06-01",
            Some(&ana),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Keyword is case-insensitive and composes with the date range.
    let (status, body) = send(
        &app,
        request(
            Method::GET,
            "/events/search?keyword=rust&start_date=2024-06-15&end_date=2024-07-15",
            Some(&ana),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["results"][0]["id"], workshop);
    assert_eq!(body["data"]["filters_applied"]["keyword"], "rust");

    // role=attendee returns only events the caller was invited to.
    let (status, body) = send(
        &app,
        request(Method::GET, "/events/search?role=attendee", Some(&ana), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["results"][0]["id"], bobs);

    // Unknown role value.
    let (status, _) = send(
        &app,
        request(Method::GET, "/events/search?role=admin", Some(&ana), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
