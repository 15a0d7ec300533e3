#![allow(clippy::unwrap_used, clippy::expect_used, clippy::non_ascii_literal)]

//! Form post and edit page round trips through the router with a real store.

mod support;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use serde_json::Value;
use support::{inmem_repo, seed_user};
use tower::ServiceExt as _;
use user_profile::api::rest::router;
use user_profile::domain::form::UPDATE_FAILED_PREFIX;
use user_profile::infra::session_store::SessionStore;
use user_profile::{Service, User, UserProfileConfig};

struct TestApp {
    router: Router,
    sessions: Arc<SessionStore>,
    alice: User,
    bob: User,
}

async fn setup() -> TestApp {
    let repo = inmem_repo().await;
    let alice = seed_user(&repo, "alice", "alice@example.com").await;
    let bob = seed_user(&repo, "bob", "bob@example.com").await;

    let service = Arc::new(Service::new(Arc::new(repo)));
    let sessions = Arc::new(SessionStore::from_config(&UserProfileConfig::default()));
    TestApp {
        router: router(service, Arc::clone(&sessions)),
        sessions,
        alice,
        bob,
    }
}

async fn post_form(app: &Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_owned()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn get_json(app: &Router, uri: &str, cookie: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn session_cookie(response: &Response<Body>) -> String {
    let header = response.headers()[SET_COOKIE].to_str().unwrap();
    header.split(';').next().unwrap().to_owned()
}

#[tokio::test]
async fn valid_submission_updates_the_stored_user() {
    let app = setup().await;
    let uri = format!("/users/{}", app.alice.id);

    let response = post_form(
        &app.router,
        &uri,
        "name=alice-renamed&email=new%40example.com&introduction=hello",
    )
    .await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], uri.as_str());

    let (status, json) = get_json(&app.router, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "alice-renamed");
    assert_eq!(json["email"], "new@example.com");
    assert_eq!(json["introduction"], "hello");
    assert!(app.sessions.is_empty());
}

#[tokio::test]
async fn keeping_own_name_is_not_a_conflict() {
    let app = setup().await;
    let uri = format!("/users/{}", app.alice.id);

    let response = post_form(&app.router, &uri, "name=alice&email=alice%40example.com").await;

    assert_eq!(response.headers()[LOCATION], uri.as_str());
}

#[tokio::test]
async fn taken_name_is_shown_once_on_the_edit_page() {
    let app = setup().await;
    let uri = format!("/users/{}", app.alice.id);
    let edit_uri = format!("{uri}/edit");

    let response = post_form(
        &app.router,
        &uri,
        &format!("name={}&email=alice%40example.com", app.bob.name),
    )
    .await;
    assert_eq!(response.headers()[LOCATION], edit_uri.as_str());
    let cookie = session_cookie(&response);

    let (status, json) = get_json(&app.router, &edit_uri, Some(&cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["user"]["name"], "alice");
    assert_eq!(json["errors"]["errors"][0], "用户名已被占用，请重新填写");
    assert_eq!(json["errors"]["by_field"][0]["field"], "name");
    assert_eq!(json["old_input"]["name"], "bob");

    let (_, json) = get_json(&app.router, &edit_uri, Some(&cookie)).await;
    assert!(json.get("errors").is_none());
    assert!(json.get("old_input").is_none());
}

#[tokio::test]
async fn duplicate_email_becomes_a_danger_flash() {
    let app = setup().await;
    let uri = format!("/users/{}", app.alice.id);
    let edit_uri = format!("{uri}/edit");

    let response = post_form(&app.router, &uri, "name=alice&email=bob%40example.com").await;
    assert_eq!(response.headers()[LOCATION], edit_uri.as_str());
    let cookie = session_cookie(&response);

    let (_, json) = get_json(&app.router, &edit_uri, Some(&cookie)).await;
    assert_eq!(json["flashes"][0]["level"], "danger");
    let message = json["flashes"][0]["message"].as_str().unwrap();
    assert!(message.starts_with(UPDATE_FAILED_PREFIX), "{message}");

    let (_, json) = get_json(&app.router, &uri, None).await;
    assert_eq!(json["email"], "alice@example.com");
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let app = setup().await;

    let (status, json) = get_json(&app.router, "/users/999/edit", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], 404);
    assert_eq!(json["title"], "User not found");
}
