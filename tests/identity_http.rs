mod common;

use common::*;
use serde_json::{Value, json};
use warp::http::StatusCode;

async fn post(h: &Harness, path: &str, authorization: Option<&str>, body: Value) -> (StatusCode, Value) {
    let mut request = warp::test::request().method("POST").path(path).json(&body);
    if let Some(value) = authorization {
        request = request.header("authorization", value);
    }
    let resp = request.reply(&h.api()).await;
    (resp.status(), json(&resp))
}

async fn get(h: &Harness, path: &str, authorization: &str) -> (StatusCode, Value) {
    let resp = warp::test::request()
        .method("GET")
        .path(path)
        .header("authorization", authorization)
        .reply(&h.api())
        .await;
    (resp.status(), json(&resp))
}

async fn login(h: &Harness, gmail: &str, password: &str) -> String {
    let (status, body) = post(
        h,
        "/v1/auth/login",
        None,
        json!({ "gmail": gmail, "password": password }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "Login successful");
    format!("Bearer {}", body["token"].as_str().unwrap())
}

#[tokio::test]
async fn admin_registers_user_who_then_logs_in() {
    let h = Harness::new().await;
    let admin = login(&h, ADMIN_GMAIL, ADMIN_PASSWORD).await;

    let (status, body) = post(
        &h,
        "/v1/auth/register",
        Some(&admin),
        json!({ "name": "Ada", "gmail": "ada@gmail.com", "password": "pw1" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "message": "User registered successfully" }));

    let user = login(&h, "ada@gmail.com", "pw1").await;
    let (status, profile) = get(&h, "/v1/auth/profile", &user).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["gmail"], "ada@gmail.com");
    assert_eq!(profile["name"], "Ada");
    assert_eq!(profile["is_admin"], false);

    // A freshly registered user is no admin.
    let (status, _) = get(&h, "/v1/auth/all", &user).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn register_validates_its_body() {
    let h = Harness::new().await;
    let admin = login(&h, ADMIN_GMAIL, ADMIN_PASSWORD).await;

    let (status, body) = post(
        &h,
        "/v1/auth/register",
        Some(&admin),
        json!({ "name": "NoPassword", "gmail": "np@gmail.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "message": "Name, Gmail and Password are required" })
    );

    let (status, body) = post(
        &h,
        "/v1/auth/register",
        Some(&admin),
        json!({ "name": "Dup", "gmail": ADMIN_GMAIL, "password": "x" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "gmail already exists" }));
}

#[tokio::test]
async fn bad_credentials_are_refused() {
    let h = Harness::new().await;

    let (status, body) = post(
        &h,
        "/v1/auth/login",
        None,
        json!({ "gmail": ADMIN_GMAIL, "password": "wrong" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "Invalid password" }));

    let (status, body) = post(&h, "/v1/auth/login", None, json!({ "gmail": ADMIN_GMAIL })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "gmail and password are required" }));
}

#[tokio::test]
async fn profile_update_changes_name_and_password() {
    let h = Harness::new().await;
    let admin = login(&h, ADMIN_GMAIL, ADMIN_PASSWORD).await;
    post(
        &h,
        "/v1/auth/register",
        Some(&admin),
        json!({ "name": "Ada", "gmail": "ada@gmail.com", "password": "pw1" }),
    )
    .await;
    let user = login(&h, "ada@gmail.com", "pw1").await;

    let (status, body) = post(
        &h,
        "/v1/auth/profile",
        Some(&user),
        json!({ "name": "Ada L.", "password": "pw2" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "User update success" }));

    let (_, profile) = get(&h, "/v1/auth/profile", &user).await;
    assert_eq!(profile["name"], "Ada L.");
    login(&h, "ada@gmail.com", "pw2").await;

    let (status, body) = post(
        &h,
        "/v1/auth/profile",
        Some(&user),
        json!({ "gmail": ADMIN_GMAIL }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "Error occurred while updating" }));
}

#[tokio::test]
async fn profile_of_unknown_subject_is_not_found() {
    let h = Harness::new().await;
    let (status, body) = get(&h, "/v1/auth/profile", &h.bearer(999, false)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "User not found" }));
}

#[tokio::test]
async fn admin_lists_every_identity() {
    let h = Harness::new().await;
    let admin = login(&h, ADMIN_GMAIL, ADMIN_PASSWORD).await;
    post(
        &h,
        "/v1/auth/register",
        Some(&admin),
        json!({ "name": "Ada", "gmail": "ada@gmail.com", "password": "pw1", "is_admin": true }),
    )
    .await;

    let (status, body) = get(&h, "/v1/auth/all", &admin).await;
    assert_eq!(status, StatusCode::OK);
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["gmail"], ADMIN_GMAIL);
    assert_eq!(users[0]["created_by"], Value::Null);
    assert_eq!(users[1]["gmail"], "ada@gmail.com");
    assert_eq!(users[1]["is_admin"], true);
    assert_eq!(users[1]["created_by"], users[0]["id"]);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let h = Harness::new().await;
    let resp = warp::test::request()
        .method("POST")
        .path("/v1/auth/login")
        .header("content-type", "application/json")
        .body("{not json")
        .reply(&h.api())
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
