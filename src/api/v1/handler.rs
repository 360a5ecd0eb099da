use super::error::*;
use super::pipelines::Pipelines;
use crate::application_port::*;
use crate::domain_model::*;
use crate::server::Server;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use warp::Rejection;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::{Reply, Response};

pub const SERVICE_UNAVAILABLE: &str = "Service currently not available";
pub const MAX_BODY_BYTES: u64 = 16 * 1024;

fn json_reply<T: Serialize>(body: &T, status: StatusCode) -> Response {
    warp::reply::with_status(warp::reply::json(body), status).into_response()
}

fn message(text: &str, status: StatusCode) -> Response {
    json_reply(&json!({ "message": text }), status)
}

/// Decodes the JSON body of a gated call. Runs only once the caller has been
/// admitted, so a bad body never masks an auth rejection.
fn decode_body<T: DeserializeOwned>(raw: &Bytes) -> Result<T, ServiceError> {
    if raw.len() as u64 > MAX_BODY_BYTES {
        return Err(ServiceError::InvalidInput("Payload too large".to_string()));
    }
    serde_json::from_slice(raw).map_err(|e| {
        ServiceError::InvalidInput(format!("Request body deserialize error: {}", e))
    })
}

/// Served in place of a breaker-protected handler while its circuit is open.
pub fn service_unavailable() -> Response {
    json_reply(
        &json!({ "error": SERVICE_UNAVAILABLE }),
        StatusCode::SERVICE_UNAVAILABLE,
    )
}

// region auth

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub gmail: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl From<RegisterRequest> for RegisterInput {
    fn from(body: RegisterRequest) -> Self {
        RegisterInput {
            name: body.name,
            gmail: body.gmail,
            password: body.password,
            is_admin: body.is_admin,
        }
    }
}

pub async fn register(
    body: Bytes,
    authorization: Option<String>,
    server: Arc<Server>,
    pipelines: Arc<Pipelines>,
) -> Result<Response, Rejection> {
    pipelines
        .register
        .run(CallContext::new(authorization), move |ctx| {
            register_inner(ctx, server, body)
        })
        .await
        .map_err(reject_with)
}

async fn register_inner(
    ctx: CallContext,
    server: Arc<Server>,
    body: Bytes,
) -> GuardResult<Response> {
    let principal = ctx.require_principal()?;
    let body: RegisterRequest = decode_body(&body)?;
    server
        .identity_service
        .register(principal.subject_id, body.into())
        .await?;
    Ok(message("User registered successfully", StatusCode::CREATED))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub gmail: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: Token,
}

pub async fn login(body: LoginRequest, server: Arc<Server>) -> Result<Response, Rejection> {
    let result = server
        .identity_service
        .login(LoginInput {
            gmail: body.gmail,
            password: body.password,
        })
        .await
        .map_err(reject_with)?;

    let response = LoginResponse {
        message: "Login successful",
        token: result.token,
    };
    Ok(json_reply(&response, StatusCode::OK))
}

pub async fn profile(
    authorization: Option<String>,
    server: Arc<Server>,
    pipelines: Arc<Pipelines>,
) -> Result<Response, Rejection> {
    pipelines
        .authenticated
        .run(CallContext::new(authorization), move |ctx| {
            profile_inner(ctx, server)
        })
        .await
        .map_err(reject_with)
}

async fn profile_inner(ctx: CallContext, server: Arc<Server>) -> GuardResult<Response> {
    let principal = ctx.require_principal()?;
    let view = server.identity_service.profile(principal.subject_id).await?;
    Ok(json_reply(&view, StatusCode::OK))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub gmail: Option<String>,
    pub password: Option<String>,
}

pub async fn update_profile(
    body: Bytes,
    authorization: Option<String>,
    server: Arc<Server>,
    pipelines: Arc<Pipelines>,
) -> Result<Response, Rejection> {
    pipelines
        .authenticated
        .run(CallContext::new(authorization), move |ctx| {
            update_profile_inner(ctx, server, body)
        })
        .await
        .map_err(reject_with)
}

async fn update_profile_inner(
    ctx: CallContext,
    server: Arc<Server>,
    body: Bytes,
) -> GuardResult<Response> {
    let principal = ctx.require_principal()?;
    let body: UpdateProfileRequest = decode_body(&body)?;
    let input = UpdateProfileInput {
        name: body.name,
        gmail: body.gmail,
        password: body.password,
    };
    server
        .identity_service
        .update_profile(principal.subject_id, input)
        .await?;
    Ok(message("User update success", StatusCode::OK))
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<IdentitySummary>,
}

pub async fn list_all(
    authorization: Option<String>,
    server: Arc<Server>,
    pipelines: Arc<Pipelines>,
) -> Result<Response, Rejection> {
    pipelines
        .admin
        .run(CallContext::new(authorization), move |_ctx| list_all_inner(server))
        .await
        .map_err(reject_with)
}

async fn list_all_inner(server: Arc<Server>) -> GuardResult<Response> {
    let users = server.identity_service.list_all().await?;
    Ok(json_reply(&UserListResponse { users }, StatusCode::OK))
}

// endregion

// region demo

pub async fn mock_open() -> Result<Response, Rejection> {
    Ok(json_reply(&json!({ "ok": true }), StatusCode::OK))
}

async fn whoami(ctx: CallContext) -> GuardResult<Response> {
    let principal = ctx.require_principal()?;
    Ok(json_reply(
        &json!({ "user": principal.subject_id }),
        StatusCode::OK,
    ))
}

pub async fn mock_token(
    authorization: Option<String>,
    pipelines: Arc<Pipelines>,
) -> Result<Response, Rejection> {
    pipelines
        .authenticated
        .run(CallContext::new(authorization), whoami)
        .await
        .map_err(reject_with)
}

pub async fn mock_token_admin(
    authorization: Option<String>,
    pipelines: Arc<Pipelines>,
) -> Result<Response, Rejection> {
    pipelines
        .admin
        .run(CallContext::new(authorization), whoami)
        .await
        .map_err(reject_with)
}

async fn monthly_events_inner(ctx: CallContext) -> GuardResult<Response> {
    let principal = ctx.require_principal()?;
    Ok(json_reply(
        &json!({ "message": "ok", "user_id": principal.subject_id }),
        StatusCode::OK,
    ))
}

pub async fn monthly_events(
    authorization: Option<String>,
    pipelines: Arc<Pipelines>,
) -> Result<Response, Rejection> {
    pipelines
        .authenticated
        .run(CallContext::new(authorization), monthly_events_inner)
        .await
        .map_err(reject_with)
}

pub async fn fault_demo(
    server: Arc<Server>,
    pipelines: Arc<Pipelines>,
) -> Result<Response, Rejection> {
    pipelines
        .fault_demo
        .run(CallContext::anonymous(), move |_ctx| fault_demo_inner(server))
        .await
        .map_err(reject_with)
}

async fn fault_demo_inner(server: Arc<Server>) -> GuardResult<Response> {
    let report = server.fault_demo_service.run().await?;
    Ok(json_reply(&report, StatusCode::OK))
}

// endregion
