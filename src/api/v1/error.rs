use crate::application_port::*;
use serde_json::{Value, json};
use std::convert::Infallible;
use tracing::{error, warn};
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub const GMAIL_TAKEN: &str = "gmail already exists";
pub const INVALID_PASSWORD: &str = "Invalid password";
pub const USER_NOT_FOUND: &str = "User not found";
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong";

/// Every failure a v1 handler can surface. Rendered by [`recover_error`].
#[derive(Debug)]
pub enum ApiError {
    Rejected(AuthRejection),
    BadRequest(String),
    InvalidCredentials,
    NotFound,
    Internal,
}

impl reject::Reject for ApiError {}

impl ApiError {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiError {
        error!("Internal error: {}", error);
        ApiError::Internal
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Rejected(AuthRejection::Forbidden) => StatusCode::FORBIDDEN,
            ApiError::Rejected(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> Value {
        match self {
            ApiError::Rejected(rejection) => json!({ "message": rejection.to_string() }),
            ApiError::BadRequest(message) => json!({ "message": message }),
            ApiError::InvalidCredentials => json!({ "message": INVALID_PASSWORD }),
            ApiError::NotFound => json!({ "message": USER_NOT_FOUND }),
            ApiError::Internal => json!({ "error": SOMETHING_WENT_WRONG }),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::InvalidInput(message) => ApiError::BadRequest(message),
            ServiceError::InvalidCredentials => ApiError::InvalidCredentials,
            ServiceError::DuplicateIdentity => ApiError::BadRequest(GMAIL_TAKEN.to_string()),
            ServiceError::NotFound => ApiError::NotFound,
            ServiceError::Upstream(e) => ApiError::internal(e),
            ServiceError::Internal(e) => ApiError::internal(e),
        }
    }
}

impl From<GuardError> for ApiError {
    fn from(error: GuardError) -> Self {
        match error {
            GuardError::Rejected(rejection) => ApiError::Rejected(rejection),
            GuardError::Service(e) => ApiError::from(e),
        }
    }
}

pub fn reject_with(error: impl Into<ApiError>) -> Rejection {
    reject::custom(error.into())
}

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let (status, body) = if let Some(e) = err.find::<ApiError>() {
        (e.status(), e.body())
    } else if err.is_not_found() {
        (StatusCode::NOT_FOUND, json!({ "message": "Not found" }))
    } else if let Some(e) = err.find::<warp::body::BodyDeserializeError>() {
        (StatusCode::BAD_REQUEST, json!({ "message": e.to_string() }))
    } else if err.find::<reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            json!({ "message": "Payload too large" }),
        )
    } else if err.find::<reject::LengthRequired>().is_some() {
        (
            StatusCode::LENGTH_REQUIRED,
            json!({ "message": "Content-Length required" }),
        )
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            json!({ "message": "Method not allowed" }),
        )
    } else {
        warn!("Unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": SOMETHING_WENT_WRONG }),
        )
    };

    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}
