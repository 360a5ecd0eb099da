use super::handler::{self, MAX_BODY_BYTES};
use super::pipelines::Pipelines;
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, http};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let pipelines = Arc::new(Pipelines::new(&server));

    // Gated routes take the raw body and decode it behind the gate.
    let register = warp::path!("auth" / "register")
        .and(warp::post())
        .and(warp::body::bytes())
        .and(authorization())
        .and(with(server.clone()))
        .and(with(pipelines.clone()))
        .and_then(handler::register);

    let login = warp::path!("auth" / "login")
        .and(warp::post())
        .and(json_body())
        .and(with(server.clone()))
        .and_then(handler::login);

    let profile = warp::path!("auth" / "profile")
        .and(warp::get())
        .and(authorization())
        .and(with(server.clone()))
        .and(with(pipelines.clone()))
        .and_then(handler::profile);

    let update_profile = warp::path!("auth" / "profile")
        .and(warp::post())
        .and(warp::body::bytes())
        .and(authorization())
        .and(with(server.clone()))
        .and(with(pipelines.clone()))
        .and_then(handler::update_profile);

    let list_all = warp::path!("auth" / "all")
        .and(warp::get())
        .and(authorization())
        .and(with(server.clone()))
        .and(with(pipelines.clone()))
        .and_then(handler::list_all);

    let mock_open = warp::path!("mock" / "test")
        .and(warp::get())
        .and_then(handler::mock_open);

    let mock_token = warp::path!("mock" / "token-test")
        .and(warp::get())
        .and(authorization())
        .and(with(pipelines.clone()))
        .and_then(handler::mock_token);

    let mock_token_admin = warp::path!("mock" / "token-admin-test")
        .and(warp::get())
        .and(authorization())
        .and(with(pipelines.clone()))
        .and_then(handler::mock_token_admin);

    let monthly_events = warp::path!("reports" / "monthly-events")
        .and(warp::get())
        .and(authorization())
        .and(with(pipelines.clone()))
        .and_then(handler::monthly_events);

    let fault_demo = warp::path!("fault" / "demo")
        .and(warp::get())
        .and(with(server))
        .and(with(pipelines))
        .and_then(handler::fault_demo);

    register
        .or(login)
        .or(profile)
        .or(update_profile)
        .or(list_all)
        .or(mock_open)
        .or(mock_token)
        .or(mock_token_admin)
        .or(monthly_events)
        .or(fault_demo)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

/// The raw `Authorization` header. Absence is left to the auth gate.
fn authorization() -> impl Filter<Extract = (Option<String>,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>(http::header::AUTHORIZATION.as_str())
}

fn json_body<T>() -> impl Filter<Extract = (T,), Error = warp::Rejection> + Clone
where
    T: serde::de::DeserializeOwned + Send,
{
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}
