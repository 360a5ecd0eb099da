use super::handler::service_unavailable;
use crate::application_impl::{AuthGate, Pipeline};
use crate::resilience::{BreakerGuard, Fallback};
use crate::server::{Server, call_site};
use std::sync::Arc;
use warp::reply::Response;

/// Guard chains shared by the v1 handlers, built once per router.
pub struct Pipelines {
    pub authenticated: Pipeline<Response>,
    pub admin: Pipeline<Response>,
    /// Admin gate outside the breaker, so turned-away callers never count
    /// as failures.
    pub register: Pipeline<Response>,
    pub fault_demo: Pipeline<Response>,
}

impl Pipelines {
    pub fn new(server: &Server) -> Self {
        let gate = AuthGate::new(server.token_authority.clone());
        let admin_gate = AuthGate::admin(server.token_authority.clone());
        let fallback: Fallback<Response> = Arc::new(service_unavailable);

        Pipelines {
            authenticated: Pipeline::new().guard(gate),
            admin: Pipeline::new().guard(admin_gate.clone()),
            register: Pipeline::new().guard(admin_gate).guard(BreakerGuard::new(
                server.breakers.breaker(call_site::REGISTER),
                fallback.clone(),
            )),
            fault_demo: Pipeline::new().guard(BreakerGuard::new(
                server.breakers.breaker(call_site::FAULT_DEMO),
                fallback,
            )),
        }
    }
}
