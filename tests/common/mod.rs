#![allow(dead_code)]

use serde_json::Value;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use warp::Filter;
use warp::http::Response;
use warp::hyper::body::Bytes;
use workclock::api;
use workclock::application_impl::{Argon2PasswordHasher, FaultOdds};
use workclock::application_port::DEFAULT_TOKEN_TTL;
use workclock::domain_model::SubjectId;
use workclock::domain_port::IdentityRepo;
use workclock::infra_local::*;
use workclock::resilience::BreakerConfig;
use workclock::server::{Components, Server};

pub const ADMIN_GMAIL: &str = "admin@gmail.com";
pub const ADMIN_PASSWORD: &str = "admin-pw";

pub struct Harness {
    pub server: Arc<Server>,
    pub clock: Arc<FakeClock>,
    pub faults: Arc<ScriptedFaultSource>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_repo(Arc::new(InMemoryIdentityRepo::new())).await
    }

    pub async fn with_repo(identity_repo: Arc<dyn IdentityRepo>) -> Self {
        let clock = Arc::new(FakeClock::starting_now());
        // Rolls above the target succeed once the script runs out.
        let faults = Arc::new(ScriptedFaultSource::new(Vec::new(), 6));
        let components = Components {
            identity_repo,
            password_hasher: Arc::new(Argon2PasswordHasher),
            notification_sink: Arc::new(LogNotificationSink),
            clock: clock.clone(),
            fault_source: faults.clone(),
            signing_secret: b"integration-secret".to_vec(),
            token_ttl: DEFAULT_TOKEN_TTL,
            breaker: BreakerConfig {
                failure_threshold: 2,
                recovery_timeout: Duration::from_secs(60),
                ..BreakerConfig::default()
            },
            fault_odds: FaultOdds {
                target: 2,
                sides: 6,
            },
        };
        let server = Server::from_components_with_admin(components, "Admin", ADMIN_GMAIL, ADMIN_PASSWORD)
            .await
            .unwrap();

        Harness {
            server: Arc::new(server),
            clock,
            faults,
        }
    }

    pub fn api(
        &self,
    ) -> impl Filter<Extract = (impl warp::Reply,), Error = Infallible> + Clone + 'static {
        warp::path("v1")
            .and(api::v1::routes(self.server.clone()))
            .recover(api::v1::recover_error)
    }

    pub fn bearer(&self, subject: i64, admin: bool) -> String {
        self.server
            .token_authority
            .issue_default(SubjectId(subject), admin)
            .unwrap()
            .bearer()
    }
}

pub fn json(response: &Response<Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}
