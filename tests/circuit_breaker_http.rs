mod common;

use common::*;
use serde_json::json;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use warp::http::StatusCode;
use workclock::domain_model::*;
use workclock::domain_port::*;
use workclock::infra_local::InMemoryIdentityRepo;
use workclock::server::call_site;

async fn fault_demo(h: &Harness) -> (StatusCode, serde_json::Value) {
    let resp = warp::test::request()
        .method("GET")
        .path("/v1/fault/demo")
        .reply(&h.api())
        .await;
    (resp.status(), json(&resp))
}

#[tokio::test]
async fn healthy_dependency_reports_success() {
    let h = Harness::new().await;
    assert_eq!(
        fault_demo(&h).await,
        (StatusCode::OK, json!({ "Worked": true }))
    );
}

#[tokio::test]
async fn two_failures_open_the_circuit_until_recovery_timeout() {
    let h = Harness::new().await;
    h.faults.push([1, 1, 6]);

    for _ in 0..2 {
        assert_eq!(
            fault_demo(&h).await,
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Something went wrong" })
            )
        );
    }

    let breaker = h.server.breakers.breaker(call_site::FAULT_DEMO);
    assert_eq!(breaker.state(), BreakerState::Open);

    h.clock.advance(Duration::from_secs(30));
    assert_eq!(
        fault_demo(&h).await,
        (
            StatusCode::SERVICE_UNAVAILABLE,
            json!({ "error": "Service currently not available" })
        )
    );
    assert_eq!(h.faults.remaining(), 1, "open circuit must not reach the dependency");

    h.clock.advance(Duration::from_secs(30));
    assert_eq!(
        fault_demo(&h).await,
        (StatusCode::OK, json!({ "Worked": true }))
    );
    assert_eq!(h.faults.remaining(), 0);
    assert_eq!(breaker.state(), BreakerState::Closed);
    assert_eq!(breaker.snapshot().consecutive_failures, 0);
}

#[tokio::test]
async fn failed_probe_serves_fallback_and_restarts_the_timer() {
    let h = Harness::new().await;
    h.faults.push([1, 1, 1, 6]);

    fault_demo(&h).await;
    fault_demo(&h).await;

    h.clock.advance(Duration::from_secs(60));
    assert_eq!(fault_demo(&h).await.0, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(h.faults.remaining(), 1);

    h.clock.advance(Duration::from_secs(59));
    assert_eq!(fault_demo(&h).await.0, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(h.faults.remaining(), 1);

    h.clock.advance(Duration::from_secs(1));
    assert_eq!(fault_demo(&h).await.0, StatusCode::OK);
}

#[tokio::test]
async fn success_between_failures_keeps_the_circuit_closed() {
    let h = Harness::new().await;
    h.faults.push([1, 6, 1, 6, 1]);

    for _ in 0..5 {
        fault_demo(&h).await;
    }
    let breaker = h.server.breakers.breaker(call_site::FAULT_DEMO);
    assert_eq!(breaker.state(), BreakerState::Closed);
    assert_eq!(breaker.snapshot().consecutive_failures, 1);
}

/// Identity store that can be told to fail like an unreachable database.
#[derive(Default)]
struct FlakyRepo {
    inner: InMemoryIdentityRepo,
    down: AtomicBool,
}

impl FlakyRepo {
    fn check(&self) -> Result<(), RepoError> {
        if self.down.load(Ordering::SeqCst) {
            Err(RepoError::Store("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl IdentityRepo for FlakyRepo {
    async fn find_by_id(&self, id: SubjectId) -> Result<Option<Identity>, RepoError> {
        self.check()?;
        self.inner.find_by_id(id).await
    }

    async fn find_by_gmail(&self, gmail: &str) -> Result<Option<Identity>, RepoError> {
        self.check()?;
        self.inner.find_by_gmail(gmail).await
    }

    async fn save(&self, identity: NewIdentity) -> Result<Identity, RepoError> {
        self.check()?;
        self.inner.save(identity).await
    }

    async fn update(&self, id: SubjectId, changes: IdentityChanges) -> Result<Identity, RepoError> {
        self.check()?;
        self.inner.update(id, changes).await
    }

    async fn list_all(&self) -> Result<Vec<Identity>, RepoError> {
        self.check()?;
        self.inner.list_all().await
    }
}

async fn register(h: &Harness, authorization: Option<&str>, gmail: &str) -> StatusCode {
    let mut request = warp::test::request()
        .method("POST")
        .path("/v1/auth/register")
        .json(&json!({ "name": "Ada", "gmail": gmail, "password": "pw" }));
    if let Some(value) = authorization {
        request = request.header("authorization", value);
    }
    request.reply(&h.api()).await.status()
}

#[tokio::test]
async fn turned_away_callers_never_trip_the_register_breaker() {
    let h = Harness::new().await;
    let plain = h.bearer(2, false);

    for _ in 0..5 {
        assert_eq!(register(&h, None, "a@gmail.com").await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            register(&h, Some("Bearer junk"), "a@gmail.com").await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            register(&h, Some(&plain), "a@gmail.com").await,
            StatusCode::FORBIDDEN
        );
    }

    let breaker = h.server.breakers.breaker(call_site::REGISTER);
    assert_eq!(breaker.state(), BreakerState::Closed);
    assert_eq!(breaker.snapshot().consecutive_failures, 0);
}

#[tokio::test]
async fn duplicate_registrations_do_not_trip_the_register_breaker() {
    let h = Harness::new().await;
    let admin = h.bearer(1, true);

    assert_eq!(register(&h, Some(&admin), "dup@gmail.com").await, StatusCode::CREATED);
    for _ in 0..3 {
        assert_eq!(
            register(&h, Some(&admin), "dup@gmail.com").await,
            StatusCode::BAD_REQUEST
        );
    }
    assert_eq!(
        h.server.breakers.breaker(call_site::REGISTER).state(),
        BreakerState::Closed
    );
}

#[tokio::test]
async fn store_outage_opens_the_register_breaker() {
    let repo = Arc::new(FlakyRepo::default());
    let h = Harness::with_repo(repo.clone()).await;
    let admin = h.bearer(1, true);

    repo.down.store(true, Ordering::SeqCst);
    assert_eq!(
        register(&h, Some(&admin), "x@gmail.com").await,
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        register(&h, Some(&admin), "y@gmail.com").await,
        StatusCode::INTERNAL_SERVER_ERROR
    );

    repo.down.store(false, Ordering::SeqCst);
    assert_eq!(
        register(&h, Some(&admin), "z@gmail.com").await,
        StatusCode::SERVICE_UNAVAILABLE
    );

    // Still gated while open.
    assert_eq!(register(&h, None, "z@gmail.com").await, StatusCode::UNAUTHORIZED);

    h.clock.advance(Duration::from_secs(60));
    assert_eq!(
        register(&h, Some(&admin), "z@gmail.com").await,
        StatusCode::CREATED
    );
}

#[tokio::test]
async fn breakers_are_registered_per_call_site() {
    let h = Harness::new().await;
    let names: Vec<String> = h
        .server
        .breakers
        .snapshots()
        .into_iter()
        .map(|s| s.call_site.to_string())
        .collect();
    assert_eq!(names, vec!["auth.register", "fault.demo"]);
}
