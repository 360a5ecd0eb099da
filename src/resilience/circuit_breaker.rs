//! Circuit breaker for volatile call sites.
//!
//! # State Transitions
//! ```text
//! Closed → Open:     consecutive_failures >= failure_threshold
//! Open → HalfOpen:   recovery_timeout elapsed since opened_at
//! HalfOpen → Closed: probe succeeds
//! HalfOpen → Open:   probe fails (opened_at restarts)
//! ```
//!
//! Closed propagates the operation's own failure. Only Open, and a failed
//! probe, hand back the fallback. While the probe is in flight every other
//! caller gets the fallback.

use crate::domain_model::*;
use crate::domain_port::Clock;
use crate::logger::*;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// How a failed protected call should be treated by the breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The volatile dependency misbehaved. Always counted.
    Upstream,
    /// A business outcome such as a duplicate or a missing record. Counted
    /// only when the call site opts in.
    Domain,
    /// The caller was turned away before reaching the dependency. Never counted.
    Rejected,
}

pub trait BreakerFailure {
    fn failure_class(&self) -> FailureClass;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerConfig {
    pub failure_threshold: u32,
    pub recovery_timeout: Duration,
    pub count_domain_errors: bool,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        BreakerConfig {
            failure_threshold: 2,
            recovery_timeout: Duration::from_secs(60),
            count_domain_errors: false,
        }
    }
}

impl BreakerConfig {
    fn counts(&self, class: FailureClass) -> bool {
        match class {
            FailureClass::Upstream => true,
            FailureClass::Domain => self.count_domain_errors,
            FailureClass::Rejected => false,
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at: Option<DateTime<Utc>>,
    probe_in_flight: bool,
}

impl Inner {
    fn closed() -> Self {
        Inner {
            state: BreakerState::Closed,
            consecutive_failures: 0,
            opened_at: None,
            probe_in_flight: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Permit {
    Pass,
    Probe,
    Reject,
}

/// Releases the probe slot if the probe future is dropped before it settles.
struct Ticket<'a> {
    breaker: &'a CircuitBreaker,
    permit: Permit,
    settled: bool,
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        if !self.settled && self.permit == Permit::Probe {
            debug!(call_site = %self.breaker.call_site, "probe abandoned");
            self.breaker.release(self.permit);
        }
    }
}

pub struct CircuitBreaker {
    call_site: CallSiteId,
    config: BreakerConfig,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(
        call_site: impl Into<CallSiteId>,
        config: BreakerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        CircuitBreaker {
            call_site: call_site.into(),
            config,
            clock,
            inner: Mutex::new(Inner::closed()),
        }
    }

    pub fn call_site(&self) -> &CallSiteId {
        &self.call_site
    }

    pub fn config(&self) -> &BreakerConfig {
        &self.config
    }

    pub fn state(&self) -> BreakerState {
        self.lock().state
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.lock();
        BreakerSnapshot {
            call_site: self.call_site.clone(),
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            opened_at: inner.opened_at,
        }
    }

    pub fn reset(&self) {
        *self.lock() = Inner::closed();
    }

    /// Runs `operation` unless the circuit is open, in which case `fallback`
    /// is returned without touching the operation.
    pub async fn call<T, E, F, Fut, Fb>(&self, operation: F, fallback: Fb) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        Fb: FnOnce() -> T,
        E: BreakerFailure + std::fmt::Display,
    {
        let permit = self.acquire();
        if permit == Permit::Reject {
            debug!(call_site = %self.call_site, "circuit open, serving fallback");
            return Ok(fallback());
        }

        let mut ticket = Ticket {
            breaker: self,
            permit,
            settled: false,
        };
        let result = operation().await;
        ticket.settled = true;

        match result {
            Ok(value) => {
                self.on_success(permit);
                Ok(value)
            }
            Err(error) if !self.config.counts(error.failure_class()) => {
                self.release(permit);
                Err(error)
            }
            Err(error) => {
                self.on_failure(permit);
                if permit == Permit::Probe {
                    warn!(call_site = %self.call_site, "probe failed: {}", error);
                    Ok(fallback())
                } else {
                    Err(error)
                }
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn recovery_elapsed(&self, opened_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match opened_at {
            Some(opened_at) => (now - opened_at)
                .to_std()
                .map(|elapsed| elapsed >= self.config.recovery_timeout)
                .unwrap_or(false),
            None => true,
        }
    }

    fn acquire(&self) -> Permit {
        let now = self.clock.now();
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed => Permit::Pass,
            BreakerState::Open => {
                if !self.recovery_elapsed(inner.opened_at, now) {
                    return Permit::Reject;
                }
                inner.state = BreakerState::HalfOpen;
                inner.opened_at = None;
                inner.probe_in_flight = true;
                info!(call_site = %self.call_site, "circuit half-open, probing");
                Permit::Probe
            }
            BreakerState::HalfOpen => {
                if inner.probe_in_flight {
                    Permit::Reject
                } else {
                    inner.probe_in_flight = true;
                    Permit::Probe
                }
            }
        }
    }

    fn on_success(&self, permit: Permit) {
        let mut inner = self.lock();
        match permit {
            Permit::Probe => {
                inner.state = BreakerState::Closed;
                inner.consecutive_failures = 0;
                inner.probe_in_flight = false;
                info!(call_site = %self.call_site, "circuit closed");
            }
            // A late success from before the circuit opened must not close it.
            Permit::Pass if inner.state == BreakerState::Closed => {
                inner.consecutive_failures = 0;
            }
            _ => {}
        }
    }

    fn on_failure(&self, permit: Permit) {
        let now = self.clock.now();
        let mut inner = self.lock();
        match permit {
            Permit::Probe => {
                inner.state = BreakerState::Open;
                inner.opened_at = Some(now);
                inner.probe_in_flight = false;
                inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
                warn!(call_site = %self.call_site, "circuit re-opened");
            }
            Permit::Pass if inner.state == BreakerState::Closed => {
                inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);
                if inner.consecutive_failures >= self.config.failure_threshold.max(1) {
                    inner.state = BreakerState::Open;
                    inner.opened_at = Some(now);
                    warn!(
                        call_site = %self.call_site,
                        failures = inner.consecutive_failures,
                        "circuit opened"
                    );
                }
            }
            _ => {}
        }
    }

    fn release(&self, permit: Permit) {
        if permit == Permit::Probe {
            self.lock().probe_in_flight = false;
        }
    }
}
