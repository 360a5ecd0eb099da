use super::circuit_breaker::{BreakerConfig, CircuitBreaker};
use crate::domain_model::*;
use crate::domain_port::Clock;
use dashmap::DashMap;
use std::sync::Arc;

/// Owns every breaker in the process, one per call site. Created once at
/// startup and handed to whoever wires call sites together.
pub struct BreakerRegistry {
    clock: Arc<dyn Clock>,
    defaults: BreakerConfig,
    breakers: DashMap<CallSiteId, Arc<CircuitBreaker>>,
}

impl BreakerRegistry {
    pub fn new(clock: Arc<dyn Clock>, defaults: BreakerConfig) -> Self {
        BreakerRegistry {
            clock,
            defaults,
            breakers: DashMap::new(),
        }
    }

    pub fn defaults(&self) -> &BreakerConfig {
        &self.defaults
    }

    pub fn breaker(&self, call_site: impl Into<CallSiteId>) -> Arc<CircuitBreaker> {
        self.breaker_with(call_site, self.defaults)
    }

    /// Returns the call site's breaker, creating it with `config` on first use.
    /// A breaker that already exists keeps the config it was created with.
    pub fn breaker_with(
        &self,
        call_site: impl Into<CallSiteId>,
        config: BreakerConfig,
    ) -> Arc<CircuitBreaker> {
        let call_site = call_site.into();
        self.breakers
            .entry(call_site.clone())
            .or_insert_with(|| {
                Arc::new(CircuitBreaker::new(call_site, config, self.clock.clone()))
            })
            .value()
            .clone()
    }

    pub fn get(&self, call_site: &CallSiteId) -> Option<Arc<CircuitBreaker>> {
        self.breakers.get(call_site).map(|entry| entry.value().clone())
    }

    pub fn snapshots(&self) -> Vec<BreakerSnapshot> {
        let mut snapshots: Vec<BreakerSnapshot> = self
            .breakers
            .iter()
            .map(|entry| entry.value().snapshot())
            .collect();
        snapshots.sort_by(|a, b| a.call_site.as_str().cmp(b.call_site.as_str()));
        snapshots
    }

    pub fn reset_all(&self) {
        for entry in self.breakers.iter() {
            entry.value().reset();
        }
    }
}
