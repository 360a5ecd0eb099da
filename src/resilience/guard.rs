use super::circuit_breaker::CircuitBreaker;
use crate::application_port::*;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::sync::Arc;

/// Produces the substitute result served while a circuit is open.
pub type Fallback<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// Routes the rest of a guard chain through a circuit breaker.
pub struct BreakerGuard<T> {
    breaker: Arc<CircuitBreaker>,
    fallback: Fallback<T>,
}

impl<T> BreakerGuard<T> {
    pub fn new(breaker: Arc<CircuitBreaker>, fallback: Fallback<T>) -> Self {
        BreakerGuard { breaker, fallback }
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }
}

impl<T: Send + 'static> Guard<T> for BreakerGuard<T> {
    fn invoke<'a>(&'a self, ctx: CallContext, next: Next<'a, T>) -> BoxFuture<'a, GuardResult<T>> {
        let fallback = self.fallback.clone();
        async move { self.breaker.call(move || next(ctx), move || fallback()).await }.boxed()
    }
}
