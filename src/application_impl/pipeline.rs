use crate::application_port::*;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use tracing::Instrument;

/// An ordered guard chain. The first guard added is the outermost: it sees
/// the call first and the result last.
pub struct Pipeline<T> {
    guards: Vec<Arc<dyn Guard<T>>>,
}

impl<T: Send + 'static> Default for Pipeline<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Pipeline<T> {
    pub fn new() -> Self {
        Pipeline { guards: Vec::new() }
    }

    pub fn guard(self, guard: impl Guard<T> + 'static) -> Self {
        self.guard_arc(Arc::new(guard))
    }

    pub fn guard_arc(mut self, guard: Arc<dyn Guard<T>>) -> Self {
        self.guards.push(guard);
        self
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    pub async fn run<'a, H, Fut>(&'a self, ctx: CallContext, handler: H) -> GuardResult<T>
    where
        H: FnOnce(CallContext) -> Fut + Send + 'a,
        Fut: Future<Output = GuardResult<T>> + Send + 'a,
    {
        let span = tracing::debug_span!("guarded_call", request_id = %ctx.request_id);
        let handler: Next<'a, T> = Box::new(move |ctx| handler(ctx).boxed());
        self.run_from(0, ctx, handler).instrument(span).await
    }

    fn run_from<'a>(
        &'a self,
        index: usize,
        ctx: CallContext,
        handler: Next<'a, T>,
    ) -> BoxFuture<'a, GuardResult<T>> {
        match self.guards.get(index) {
            Some(guard) => guard.invoke(
                ctx,
                Box::new(move |ctx| self.run_from(index + 1, ctx, handler)),
            ),
            None => handler(ctx),
        }
    }
}
