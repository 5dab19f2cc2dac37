use async_trait::async_trait;
use std::sync::Arc;

use crate::util;

/// The ranked entries of one chart, with the query that produced them.
#[derive(Clone)]
pub struct SideEffectInput<Q, C> {
    pub query: Arc<Q>,
    pub selected_candidates: Vec<C>,
}

/// Reacts to a finished ranking (logging which series made the chart,
/// caching the payload) without being able to alter it.
#[async_trait]
pub trait SideEffect<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Skip this side effect for the query.
    fn enable(&self, _query: Arc<Q>) -> bool {
        true
    }

    /// Observe the selection. An `Err` is logged; the chart is served anyway.
    async fn run(&self, input: Arc<SideEffectInput<Q, C>>) -> Result<(), String>;

    /// Name used in `side_effect=` log fields.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
