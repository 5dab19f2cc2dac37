use async_trait::async_trait;
use std::sync::Arc;

use crate::filter::Filter;
use crate::selector::Selector;
use crate::side_effect::{SideEffect, SideEffectInput};
use crate::source::Source;

/// Queries carry a request id so every log line of one run can be correlated.
pub trait HasRequestId {
    fn request_id(&self) -> &str;
}

/// Everything a pipeline run produced, stage by stage.
#[derive(Clone, Debug)]
pub struct PipelineResult<Q, C> {
    pub query: Arc<Q>,
    /// Candidates returned by all enabled sources, in source order.
    pub retrieved_candidates: Vec<C>,
    /// Candidates removed by filters.
    pub filtered_candidates: Vec<C>,
    /// Final selection, best first.
    pub selected_candidates: Vec<C>,
}

/// A staged candidate pipeline:
///
/// 1. sources fetch candidates
/// 2. filters drop candidates, sequentially
/// 3. the selector orders and truncates what is left
/// 4. side effects observe the selection
///
/// A failing source or filter is logged and skipped; it never aborts the run.
#[async_trait]
pub trait CandidatePipeline<Q, C>: Send + Sync
where
    Q: HasRequestId + Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    fn sources(&self) -> &[Box<dyn Source<Q, C>>];

    fn filters(&self) -> &[Box<dyn Filter<Q, C>>];

    fn selector(&self) -> &dyn Selector<Q, C>;

    fn side_effects(&self) -> Arc<Vec<Box<dyn SideEffect<Q, C>>>>;

    /// Upper bound on the number of selected candidates.
    fn result_size(&self) -> usize;

    async fn execute(&self, query: Q) -> PipelineResult<Q, C> {
        let query = Arc::new(query);

        let retrieved_candidates = self.fetch_candidates(&query).await;
        let (kept, filtered_candidates) =
            self.filter_candidates(&query, retrieved_candidates.clone()).await;
        let selected_candidates = self.select_candidates(&query, kept);

        let input = Arc::new(SideEffectInput {
            query: Arc::clone(&query),
            selected_candidates: selected_candidates.clone(),
        });
        self.run_side_effects(input).await;

        PipelineResult {
            query,
            retrieved_candidates,
            filtered_candidates,
            selected_candidates,
        }
    }

    async fn fetch_candidates(&self, query: &Q) -> Vec<C> {
        let mut candidates = Vec::new();
        for source in self.sources().iter().filter(|s| s.enable(query)) {
            match source.get_candidates(query).await {
                Ok(mut fetched) => {
                    log::debug!(
                        "request_id={} source={} fetched {} candidates",
                        query.request_id(),
                        source.name(),
                        fetched.len()
                    );
                    candidates.append(&mut fetched);
                }
                Err(err) => log::warn!(
                    "request_id={} source={} failed: {}",
                    query.request_id(),
                    source.name(),
                    err
                ),
            }
        }
        candidates
    }

    /// Returns `(kept, removed)`.
    async fn filter_candidates(&self, query: &Q, candidates: Vec<C>) -> (Vec<C>, Vec<C>) {
        let mut kept = candidates;
        let mut removed = Vec::new();
        for filter in self.filters().iter().filter(|f| f.enable(query)) {
            let backup = kept.clone();
            match filter.filter(query, kept).await {
                Ok(result) => {
                    log::debug!(
                        "request_id={} filter={} kept {} removed {}",
                        query.request_id(),
                        filter.name(),
                        result.kept.len(),
                        result.removed.len()
                    );
                    kept = result.kept;
                    removed.extend(result.removed);
                }
                Err(err) => {
                    log::warn!(
                        "request_id={} filter={} failed: {}",
                        query.request_id(),
                        filter.name(),
                        err
                    );
                    kept = backup;
                }
            }
        }
        (kept, removed)
    }

    fn select_candidates(&self, query: &Q, candidates: Vec<C>) -> Vec<C> {
        let selector = self.selector();
        let mut selected = if selector.enable(query) {
            selector.select(query, candidates)
        } else {
            candidates
        };
        selected.truncate(self.result_size());
        selected
    }

    async fn run_side_effects(&self, input: Arc<SideEffectInput<Q, C>>) {
        let side_effects = self.side_effects();
        for side_effect in side_effects.iter() {
            if !side_effect.enable(Arc::clone(&input.query)) {
                continue;
            }
            if let Err(err) = side_effect.run(Arc::clone(&input)).await {
                log::warn!(
                    "request_id={} side_effect={} failed: {}",
                    input.query.request_id(),
                    side_effect.name(),
                    err
                );
            }
        }
    }
}
