use async_trait::async_trait;

use crate::util;

/// Where series records come from: a loaded file, an API page, a fixture.
///
/// A chart can merge several sources (one breakdown per endpoint); their
/// records are concatenated in the order the sources are listed.
#[async_trait]
pub trait Source<Q, C>: Send + Sync
where
    Q: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    /// Skip this source for the query, e.g. when it holds no records.
    fn enable(&self, _query: &Q) -> bool {
        true
    }

    /// Records for this query. On `Err` the chart is built from the
    /// remaining sources.
    async fn get_candidates(&self, query: &Q) -> Result<Vec<C>, String>;

    /// Name used in `source=` log fields.
    fn name(&self) -> &str {
        util::short_type_name(std::any::type_name::<Self>())
    }
}
