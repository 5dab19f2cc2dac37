use async_trait::async_trait;

use crate::filter::{Filter, FilterResult};
use crate::types::{Record, SeriesQuery};

/// Filters out records whose `value` is below the query's threshold.
///
/// Records without a numeric `value` cannot meet any threshold and are
/// removed too.
pub struct MinValueFilter;

#[async_trait]
impl Filter<SeriesQuery, Record> for MinValueFilter {
    fn enable(&self, query: &SeriesQuery) -> bool {
        query.min_value.is_some()
    }

    async fn filter(
        &self,
        query: &SeriesQuery,
        candidates: Vec<Record>,
    ) -> Result<FilterResult<Record>, String> {
        let min = query
            .min_value
            .ok_or_else(|| "min_value not set on query".to_string())?;

        Ok(FilterResult::partition(candidates, |r| {
            r.value().is_some_and(|v| v >= min)
        }))
    }
}
