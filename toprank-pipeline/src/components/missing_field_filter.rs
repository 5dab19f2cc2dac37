use async_trait::async_trait;

use crate::filter::{Filter, FilterResult};
use crate::types::{Record, SeriesQuery};

/// Drops records that lack any of the query's required fields.
///
/// A field holding `null` counts as missing, the same way a breakdown
/// excludes rows whose grouping column is empty.
pub struct MissingFieldFilter;

#[async_trait]
impl Filter<SeriesQuery, Record> for MissingFieldFilter {
    fn enable(&self, query: &SeriesQuery) -> bool {
        !query.required_fields.is_empty()
    }

    async fn filter(
        &self,
        query: &SeriesQuery,
        candidates: Vec<Record>,
    ) -> Result<FilterResult<Record>, String> {
        Ok(FilterResult::partition(candidates, |r| {
            query.required_fields.iter().all(|f| r.has(f))
        }))
    }
}
