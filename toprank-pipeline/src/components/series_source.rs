use async_trait::async_trait;

use crate::source::Source;
use crate::types::{Record, SeriesQuery};

/// Serves an already-loaded series.
///
/// The dashboard API aggregates its breakdowns up front, so the records are
/// handed over whole; the source only copies them into the pipeline.
pub struct SeriesSource {
    records: Vec<Record>,
}

impl SeriesSource {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl Source<SeriesQuery, Record> for SeriesSource {
    fn enable(&self, _query: &SeriesQuery) -> bool {
        !self.records.is_empty()
    }

    async fn get_candidates(&self, query: &SeriesQuery) -> Result<Vec<Record>, String> {
        log::debug!(
            "request_id={} serving {} series records",
            query.request_id,
            self.records.len()
        );
        Ok(self.records.clone())
    }
}
