use async_trait::async_trait;
use std::sync::Arc;

use crate::candidate_pipeline::CandidatePipeline;
use crate::components::min_value_filter::MinValueFilter;
use crate::components::missing_field_filter::MissingFieldFilter;
use crate::components::selection_log_side_effect::SelectionLogSideEffect;
use crate::components::series_source::SeriesSource;
use crate::components::top_n_selector::{TopNSelector, DEFAULT_TOP_N};
use crate::filter::Filter;
use crate::selector::Selector;
use crate::side_effect::SideEffect;
use crate::sort_key::OrderBy;
use crate::source::Source;
use crate::types::{Record, SeriesQuery};

/// The chart feed pipeline: ranks one series and keeps its top entries.
///
/// Pipeline flow:
/// 1. SeriesSource serves the loaded records
/// 2. MissingFieldFilter drops records lacking a required field
/// 3. MinValueFilter drops records below the query's threshold
/// 4. TopNSelector orders what is left and keeps the top N
/// 5. SelectionLogSideEffect logs the selection
pub struct TopSeriesPipeline {
    sources: Vec<Box<dyn Source<SeriesQuery, Record>>>,
    filters: Vec<Box<dyn Filter<SeriesQuery, Record>>>,
    selector: TopNSelector,
    side_effects: Arc<Vec<Box<dyn SideEffect<SeriesQuery, Record>>>>,
    result_size: usize,
}

impl TopSeriesPipeline {
    /// Top three by largest `value`, as the dashboard charts them.
    pub fn with_records(records: Vec<Record>) -> Self {
        Self::with_records_and_order(records, OrderBy::default(), DEFAULT_TOP_N)
    }

    /// Create a pipeline with a custom ordering and result size.
    pub fn with_records_and_order(records: Vec<Record>, order: OrderBy, result_size: usize) -> Self {
        let sources: Vec<Box<dyn Source<SeriesQuery, Record>>> =
            vec![Box::new(SeriesSource::new(records))];

        let filters: Vec<Box<dyn Filter<SeriesQuery, Record>>> =
            vec![Box::new(MissingFieldFilter), Box::new(MinValueFilter)];

        let selector = TopNSelector::new(result_size).by(order);

        let side_effects: Arc<Vec<Box<dyn SideEffect<SeriesQuery, Record>>>> =
            Arc::new(vec![Box::new(SelectionLogSideEffect)]);

        Self {
            sources,
            filters,
            selector,
            side_effects,
            result_size,
        }
    }
}

#[async_trait]
impl CandidatePipeline<SeriesQuery, Record> for TopSeriesPipeline {
    fn sources(&self) -> &[Box<dyn Source<SeriesQuery, Record>>] {
        &self.sources
    }

    fn filters(&self) -> &[Box<dyn Filter<SeriesQuery, Record>>] {
        &self.filters
    }

    fn selector(&self) -> &dyn Selector<SeriesQuery, Record> {
        &self.selector
    }

    fn side_effects(&self) -> Arc<Vec<Box<dyn SideEffect<SeriesQuery, Record>>>> {
        Arc::clone(&self.side_effects)
    }

    fn result_size(&self) -> usize {
        self.result_size
    }
}
