use async_trait::async_trait;
use std::sync::Arc;

use crate::side_effect::{SideEffect, SideEffectInput};
use crate::types::{Record, SeriesQuery};

/// Logs the selected series so a dashboard run can be traced afterwards.
pub struct SelectionLogSideEffect;

/// Placeholder for entries that carry no label field.
const UNLABELED: &str = "?";

/// Comma-separated labels of the selection, best first.
fn describe(selected: &[Record]) -> String {
    selected
        .iter()
        .map(|r| r.label().unwrap_or(UNLABELED))
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl SideEffect<SeriesQuery, Record> for SelectionLogSideEffect {
    async fn run(&self, input: Arc<SideEffectInput<SeriesQuery, Record>>) -> Result<(), String> {
        log::info!(
            "request_id={} selected {} series: [{}]",
            input.query.request_id,
            input.selected_candidates.len(),
            describe(&input.selected_candidates)
        );
        Ok(())
    }
}
