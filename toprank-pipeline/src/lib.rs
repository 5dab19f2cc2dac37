//! Top-N ranking for dashboard series.
//!
//! A series is a list of labeled records such as `{"name": "Spain", "value": 42}`.
//! The dashboard only charts the largest few entries of each breakdown, so the
//! core of this crate is [`components::top_n_selector::select_top_n`] and the
//! sort-key comparators it is built on. Around it sits a small staged pipeline
//! (source, filters, selector, side effects) that the server binary drives.

pub mod candidate_pipeline;
pub mod components;
pub mod error;
pub mod filter;
pub mod pipelines;
pub mod selector;
pub mod series_loader;
pub mod side_effect;
pub mod sort_key;
pub mod source;
pub mod types;
pub mod util;

pub use components::top_n_selector::{select_top_n, top3, TopNSelector, DEFAULT_TOP_N};
pub use error::{RankError, RankResult};
pub use sort_key::{build_comparator, comparator_by, Direction, OrderBy, SortKey};
pub use types::{Record, SeriesQuery};
