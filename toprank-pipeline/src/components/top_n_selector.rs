use std::cmp::Ordering;

use crate::selector::Selector;
use crate::sort_key::{build_comparator, OrderBy};
use crate::types::Record;

/// Number of entries a dashboard chart shows.
pub const DEFAULT_TOP_N: usize = 3;

/// Return the `n` records with the largest `value`, largest first.
///
/// Collections with at most `n` records come back unchanged, in their
/// original order. Otherwise a copy is sorted, so the caller's slice is never
/// reordered. Records with equal values keep their relative input order.
pub fn select_top_n(records: &[Record], n: usize) -> Vec<Record> {
    if records.len() <= n {
        return records.to_vec();
    }

    let largest_first = build_comparator("-value");
    let mut sorted = records.to_vec();
    sorted.sort_by(largest_first);
    sorted.truncate(n);
    sorted
}

/// [`select_top_n`] with the chart's fixed size of three.
pub fn top3(records: &[Record]) -> Vec<Record> {
    select_top_n(records, DEFAULT_TOP_N)
}

/// Selects the top N records under an arbitrary ordering.
///
/// With the default ordering (`-value`) this behaves exactly like
/// [`select_top_n`].
#[derive(Clone, Debug)]
pub struct TopNSelector {
    pub n: usize,
    pub order: OrderBy,
}

impl Default for TopNSelector {
    fn default() -> Self {
        Self {
            n: DEFAULT_TOP_N,
            order: OrderBy::default(),
        }
    }
}

impl TopNSelector {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            ..Self::default()
        }
    }

    pub fn by(mut self, order: OrderBy) -> Self {
        self.order = order;
        self
    }
}

impl<Q> Selector<Q, Record> for TopNSelector
where
    Q: Clone + Send + Sync + 'static,
{
    fn select(&self, _query: &Q, candidates: Vec<Record>) -> Vec<Record> {
        if candidates.len() <= self.n {
            return candidates;
        }
        let mut sorted = Selector::<Q, Record>::sort(self, candidates);
        sorted.truncate(self.n);
        sorted
    }

    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        self.order.compare(a, b)
    }

    fn size(&self) -> Option<usize> {
        Some(self.n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort_key::SortKey;
    use crate::types::SeriesQuery;

    fn values(records: &[Record]) -> Vec<f64> {
        records.iter().filter_map(Record::value).collect()
    }

    fn series(vs: &[i64]) -> Vec<Record> {
        vs.iter()
            .enumerate()
            .map(|(i, v)| Record::series(format!("s{}", i), *v))
            .collect()
    }

    #[test]
    fn picks_three_largest_descending() {
        let records = series(&[5, 1, 9, 3]);
        assert_eq!(values(&top3(&records)), vec![9.0, 5.0, 3.0]);
    }

    #[test]
    fn short_input_is_returned_unchanged() {
        let records = series(&[1, 2]);
        assert_eq!(top3(&records), records);
        let records = series(&[3, 1, 2]);
        assert_eq!(top3(&records), records);
        assert!(top3(&[]).is_empty());
    }

    #[test]
    fn input_slice_is_not_reordered() {
        let records = series(&[5, 1, 9, 3]);
        let before = records.clone();
        let _ = top3(&records);
        assert_eq!(records, before);
    }

    #[test]
    fn ties_keep_input_order() {
        let records = series(&[7, 2, 7, 1]);
        let top = top3(&records);
        let labels: Vec<_> = top.iter().filter_map(Record::label).collect();
        assert_eq!(labels, vec!["s0", "s2", "s1"]);
    }

    #[test]
    fn zero_n_selects_nothing_from_non_empty_input() {
        assert!(select_top_n(&series(&[1]), 0).is_empty());
        assert!(select_top_n(&[], 0).is_empty());
    }

    #[test]
    fn records_without_value_rank_last() {
        let mut records = series(&[4, 8, 6]);
        records.insert(1, Record::new().with("label", "no value"));
        records.push(Record::new().with("label", "text").with("value", "n/a"));
        let top = top3(&records);
        assert_eq!(values(&top), vec![8.0, 6.0, 4.0]);
    }

    #[test]
    fn mixed_integer_and_float_values_beyond_f64_precision() {
        let records = vec![
            Record::series("int", 9_007_199_254_740_992_i64),
            Record::series("float", 9_007_199_254_740_992.0_f64),
            Record::series("above", 9_007_199_254_740_993_i64),
            Record::series("small", 1),
        ];
        let top = select_top_n(&records, 1);
        assert_eq!(top[0].label(), Some("above"));
        let top = top3(&records);
        let labels: Vec<_> = top.iter().filter_map(Record::label).collect();
        assert_eq!(labels, vec!["above", "int", "float"]);
    }

    #[test]
    fn selector_trait_matches_free_function() {
        let selector = TopNSelector::default();
        let query = SeriesQuery::new("t");
        let records = series(&[5, 1, 9, 3, 9]);
        let via_trait = selector.select(&query, records.clone());
        assert_eq!(via_trait, top3(&records));
        assert_eq!(Selector::<SeriesQuery, Record>::size(&selector), Some(3));
        assert_eq!(Selector::<SeriesQuery, Record>::name(&selector), "TopNSelector");
    }

    #[test]
    fn selector_with_custom_order() {
        let selector = TopNSelector::new(2).by(
            OrderBy::from(SortKey::descending("total")).then(SortKey::ascending("name")),
        );
        let records = vec![
            Record::new().with("name", "c").with("total", 3),
            Record::new().with("name", "b").with("total", 5),
            Record::new().with("name", "a").with("total", 5),
        ];
        let selected = selector.select(&SeriesQuery::new("t"), records);
        let names: Vec<_> = selected.iter().filter_map(Record::label).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
