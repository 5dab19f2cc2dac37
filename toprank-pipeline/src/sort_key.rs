//! Sort keys and the comparators built from them.
//!
//! A key is a field name, optionally prefixed with `-` for descending order:
//! `"value"` sorts smallest first, `"-value"` largest first. An [`OrderBy`] is
//! a comma-separated list of keys where later keys break ties left by earlier
//! ones, e.g. `"total,name"`.
//!
//! Every comparator produced here is a total order, so it can be handed to
//! `slice::sort_by` for any input, including records with missing fields or
//! values of mixed JSON types.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::types::Record;

/// Prefix marking a key as descending.
const DESCENDING_PREFIX: char = '-';

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    /// Apply this direction to an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

// ---------------------------------------------------------------------------
// Value ordering
// ---------------------------------------------------------------------------

/// Rank of a value's kind. Values of different kinds order by this rank;
/// a missing field ranks with `null`. Numbers rank highest so a record with a
/// malformed value never outranks a numeric one in a largest-first ordering.
fn kind_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Object(_)) => 1,
        Some(Value::Array(_)) => 2,
        Some(Value::Bool(_)) => 3,
        Some(Value::String(_)) => 4,
        Some(Value::Number(_)) => 5,
    }
}

/// A JSON number widened so integers of either sign compare exactly.
enum Numeric {
    Int(i128),
    Float(f64),
}

impl Numeric {
    fn of(n: &serde_json::Number) -> Self {
        if let Some(i) = n.as_i64() {
            Numeric::Int(i128::from(i))
        } else if let Some(u) = n.as_u64() {
            Numeric::Int(i128::from(u))
        } else {
            Numeric::Float(n.as_f64().unwrap_or(0.0))
        }
    }
}

/// 2^127 as a float; every finite float below it truncates into an `i128`.
const I128_BOUND: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

/// Exact comparison of an integer with a finite float.
fn compare_int_float(i: i128, f: f64) -> Ordering {
    if f >= I128_BOUND {
        return Ordering::Less;
    }
    if f < -I128_BOUND {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    match i.cmp(&(whole as i128)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(f - whole)).unwrap_or(Ordering::Equal),
        unequal => unequal,
    }
}

/// Numeric ordering by exact value, so mixed integer/float comparisons stay
/// transitive past 2^53.
fn compare_numbers(a: &serde_json::Number, b: &serde_json::Number) -> Ordering {
    match (Numeric::of(a), Numeric::of(b)) {
        (Numeric::Int(x), Numeric::Int(y)) => x.cmp(&y),
        (Numeric::Int(x), Numeric::Float(y)) => compare_int_float(x, y),
        (Numeric::Float(x), Numeric::Int(y)) => compare_int_float(y, x).reverse(),
        // JSON floats are finite; -0.0 and 0.0 are equal, as they are to 0.
        (Numeric::Float(x), Numeric::Float(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
    }
}

/// Natural ascending ordering of two (possibly missing) field values.
///
/// Numbers compare numerically, strings lexicographically and booleans
/// `false < true`. Arrays and objects are not ordered among themselves and
/// compare equal. Values of different kinds are ordered by kind:
/// missing/`null` < object < array < bool < string < number.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => compare_numbers(x, y),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

// ---------------------------------------------------------------------------
// SortKey
// ---------------------------------------------------------------------------

/// A field name plus the direction to order it in.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SortKey {
    field: String,
    direction: Direction,
}

impl SortKey {
    /// Parse `"field"` or `"-field"`.
    ///
    /// Never fails: `""` and `"-"` produce an empty field name, which no record
    /// carries, so every pair of records compares equal under it.
    pub fn parse(key: &str) -> Self {
        match key.strip_prefix(DESCENDING_PREFIX) {
            Some(field) => Self::descending(field),
            None => Self::ascending(key),
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        self.direction
            .apply(compare_values(a.get(&self.field), b.get(&self.field)))
    }
}

impl FromStr for SortKey {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Direction::Ascending => write!(f, "{}", self.field),
            Direction::Descending => write!(f, "{}{}", DESCENDING_PREFIX, self.field),
        }
    }
}

/// Build a record comparator from a sort key string such as `"value"` or
/// `"-value"`.
pub fn build_comparator(key: &str) -> impl Fn(&Record, &Record) -> Ordering {
    let key = SortKey::parse(key);
    move |a, b| key.compare(a, b)
}

/// Build a comparator from an extraction function instead of a field name.
///
/// Values that are not comparable with themselves (`f64::NAN`) rank below
/// everything else, which keeps the ordering total for floating point keys.
pub fn comparator_by<T, K, F>(extract: F, direction: Direction) -> impl Fn(&T, &T) -> Ordering
where
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    move |a, b| {
        let ka = extract(a);
        let kb = extract(b);
        // Explicit total ordering: self-incomparable keys go first (Less)
        let ordering = match (ka.partial_cmp(&ka).is_none(), kb.partial_cmp(&kb).is_none()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => ka.partial_cmp(&kb).unwrap_or(Ordering::Equal),
        };
        direction.apply(ordering)
    }
}

// ---------------------------------------------------------------------------
// OrderBy
// ---------------------------------------------------------------------------

/// An ordered list of sort keys; later keys break ties left by earlier ones.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OrderBy {
    keys: Vec<SortKey>,
}

impl OrderBy {
    pub fn new(keys: Vec<SortKey>) -> Self {
        Self { keys }
    }

    /// Parse a comma-separated key list such as `"-total,name"`.
    /// Blank entries are skipped; an empty list orders nothing.
    pub fn parse(spec: &str) -> Self {
        let keys = spec
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(SortKey::parse)
            .collect();
        Self { keys }
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    /// Append a tie-breaking key.
    pub fn then(mut self, key: SortKey) -> Self {
        self.keys.push(key);
        self
    }

    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        self.keys
            .iter()
            .map(|key| key.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

/// Largest `value` first.
impl Default for OrderBy {
    fn default() -> Self {
        Self::new(vec![SortKey::descending(crate::types::VALUE_FIELD)])
    }
}

impl From<SortKey> for OrderBy {
    fn from(key: SortKey) -> Self {
        Self::new(vec![key])
    }
}

impl FromStr for OrderBy {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self.keys.iter().map(SortKey::to_string).collect();
        write!(f, "{}", keys.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(value: i64) -> Record {
        Record::new().with("value", value)
    }

    #[test]
    fn ascending_key_orders_smaller_first() {
        let cmp = build_comparator("value");
        assert_eq!(cmp(&v(1), &v(2)), Ordering::Less);
        assert_eq!(cmp(&v(2), &v(1)), Ordering::Greater);
        assert_eq!(cmp(&v(2), &v(2)), Ordering::Equal);
    }

    #[test]
    fn descending_key_negates() {
        let cmp = build_comparator("-value");
        assert_eq!(cmp(&v(1), &v(2)), Ordering::Greater);
        assert_eq!(cmp(&v(2), &v(1)), Ordering::Less);
    }

    #[test]
    fn parse_strips_only_leading_dash() {
        let key = SortKey::parse("-net-total");
        assert_eq!(key.field(), "net-total");
        assert_eq!(key.direction(), Direction::Descending);
        assert_eq!(key.to_string(), "-net-total");

        let key: SortKey = "total".parse().unwrap();
        assert_eq!(key.field(), "total");
        assert_eq!(key.direction(), Direction::Ascending);
    }

    #[test]
    fn degenerate_keys_compare_everything_equal() {
        for key in ["", "-"] {
            let cmp = build_comparator(key);
            assert_eq!(cmp(&v(1), &v(9)), Ordering::Equal, "key {:?}", key);
        }
        assert_eq!(SortKey::parse("-").field(), "");
    }

    #[test]
    fn strings_and_mixed_kinds() {
        let cmp = build_comparator("name");
        let a = Record::new().with("name", "Austria");
        let b = Record::new().with("name", "Belgium");
        assert_eq!(cmp(&a, &b), Ordering::Less);

        // missing < string < number
        let missing = Record::new();
        let num = Record::new().with("name", 3);
        assert_eq!(cmp(&missing, &a), Ordering::Less);
        assert_eq!(cmp(&a, &num), Ordering::Less);
        assert_eq!(cmp(&missing, &Record::new().with("name", json!(null))), Ordering::Equal);
    }

    #[test]
    fn integers_and_floats_compare_numerically() {
        let cmp = build_comparator("value");
        let int = v(2);
        let float = Record::new().with("value", 2.5);
        assert_eq!(cmp(&int, &float), Ordering::Less);
        let big = Record::new().with("value", u64::MAX);
        assert_eq!(cmp(&int, &big), Ordering::Less);
    }

    #[test]
    fn integer_and_float_compare_exactly_past_f64_precision() {
        let cmp = build_comparator("value");
        let above = Record::new().with("value", 9_007_199_254_740_993_i64);
        let float = Record::new().with("value", 9_007_199_254_740_992.0_f64);
        let int = Record::new().with("value", 9_007_199_254_740_992_i64);
        assert_eq!(cmp(&above, &float), Ordering::Greater);
        assert_eq!(cmp(&float, &int), Ordering::Equal);
        assert_eq!(cmp(&above, &int), Ordering::Greater);
        assert_eq!(cmp(&float, &above), Ordering::Less);

        let half = Record::new().with("value", 2.5);
        assert_eq!(cmp(&Record::new().with("value", 2), &half), Ordering::Less);
        assert_eq!(cmp(&Record::new().with("value", 3), &half), Ordering::Greater);
        let negative = Record::new().with("value", -2.5);
        assert_eq!(cmp(&Record::new().with("value", -2), &negative), Ordering::Greater);
        assert_eq!(cmp(&Record::new().with("value", -3), &negative), Ordering::Less);
    }

    #[test]
    fn signed_zeros_equal_integer_zero() {
        let cmp = build_comparator("value");
        let zero = Record::new().with("value", 0);
        let pos = Record::new().with("value", 0.0);
        let neg = Record::new().with("value", -0.0);
        assert_eq!(cmp(&zero, &pos), Ordering::Equal);
        assert_eq!(cmp(&zero, &neg), Ordering::Equal);
        assert_eq!(cmp(&pos, &neg), Ordering::Equal);
    }

    #[test]
    fn huge_floats_beyond_every_integer() {
        let cmp = build_comparator("value");
        let max = Record::new().with("value", u64::MAX);
        let huge = Record::new().with("value", 1e300);
        assert_eq!(cmp(&max, &huge), Ordering::Less);
        assert_eq!(cmp(&Record::new().with("value", -1e300), &max), Ordering::Less);
    }

    #[test]
    fn order_by_breaks_ties_with_later_keys() {
        let order = OrderBy::parse("total, name");
        assert_eq!(order.keys().len(), 2);
        let a = Record::new().with("total", 5).with("name", "b");
        let b = Record::new().with("total", 5).with("name", "a");
        let c = Record::new().with("total", 4).with("name", "z");
        assert_eq!(order.compare(&a, &b), Ordering::Greater);
        assert_eq!(order.compare(&c, &a), Ordering::Less);
        assert_eq!(order.to_string(), "total,name");
    }

    #[test]
    fn empty_order_by_is_all_equal() {
        let order = OrderBy::parse(" , ");
        assert!(order.keys().is_empty());
        assert_eq!(order.compare(&v(1), &v(2)), Ordering::Equal);
    }

    #[test]
    fn default_order_is_largest_value_first() {
        let order = OrderBy::default();
        assert_eq!(order.to_string(), "-value");
        assert_eq!(order.compare(&v(9), &v(1)), Ordering::Less);
    }

    #[test]
    fn extractor_comparator_handles_nan() {
        let cmp = comparator_by(|x: &f64| *x, Direction::Descending);
        let mut xs = vec![1.0, f64::NAN, 3.0, 2.0];
        xs.sort_by(&cmp);
        assert_eq!(&xs[..3], &[3.0, 2.0, 1.0]);
        assert!(xs[3].is_nan());

        let asc = comparator_by(|s: &&str| s.len(), Direction::Ascending);
        assert_eq!(asc(&"ab", &"abc"), Ordering::Less);
    }
}
