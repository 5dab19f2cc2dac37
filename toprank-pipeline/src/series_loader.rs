//! Series data loader.
//!
//! Reads dashboard series from CSV or JSON into [`Record`]s.
//!
//! CSV: a header row names the fields. Cells that parse as numbers become
//! numbers, empty cells become `null`, anything else stays a string.
//!
//! JSON: either an array of objects, or the paginated envelope the dashboard
//! API returns (`{"count": .., "results": [...]}`).

use std::io::Read;
use std::path::Path;

use serde_json::{Map, Number, Value};

use crate::error::{RankError, RankResult};
use crate::types::{Record, VALUE_FIELD};

/// Key holding the record list in a paginated API response.
const RESULTS_KEY: &str = "results";

fn parse_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = cell.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(u) = cell.parse::<u64>() {
        return Value::Number(u.into());
    }
    match cell.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(n) => Value::Number(n),
        None => Value::String(cell.to_string()),
    }
}

/// Wrap a CSV error with the line its record starts on. Quoted cells may
/// span lines, so the count comes from the reader, not the row index.
fn csv_error(source: csv::Error, reader_pos: &csv::Position) -> RankError {
    let line = source.position().unwrap_or(reader_pos).line();
    RankError::Csv { line, source }
}

/// Load series records from a CSV reader.
pub fn load_series_csv<R: Read>(reader: R) -> RankResult<Vec<Record>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = match csv_reader.headers() {
        Ok(headers) => headers.clone(),
        Err(source) => return Err(csv_error(source, csv_reader.position())),
    };

    let mut records = Vec::new();
    let mut row = csv::StringRecord::new();
    loop {
        match csv_reader.read_record(&mut row) {
            Ok(true) => {}
            Ok(false) => break,
            Err(source) => return Err(csv_error(source, csv_reader.position())),
        }
        let fields: Map<String, Value> = headers
            .iter()
            .zip(row.iter())
            .map(|(name, cell)| (name.to_string(), parse_cell(cell)))
            .collect();
        records.push(Record::from(fields));
    }

    Ok(records)
}

fn records_from_array(items: Vec<Value>) -> RankResult<Vec<Record>> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(fields) => Ok(Record::from(fields)),
            other => Err(RankError::InvalidShape(format!(
                "item {} is not an object: {}",
                i, other
            ))),
        })
        .collect()
}

/// Load series records from a JSON reader.
pub fn load_series_json<R: Read>(reader: R) -> RankResult<Vec<Record>> {
    let document: Value = serde_json::from_reader(reader)?;
    match document {
        Value::Array(items) => records_from_array(items),
        Value::Object(mut envelope) => match envelope.remove(RESULTS_KEY) {
            Some(Value::Array(items)) => records_from_array(items),
            _ => Err(RankError::InvalidShape(format!(
                "expected an array or an object with a '{}' array",
                RESULTS_KEY
            ))),
        },
        other => Err(RankError::InvalidShape(format!(
            "expected an array of records, got {}",
            other
        ))),
    }
}

/// Load series records from a file, picking the format by extension.
pub fn load_series_file(path: &str) -> RankResult<Vec<Record>> {
    let extension = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let open = || {
        std::fs::File::open(path).map_err(|source| RankError::Io {
            path: path.to_string(),
            source,
        })
    };

    match extension.as_str() {
        "csv" => load_series_csv(open()?),
        "json" => load_series_json(open()?),
        _ => Err(RankError::UnsupportedFormat(format!(
            "'{}' (expected .csv or .json)",
            path
        ))),
    }
}

/// Copy `field` into `value` on every record that has it.
///
/// Breakdown endpoints report counts under names like `total`; ranking always
/// reads `value`. Records without the field are left untouched.
pub fn normalize_value(records: Vec<Record>, field: &str) -> Vec<Record> {
    if field == VALUE_FIELD {
        return records;
    }
    records
        .into_iter()
        .map(|mut record| {
            if let Some(v) = record.get(field).cloned() {
                record.set(VALUE_FIELD, v);
            }
            record
        })
        .collect()
}
