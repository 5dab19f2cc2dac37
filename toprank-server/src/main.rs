use std::env;
use std::process;
use std::time::Instant;

use chrono::Utc;
use env_logger::Env;
use serde::Serialize;

use toprank_pipeline::candidate_pipeline::{CandidatePipeline, PipelineResult};
use toprank_pipeline::pipelines::top_series::TopSeriesPipeline;
use toprank_pipeline::series_loader::{load_series_file, normalize_value};
use toprank_pipeline::{OrderBy, Record, SeriesQuery, DEFAULT_TOP_N};

// ---------------------------------------------------------------------------
// JSON output contract
// ---------------------------------------------------------------------------

/// Chart payload: the ranked entries plus enough context to caption them.
#[derive(Serialize)]
struct ChartJson {
    generated_at: String,
    order: String,
    pipeline_ms: u128,
    series: Vec<PointJson>,
    summary: SummaryJson,
}

#[derive(Serialize)]
struct PointJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    value: Option<f64>,
    record: Record,
}

#[derive(Serialize)]
struct SummaryJson {
    records_loaded: usize,
    records_filtered_out: usize,
    selected: usize,
    selected_total: f64,
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

struct Options {
    path: String,
    field: Option<String>,
    order: OrderBy,
    top: usize,
    required_fields: Vec<String>,
    min_value: Option<f64>,
    json_output: bool,
}

fn usage() -> ! {
    eprintln!("Usage: toprank-server <series.csv|series.json> [--field F] [--order KEYS] [--top N] [--require F1,F2] [--min X] [--json]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --field    Field to rank by, copied into `value` (default: value)");
    eprintln!("  --order    Comma-separated sort keys, `-` for descending (default: -value)");
    eprintln!("  --top      Number of entries to keep (default: {})", DEFAULT_TOP_N);
    eprintln!("  --require  Drop records missing any of these fields");
    eprintln!("  --min      Drop records whose value is below this threshold");
    eprintln!("  --json     Output as JSON instead of formatted text");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  toprank-server fixtures/countries.json --field total --require country__name");
    eprintln!("  toprank-server fixtures/phases.csv --order -total,name --top 5 --json");
    process::exit(1);
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Value following a flag, or exit with a message naming the flag.
fn flag_value<'a>(args: &'a [String], i: usize, flag: &str, what: &str) -> &'a str {
    match args.get(i + 1) {
        Some(v) => v.as_str(),
        None => fail(&format!("{} requires {}", flag, what)),
    }
}

fn parse_args(args: &[String]) -> Options {
    if args.len() < 2 {
        usage();
    }

    let mut options = Options {
        path: args[1].clone(),
        field: None,
        order: OrderBy::default(),
        top: DEFAULT_TOP_N,
        required_fields: Vec::new(),
        min_value: None,
        json_output: false,
    };

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--field" => {
                options.field = Some(flag_value(args, i, "--field", "a field name").to_string());
                i += 2;
            }
            "--order" => {
                let spec = flag_value(args, i, "--order", "a comma-separated list of keys");
                options.order = OrderBy::parse(spec);
                if options.order.keys().is_empty() {
                    fail("--order requires at least one key");
                }
                i += 2;
            }
            "--top" => {
                let raw = flag_value(args, i, "--top", "a number");
                options.top = raw
                    .parse()
                    .unwrap_or_else(|_| fail("--top requires a non-negative integer"));
                i += 2;
            }
            "--require" => {
                options.required_fields = flag_value(args, i, "--require", "a comma-separated list of fields")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                i += 2;
            }
            "--min" => {
                let raw = flag_value(args, i, "--min", "a number");
                options.min_value = Some(
                    raw.parse()
                        .unwrap_or_else(|_| fail("--min requires a number")),
                );
                i += 2;
            }
            "--json" => {
                options.json_output = true;
                i += 1;
            }
            "-h" | "--help" => usage(),
            other => fail(&format!("Unknown argument: {}", other)),
        }
    }

    options
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn build_json(
    result: &PipelineResult<SeriesQuery, Record>,
    order: &OrderBy,
    pipeline_ms: u128,
) -> ChartJson {
    let series = result
        .selected_candidates
        .iter()
        .map(|r| PointJson {
            label: r.label().map(str::to_string),
            value: r.value(),
            record: r.clone(),
        })
        .collect();

    ChartJson {
        generated_at: Utc::now().to_rfc3339(),
        order: order.to_string(),
        pipeline_ms,
        series,
        summary: SummaryJson {
            records_loaded: result.retrieved_candidates.len(),
            records_filtered_out: result.filtered_candidates.len(),
            selected: result.selected_candidates.len(),
            selected_total: result.selected_candidates.iter().filter_map(Record::value).sum(),
        },
    }
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 => format!("{:.0}", v),
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

fn print_human(
    result: &PipelineResult<SeriesQuery, Record>,
    order: &OrderBy,
    load_ms: u128,
    pipeline_ms: u128,
) {
    println!();
    println!(
        "  {} records loaded  \u{00b7}  {} filtered out  \u{00b7}  top {} by {}",
        result.retrieved_candidates.len(),
        result.filtered_candidates.len(),
        result.selected_candidates.len(),
        order
    );
    println!();

    if result.selected_candidates.is_empty() {
        println!("  Nothing to rank.");
    } else {
        println!("  {:\u{2500}<48}", "");
        for (i, r) in result.selected_candidates.iter().enumerate() {
            println!(
                "  {}. {:32} {:>10}",
                i + 1,
                r.label().unwrap_or("(unlabeled)"),
                format_value(r.value())
            );
        }
        println!("  {:\u{2500}<48}", "");
    }

    println!();
    println!(
        "  \u{23f1}  Loaded in {}ms \u{00b7} Pipeline ran in {}ms",
        load_ms, pipeline_ms
    );
    println!();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let options = parse_args(&args);

    let load_start = Instant::now();
    let records = match load_series_file(&options.path) {
        Ok(r) => r,
        Err(e) => fail(&format!("loading series: {}", e)),
    };
    let records = match &options.field {
        Some(field) => normalize_value(records, field),
        None => records,
    };
    let load_ms = load_start.elapsed().as_millis();
    log::info!("loaded {} records from {}", records.len(), options.path);

    let pipeline_start = Instant::now();
    let pipeline =
        TopSeriesPipeline::with_records_and_order(records, options.order.clone(), options.top);

    let query = SeriesQuery {
        required_fields: options.required_fields.clone(),
        min_value: options.min_value,
        ..SeriesQuery::new("toprank-001")
    };

    let result = pipeline.execute(query).await;
    let pipeline_ms = pipeline_start.elapsed().as_millis();

    if options.json_output {
        let chart = build_json(&result, &options.order, pipeline_ms);
        match serde_json::to_string_pretty(&chart) {
            Ok(json) => println!("{}", json),
            Err(e) => fail(&format!("serializing output: {}", e)),
        }
    } else {
        print_human(&result, &options.order, load_ms, pipeline_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parse_defaults() {
        let options = parse_args(&args(&["toprank-server", "series.json"]));
        assert_eq!(options.path, "series.json");
        assert_eq!(options.top, DEFAULT_TOP_N);
        assert_eq!(options.order, OrderBy::default());
        assert!(options.field.is_none());
        assert!(!options.json_output);
    }

    #[test]
    fn parse_all_flags() {
        let options = parse_args(&args(&[
            "toprank-server",
            "phases.csv",
            "--field",
            "total",
            "--order",
            "-total,name",
            "--top",
            "5",
            "--require",
            "name, phase",
            "--min",
            "1.5",
            "--json",
        ]));
        assert_eq!(options.field.as_deref(), Some("total"));
        assert_eq!(options.order.to_string(), "-total,name");
        assert_eq!(options.top, 5);
        assert_eq!(options.required_fields, vec!["name", "phase"]);
        assert_eq!(options.min_value, Some(1.5));
        assert!(options.json_output);
    }

    #[test]
    fn values_print_without_trailing_zeros() {
        assert_eq!(format_value(Some(42.0)), "42");
        assert_eq!(format_value(Some(3.456)), "3.46");
        assert_eq!(format_value(None), "-");
    }
}
