use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dataset, Record, Year};
use crate::error::Error;

// ---------------------------------------------------------------------------
// Column layout
// ---------------------------------------------------------------------------

/// Source column names, in `Record` field order.
const YEAR_COLUMNS: [&str; 2] = ["YearStart", "Year"];
const LOCATION: &str = "LocationDesc";
const REGION: &str = "Region";
const QUESTION: &str = "Question";
const STRATIFICATION: &str = "Stratification1";
const VALUE: &str = "DataValue";
const VALUE_TYPE: &str = "DataValueType";
const TOPIC: &str = "Topic";

/// Position of every required column within a header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    year: usize,
    location: usize,
    region: usize,
    question: usize,
    stratification: usize,
    value: usize,
    data_type: usize,
    topic: usize,
}

impl Columns {
    fn locate<S: AsRef<str>>(headers: &[S]) -> Result<Self, Error> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.as_ref().trim() == name)
                .ok_or_else(|| Error::Parse(format!("missing required column '{name}'")))
        };
        let year = YEAR_COLUMNS
            .iter()
            .find_map(|name| find(*name).ok())
            .ok_or_else(|| Error::Parse("missing required column 'YearStart'".into()))?;

        Ok(Columns {
            year,
            location: find(LOCATION)?,
            region: find(REGION)?,
            question: find(QUESTION)?,
            stratification: find(STRATIFICATION)?,
            value: find(VALUE)?,
            data_type: find(VALUE_TYPE)?,
            topic: find(TOPIC)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an indicator table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – the published indicator export (header row required)
/// * `.json`    – `[{ "YearStart": 2015, "DataValue": 8.1, ... }, ...]`
/// * `.parquet` – flat table with the same column names
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!(Error::UnsupportedFormat(other.to_string())),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    if let Some((first, last)) = dataset.year_span() {
        log::info!(
            "Loaded {} records spanning {first}–{last} from {}",
            dataset.len(),
            path.display()
        );
    } else {
        log::info!("Loaded an empty table from {}", path.display());
    }
    Ok(dataset)
}

/// Parse a numeric cell. Anything unparsable is missing data (`NaN`), never 0.
pub fn parse_value(s: &str) -> f64 {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(f64::NAN)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening CSV")?;
    parse_csv(file)
}

/// Parse CSV text with a header row. Extra columns are ignored.
pub fn parse_csv<R: Read>(input: R) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::Parse(format!("reading CSV headers: {e}")))?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    let cols = Columns::locate(&headers)?;

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result.map_err(|e| Error::Parse(format!("CSV row {}: {e}", row_no + 1)))?;
        let cell = |idx: usize| row.get(idx).unwrap_or("").to_string();

        records.push(Record {
            year: Year::new(cell(cols.year)),
            location: cell(cols.location),
            region: cell(cols.region),
            question: cell(cols.question),
            stratification: cell(cols.stratification),
            value: parse_value(row.get(cols.value).unwrap_or("")),
            data_type: cell(cols.data_type),
            topic: cell(cols.topic),
        });
    }

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented):
///
/// ```json
/// [
///   {
///     "YearStart": 2015,
///     "LocationDesc": "Ohio",
///     "Region": "Midwest",
///     "Question": "Asthma mortality rate",
///     "Stratification1": "Female",
///     "DataValue": 9.4,
///     "DataValueType": "Crude Rate",
///     "Topic": "Asthma"
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

pub fn parse_json(text: &str) -> Result<Dataset> {
    let root: JsonValue =
        serde_json::from_str(text).map_err(|e| Error::Parse(format!("parsing JSON: {e}")))?;

    let rows = root
        .as_array()
        .ok_or_else(|| Error::Parse("expected top-level JSON array".into()))?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| Error::Parse(format!("row {i} is not a JSON object")))?;

        let keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        Columns::locate(&keys).map_err(|e| Error::Parse(format!("row {i}: {e}")))?;

        let field = |name: &str| obj.get(name).map(json_to_text).unwrap_or_default();
        let year = YEAR_COLUMNS
            .iter()
            .find_map(|name| obj.get(*name))
            .map(json_to_text)
            .unwrap_or_default();

        records.push(Record {
            year: Year::new(year),
            location: field(LOCATION),
            region: field(REGION),
            question: field(QUESTION),
            stratification: field(STRATIFICATION),
            value: obj.get(VALUE).map(json_to_value).unwrap_or(f64::NAN),
            data_type: field(VALUE_TYPE),
            topic: field(TOPIC),
        });
    }

    Ok(Dataset::from_records(records))
}

fn json_to_text(val: &JsonValue) -> String {
    match val {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_to_value(val: &JsonValue) -> f64 {
    match val {
        JsonValue::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        JsonValue::String(s) => parse_value(s),
        _ => f64::NAN,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file holding the indicator table.
///
/// Text columns may be Utf8 or LargeUtf8. `YearStart` may also be an
/// integer column and `DataValue` any float or integer column; nulls in
/// `DataValue` load as `NaN`.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
        let cols = Columns::locate(&names)?;

        for row in 0..batch.num_rows() {
            let text = |idx: usize| {
                cell_text(batch.column(idx), row)
                    .with_context(|| format!("row {row}, column '{}'", names[idx]))
            };

            records.push(Record {
                year: Year::new(text(cols.year)?),
                location: text(cols.location)?,
                region: text(cols.region)?,
                question: text(cols.question)?,
                stratification: text(cols.stratification)?,
                value: cell_value(batch.column(cols.value), row),
                data_type: text(cols.data_type)?,
                topic: text(cols.topic)?,
            });
        }
    }

    Ok(Dataset::from_records(records))
}

// -- Parquet / Arrow helpers --

/// Render a text or integer cell as a string; nulls become empty strings.
fn cell_text(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        return Ok(String::new());
    }
    let text = match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|s| s.value(row).to_string()),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => col
            .as_any()
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row).to_string()),
        DataType::Int64 => col
            .as_any()
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row).to_string()),
        other => bail!(Error::Parse(format!("unexpected column type {other:?}"))),
    };
    text.ok_or_else(|| Error::Parse("column downcast failed".into()).into())
}

/// Read a numeric cell; nulls and unreadable cells are `NaN`.
fn cell_value(col: &Arc<dyn Array>, row: usize) -> f64 {
    if col.is_null(row) {
        return f64::NAN;
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Float64 => any.downcast_ref::<Float64Array>().map(|a| a.value(row)),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64),
        DataType::Int64 => any.downcast_ref::<Int64Array>().map(|a| a.value(row) as f64),
        DataType::Int32 => any.downcast_ref::<Int32Array>().map(|a| a.value(row) as f64),
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|a| parse_value(a.value(row))),
        DataType::LargeUtf8 => Some(parse_value(col.as_string::<i64>().value(row))),
        _ => None,
    }
    .unwrap_or(f64::NAN)
}
