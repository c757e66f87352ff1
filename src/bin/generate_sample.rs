use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use cdi_dashboard::data::filter::{MetricKind, GENDERS, RACES};
use cdi_dashboard::data::lookup::DISEASES;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in `[-1, 1)`.
    fn jitter(&mut self) -> f64 {
        self.next_f64() * 2.0 - 1.0
    }
}

const LOCATIONS: [(&str, &str); 8] = [
    ("Ohio", "Midwest"),
    ("Illinois", "Midwest"),
    ("New York", "Northeast"),
    ("Maine", "Northeast"),
    ("Texas", "South"),
    ("Georgia", "South"),
    ("California", "West"),
    ("Oregon", "West"),
];

/// One synthetic row, column order matching the published export.
struct Row {
    year: i64,
    location: &'static str,
    region: &'static str,
    question: &'static str,
    stratification: &'static str,
    value: Option<f64>,
    data_type: &'static str,
    topic: &'static str,
}

const HEADER: [&str; 8] = [
    "YearStart",
    "LocationDesc",
    "Region",
    "Question",
    "Stratification1",
    "DataValue",
    "DataValueType",
    "Topic",
];

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    let strata: Vec<&'static str> = GENDERS.iter().chain(RACES.iter()).copied().collect();
    let mut rows = Vec::new();

    for (d_idx, disease) in DISEASES.iter().enumerate() {
        let (base, data_type) = match disease.metric {
            MetricKind::Prevalence => (4.0 + d_idx as f64 * 1.5, "Crude Prevalence"),
            MetricKind::MortalityRate => (8.0 + d_idx as f64 * 6.0, "Crude Rate"),
        };
        for year in 2011..=2020_i64 {
            let trend = 1.0 + (year - 2011) as f64 * 0.01;
            for (l_idx, &(location, region)) in LOCATIONS.iter().enumerate() {
                for (s_idx, &stratification) in strata.iter().enumerate() {
                    // ~3% of cells are suppressed in the published data
                    let value = if rng.next_f64() < 0.03 {
                        None
                    } else {
                        let spread = 1.0 + 0.05 * l_idx as f64 + 0.08 * s_idx as f64;
                        Some(((base * trend * spread + rng.jitter()) * 10.0).round() / 10.0)
                    };
                    rows.push(Row {
                        year,
                        location,
                        region,
                        question: disease.question,
                        stratification,
                        value,
                        data_type,
                        topic: disease.topic,
                    });
                }
            }
        }
    }
    rows
}

fn write_csv(path: &str, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record(HEADER)?;
    for r in rows {
        let value = r.value.map(|v| v.to_string()).unwrap_or_default();
        writer.write_record([
            r.year.to_string().as_str(),
            r.location,
            r.region,
            r.question,
            r.stratification,
            value.as_str(),
            r.data_type,
            r.topic,
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(path: &str, rows: &[Row]) -> Result<()> {
    let text = |f: fn(&Row) -> &'static str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new(HEADER[0], DataType::Int64, false),
        Field::new(HEADER[1], DataType::Utf8, false),
        Field::new(HEADER[2], DataType::Utf8, false),
        Field::new(HEADER[3], DataType::Utf8, false),
        Field::new(HEADER[4], DataType::Utf8, false),
        Field::new(HEADER[5], DataType::Float64, true),
        Field::new(HEADER[6], DataType::Utf8, false),
        Field::new(HEADER[7], DataType::Utf8, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(rows.iter().map(|r| r.year).collect::<Vec<_>>())),
            text(|r| r.location),
            text(|r| r.region),
            text(|r| r.question),
            text(|r| r.stratification),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.value).collect::<Vec<_>>())),
            text(|r| r.data_type),
            text(|r| r.topic),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    write_csv("sample_indicators.csv", &rows)?;
    write_parquet("sample_indicators.parquet", &rows)?;

    println!(
        "Wrote {} rows ({} indicators × {} locations) to sample_indicators.csv and .parquet",
        rows.len(),
        DISEASES.len(),
        LOCATIONS.len()
    );
    Ok(())
}
