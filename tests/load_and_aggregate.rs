use std::io::Write;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use cdi_dashboard::data::aggregate::aggregate;
use cdi_dashboard::data::export::write_table;
use cdi_dashboard::data::filter::{
    owned_keys, AggregationFilter, GroupDimension, GroupKeys, MetricKind, GENDERS,
};
use cdi_dashboard::data::loader::load_file;
use cdi_dashboard::error::Error;

const CSV: &str = "\
YearStart,LocationDesc,Region,Question,Stratification1,DataValue,DataValueType,Topic
2016,Ohio,Midwest,Asthma mortality rate,Male,12,Crude Rate,Asthma
2015,Ohio,Midwest,Asthma mortality rate,Male,10,Crude Rate,Asthma
2015,Texas,South,Asthma mortality rate,Male,20,Crude Rate,Asthma
2015,Texas,South,Current asthma prevalence among adults aged >= 18 years,Female,9.5,Crude Prevalence,Asthma
2016,Texas,South,Asthma mortality rate,Female,,Crude Rate,Asthma
";

fn write_temp(suffix: &str, contents: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents).unwrap();
    file.flush().unwrap();
    file
}

fn mortality_by_gender() -> AggregationFilter {
    AggregationFilter::new(MetricKind::MortalityRate)
        .with_disease("Asthma (Mortality Rate)")
        .grouped_by(GroupDimension::Stratification, GroupKeys::Fixed(owned_keys(&GENDERS)))
}

#[test]
fn csv_file_to_gender_table() {
    let file = write_temp(".csv", CSV.as_bytes());
    let ds = load_file(file.path()).unwrap();
    assert_eq!(ds.len(), 5);

    let table = aggregate(&ds.records, &mortality_by_gender()).unwrap();
    let years: Vec<&str> = table.rows.iter().map(|r| r.year.as_str()).collect();
    assert_eq!(years, vec!["2015", "2016"]);
    assert_eq!(table.rows[0].get("Male"), Some(15.0));
    assert!(table.rows[0].get("Female").unwrap().is_nan());
    assert_eq!(table.rows[1].get("Male"), Some(12.0));
    // the only 2016 Female cell is empty in the source
    assert!(table.rows[1].get("Female").unwrap().is_nan());
}

#[test]
fn malformed_header_fails_the_load() {
    let file = write_temp(".csv", b"YearStart,Question\n2015,Q\n");
    let err = load_file(file.path()).unwrap_err();
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::Parse(_))));
}

#[test]
fn json_file_loads_like_csv() {
    let json = r#"[
        {"YearStart": 2015, "LocationDesc": "Ohio", "Region": "Midwest",
         "Question": "Asthma mortality rate", "Stratification1": "Male",
         "DataValue": "10", "DataValueType": "Crude Rate", "Topic": "Asthma"},
        {"YearStart": 2015, "LocationDesc": "Texas", "Region": "South",
         "Question": "Asthma mortality rate", "Stratification1": "Male",
         "DataValue": 20, "DataValueType": "Crude Rate", "Topic": "Asthma"}
    ]"#;
    let file = write_temp(".json", json.as_bytes());
    let ds = load_file(file.path()).unwrap();
    let table = aggregate(&ds.records, &mortality_by_gender()).unwrap();
    assert_eq!(table.rows[0].get("Male"), Some(15.0));
}

#[test]
fn parquet_file_with_integer_years_and_null_values() {
    let schema = Arc::new(Schema::new(vec![
        Field::new("YearStart", DataType::Int64, false),
        Field::new("LocationDesc", DataType::Utf8, false),
        Field::new("Region", DataType::Utf8, false),
        Field::new("Question", DataType::Utf8, false),
        Field::new("Stratification1", DataType::Utf8, false),
        Field::new("DataValue", DataType::Float64, true),
        Field::new("DataValueType", DataType::Utf8, false),
        Field::new("Topic", DataType::Utf8, false),
    ]));
    let text = |v: [&str; 2]| -> ArrayRef { Arc::new(StringArray::from(v.to_vec())) };
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(Int64Array::from(vec![2015, 2015])),
            text(["Ohio", "Texas"]),
            text(["Midwest", "South"]),
            text(["Asthma mortality rate", "Asthma mortality rate"]),
            text(["Male", "Male"]),
            Arc::new(Float64Array::from(vec![Some(10.0), None])),
            text(["Crude Rate", "Crude Rate"]),
            text(["Asthma", "Asthma"]),
        ],
    )
    .unwrap();

    let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
    let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
    writer.write(&batch).unwrap();
    writer.close().unwrap();

    let ds = load_file(file.path()).unwrap();
    assert_eq!(ds.records[0].year.as_str(), "2015");
    assert!(ds.records[1].value.is_nan());

    let table = aggregate(&ds.records, &mortality_by_gender()).unwrap();
    assert_eq!(table.rows[0].get("Male"), Some(10.0));
}

#[test]
fn exported_table_reads_back() {
    let file = write_temp(".csv", CSV.as_bytes());
    let ds = load_file(file.path()).unwrap();
    let table = aggregate(&ds.records, &mortality_by_gender()).unwrap();

    let out = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    write_table(out.path(), &table).unwrap();
    let text = std::fs::read_to_string(out.path()).unwrap();
    assert_eq!(text, "Year,Male,Female\n2015,15,\n2016,12,\n");
}
