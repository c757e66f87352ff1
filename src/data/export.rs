use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::AggregatedTable;

/// Write a table as `Year,<key>,...` CSV. Missing cells are left empty.
pub fn write_table(path: &Path, table: &AggregatedTable) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_table_to(file, table)?;
    log::info!("Exported {} rows to {}", table.rows.len(), path.display());
    Ok(())
}

pub fn write_table_to<W: Write>(out: W, table: &AggregatedTable) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec!["Year"];
    header.extend(table.keys.iter().map(String::as_str));
    writer.write_record(&header).context("writing CSV header")?;

    for row in &table.rows {
        let mut cells = vec![row.year.to_string()];
        for key in &table.keys {
            let cell = match row.get(key) {
                Some(v) if v.is_finite() => v.to_string(),
                _ => String::new(),
            };
            cells.push(cell);
        }
        writer
            .write_record(&cells)
            .with_context(|| format!("writing row for {}", row.year))?;
    }

    writer.flush().context("flushing CSV")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::data::model::{AggregatedRow, Year};

    #[test]
    fn nan_cells_are_written_empty() {
        let table = AggregatedTable {
            keys: vec!["Male".into(), "Female".into()],
            rows: vec![AggregatedRow {
                year: Year::from("2015"),
                values: BTreeMap::from([
                    ("Male".to_string(), 15.0),
                    ("Female".to_string(), f64::NAN),
                ]),
            }],
        };
        let mut buf = Vec::new();
        write_table_to(&mut buf, &table).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Year,Male,Female\n2015,15,\n");
    }
}
