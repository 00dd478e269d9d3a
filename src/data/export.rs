use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::ObservationTable;

// ---------------------------------------------------------------------------
// CSV export of result tables
// ---------------------------------------------------------------------------

/// Serialize a table as CSV: header in the original column order, every
/// row, no index column.  Callers hand over the full result set; the
/// on-screen row cap never applies here.
pub fn write_csv<W: Write>(table: &ObservationTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(&table.columns)
        .context("writing CSV header")?;

    for obs in &table.observations {
        let record: Vec<String> = table
            .columns
            .iter()
            .map(|column| obs.column_text(column))
            .collect();
        wtr.write_record(&record).context("writing CSV row")?;
    }

    wtr.flush().context("flushing CSV output")?;
    Ok(())
}

/// Write the table to `path`, creating or truncating the file.
pub fn export_csv(table: &ObservationTable, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_csv(table, file)
}
