use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{BASE_PAIR_COLUMN, CellValue, Observation, ObservationTable};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an observation table from a file.  Dispatch by extension.
///
/// Supported formats (all three fall out of the Pandas workflow the source
/// dataset comes from):
/// * `.csv`     – header row; a `base_pair` column is required
/// * `.json`    – `[{ "base_pair": "G-U", ...cells }, ...]`
/// * `.parquet` – flat scalar columns, `df.to_parquet()` style
pub fn load_file(path: &Path) -> Result<ObservationTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<ObservationTable> {
    let file = File::open(path).context("opening CSV")?;
    read_csv(file)
}

/// Parse CSV text into an observation table.  The header row gives the
/// column order; the `base_pair` cell is kept verbatim and every other cell
/// is type-guessed.
pub fn read_csv<R: Read>(input: R) -> Result<ObservationTable> {
    let mut reader = csv::Reader::from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let bp_idx = headers
        .iter()
        .position(|h| h == BASE_PAIR_COLUMN)
        .context("CSV missing 'base_pair' column")?;

    let mut observations = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let base_pair = record.get(bp_idx).unwrap_or("").to_string();

        let mut cells = BTreeMap::new();
        for (col_idx, value) in record.iter().enumerate() {
            if col_idx == bp_idx {
                continue;
            }
            cells.insert(headers[col_idx].clone(), guess_cell_type(value));
        }

        observations.push(Observation { base_pair, cells });
    }

    Ok(ObservationTable::new(headers, observations))
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<ObservationTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    read_json(&text)
}

/// Parse records-oriented JSON (the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "base_pair": "G-U", "atoms_hbond_1": "O6-N3", "dist_hbond_1": 2.8 },
///   ...
/// ]
/// ```
///
/// JSON objects carry no reliable key order, so columns come out sorted.
pub fn read_json(text: &str) -> Result<ObservationTable> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns: BTreeSet<String> = BTreeSet::new();
    let mut observations = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let base_pair = obj
            .get(BASE_PAIR_COLUMN)
            .and_then(|v| v.as_str())
            .with_context(|| format!("Row {i}: missing or non-string 'base_pair'"))?
            .to_string();

        let mut cells = BTreeMap::new();
        for (key, val) in obj {
            columns.insert(key.clone());
            if key == BASE_PAIR_COLUMN {
                continue;
            }
            cells.insert(key.clone(), json_to_cell(val));
        }

        observations.push(Observation { base_pair, cells });
    }

    Ok(ObservationTable::new(
        columns.into_iter().collect(),
        observations,
    ))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet observation table.
///
/// Expected schema: flat scalar columns, with `base_pair` as a string
/// column and the rest strings, ints, floats, or bools.  Works with files
/// written by both **Pandas** (`df.to_parquet()`) and **Polars**
/// (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<ObservationTable> {
    let file = File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    // The schema is fixed across batches; resolve columns once.
    let schema = builder.schema().clone();
    let columns: Vec<String> = schema.fields().iter().map(|f| f.name().clone()).collect();
    let bp_idx = schema
        .index_of(BASE_PAIR_COLUMN)
        .map_err(|_| anyhow::anyhow!("Parquet file missing 'base_pair' column"))?;

    let reader = builder.build().context("building parquet reader")?;
    let mut observations = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let bp_col = batch.column(bp_idx);

        for row in 0..batch.num_rows() {
            let Some(base_pair) = string_cell(bp_col, row) else {
                bail!(
                    "Row {}: 'base_pair' is null or not a string",
                    observations.len()
                );
            };

            let mut cells = BTreeMap::new();
            for (col_idx, field) in schema.fields().iter().enumerate() {
                if col_idx == bp_idx {
                    continue;
                }
                cells.insert(field.name().clone(), arrow_cell(batch.column(col_idx), row));
            }

            observations.push(Observation { base_pair, cells });
        }
    }

    Ok(ObservationTable::new(columns, observations))
}

// -- Arrow helpers --

/// Read a string cell, or `None` when the value is null or the column is
/// not a string column.
fn string_cell(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|a| a.value(row).to_string()),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row).to_string()),
        _ => None,
    }
}

/// Map a scalar Arrow value onto a [`CellValue`].  Anything fancier than a
/// scalar is not observation data and reads as null.
fn arrow_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => match string_cell(col, row) {
            Some(s) => CellValue::String(s),
            None => CellValue::Null,
        },
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            CellValue::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            CellValue::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            CellValue::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            CellValue::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().unwrap();
            CellValue::Bool(arr.value(row))
        }
        _ => CellValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use arrow::array::LargeStringArray;
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    use super::*;

    #[test]
    fn csv_keeps_column_order_and_guesses_types() {
        let data = "\
pdb_id,base_pair,atoms_hbond_1,dist_hbond_1
1EHZ,G-U,O6-N3,2.8
4V9F,U-G,N3-O6,
";
        let table = read_csv(data.as_bytes()).unwrap();

        assert_eq!(
            table.columns,
            vec!["pdb_id", "base_pair", "atoms_hbond_1", "dist_hbond_1"]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.slots.len(), 1);
        assert_eq!(table.slots[0].atom_column, "atoms_hbond_1");

        let first = &table.observations[0];
        assert_eq!(first.base_pair, "G-U");
        assert_eq!(
            first.cells.get("dist_hbond_1"),
            Some(&CellValue::Float(2.8))
        );
        assert_eq!(
            first.cells.get("atoms_hbond_1"),
            Some(&CellValue::String("O6-N3".to_string()))
        );

        // Empty distance cell reads as null.
        let second = &table.observations[1];
        assert_eq!(second.cells.get("dist_hbond_1"), Some(&CellValue::Null));
    }

    #[test]
    fn csv_without_base_pair_column_fails() {
        let data = "pdb_id,atoms_hbond_1,dist_hbond_1\n1EHZ,O6-N3,2.8\n";
        let err = read_csv(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("base_pair"));
    }

    #[test]
    fn cell_type_guessing() {
        assert_eq!(guess_cell_type(""), CellValue::Null);
        assert_eq!(guess_cell_type("42"), CellValue::Integer(42));
        assert_eq!(guess_cell_type("2.8"), CellValue::Float(2.8));
        assert_eq!(guess_cell_type("true"), CellValue::Bool(true));
        assert_eq!(
            guess_cell_type("O6-N3"),
            CellValue::String("O6-N3".to_string())
        );
    }

    #[test]
    fn json_records_load_with_sorted_columns() {
        let text = r#"[
            { "base_pair": "G-U", "atoms_hbond_1": "O6-N3", "dist_hbond_1": 2.8 },
            { "base_pair": "U-G", "atoms_hbond_1": "N3-O6", "dist_hbond_1": null }
        ]"#;
        let table = read_json(text).unwrap();

        assert_eq!(
            table.columns,
            vec!["atoms_hbond_1", "base_pair", "dist_hbond_1"]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.slots.len(), 1);
        assert_eq!(
            table.observations[1].cells.get("dist_hbond_1"),
            Some(&CellValue::Null)
        );
    }

    #[test]
    fn json_requires_string_base_pair() {
        let err = read_json(r#"[{ "base_pair": 12 }]"#).unwrap_err();
        assert!(err.to_string().contains("base_pair"));

        let err = read_json(r#"[{ "atoms_hbond_1": "O6-N3" }]"#).unwrap_err();
        assert!(err.to_string().contains("base_pair"));
    }

    #[test]
    fn json_top_level_must_be_an_array() {
        assert!(read_json(r#"{ "base_pair": "G-U" }"#).is_err());
    }

    /// Write a batch to a uniquely-named parquet file under the system
    /// temp directory.
    fn write_batch_to_temp(name: &str, batch: &RecordBatch) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "bp_explorer_{name}_{}.parquet",
            std::process::id()
        ));
        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
        path
    }

    #[test]
    fn parquet_round_trips_dtypes_and_nulls() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("pdb_id", DataType::LargeUtf8, false),
            Field::new("base_pair", DataType::Utf8, false),
            Field::new("atoms_hbond_1", DataType::Utf8, true),
            Field::new("dist_hbond_1", DataType::Float64, true),
            Field::new("resolution", DataType::Float32, false),
            Field::new("nt1_index", DataType::Int32, false),
            Field::new("model_count", DataType::Int64, false),
            Field::new("refined", DataType::Boolean, false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(LargeStringArray::from(vec!["1EHZ", "4V9F"])),
                Arc::new(StringArray::from(vec!["G-U", "U-G"])),
                Arc::new(StringArray::from(vec![Some("O6-N3"), None])),
                Arc::new(Float64Array::from(vec![Some(2.8), None])),
                Arc::new(Float32Array::from(vec![1.5_f32, 3.25])),
                Arc::new(Int32Array::from(vec![5, 900])),
                Arc::new(Int64Array::from(vec![1_i64, 12])),
                Arc::new(BooleanArray::from(vec![true, false])),
            ],
        )
        .unwrap();

        let path = write_batch_to_temp("roundtrip", &batch);
        let table = load_parquet(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(
            table.columns,
            vec![
                "pdb_id",
                "base_pair",
                "atoms_hbond_1",
                "dist_hbond_1",
                "resolution",
                "nt1_index",
                "model_count",
                "refined",
            ]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.slots.len(), 1);
        assert_eq!(table.slots[0].atom_column, "atoms_hbond_1");

        let first = &table.observations[0];
        assert_eq!(first.base_pair, "G-U");
        assert_eq!(
            first.cells.get("pdb_id"),
            Some(&CellValue::String("1EHZ".into()))
        );
        assert_eq!(
            first.cells.get("atoms_hbond_1"),
            Some(&CellValue::String("O6-N3".into()))
        );
        assert_eq!(first.cells.get("dist_hbond_1"), Some(&CellValue::Float(2.8)));
        // Narrow numeric dtypes widen on load.
        assert_eq!(first.cells.get("resolution"), Some(&CellValue::Float(1.5)));
        assert_eq!(first.cells.get("nt1_index"), Some(&CellValue::Integer(5)));
        assert_eq!(first.cells.get("model_count"), Some(&CellValue::Integer(1)));
        assert_eq!(first.cells.get("refined"), Some(&CellValue::Bool(true)));

        // Nulls in the slot columns read as null cells.
        let second = &table.observations[1];
        assert_eq!(second.base_pair, "U-G");
        assert_eq!(second.cells.get("atoms_hbond_1"), Some(&CellValue::Null));
        assert_eq!(second.cells.get("dist_hbond_1"), Some(&CellValue::Null));
    }

    #[test]
    fn parquet_without_base_pair_column_fails() {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "resolution",
            DataType::Float64,
            false,
        )]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(Float64Array::from(vec![2.4]))],
        )
        .unwrap();

        let path = write_batch_to_temp("missing_bp", &batch);
        let err = load_parquet(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);

        assert!(err.to_string().contains("base_pair"));
    }

    #[test]
    fn parquet_base_pair_must_be_a_string_column() {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "base_pair",
            DataType::Int64,
            false,
        )]));
        let batch =
            RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(vec![7]))])
                .unwrap();

        let path = write_batch_to_temp("int_bp", &batch);
        let err = load_parquet(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);

        assert!(err.to_string().contains("base_pair"));
    }

    #[test]
    fn parquet_null_base_pair_cell_fails() {
        let schema = Arc::new(Schema::new(vec![Field::new(
            "base_pair",
            DataType::Utf8,
            true,
        )]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(StringArray::from(vec![Some("G-U"), None]))],
        )
        .unwrap();

        let path = write_batch_to_temp("null_bp", &batch);
        let err = load_parquet(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);

        let message = err.to_string();
        assert!(message.contains("Row 1"));
        assert!(message.contains("null or not a string"));
    }
}
