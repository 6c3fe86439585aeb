use std::fs::File;
use std::path::Path;

use anyhow::{Context, bail};
use arrow::array::{Array, AsArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

/// One cell of the rule table as read from disk.
///
/// Readers stringify every value; only genuine source nulls survive as
/// `Null`. Null-like strings ("nan", "", ...) are the normalizer's problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawCell {
    Null,
    Text(String),
}

impl RawCell {
    pub fn text(s: impl Into<String>) -> Self {
        RawCell::Text(s.into())
    }
}

/// Row-major rule table. Rows are not guaranteed rectangular; the index
/// builder aligns code and flag rows itself.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub rows: Vec<Vec<RawCell>>,
}

pub fn read_rule_table(path: &Path) -> anyhow::Result<RawTable> {
    let extension = path
        .extension()
        .and_then(|x| x.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match extension.as_str() {
        "parquet" => read_parquet_table(path),
        "csv" => read_csv_table(path),
        _ => bail!(
            "Unsupported rule table extension for {}. Use .csv or .parquet",
            path.display()
        ),
    }
}

fn read_parquet_table(path: &Path) -> anyhow::Result<RawTable> {
    let file = File::open(path).with_context(|| format!("open parquet {}", path.display()))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .with_context(|| format!("read parquet metadata from {}", path.display()))?;
    let reader = builder.build().context("create parquet reader")?;

    let mut rows = Vec::new();
    for batch in reader {
        let batch = batch.context("read parquet record batch")?;

        // Stringify column-wise; source nulls stay nulls instead of
        // becoming "nan" text.
        let mut columns = Vec::with_capacity(batch.num_columns());
        for (idx, column) in batch.columns().iter().enumerate() {
            let column = cast(column, &DataType::Utf8)
                .with_context(|| format!("cast column {idx} of {} to string", path.display()))?;
            columns.push(column);
        }

        for row in 0..batch.num_rows() {
            let mut cells = Vec::with_capacity(columns.len());
            for column in &columns {
                let values = column.as_string::<i32>();
                if values.is_null(row) {
                    cells.push(RawCell::Null);
                } else {
                    cells.push(RawCell::Text(values.value(row).to_string()));
                }
            }
            rows.push(cells);
        }
    }
    Ok(RawTable { rows })
}

fn read_csv_table(path: &Path) -> anyhow::Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("open csv {}", path.display()))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.with_context(|| format!("read csv record from {}", path.display()))?;
        rows.push(record.iter().map(RawCell::text).collect());
    }
    Ok(RawTable { rows })
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{ArrayRef, Float64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::arrow_writer::ArrowWriter;
    use tempfile::NamedTempFile;

    use super::*;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn csv_rows_load_as_text_cells() {
        let file = create_temp_csv("99213,99214,99215\n,1,0\n");
        let table = read_rule_table(file.path()).unwrap();

        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], RawCell::text("99213"));
        assert_eq!(table.rows[1][0], RawCell::text(""));
        assert_eq!(table.rows[1][2], RawCell::text("0"));
    }

    #[test]
    fn csv_accepts_ragged_rows() {
        let file = create_temp_csv("99213,99214,99215,99217\n,1,0\n");
        let table = read_rule_table(file.path()).unwrap();

        assert_eq!(table.rows[0].len(), 4);
        assert_eq!(table.rows[1].len(), 3);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let err = read_rule_table(Path::new("/tmp/rules.txt")).unwrap_err();
        assert!(err.to_string().contains("Unsupported rule table extension"));
    }

    #[test]
    fn parquet_cells_stringify_with_nulls_preserved() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("c0", DataType::Utf8, true),
            Field::new("c1", DataType::Float64, true),
            Field::new("c2", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            Arc::clone(&schema),
            vec![
                Arc::new(StringArray::from(vec![Some("99213"), None])) as ArrayRef,
                Arc::new(Float64Array::from(vec![Some(99214.0), Some(1.0)])) as ArrayRef,
                Arc::new(StringArray::from(vec![Some("99215"), Some("0")])) as ArrayRef,
            ],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.parquet");
        let file = File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = read_rule_table(&path).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], RawCell::text("99213"));
        // Float-typed columns render with the ".0" artifact the normalizer strips.
        assert_eq!(table.rows[0][1], RawCell::text("99214.0"));
        assert_eq!(table.rows[1][0], RawCell::Null);
        assert_eq!(table.rows[1][1], RawCell::text("1.0"));
        assert_eq!(table.rows[1][2], RawCell::text("0"));
    }
}
