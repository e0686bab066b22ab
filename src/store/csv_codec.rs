//! zstd-compressed CSV payload for tables
//!
//! The payload holds a header row and one record per table row. The index
//! is not written; it travels in its own sidecar. Missing values are empty
//! fields.

use super::sidecar::TemporalColumn;
use crate::model::{Column, DType, Table, Value, DATE_FORMAT};
use crate::{Error, Result};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Write the columns of `table` to `path`
pub(crate) fn write_table(path: &Path, table: &Table, level: i32) -> Result<()> {
    let file = BufWriter::new(File::create(path)?);
    let encoder = zstd::stream::write::Encoder::new(file, level)?;
    let mut writer = csv::Writer::from_writer(encoder);

    // A header with no fields would read back as one empty column
    if table.n_columns() > 0 {
        writer.write_record(table.column_names())?;

        let mut record = Vec::with_capacity(table.n_columns());
        for row in 0..table.n_rows() {
            record.clear();
            record.extend(
                table
                    .columns()
                    .iter()
                    .map(|c| c.values()[row].to_field().unwrap_or_default()),
            );
            writer.write_record(&record)?;
        }
    }

    writer.flush()?;
    let encoder = writer.into_inner().map_err(|e| e.into_error())?;
    let mut file = encoder.finish()?;
    std::io::Write::flush(&mut file)?;
    Ok(())
}

/// Read the columns stored at `path`, in header order.
///
/// Columns listed in `parse_dates` become `Date` or `DateTime` columns,
/// using the recorded dtype when there is one and the field text otherwise.
/// The others take their type from `dtypes`, falling back to `Object`.
pub(crate) fn read_columns(
    path: &Path,
    dtypes: &BTreeMap<String, DType>,
    parse_dates: &[TemporalColumn],
) -> Result<Vec<Column>> {
    let decoder = zstd::stream::read::Decoder::new(File::open(path)?)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(decoder);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    if let Some(missing) = parse_dates.iter().find(|d| !headers.contains(&d.name)) {
        return Err(Error::Corruption(format!(
            "temporal column '{}' is not in the stored payload",
            missing.name
        )));
    }

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (field, values) in record.iter().zip(raw.iter_mut()) {
            values.push(field.to_string());
        }
    }

    headers
        .into_iter()
        .zip(raw)
        .map(|(name, fields)| {
            let dtype = match parse_dates.iter().find(|d| d.name == name) {
                Some(TemporalColumn {
                    dtype: Some(dtype), ..
                }) => *dtype,
                Some(_) => temporal_dtype(&fields),
                None => dtypes.get(&name).copied().unwrap_or(DType::Object),
            };
            parse_column(name, dtype, &fields)
        })
        .collect()
}

/// `Date` when every present field is a bare date, `DateTime` otherwise
fn temporal_dtype(fields: &[String]) -> DType {
    let mut present = fields.iter().filter(|f| !f.is_empty()).peekable();
    if present.peek().is_none() {
        return DType::DateTime;
    }
    if present.all(|f| NaiveDate::parse_from_str(f, DATE_FORMAT).is_ok()) {
        DType::Date
    } else {
        DType::DateTime
    }
}

fn parse_column(name: String, dtype: DType, fields: &[String]) -> Result<Column> {
    let values = fields
        .iter()
        .enumerate()
        .map(|(row, raw)| {
            dtype.parse(raw).ok_or_else(|| Error::Parse {
                column: name.clone(),
                row,
                value: raw.clone(),
                dtype,
            })
        })
        .collect::<Result<Vec<Value>>>()?;
    Column::new(name, dtype, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn dtype_map(table: &Table) -> BTreeMap<String, DType> {
        table
            .dtypes()
            .into_iter()
            .map(|(n, d)| (n.to_string(), d))
            .collect()
    }

    #[test]
    fn test_write_read_typed_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t");
        let table = Table::new(vec![
            Column::int64("a", [1, 2, 3]),
            Column::new(
                "b",
                DType::Float64,
                vec![Value::Float(1.5), Value::Null, Value::Float(f64::NAN)],
            )
            .unwrap(),
            Column::string("c", ["x", "with,comma", "with \"quotes\""]),
            Column::boolean("d", [true, false, true]),
        ])
        .unwrap();

        write_table(&path, &table, 3).unwrap();
        let columns = read_columns(&path, &dtype_map(&table), &[]).unwrap();

        assert_eq!(columns, table.columns());
    }

    #[test]
    fn test_payload_is_compressed_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t");
        let table = Table::new(vec![Column::int64("a", [7]), Column::string("b", ["z"])]).unwrap();

        write_table(&path, &table, 3).unwrap();
        let text = zstd::decode_all(File::open(&path).unwrap()).unwrap();
        assert_eq!(String::from_utf8(text).unwrap(), "a,b\n7,z\n");
    }

    #[test]
    fn test_temporal_columns_parsed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t");
        let day = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let table = Table::new(vec![
            Column::date("d", [day]),
            Column::datetime("ts", [day.and_hms_opt(12, 0, 0).unwrap()]),
        ])
        .unwrap();

        write_table(&path, &table, 3).unwrap();
        let dates = vec![TemporalColumn::inferred("d"), TemporalColumn::inferred("ts")];
        let columns = read_columns(&path, &BTreeMap::new(), &dates).unwrap();

        assert_eq!(columns[0].dtype(), DType::Date);
        assert_eq!(columns[1].dtype(), DType::DateTime);
        assert_eq!(columns, table.columns());
    }

    #[test]
    fn test_recorded_temporal_dtype_wins_over_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t");
        let table = Table::new(vec![
            Column::new("nulls", DType::Date, vec![Value::Null, Value::Null]).unwrap(),
            Column::datetime(
                "midnight",
                [NaiveDate::from_ymd_opt(2023, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(); 2],
            ),
        ])
        .unwrap();

        write_table(&path, &table, 3).unwrap();
        let recorded: Vec<TemporalColumn> = table
            .columns()
            .iter()
            .map(|c| TemporalColumn::for_column(c.name(), c.dtype()))
            .collect();
        let columns = read_columns(&path, &BTreeMap::new(), &recorded).unwrap();
        assert_eq!(columns, table.columns());

        // Without a recorded dtype an all-null column can only be guessed
        let guessed = vec![TemporalColumn::inferred("nulls"), TemporalColumn::inferred("midnight")];
        let columns = read_columns(&path, &BTreeMap::new(), &guessed).unwrap();
        assert_eq!(columns[0].dtype(), DType::DateTime);
    }

    #[test]
    fn test_missing_temporal_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t");
        let table = Table::new(vec![Column::int64("a", [1])]).unwrap();

        write_table(&path, &table, 3).unwrap();
        let result = read_columns(&path, &dtype_map(&table), &[TemporalColumn::inferred("zzz")]);
        assert!(matches!(result, Err(Error::Corruption(_))));
    }

    #[test]
    fn test_bad_field_reports_position() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t");
        let table = Table::new(vec![Column::string("a", ["1", "two"])]).unwrap();

        write_table(&path, &table, 3).unwrap();
        let dtypes = BTreeMap::from([("a".to_string(), DType::Int64)]);
        match read_columns(&path, &dtypes, &[]) {
            Err(Error::Parse { column, row, .. }) => {
                assert_eq!(column, "a");
                assert_eq!(row, 1);
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_no_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t");

        write_table(&path, &Table::default(), 3).unwrap();
        assert!(read_columns(&path, &BTreeMap::new(), &[]).unwrap().is_empty());
    }
}
