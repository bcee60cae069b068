use std::fs::File;
use std::path::Path;

use crate::core::{Table, TableConfig};
use crate::error::{Error, Result};

/// Read a delimited export with a header row into a [`Table`].
///
/// Column names are lower-cased. Header cells that are empty (a trailing
/// delimiter, as some simulators emit) are ignored together with their cells.
/// Row numbers in errors count data rows from 1.
pub fn load_table(path: impl AsRef<Path>, cfg: &TableConfig) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(path, e))?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(cfg.delimiter_byte()?)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::csv(path, e))?
        .iter()
        .map(String::from)
        .collect();
    let kept: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, name)| !name.is_empty())
        .map(|(i, _)| i)
        .collect();

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); kept.len()];

    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| Error::csv(path, e))?;
        let row = index + 1;

        if record.len() != headers.len() {
            return Err(Error::RaggedRow {
                path: path.to_path_buf(),
                row,
                expected: headers.len(),
                found: record.len(),
            });
        }

        for (slot, &col) in kept.iter().enumerate() {
            let cell = &record[col];
            let value = cell.parse::<f64>().map_err(|_| Error::InvalidNumber {
                path: path.to_path_buf(),
                row,
                column: headers[col].clone(),
                value: cell.to_string(),
            })?;
            columns[slot].push(value);
        }
    }

    let names = kept.iter().map(|&i| headers[i].clone());
    Table::new(path, names.zip(columns))
}

/// Write a table back out as comma-separated text, header first.
pub fn write_table(path: impl AsRef<Path>, table: &Table) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path).map_err(|e| Error::csv(path, e))?;

    writer
        .write_record(table.column_names())
        .map_err(|e| Error::csv(path, e))?;
    for index in 0..table.len() {
        let row = table.row(index);
        writer
            .write_record(row.iter().map(|v| v.to_string()))
            .map_err(|e| Error::csv(path, e))?;
    }

    writer.flush().map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(text.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_lowercases_and_trims() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "a.csv", "Time, V(N001) ,I(R1)\n0, 1.5, -2e-3\n1e-5,2,3\n");

        let table = load_table(&path, &TableConfig::default()).unwrap();
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["time", "v(n001)", "i(r1)"]);
        assert_eq!(table.time(), &[0.0, 1e-5]);
        assert_eq!(table.column("i(r1)"), Some(&[-2e-3, 3.0][..]));
    }

    #[test]
    fn test_trailing_delimiter_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "a.csv", "time,v,\n0,1,\n1,2,\n");

        let table = load_table(&path, &TableConfig::default()).unwrap();
        assert_eq!(table.column_names().count(), 2);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_tab_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "a.txt", "time\tv\n0\t1\n");

        let table = load_table(&path, &TableConfig { delimiter: '\t' }).unwrap();
        assert_eq!(table.column("v"), Some(&[1.0][..]));
    }

    #[test]
    fn test_bad_cell_reports_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "a.csv", "time,v\n0,1\n1,oops\n");

        let err = load_table(&path, &TableConfig::default()).unwrap_err();
        match err {
            Error::InvalidNumber { row, column, value, .. } => {
                assert_eq!(row, 2);
                assert_eq!(column, "v");
                assert_eq!(value, "oops");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ragged_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "a.csv", "time,v\n0,1\n1\n");

        let err = load_table(&path, &TableConfig::default()).unwrap_err();
        assert!(matches!(err, Error::RaggedRow { row: 2, expected: 2, found: 1, .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_table("/nonexistent/a.csv", &TableConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let table = Table::new(
            "mem",
            vec![
                ("time".to_string(), vec![0.0, 0.5]),
                ("v(out)".to_string(), vec![1.25, -3.0]),
            ],
        )
        .unwrap();
        let path = dir.path().join("out.csv");

        write_table(&path, &table).unwrap();
        let loaded = load_table(&path, &TableConfig::default()).unwrap();
        assert_eq!(loaded.column("v(out)"), table.column("v(out)"));
    }
}
