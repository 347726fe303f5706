//! Record source: CSV with an id column and a title column.
//!
//! Column names are configurable. A header without either column is a
//! configuration error. A row with an empty id or title, text that is not
//! UTF-8, or an id that would act as a path is skipped and counted, never
//! fatal.

use log::{debug, warn};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{Error, Result};
use crate::models::Record;

pub const DEFAULT_ID_COLUMN: &str = "id";
pub const DEFAULT_TITLE_COLUMN: &str = "title";

/// Header names of the id and title columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordColumns {
    pub id: String,
    pub title: String,
}

impl Default for RecordColumns {
    fn default() -> Self {
        Self {
            id: DEFAULT_ID_COLUMN.to_string(),
            title: DEFAULT_TITLE_COLUMN.to_string(),
        }
    }
}

/// Records read from a source, in source order, plus the skipped row count.
#[derive(Debug, Clone, Default)]
pub struct RecordLoad {
    pub records: Vec<Record>,
    pub skipped: usize,
}

pub fn load_records(path: &Path, columns: &RecordColumns) -> Result<RecordLoad> {
    let file = File::open(path)?;
    read_records(file, columns)
}

pub fn read_records<R: Read>(reader: R, columns: &RecordColumns) -> Result<RecordLoad> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let idx = |name: &str| -> Result<usize> {
        let name = name.trim();
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::MissingColumn {
                column: name.to_string(),
                found: headers.join(", "),
            })
    };

    let id_idx = idx(&columns.id)?;
    let title_idx = idx(&columns.title)?;

    let mut load = RecordLoad::default();

    for (row, record) in reader.byte_records().enumerate() {
        let record = record?;
        // Header is line 1
        let line = record.position().map_or(row as u64 + 2, |p| p.line());
        let field =
            |idx: usize| std::str::from_utf8(record.get(idx).unwrap_or_default()).map(str::trim);

        let (id, title) = match (field(id_idx), field(title_idx)) {
            (Ok(id), Ok(title)) => (id, title),
            _ => {
                warn!("Skipping record on line {}: id or title is not valid UTF-8", line);
                load.skipped += 1;
                continue;
            }
        };

        if id.is_empty() || title.is_empty() {
            warn!("Skipping record on line {}: missing id or title", line);
            load.skipped += 1;
            continue;
        }
        if id.contains(['/', '\\']) || id == "." || id == ".." {
            warn!("Skipping record on line {}: id {:?} is not usable in a file name", line, id);
            load.skipped += 1;
            continue;
        }

        load.records.push(Record::new(id, title));
    }

    debug!(
        "Read {} records ({} skipped)",
        load.records.len(),
        load.skipped
    );
    Ok(load)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn columns(id: &str, title: &str) -> RecordColumns {
        RecordColumns {
            id: id.to_string(),
            title: title.to_string(),
        }
    }

    #[test]
    fn test_read_default_columns() {
        let data = "id,title\n001,Deep Learning Survey\n002, Neural Network Basics \n";
        let load = read_records(data.as_bytes(), &RecordColumns::default()).unwrap();
        assert_eq!(
            load.records,
            vec![
                Record::new("001", "Deep Learning Survey"),
                Record::new("002", "Neural Network Basics"),
            ]
        );
        assert_eq!(load.skipped, 0);
    }

    #[test]
    fn test_custom_columns_and_extra_fields() {
        let data = "序号,作者,论文题目\n1,张三,量子计算导论\n2,李四,深度学习综述\n";
        let load = read_records(data.as_bytes(), &columns("序号", "论文题目")).unwrap();
        assert_eq!(load.records.len(), 2);
        assert_eq!(load.records[1], Record::new("2", "深度学习综述"));
    }

    #[test]
    fn test_incomplete_rows_skipped() {
        let data = "id,title\n1,First\n,No Id\n3,\n4\n5,Fifth\n";
        let load = read_records(data.as_bytes(), &RecordColumns::default()).unwrap();
        assert_eq!(load.records.len(), 2);
        assert_eq!(load.skipped, 3);
        assert_eq!(load.records[1].id, "5");
    }

    #[test]
    fn test_invalid_utf8_row_skipped() {
        let mut data = b"id,title\n1,Good\n2,".to_vec();
        data.extend_from_slice(&[0xff, 0xfe]);
        data.extend_from_slice(b"\n3,Also Good\n");

        let load = read_records(data.as_slice(), &RecordColumns::default()).unwrap();
        assert_eq!(
            load.records,
            vec![Record::new("1", "Good"), Record::new("3", "Also Good")]
        );
        assert_eq!(load.skipped, 1);
    }

    #[test]
    fn test_invalid_utf8_outside_used_columns_kept() {
        let mut data = b"id,title,notes\n1,Good,".to_vec();
        data.extend_from_slice(&[0xff]);
        data.push(b'\n');

        let load = read_records(data.as_slice(), &RecordColumns::default()).unwrap();
        assert_eq!(load.records, vec![Record::new("1", "Good")]);
        assert_eq!(load.skipped, 0);
    }

    #[test]
    fn test_path_like_ids_skipped() {
        let data = "id,title\n../../escaped,Paper\n/tmp/x,Other\na\\b,Third\n..,Fourth\nv1..2,Kept\n";
        let load = read_records(data.as_bytes(), &RecordColumns::default()).unwrap();
        assert_eq!(load.records, vec![Record::new("v1..2", "Kept")]);
        assert_eq!(load.skipped, 4);
    }

    #[test]
    fn test_missing_column_is_error() {
        let data = "id,name\n1,First\n";
        let err = read_records(data.as_bytes(), &RecordColumns::default()).unwrap_err();
        match err {
            Error::MissingColumn { column, found } => {
                assert_eq!(column, "title");
                assert_eq!(found, "id, name");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bom_in_header() {
        let data = "\u{feff}id,title\n1,First\n";
        let load = read_records(data.as_bytes(), &RecordColumns::default()).unwrap();
        assert_eq!(load.records.len(), 1);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "id,title").unwrap();
        writeln!(file, "\"007\",\"Title, With Comma\"").unwrap();
        let load = load_records(file.path(), &RecordColumns::default()).unwrap();
        assert_eq!(load.records, vec![Record::new("007", "Title, With Comma")]);
    }
}
