//! JSON Lines import/export for [`Table`].

use std::fs::{File, create_dir_all};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use super::{Table, Value};

#[derive(Debug, Error)]
pub enum TableIoError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid row at line {line}: {reason}")]
    InvalidRow { line: usize, reason: String },
}

/// Load a table from a JSON Lines file (one object per non-blank line).
///
/// Columns are ordered by first appearance across rows.
pub fn load_jsonl(path: &Path) -> Result<Table, TableIoError> {
    let file = File::open(path)?;
    read_jsonl(BufReader::new(file))
}

/// Parse JSON Lines from any buffered reader.
pub fn read_jsonl<R: BufRead>(reader: R) -> Result<Table, TableIoError> {
    let mut table = Table::default();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let line_no = idx + 1;
        let parsed: serde_json::Value =
            serde_json::from_str(&line).map_err(|err| TableIoError::InvalidRow {
                line: line_no,
                reason: err.to_string(),
            })?;
        let serde_json::Value::Object(object) = parsed else {
            return Err(TableIoError::InvalidRow {
                line: line_no,
                reason: "expected a JSON object".to_string(),
            });
        };
        let mut cells = Vec::with_capacity(object.len());
        for (column, value) in object {
            let value = value_from_json(value).map_err(|reason| TableIoError::InvalidRow {
                line: line_no,
                reason: format!("column {column}: {reason}"),
            })?;
            cells.push((column, value));
        }
        table.push_row(cells);
    }
    Ok(table)
}

/// Write a table as JSON Lines, creating parent directories as needed.
pub fn write_jsonl(table: &Table, path: &Path) -> Result<(), TableIoError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_rows(table, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Serialize every row of `table` as one JSON object per line.
pub fn write_rows<W: Write>(table: &Table, writer: &mut W) -> Result<(), TableIoError> {
    for row in 0..table.row_count() {
        let mut object = serde_json::Map::new();
        if let Some(cells) = table.row(row) {
            for (column, value) in cells {
                object.insert(column.to_string(), value_to_json(value));
            }
        }
        serde_json::to_writer(&mut *writer, &serde_json::Value::Object(object))?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

fn value_from_json(value: serde_json::Value) -> Result<Value, String> {
    match value {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(v) => Ok(Value::Bool(v)),
        serde_json::Value::Number(number) => {
            if let Some(v) = number.as_i64() {
                Ok(Value::Integer(v))
            } else if let Some(v) = number.as_f64() {
                Ok(Value::Float(v))
            } else {
                Err(format!("number out of range: {number}"))
            }
        }
        serde_json::Value::String(v) => Ok(Value::Text(v)),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Err("nested values are not supported".to_string())
        }
    }
}

fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(v) => serde_json::Value::Bool(*v),
        Value::Integer(v) => serde_json::Value::from(*v),
        // Non-finite floats have no JSON form and are written as null.
        Value::Float(v) => serde_json::Number::from_f64(*v)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(v) => serde_json::Value::String(v.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn loads_rows_with_missing_and_null_labels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.jsonl");
        std::fs::write(
            &path,
            r#"{"label":1,"x":10}
{"x":20}

{"label":null,"x":30.5,"name":"c"}
"#,
        )
        .unwrap();

        let table = load_jsonl(&path).unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.columns(), &["label", "x", "name"]);
        assert_eq!(table.get(0, "label"), Some(&Value::Integer(1)));
        assert_eq!(table.get(1, "label"), Some(&Value::Null));
        assert_eq!(table.get(2, "x"), Some(&Value::Float(30.5)));
        assert_eq!(table.get(2, "name"), Some(&Value::Text("c".into())));
        assert_eq!(table.null_rows("label"), vec![1, 2]);
    }

    #[test]
    fn column_order_follows_the_file() {
        let dir = tempdir().unwrap();
        let input = "{\"x\":10,\"label\":1}\n{\"z\":true,\"x\":20}\n";
        let table = read_jsonl(input.as_bytes()).unwrap();
        assert_eq!(table.columns(), &["x", "label", "z"]);

        let path = dir.path().join("ordered.jsonl");
        write_jsonl(&table, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "{\"x\":10,\"label\":1,\"z\":null}\n{\"x\":20,\"label\":null,\"z\":true}\n"
        );
        assert_eq!(load_jsonl(&path).unwrap(), table);
    }

    #[test]
    fn rejects_nested_values_with_line_number() {
        let input = "{\"x\":1}\n{\"x\":[1,2]}\n";
        let err = read_jsonl(input.as_bytes()).unwrap_err();
        match err {
            TableIoError::InvalidRow { line, reason } => {
                assert_eq!(line, 2);
                assert!(reason.contains("column x"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_non_object_lines() {
        let err = read_jsonl("[1,2,3]\n".as_bytes()).unwrap_err();
        assert!(matches!(err, TableIoError::InvalidRow { line: 1, .. }));
    }

    #[test]
    fn writes_rows_back_with_nulls() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("out.jsonl");
        let mut table = Table::new(["x", "label"]);
        table.push_row([("x", Value::Integer(1)), ("label", Value::Text("a".into()))]);
        table.push_row([("x", Value::Float(2.5))]);

        write_jsonl(&table, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"x":1,"label":"a"}"#);
        assert_eq!(lines[1], r#"{"x":2.5,"label":null}"#);

        let reloaded = load_jsonl(&path).unwrap();
        assert_eq!(reloaded.get(0, "label"), Some(&Value::Text("a".into())));
        assert_eq!(reloaded.get(1, "label"), Some(&Value::Null));
    }
}
