use std::path::{Path, PathBuf};

use handlabel::table::{Table, Value};

/// Write JSON Lines text into `dir/name` and return the path.
pub fn write_jsonl_fixture(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut text = lines.join("\n");
    text.push('\n');
    std::fs::write(&path, text).expect("write jsonl fixture");
    path
}

/// Label column values of every row, in row order.
pub fn label_values(table: &Table, label_column: &str) -> Vec<Value> {
    (0..table.row_count())
        .map(|row| table.get(row, label_column).cloned().unwrap_or_default())
        .collect()
}
