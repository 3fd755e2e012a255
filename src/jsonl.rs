//! Line-delimited JSON codec for record documents.

use std::{fs, io, path::Path};

use crate::error::{EditorError, Result};
use crate::record::Record;

// File extension offered by the open/save dialogs
pub const JSONL_FILE_EXT: &str = "jsonl";

/// Parses a JSONL document held in memory. Blank lines are skipped; the
/// first malformed line aborts the whole parse.
pub fn parse_str(text: &str) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for (line_idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        let record = serde_json::from_str::<Record>(line)
            .map_err(|e| EditorError::parse(line_idx + 1, line, e))?;
        records.push(record);
    }
    Ok(records)
}

/// One compact JSON object per line, each newline-terminated.
pub fn to_string(records: &[Record]) -> serde_json::Result<String> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push('\n');
    }
    Ok(out)
}

pub fn read_all(path: &Path) -> Result<Vec<Record>> {
    let text = fs::read_to_string(path).map_err(|e| EditorError::io(path, e))?;
    let records = parse_str(&text)?;
    tracing::info!(path = %path.display(), count = records.len(), "read jsonl");
    Ok(records)
}

/// Overwrites `path` with the serialized records.
pub fn write_all(path: &Path, records: &[Record]) -> Result<()> {
    let text = to_string(records)
        .map_err(|e| EditorError::io(path, io::Error::new(io::ErrorKind::InvalidData, e)))?;
    fs::write(path, text).map_err(|e| EditorError::io(path, e))?;
    tracing::info!(path = %path.display(), count = records.len(), "wrote jsonl");
    Ok(())
}
