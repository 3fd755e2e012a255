use std::{io, path::PathBuf};

// Longest slice of an offending line echoed back to the user
pub const PARSE_EXCERPT_CHARS: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("error parsing JSON on line {line}: {source}\n\n'{excerpt}'")]
    Parse {
        line: usize,
        excerpt: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("record index {index} out of range for document of {len} records")]
    IndexOutOfRange { index: usize, len: usize },
}

impl EditorError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        EditorError::Io {
            path: path.into(),
            source,
        }
    }

    // Builds a parse error carrying a truncated copy of the raw line
    pub fn parse(line: usize, raw: &str, source: serde_json::Error) -> Self {
        EditorError::Parse {
            line,
            excerpt: excerpt(raw),
            source,
        }
    }

    /// Title for the modal that reports this error.
    pub fn title(&self) -> &'static str {
        match self {
            EditorError::Parse { .. } => "JSON Error",
            EditorError::Io { .. } => "File Error",
            EditorError::IndexOutOfRange { .. } => "Internal Error",
        }
    }
}

fn excerpt(raw: &str) -> String {
    let mut chars = raw.chars();
    let head: String = chars.by_ref().take(PARSE_EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

pub type Result<T> = std::result::Result<T, EditorError>;
