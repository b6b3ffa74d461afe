use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrepError {
    #[error("Input directory does not exist: {}", .0.display())]
    InputDirMissing(PathBuf),

    #[error("Input path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid file pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Failed to initialize log file: {0}")]
    LogInit(#[from] tracing_appender::rolling::InitError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Line is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Malformed record at {}:{line}: {reason}", path.display())]
    MalformedLine {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Cluster {cluster_id} has no palette entry (palette holds {palette_len} colors)")]
    PaletteIndexOutOfRange { cluster_id: u32, palette_len: usize },

    #[error("Failed to write output {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PrepError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PrepError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PrepError>;
