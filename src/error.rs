// Error type for the conversion pipeline. The parser itself never fails;
// "nothing extracted" is the only condition it reports.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(
        "No data extracted from SQL. Please ensure your SQL follows the format: \
         INSERT INTO table_name (col1, col2) VALUES (val1, val2);"
    )]
    NoData,
    #[error("{} is {size} bytes, over the {limit} byte limit", path.display())]
    InputTooLarge { path: PathBuf, size: u64, limit: u64 },
    #[error("{} is not valid UTF-8", path.display())]
    Utf8 { path: PathBuf },
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
