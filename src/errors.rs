use serde::Serialize;

/// Structural problems in the raw payload. Any of these aborts decoding of the
/// whole dataset; rows are never skipped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("Unsupported row schema version {found} (expected {expected})")]
    UnsupportedSchema { found: u32, expected: u32 },

    #[error("Row {row}: expected {expected} fields, got {actual}")]
    Arity {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Row {row}: {field} index {index} out of range (table has {len} entries)")]
    IndexOutOfRange {
        row: usize,
        field: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Row {row}: {field} is missing")]
    MissingField { row: usize, field: &'static str },

    #[error("Row {row}: invalid {field} value {value}")]
    InvalidValue {
        row: usize,
        field: &'static str,
        value: f64,
    },

    #[error("Invalid trade date in calendar: {0}")]
    InvalidDate(String),
}

/// All application errors, categorized by domain.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ── Data / Load ──
    #[error("Malformed dataset: {0}")]
    Decode(#[from] DecodeError),

    #[error("Could not load dataset: {0}")]
    LoadFailure(String),

    // ── Export ──
    #[error("Failed to write file: {0}")]
    FileWrite(String),

    // ── Configuration ──
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Serialization ──
    #[error("Serialization error: {0}")]
    Serialization(String),

    // ── General ──
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Serializable error response for the presentation layer.
#[derive(Debug, Serialize, Clone)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        let code = match err {
            AppError::Decode(_) => "DECODE_ERROR",
            AppError::LoadFailure(_) => "LOAD_FAILURE",
            AppError::FileWrite(_) => "FILE_WRITE",
            AppError::InvalidConfig(_) => "INVALID_CONFIG",
            AppError::Serialization(_) => "SERIALIZATION",
            AppError::Internal(_) => "INTERNAL",
        };
        ErrorResponse {
            code: code.to_string(),
            message: err.to_string(),
        }
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let response = ErrorResponse::from(self);
        response.serialize(serializer)
    }
}

// ── Conversions from external errors ──

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileWrite(err.to_string())
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::FileWrite(err.to_string())
    }
}
