use thiserror::Error;

#[derive(Error, Debug)]
pub enum TesseraError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Cannot decode {label:?} as {datatype}: {message}")]
    Decode { datatype: String, label: String, message: String },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Dictionary error: {0}")]
    Dictionary(String),
    #[error("Store error: {0}")]
    Store(String),
    #[error("Lock poisoned: {0}")]
    Lock(String),
    #[error("Unsupported: {0}")]
    Unsupported(String),
    #[error("Internal invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, TesseraError>;

impl TesseraError {
    pub fn decode(datatype: &str, label: &str, message: impl Into<String>) -> Self {
        Self::Decode {
            datatype: datatype.to_owned(),
            label: label.to_owned(),
            message: message.into(),
        }
    }
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

// Helper conversions
impl From<config::ConfigError> for TesseraError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}

impl<T> From<std::sync::PoisonError<T>> for TesseraError {
    fn from(e: std::sync::PoisonError<T>) -> Self { Self::Lock(e.to_string()) }
}
