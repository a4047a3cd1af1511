/// Metadata and payload validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    InvalidInput(String),
    Malformed(String),
}

impl std::fmt::Display for MetadataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::Malformed(msg) => write!(f, "malformed response: {msg}"),
        }
    }
}

impl std::error::Error for MetadataError {}
