use std::error::Error as StdError;
use std::io;
use std::num::ParseFloatError;

use thiserror::Error;

/// An error that might occur while extracting and writing XIC traces
#[derive(Debug, Error)]
pub enum XicError {
    #[error("An IO error occurred: {0}")]
    IOError(
        #[source]
        #[from]
        io::Error,
    ),
    #[error("Failed to parse mass on line {line} ({text:?}): {source}")]
    MassListParseError {
        line: usize,
        text: String,
        #[source]
        source: ParseFloatError,
    },
    #[error("Mass on line {line} is not a finite number ({text:?})")]
    NonFiniteMass { line: usize, text: String },
    #[error("The scan provider failed: {0}")]
    ProviderError(#[source] Box<dyn StdError + Send + Sync>),
    #[error("Requested {expected} chromatogram traces but the scan provider returned {received}")]
    TraceCountMismatch { expected: usize, received: usize },
    #[error("Failed to serialize XIC records: {0}")]
    SerializationError(
        #[source]
        #[from]
        serde_json::Error,
    ),
}

impl XicError {
    pub fn provider<E: StdError + Send + Sync + 'static>(error: E) -> Self {
        Self::ProviderError(Box::new(error))
    }
}
