use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum ProtocolError {
    /// A numeric column held text that is not a non-negative integer.
    InvalidNumber {
        row: usize,
        field: &'static str,
        value: String,
    },
    MissingField {
        row: usize,
        field: &'static str,
    },
    InvalidStrand {
        row: usize,
        value: String,
    },
    Csv(csv::Error),
    Io(std::io::Error),
    Serde(serde_json::Error),
}

impl Error for ProtocolError {}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProtocolError::InvalidNumber { row, field, value } => {
                write!(f, "row {row}: field '{field}' is not an integer: '{value}'")
            }
            ProtocolError::MissingField { row, field } => {
                write!(f, "row {row}: required field '{field}' is empty")
            }
            ProtocolError::InvalidStrand { row, value } => {
                write!(f, "row {row}: unknown strand '{value}'")
            }
            ProtocolError::Csv(e) => write!(f, "CSV error: {e}"),
            ProtocolError::Io(e) => write!(f, "IO error: {e}"),
            ProtocolError::Serde(e) => write!(f, "JSON error: {e}"),
        }
    }
}

impl From<csv::Error> for ProtocolError {
    fn from(err: csv::Error) -> Self {
        ProtocolError::Csv(err)
    }
}

impl From<std::io::Error> for ProtocolError {
    fn from(err: std::io::Error) -> Self {
        ProtocolError::Io(err)
    }
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        ProtocolError::Serde(err)
    }
}
