use std::error::Error;
use std::fmt;
use synteny_protocol::ProtocolError;
use synteny_render::ExportError;

#[derive(Debug)]
pub enum ViewerError {
    String(String),
    Io(std::io::Error),
    Serde(serde_json::Error),
    Protocol(ProtocolError),
    Export(ExportError),
    /// The platform refused to switch to fullscreen; the view is unchanged.
    FullscreenRejected(String),
}

impl Error for ViewerError {}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ViewerError::String(s) => write!(f, "{s}"),
            ViewerError::Io(e) => write!(f, "IO error: {e}"),
            ViewerError::Serde(e) => write!(f, "JSON error: {e}"),
            ViewerError::Protocol(e) => write!(f, "{e}"),
            ViewerError::Export(e) => write!(f, "{e}"),
            ViewerError::FullscreenRejected(why) => write!(f, "fullscreen rejected: {why}"),
        }
    }
}

impl From<String> for ViewerError {
    fn from(err: String) -> Self {
        ViewerError::String(err)
    }
}

impl From<std::io::Error> for ViewerError {
    fn from(err: std::io::Error) -> Self {
        ViewerError::Io(err)
    }
}

impl From<serde_json::Error> for ViewerError {
    fn from(err: serde_json::Error) -> Self {
        ViewerError::Serde(err)
    }
}

impl From<ProtocolError> for ViewerError {
    fn from(err: ProtocolError) -> Self {
        ViewerError::Protocol(err)
    }
}

impl From<ExportError> for ViewerError {
    fn from(err: ExportError) -> Self {
        ViewerError::Export(err)
    }
}
