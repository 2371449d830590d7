use std::path::PathBuf;

use thiserror::Error;

/// Fatal problems with the supplied document. Raised before any page is
/// processed; no partial result is returned.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("input file does not exist: {0}")]
    NotFound(PathBuf),

    #[error("input file is not readable: {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("input is not a PDF (missing %PDF- header): {0}")]
    NotPdf(PathBuf),

    #[error("PDF could not be opened: {path}: {reason}")]
    InvalidPdf { path: PathBuf, reason: String },
}

impl InputError {
    pub fn path(&self) -> &PathBuf {
        match self {
            InputError::NotFound(path) | InputError::NotPdf(path) => path,
            InputError::Unreadable { path, .. } | InputError::InvalidPdf { path, .. } => path,
        }
    }
}
