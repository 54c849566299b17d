use std::io;

use thiserror::Error;

use crate::annotation::ParseError;
use crate::store::StoreError;

/// Fatal errors of a conversion / export run.
///
/// Anything recoverable (strand conflicts, missing contigs, ...) is a
/// [`crate::annotation::Diagnostic`] instead and never shows up here.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("cannot read '{path}': {source}")]
    Input {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl ConvertError {
    pub(crate) fn input(path: &std::path::Path, source: io::Error) -> Self {
        ConvertError::Input {
            path: path.display().to_string(),
            source,
        }
    }
}
