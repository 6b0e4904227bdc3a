use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TallyError {
    #[error("could not read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("--top must be at least 1, got {0}")]
    Top(i64),

    #[error("--min-length can't be negative, got {0}")]
    MinLength(i64),
}
