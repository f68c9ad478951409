//! Typed failures of the log producers.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TailError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("read failed on {source_name}: {source}")]
    Read {
        source_name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("event loop is gone")]
    ChannelClosed,
}
