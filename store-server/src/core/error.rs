use thiserror::Error;

use crate::orders::ManagerError;

/// Startup and serve failures
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Work directory error: {0}")]
    WorkDir(#[source] std::io::Error),

    #[error("Failed to open store: {0}")]
    Store(#[from] ManagerError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server error: {0}")]
    Serve(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
