use std::path::PathBuf;

use thiserror::Error;

use crate::app_error::AppError;

/// Errors that can occur during application startup.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("Failed to read student seed file {path}")]
    SeedRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Student seed file {path} is not a JSON array of student records")]
    SeedParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Student seed import failed")]
    SeedImport(#[source] AppError),

    #[error("Cannot create log file {path}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("TCP bind failed")]
    TcpBind(#[source] std::io::Error),

    #[error("Server error")]
    Server(#[source] std::io::Error),
}
