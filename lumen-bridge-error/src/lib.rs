pub mod process;
pub mod publish;
pub mod web;

use anyhow::Error as AnyhowError;
use config::ConfigError;
use process::ProcessError;
use publish::PublishError;
use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;
use thiserror::Error;
use tokio::task::JoinError;
use web::WebError;

pub type LbResult<T, E = LbError> = anyhow::Result<T, E>;
pub type WebResult<T, E = WebError> = anyhow::Result<T, E>;
pub type PublishResult<T, E = PublishError> = Result<T, E>;

/// Top-level error for the bridge binary and component wiring.
#[derive(Error, Debug)]
pub enum LbError {
    #[error("{0}")]
    Msg(String),
    #[error("{0}")]
    IoError(#[from] IoError),
    #[error("{0}")]
    Anyhow(#[from] AnyhowError),
    #[error("{0}")]
    Json(#[from] SerdeJsonError),
    #[error("{0}")]
    ConfigError(#[from] ConfigError),
    #[error("{0}")]
    JoinError(#[from] JoinError),
    #[error("{0}")]
    PublishError(#[from] PublishError),
    #[error("{0}")]
    ProcessError(#[from] ProcessError),
    #[error("{0}")]
    WebError(#[from] WebError),
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
    #[error("Initialization error: {0}")]
    InitializationError(String),
    #[error("Shutdown error: {0}")]
    ShutdownError(String),
}

impl From<String> for LbError {
    #[inline]
    fn from(e: String) -> Self {
        LbError::Msg(e)
    }
}

impl From<&str> for LbError {
    #[inline]
    fn from(e: &str) -> Self {
        LbError::Msg(e.to_string())
    }
}
