use serde::Deserialize;
use serde::Serialize;

/// Response code
pub enum ResponseCode {
    /// Success
    Success = 0,
    /// Completed with per-point or per-publish errors
    PartialFailure = 207,
    /// Error
    Error = 500,
}

/// Standard response structure for the REST endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct WebResponse<T> {
    /// Response code
    pub code: u16,
    /// Human-readable message describing the result
    pub message: String,
    /// Optional payload data (present on success, may be absent on errors)
    pub data: Option<T>,
}

impl<T> WebResponse<T> {
    /// Create a new response with specified message and optional data
    pub fn new(code: ResponseCode, message: &str, data: Option<T>) -> Self {
        Self {
            code: code as u16,
            message: message.into(),
            data,
        }
    }

    /// Create a success response with data
    pub fn ok(data: T) -> Self {
        Self {
            code: ResponseCode::Success as u16,
            message: "success".into(),
            data: Some(data),
        }
    }

    /// Create a partial-failure response with message and data
    pub fn partial(message: &str, data: T) -> Self {
        Self {
            code: ResponseCode::PartialFailure as u16,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Create an error response with message
    pub fn error(message: &str) -> Self {
        Self {
            code: ResponseCode::Error as u16,
            message: message.into(),
            data: None,
        }
    }
}
