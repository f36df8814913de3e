// src/handlers/error.rs
use std::fmt;
use warp::http::StatusCode;
use warp::reject::Reject;

use crate::error::ResearchError;

#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        ApiError {
            status,
            kind,
            message: message.into(),
        }
    }
}

impl From<ResearchError> for ApiError {
    fn from(e: ResearchError) -> Self {
        let status = match &e {
            ResearchError::InvalidDateFormat { .. } | ResearchError::InvalidParameter { .. } => {
                StatusCode::BAD_REQUEST
            }
            ResearchError::UnknownTicker { .. } => StatusCode::NOT_FOUND,
            ResearchError::DataFetch { .. } => StatusCode::BAD_GATEWAY,
            ResearchError::Universe { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ResearchError::DivisionUndefined { .. }
            | ResearchError::TerminalValueUndefined { .. }
            | ResearchError::InsufficientHistory { .. }
            | ResearchError::NoPeers { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        };
        ApiError::new(status, e.kind(), e.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}
impl Reject for ApiError {}

/// Logs a failed request and turns it into a rejection.
pub fn reject(context: &str, e: ResearchError) -> warp::Rejection {
    log::error!("{} failed: {}", context, e);
    warp::reject::custom(ApiError::from(e))
}
