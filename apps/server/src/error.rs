use std::time::Duration;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{SecondsFormat, Utc};
use folio_market_data::{ErrorKind, MarketDataError};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Too many requests. Please try again later.")]
    TooManyRequests { retry_after: Option<Duration> },
    /// A service failure, with the message shown to the client.
    #[error("{message}")]
    MarketData {
        message: String,
        #[source]
        source: MarketDataError,
    },
}

impl ApiError {
    pub fn quote(source: MarketDataError) -> Self {
        let message = match source.kind() {
            ErrorKind::InvalidInput => source.to_string(),
            ErrorKind::NotFound => format!("Quote not found for symbol: {}", source),
            _ => format!("Failed to fetch quote: {}", source),
        };
        Self::MarketData { message, source }
    }

    pub fn earnings(source: MarketDataError) -> Self {
        let message = match source.kind() {
            ErrorKind::InvalidInput => source.to_string(),
            ErrorKind::NotFound => {
                "No upcoming earnings date found for the specified symbol".to_string()
            }
            _ => format!("Failed to fetch earnings date: {}", source),
        };
        Self::MarketData { message, source }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::MarketData { source, .. } => StatusCode::from_u16(source.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            ApiError::TooManyRequests { retry_after } => *retry_after,
            ApiError::MarketData { source, .. } => source.retry_after(),
            ApiError::BadRequest(_) => None,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    timestamp: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Market data request failed: {}", self);
        }

        let body = Json(ErrorBody {
            error: self.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        });
        let mut response = (status, body).into_response();

        if let Some(wait) = self.retry_after() {
            // Whole seconds, never zero
            let secs = wait.as_secs_f64().ceil().max(1.0) as u64;
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
