//! HTTP failures from the hosted backend.
//!
//! PostgREST and Storage both answer errors with a JSON body carrying a
//! `message` field. `ApiError` keeps that message together with the status so
//! that the caller can file the failure under the right category.

use std::fmt;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde::Deserialize;

use crate::error::TicketDeskError;

/// Retry delay reported when a 429 carries no usable `Retry-After`
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code, if the request got that far
    pub status: Option<StatusCode>,
    /// Retry-After header value in seconds
    pub retry_after: Option<u64>,
    pub message: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            retry_after: None,
            message: message.into(),
        }
    }

    /// Build from a non-success response's status, headers and body text.
    pub fn from_response_parts(status: StatusCode, headers: &HeaderMap, body: &str) -> Self {
        let retry_after = headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok());

        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message.or(b.error))
            .filter(|m| !m.is_empty());

        let message = match detail {
            Some(detail) => format!("{detail} (HTTP {})", status.as_u16()),
            None => format!("HTTP {status}"),
        };

        Self {
            status: Some(status),
            retry_after,
            message,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == Some(StatusCode::TOO_MANY_REQUESTS)
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status,
            Some(StatusCode::UNAUTHORIZED) | Some(StatusCode::FORBIDDEN)
        )
    }

    /// Convert into a crate error, filing ordinary failures with `category`.
    pub fn into_error(self, category: fn(String) -> TicketDeskError) -> TicketDeskError {
        if self.is_rate_limited() {
            return TicketDeskError::RateLimited(
                self.retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
            );
        }
        if self.is_unauthorized() {
            return category(format!(
                "{}; check SUPABASE_ANON_KEY or auth.api_key",
                self.message
            ));
        }
        category(self.message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        Self {
            status: error.status(),
            retry_after: None,
            message: error.to_string(),
        }
    }
}
