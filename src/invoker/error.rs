use crate::routing::discovery::ResolutionError;
use crate::routing::types::PartitionId;

use thiserror::Error;

/// Status codes a replica uses to say it is not (or no longer) the primary.
const ROUTING_STATUSES: [u16; 2] = [421, 503];

/// Decides whether a failure is worth another attempt.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// Outcome of a single failed attempt, as classified by the operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AttemptError {
    /// The endpoint is unreachable, timed out or is no longer the right target.
    #[error("routing failure: {reason}")]
    Routing { reason: String },

    /// The service processed the request and rejected it.
    #[error("rejected with status {status}: {reason}")]
    Application { status: u16, reason: String },
}

impl AttemptError {
    pub fn routing(reason: impl Into<String>) -> Self {
        Self::Routing {
            reason: reason.into(),
        }
    }

    /// Classifies a non-success status returned by a reachable replica.
    ///
    /// `body` is the response text; when empty the canonical reason phrase is used.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let reason = match body.trim() {
            "" => status.canonical_reason().unwrap_or("unknown").to_string(),
            text => text.to_string(),
        };

        if ROUTING_STATUSES.contains(&status.as_u16()) {
            Self::Routing {
                reason: format!("{}: {}", status, reason),
            }
        } else {
            Self::Application {
                status: status.as_u16(),
                reason,
            }
        }
    }
}

impl From<reqwest::Error> for AttemptError {
    /// Any error raised before a response arrives (connect, timeout, reset) means the
    /// endpoint could not serve the request.
    fn from(err: reqwest::Error) -> Self {
        Self::Routing {
            reason: err.to_string(),
        }
    }
}

impl Retryable for AttemptError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Routing { .. })
    }
}

impl Retryable for ResolutionError {
    fn is_retryable(&self) -> bool {
        !matches!(self, Self::Malformed { .. })
    }
}

/// Terminal outcome of an invocation that did not succeed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("could not resolve partition {partition} after {attempts} attempt(s): {source}")]
    Resolution {
        partition: PartitionId,
        attempts: u32,
        #[source]
        source: ResolutionError,
    },

    #[error("partition {partition} unreachable after {attempts} attempt(s): {reason}")]
    Transport {
        partition: PartitionId,
        attempts: u32,
        reason: String,
    },

    #[error("operation rejected with status {status}: {reason}")]
    Operation { status: u16, reason: String },

    #[error("invocation cancelled")]
    Cancelled,
}

impl DispatchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Short label for logs and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Resolution { .. } => "resolution",
            Self::Transport { .. } => "transport",
            Self::Operation { .. } => "operation",
            Self::Cancelled => "cancelled",
        }
    }

    /// HTTP status a gateway should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Operation { status, .. } => *status,
            Self::Transport { .. } => 502,
            Self::Resolution { .. } => 503,
            Self::Cancelled => 499,
        }
    }
}
