//! Generative client error types.
//!
//! Errors carry machine-checkable structure (HTTP status, kind tag) so the
//! retry layer above can classify them without inspecting message text. Only
//! [`GenAiError::Other`], which wraps failures from opaque collaborators, has
//! nothing but text to go on.

use std::fmt;

use thiserror::Error;

/// Errors that can occur when calling the generative backend.
#[derive(Debug, Error)]
pub enum GenAiError {
    /// No credential is configured; the call was never sent.
    #[error("generative backend is not configured: {0}")]
    Configuration(String),

    /// HTTP error: transport failures (connect, timeout, body read) or a
    /// request that could not be built or followed (bad URL, redirects).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Error message extracted from the response body.
        message: String,
    },

    /// The backend returned a 429 Too Many Requests response.
    #[error("rate limited (retry after {retry_after_secs}s)")]
    RateLimited {
        /// Seconds the backend asked us to wait.
        retry_after_secs: u64,
    },

    /// The response envelope could not be decoded.
    #[error("could not decode backend response: {0}")]
    Decode(String),

    /// A structured response did not match the declared schema.
    #[error("structured response violates schema: {}", errors.join("; "))]
    SchemaViolation {
        /// Individual violations, from JSON parsing or schema validation.
        errors: Vec<String>,
    },

    /// The backend refused the prompt (safety filters, policy).
    #[error("request blocked by the backend: {reason}")]
    Blocked {
        /// Block reason reported by the backend.
        reason: String,
    },

    /// An error from an opaque collaborator that carries only a message.
    #[error("{0}")]
    Other(String),
}

/// Coarse kind tag for a [`GenAiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    /// Connect, timeout or body failure on the wire.
    Transport,
    /// The request never left the client, or its redirects could not be followed.
    Request,
    RateLimited,
    Server,
    Rejected,
    Decode,
    SchemaViolation,
    Blocked,
    Opaque,
}

impl ErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Transport => "transport",
            Self::Request => "request",
            Self::RateLimited => "rate_limited",
            Self::Server => "server",
            Self::Rejected => "rejected",
            Self::Decode => "decode",
            Self::SchemaViolation => "schema_violation",
            Self::Blocked => "blocked",
            Self::Opaque => "opaque",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GenAiError {
    /// HTTP status associated with the error, when there is one.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            Self::Http(error) => error.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Kind tag used for retry classification.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Api { status: 429, .. } => ErrorKind::RateLimited,
            Self::Api { status, .. } if *status >= 500 => ErrorKind::Server,
            Self::Api { .. } => ErrorKind::Rejected,
            Self::Http(error) if error.is_decode() => ErrorKind::Decode,
            Self::Http(error) if error.is_timeout() || error.is_connect() || error.is_body() => {
                ErrorKind::Transport
            }
            Self::Http(_) => ErrorKind::Request,
            Self::Decode(_) => ErrorKind::Decode,
            Self::SchemaViolation { .. } => ErrorKind::SchemaViolation,
            Self::Blocked { .. } => ErrorKind::Blocked,
            Self::Other(_) => ErrorKind::Opaque,
        }
    }

    /// Build a `SchemaViolation` from a single message.
    #[must_use]
    pub fn schema(message: impl Into<String>) -> Self {
        Self::SchemaViolation {
            errors: vec![message.into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_map_to_kinds() {
        let cases = [
            (429, ErrorKind::RateLimited),
            (500, ErrorKind::Server),
            (503, ErrorKind::Server),
            (400, ErrorKind::Rejected),
            (403, ErrorKind::Rejected),
        ];
        for (status, kind) in cases {
            let err = GenAiError::Api {
                status,
                message: String::new(),
            };
            assert_eq!(err.kind(), kind, "status {status}");
            assert_eq!(err.status_code(), Some(status));
        }
    }

    #[test]
    fn rate_limited_reports_429() {
        let err = GenAiError::RateLimited {
            retry_after_secs: 5,
        };
        assert_eq!(err.status_code(), Some(429));
        assert_eq!(err.kind(), ErrorKind::RateLimited);
    }

    #[test]
    fn opaque_errors_have_no_status() {
        let err = GenAiError::Other("RPC failed".into());
        assert_eq!(err.status_code(), None);
        assert_eq!(err.kind(), ErrorKind::Opaque);
        assert_eq!(err.to_string(), "RPC failed");
    }

    #[test]
    fn unbuildable_request_is_not_transport() {
        let error = reqwest::Client::new()
            .post("not a url/models/m:generateContent")
            .build()
            .unwrap_err();
        assert!(error.is_builder());

        let err = GenAiError::from(error);
        assert_eq!(err.kind(), ErrorKind::Request);
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn schema_violation_lists_errors() {
        let err = GenAiError::SchemaViolation {
            errors: vec!["missing rooms".into(), "bad unit".into()],
        };
        assert_eq!(
            err.to_string(),
            "structured response violates schema: missing rooms; bad unit"
        );
    }
}
