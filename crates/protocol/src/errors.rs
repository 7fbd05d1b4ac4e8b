//! Error types shared by the relay protocol.
//!
//! [`ParseEnumError`] and [`IdentifierError`] are produced while decoding
//! untrusted input and surface as client errors. [`RelayError`] is the single
//! error type returned across the port traits; each adapter folds its own
//! transport errors into it so handlers can map failures to status codes
//! without knowing which adapter produced them.

use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Decode errors
// ---------------------------------------------------------------------------

/// A token that is not one of an enumeration's canonical wire values.
///
/// Never silently defaulted: every wire enumeration rejects unknown tokens,
/// the empty string, and case variants of valid tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} value: {value:?}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    /// Creates an error for `value` rejected by the enumeration named `kind`.
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// Name of the enumeration that rejected the token.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// The rejected token.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// An identifier value that cannot name anything on GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    /// A string identifier was empty.
    #[error("{kind} must not be empty")]
    Empty {
        /// Identifier type name.
        kind: &'static str,
    },

    /// An integer identifier was zero.
    #[error("{kind} must be a positive integer")]
    Zero {
        /// Identifier type name.
        kind: &'static str,
    },
}

// ---------------------------------------------------------------------------
// Relay errors
// ---------------------------------------------------------------------------

/// Failure of an outbound call made on behalf of an inbound request.
///
/// The bridge never retries; the handler that receives this error turns it
/// into a gateway (`502`) or service-unavailable (`503`) response and the
/// upstream sender's own retry policy takes over.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The call did not finish before the downstream deadline.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        /// Name of the outbound operation.
        operation: &'static str,
        /// Deadline that expired.
        after: Duration,
    },

    /// The remote answered with a non-success status.
    #[error("{operation} rejected with status {status}: {body}")]
    Rejected {
        /// Name of the outbound operation.
        operation: &'static str,
        /// HTTP status code returned by the remote.
        status: u16,
        /// Response body or extracted error message.
        body: String,
    },

    /// The call failed before a response was obtained (transport, auth, decoding).
    #[error("{operation} failed: {source}")]
    Downstream {
        /// Name of the outbound operation.
        operation: &'static str,
        /// Underlying adapter error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl RelayError {
    /// Wraps an adapter error raised while performing `operation`.
    pub fn downstream(
        operation: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Downstream {
            operation,
            source: source.into(),
        }
    }

    /// Returns `true` if the error was caused by the downstream deadline.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
