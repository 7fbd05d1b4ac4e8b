//! Wire enumerations and shared value types.
//!
//! Each enumeration here has exactly the members GitHub or the relay protocol
//! accept; there is no "invalid" placeholder member. Conversion to and from
//! the wire goes through one pair of functions per enumeration, `parse` and
//! `as_str`, and the serde implementations are defined in terms of them, so
//! the wire format and the in-process representation cannot drift apart.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ParseEnumError;

// ---------------------------------------------------------------------------
// Macro for string-tokened enumerations.
// Generates: enum, ALL, parse(), as_str(), FromStr, Display, Serialize,
// Deserialize. Matching is exact: no trimming, no case folding.
// ---------------------------------------------------------------------------
macro_rules! wire_enum {
    (
        $(#[$attr:meta])*
        $name:ident {
            $(
                $(#[$vattr:meta])*
                $variant:ident => $token:literal,
            )+
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                $(#[$vattr])*
                $variant,
            )+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Parses a canonical wire token.
            pub fn parse(token: &str) -> Result<Self, ParseEnumError> {
                match token {
                    $($token => Ok(Self::$variant),)+
                    _ => Err(ParseEnumError::new(stringify!($name), token)),
                }
            }

            /// Returns the canonical wire token.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $token,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(token: &str) -> Result<Self, Self::Err> {
                Self::parse(token)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let token = String::deserialize(deserializer)?;
                Self::parse(&token).map_err(serde::de::Error::custom)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Check-run enumerations
// ---------------------------------------------------------------------------

wire_enum! {
    /// Lifecycle position of a check run, restricted to the values GitHub's
    /// check-run API accepts.
    CheckRunStatus {
        /// Created, waiting for CI to pick it up.
        Queued => "queued",
        /// CI is running.
        InProgress => "in_progress",
        /// Finished; a [`CheckRunConclusion`] is expected alongside.
        Completed => "completed",
    }
}

impl CheckRunStatus {
    /// Returns `true` for the status that carries a conclusion.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

wire_enum! {
    /// Terminal outcome of a completed check run.
    ///
    /// Optional on the wire: absence is modelled as `Option::None`, never as
    /// a placeholder member.
    CheckRunConclusion {
        Success => "success",
        Failure => "failure",
        Neutral => "neutral",
        Cancelled => "cancelled",
        Skipped => "skipped",
        TimedOut => "timed_out",
    }
}

// ---------------------------------------------------------------------------
// Relay message tags
// ---------------------------------------------------------------------------

wire_enum! {
    /// Which branch of the Tekton-facing endpoint a [`crate::TektonEvent`] drives.
    TektonEventType {
        /// Create a check run; the response carries the assigned id.
        CreateCheckRun => "create-checkrun",
        /// Update an existing check run addressed by id.
        UpdateCheckRun => "update-checkrun",
    }
}

wire_enum! {
    /// Tag of notifications the bridge sends to Tekton.
    NotificationEvent {
        /// A check suite was requested for a commit.
        CheckSuiteCreated => "check-suite-created",
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Serialises as RFC 3339, the format GitHub expects for `started_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
