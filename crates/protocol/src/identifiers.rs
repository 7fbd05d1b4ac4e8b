//! Newtype identifiers.
//!
//! Every value the bridge uses to address something on GitHub is a distinct
//! newtype. A repository owner can therefore never be passed where a head SHA
//! is expected, and empty or zero identifiers are rejected the moment they are
//! decoded from untrusted input rather than when GitHub refuses the call.

use serde::{Deserialize, Deserializer, Serialize};

use crate::IdentifierError;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() rejecting empty values, as_str(), Display, and
// serde support that routes deserialisation through new().
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, rejecting the empty string.
            pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
                let v = value.into();
                if v.is_empty() {
                    Err(IdentifierError::Empty { kind: stringify!($name) })
                } else {
                    Ok(Self(v))
                }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// String-backed identifiers
// ---------------------------------------------------------------------------

string_id! {
    /// Login of the user or organisation that owns a repository.
    RepoOwner
}

string_id! {
    /// Repository name without the owner prefix.
    RepoName
}

string_id! {
    /// A Git commit SHA, as reported by GitHub for a check suite's head commit.
    CommitSha
}

// ---------------------------------------------------------------------------
// Integer-backed identifiers
// ---------------------------------------------------------------------------

/// Identifies a check run. Assigned by GitHub on creation.
///
/// This is the only durable link between the two sides of the bridge: the
/// value returned by a create call must be carried by every later update of
/// the same check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct CheckRunId(u64);

impl CheckRunId {
    /// Creates a [`CheckRunId`], rejecting zero (GitHub never assigns it).
    pub fn new(value: u64) -> Result<Self, IdentifierError> {
        if value == 0 {
            Err(IdentifierError::Zero { kind: "CheckRunId" })
        } else {
            Ok(Self(value))
        }
    }

    /// Returns the underlying integer value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for CheckRunId {
    type Error = IdentifierError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CheckRunId> for u64 {
    fn from(id: CheckRunId) -> u64 {
        id.0
    }
}

impl std::fmt::Display for CheckRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deserialises an optional check-run id where `0` means "not yet assigned".
///
/// Older relay clients always emit `"id": 0` on create events, so zero and an
/// absent field decode to the same value. Negative numbers are rejected.
pub(crate) fn unassigned_as_none<'de, D>(deserializer: D) -> Result<Option<CheckRunId>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<u64>::deserialize(deserializer)? {
        None | Some(0) => Ok(None),
        Some(raw) => CheckRunId::new(raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_identifiers_reject_empty_values() {
        assert_eq!(
            RepoOwner::new(""),
            Err(IdentifierError::Empty { kind: "RepoOwner" })
        );
        assert_eq!(RepoName::new("tekton-github-app").unwrap().as_str(), "tekton-github-app");
    }

    #[test]
    fn string_identifiers_reject_empty_values_on_the_wire() {
        let err = serde_json::from_str::<CommitSha>(r#""""#).unwrap_err();
        assert!(err.to_string().contains("CommitSha must not be empty"), "{err}");
    }

    #[test]
    fn check_run_id_is_a_bare_integer_on_the_wire() {
        let id = CheckRunId::new(4242).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "4242");
        assert_eq!(serde_json::from_str::<CheckRunId>("4242").unwrap(), id);
    }

    #[test]
    fn check_run_id_rejects_zero() {
        assert_eq!(CheckRunId::new(0), Err(IdentifierError::Zero { kind: "CheckRunId" }));
        assert!(serde_json::from_str::<CheckRunId>("0").is_err());
        assert!(serde_json::from_str::<CheckRunId>("-7").is_err());
    }
}
