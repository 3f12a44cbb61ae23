//! Strongly-typed identifiers used across the client.

use core::str::FromStr;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Electronic Product Code read from a radio tag (one per physical tag).
///
/// Wire values are taken as-is so that one blank EPC does not invalidate the
/// whole message it arrived in; use [`Epc::is_blank`] to filter them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Epc(String);

/// Opaque catalog row identifier.
///
/// The backend sends either a string or an integer; both are kept in their
/// textual form so that `"7"` and `7` name the same row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct CatalogRowId(String);

/// Identifier of one connection session (client side).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

macro_rules! impl_string_newtype {
    ($t:ty) => {
        impl $t {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<$t> for String {
            fn from(value: $t) -> Self {
                value.0
            }
        }
    };
}

impl_string_newtype!(Epc);
impl_string_newtype!(CatalogRowId);

impl Epc {
    /// Build an EPC, rejecting blank values.
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(DomainError::invalid_id("Epc: value cannot be empty"));
        }
        Ok(Self(value))
    }

    /// Empty or whitespace-only; such a tag can never match a catalog row.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl TryFrom<String> for Epc {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for Epc {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl CatalogRowId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl From<&str> for CatalogRowId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<u64> for CatalogRowId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for CatalogRowId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Integer(i64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Integer(n) => Self(n.to_string()),
        })
    }
}

impl SessionId {
    /// Create a new identifier.
    ///
    /// Uses UUIDv7 (time-ordered) so log lines of consecutive sessions sort
    /// naturally.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SessionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SessionId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let uuid =
            Uuid::from_str(s).map_err(|e| DomainError::invalid_id(format!("SessionId: {e}")))?;
        Ok(Self(uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_epc_is_rejected() {
        assert!(matches!(Epc::new("   "), Err(DomainError::InvalidId(_))));
        assert_eq!(Epc::new("E200").unwrap().as_str(), "E200");
    }

    #[test]
    fn epc_deserialization_keeps_blank_values_for_filtering() {
        let ok: Epc = serde_json::from_str("\"E2801160\"").unwrap();
        assert_eq!(ok.to_string(), "E2801160");
        assert!(!ok.is_blank());

        let blank: Epc = serde_json::from_str("\" \"").unwrap();
        assert!(blank.is_blank());
    }

    #[test]
    fn catalog_row_id_accepts_string_or_integer() {
        let a: CatalogRowId = serde_json::from_str("7").unwrap();
        let b: CatalogRowId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(a, b);
        assert_eq!(serde_json::to_string(&a).unwrap(), "\"7\"");
    }

    #[test]
    fn session_id_round_trips_through_display() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<SessionId>().is_err());
    }
}
