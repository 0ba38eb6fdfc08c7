//! Ownership-scoped record contract shared by geo files and shapes.
//!
//! Every stored artefact carries the id of the user who created it. The
//! [`OwnedRecord`] trait describes how a record type is created from a draft
//! and how a partial patch is applied, so repository adapters can stay
//! generic over the record kind while the owner filter stays mandatory.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;

/// Maximum record name length in characters.
pub const RECORD_NAME_MAX: usize = 255;

/// Validation errors shared by record identifiers and names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    NonPositiveId,
    EmptyName,
    NameTooLong { max: usize },
}

impl fmt::Display for RecordValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveId => write!(f, "record id must be a positive integer"),
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
        }
    }
}

impl std::error::Error for RecordValidationError {}

/// Storage-assigned identifier of a geo file or shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct RecordId(i64);

impl RecordId {
    /// Validate and wrap a raw identifier.
    ///
    /// # Examples
    /// ```
    /// use geodata::domain::RecordId;
    ///
    /// assert!(RecordId::new(1).is_ok());
    /// assert!(RecordId::new(0).is_err());
    /// ```
    pub fn new(id: i64) -> Result<Self, RecordValidationError> {
        if id <= 0 {
            return Err(RecordValidationError::NonPositiveId);
        }
        Ok(Self(id))
    }

    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for RecordId {
    type Error = RecordValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RecordId> for i64 {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

/// Human-facing record name, trimmed and bounded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RecordName(String);

impl RecordName {
    /// Validate and construct a record name.
    pub fn new(name: impl AsRef<str>) -> Result<Self, RecordValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(RecordValidationError::EmptyName);
        }
        if trimmed.chars().count() > RECORD_NAME_MAX {
            return Err(RecordValidationError::NameTooLong {
                max: RECORD_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for RecordName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for RecordName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for RecordName {
    type Error = RecordValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RecordName> for String {
    fn from(value: RecordName) -> Self {
        value.0
    }
}

/// A record stamped with its owner at creation.
///
/// `Draft` carries the caller-supplied fields of a new record; `Patch`
/// carries the subset of fields an update replaces.
pub trait OwnedRecord: Clone + fmt::Debug + Send + Sync + 'static {
    /// Caller-supplied fields for a new record.
    type Draft: Clone + fmt::Debug + Send + Sync + 'static;
    /// Partial update; absent fields are left untouched.
    type Patch: Clone + fmt::Debug + Send + Sync + 'static;

    /// Lowercase noun used in messages, e.g. `"shape"`.
    const LABEL: &'static str;

    /// Build the stored form of a freshly created record.
    fn from_draft(id: RecordId, owner_id: UserId, draft: Self::Draft, at: DateTime<Utc>) -> Self;

    fn id(&self) -> RecordId;

    fn owner_id(&self) -> UserId;

    /// Apply the fields present in `patch` and refresh the update timestamp.
    fn apply_patch(&mut self, patch: Self::Patch, at: DateTime<Utc>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0)]
    #[case(-3)]
    fn record_id_rejects_non_positive(#[case] raw: i64) {
        assert_eq!(RecordId::new(raw), Err(RecordValidationError::NonPositiveId));
    }

    #[rstest]
    fn record_name_is_trimmed() {
        let name = RecordName::new("  parks.geojson ").expect("valid name");
        assert_eq!(name.as_ref(), "parks.geojson");
    }

    #[rstest]
    #[case("")]
    #[case("  \t ")]
    fn record_name_rejects_blank(#[case] raw: &str) {
        assert_eq!(RecordName::new(raw), Err(RecordValidationError::EmptyName));
    }

    #[rstest]
    fn record_name_rejects_overlong() {
        let raw = "n".repeat(RECORD_NAME_MAX + 1);
        assert_eq!(
            RecordName::new(raw),
            Err(RecordValidationError::NameTooLong {
                max: RECORD_NAME_MAX
            })
        );
    }
}
