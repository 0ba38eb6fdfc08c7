//! Uploaded geo files.
//!
//! Content is stored verbatim as an opaque string; no GeoJSON or KML parsing
//! happens anywhere in the service.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{OwnedRecord, RecordId, RecordName, RecordValidationError, UserId};

/// Validation errors raised while building geo file uploads and replacements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeoFileValidationError {
    Name(RecordValidationError),
    EmptyContent,
    UnknownKind { value: String },
}

impl fmt::Display for GeoFileValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(err) => write!(f, "{err}"),
            Self::EmptyContent => write!(f, "content must not be empty"),
            Self::UnknownKind { value } => {
                write!(f, "unknown file kind '{value}'; expected geojson or kml")
            }
        }
    }
}

impl std::error::Error for GeoFileValidationError {}

impl From<RecordValidationError> for GeoFileValidationError {
    fn from(value: RecordValidationError) -> Self {
        Self::Name(value)
    }
}

/// Format of an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GeoFileKind {
    Geojson,
    Kml,
}

impl GeoFileKind {
    /// Infer the kind from a file name: names ending in `kml` are KML,
    /// everything else is treated as GeoJSON.
    ///
    /// # Examples
    /// ```
    /// use geodata::domain::GeoFileKind;
    ///
    /// assert_eq!(GeoFileKind::from_file_name("trail.KML"), GeoFileKind::Kml);
    /// assert_eq!(GeoFileKind::from_file_name("parks.json"), GeoFileKind::Geojson);
    /// ```
    pub fn from_file_name(name: &str) -> Self {
        if name.to_ascii_lowercase().ends_with("kml") {
            Self::Kml
        } else {
            Self::Geojson
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Geojson => "geojson",
            Self::Kml => "kml",
        }
    }
}

impl fmt::Display for GeoFileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeoFileKind {
    type Err = GeoFileValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "geojson" => Ok(Self::Geojson),
            "kml" => Ok(Self::Kml),
            _ => Err(GeoFileValidationError::UnknownKind {
                value: value.to_owned(),
            }),
        }
    }
}

fn validate_content(content: String) -> Result<String, GeoFileValidationError> {
    if content.trim().is_empty() {
        return Err(GeoFileValidationError::EmptyContent);
    }
    Ok(content)
}

/// Caller-supplied fields of an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoFileDraft {
    name: RecordName,
    kind: GeoFileKind,
    content: String,
}

impl GeoFileDraft {
    /// Validate an upload. When `kind` is absent it is inferred from `name`.
    ///
    /// # Examples
    /// ```
    /// use geodata::domain::{GeoFileDraft, GeoFileKind};
    ///
    /// let draft = GeoFileDraft::try_new("route.kml", None, "<kml/>".into()).unwrap();
    /// assert_eq!(draft.kind(), GeoFileKind::Kml);
    /// ```
    pub fn try_new(
        name: &str,
        kind: Option<GeoFileKind>,
        content: String,
    ) -> Result<Self, GeoFileValidationError> {
        let name = RecordName::new(name)?;
        let kind = kind.unwrap_or_else(|| GeoFileKind::from_file_name(name.as_ref()));
        let content = validate_content(content)?;
        Ok(Self {
            name,
            kind,
            content,
        })
    }

    pub fn name(&self) -> &RecordName {
        &self.name
    }

    pub fn kind(&self) -> GeoFileKind {
        self.kind
    }

    pub fn content(&self) -> &str {
        self.content.as_str()
    }
}

/// Content replacement for a stored geo file. Name and kind are fixed at
/// upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoFilePatch {
    content: String,
}

impl GeoFilePatch {
    pub fn replace_content(content: String) -> Result<Self, GeoFileValidationError> {
        Ok(Self {
            content: validate_content(content)?,
        })
    }

    pub fn content(&self) -> &str {
        self.content.as_str()
    }
}

/// A stored geo file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoFile {
    pub id: RecordId,
    pub owner_id: UserId,
    pub name: RecordName,
    pub kind: GeoFileKind,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedRecord for GeoFile {
    type Draft = GeoFileDraft;
    type Patch = GeoFilePatch;

    const LABEL: &'static str = "geo file";

    fn from_draft(id: RecordId, owner_id: UserId, draft: GeoFileDraft, at: DateTime<Utc>) -> Self {
        let GeoFileDraft {
            name,
            kind,
            content,
        } = draft;
        Self {
            id,
            owner_id,
            name,
            kind,
            content,
            created_at: at,
            updated_at: at,
        }
    }

    fn id(&self) -> RecordId {
        self.id
    }

    fn owner_id(&self) -> UserId {
        self.owner_id
    }

    fn apply_patch(&mut self, patch: GeoFilePatch, at: DateTime<Utc>) {
        self.content = patch.content;
        self.updated_at = at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
    }

    #[rstest]
    #[case("trail.kml", GeoFileKind::Kml)]
    #[case("TRAIL.KML", GeoFileKind::Kml)]
    #[case("notkml", GeoFileKind::Kml)]
    #[case("parks.geojson", GeoFileKind::Geojson)]
    #[case("parks", GeoFileKind::Geojson)]
    fn kind_is_inferred_from_name(#[case] name: &str, #[case] expected: GeoFileKind) {
        assert_eq!(GeoFileKind::from_file_name(name), expected);
    }

    #[rstest]
    #[case("geojson", GeoFileKind::Geojson)]
    #[case(" KML ", GeoFileKind::Kml)]
    fn kind_parses_from_str(#[case] raw: &str, #[case] expected: GeoFileKind) {
        assert_eq!(raw.parse::<GeoFileKind>(), Ok(expected));
    }

    #[rstest]
    fn unknown_kind_is_rejected() {
        assert!(matches!(
            "shp".parse::<GeoFileKind>(),
            Err(GeoFileValidationError::UnknownKind { .. })
        ));
    }

    #[rstest]
    fn explicit_kind_wins_over_inference() {
        let draft = GeoFileDraft::try_new("export.kml", Some(GeoFileKind::Geojson), "{}".into())
            .expect("valid draft");
        assert_eq!(draft.kind(), GeoFileKind::Geojson);
    }

    #[rstest]
    fn blank_content_is_rejected() {
        let err = GeoFileDraft::try_new("a.geojson", None, "  ".into()).expect_err("blank");
        assert_eq!(err, GeoFileValidationError::EmptyContent);
    }

    #[rstest]
    fn blank_replacement_is_rejected() {
        assert_eq!(
            GeoFilePatch::replace_content(" \n".into()),
            Err(GeoFileValidationError::EmptyContent)
        );
    }

    #[rstest]
    fn replacement_keeps_name_and_kind() {
        let draft = GeoFileDraft::try_new("a.kml", None, "<kml>1</kml>".into()).expect("draft");
        let id = RecordId::new(1).expect("id");
        let owner = UserId::new(9).expect("owner");
        let mut file = GeoFile::from_draft(id, owner, draft, at(10));

        let patch = GeoFilePatch::replace_content("{\"v\":2}".into()).expect("patch");
        file.apply_patch(patch, at(20));

        assert_eq!(file.name.as_ref(), "a.kml");
        assert_eq!(file.content, "{\"v\":2}");
        assert_eq!(file.kind, GeoFileKind::Kml);
        assert_eq!(file.created_at, at(10));
        assert_eq!(file.updated_at, at(20));
    }
}
