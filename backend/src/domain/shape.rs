//! Shapes drawn by users on the map.
//!
//! Geometry is an opaque serialised string (typically a GeoJSON geometry);
//! the service stores it without interpretation.

use std::fmt;

use chrono::{DateTime, Utc};

use super::{OwnedRecord, RecordId, RecordName, RecordValidationError, UserId};

/// Validation errors raised while building shape drafts and patches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeValidationError {
    Name(RecordValidationError),
    EmptyGeometry,
    EmptyPatch,
}

impl fmt::Display for ShapeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(err) => write!(f, "{err}"),
            Self::EmptyGeometry => write!(f, "geometry must not be empty"),
            Self::EmptyPatch => write!(f, "update must change at least one field"),
        }
    }
}

impl std::error::Error for ShapeValidationError {}

impl From<RecordValidationError> for ShapeValidationError {
    fn from(value: RecordValidationError) -> Self {
        Self::Name(value)
    }
}

fn validate_geometry(geometry: String) -> Result<String, ShapeValidationError> {
    if geometry.trim().is_empty() {
        return Err(ShapeValidationError::EmptyGeometry);
    }
    Ok(geometry)
}

/// Caller-supplied fields of a new shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeDraft {
    name: RecordName,
    geometry: String,
}

impl ShapeDraft {
    /// Validate a new shape.
    ///
    /// # Examples
    /// ```
    /// use geodata::domain::ShapeDraft;
    ///
    /// let draft = ShapeDraft::try_new("S1", r#"{"type":"Point","coordinates":[0,0]}"#.into());
    /// assert!(draft.is_ok());
    /// ```
    pub fn try_new(name: &str, geometry: String) -> Result<Self, ShapeValidationError> {
        Ok(Self {
            name: RecordName::new(name)?,
            geometry: validate_geometry(geometry)?,
        })
    }

    pub fn name(&self) -> &RecordName {
        &self.name
    }

    pub fn geometry(&self) -> &str {
        self.geometry.as_str()
    }
}

/// Partial update for a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapePatch {
    name: Option<RecordName>,
    geometry: Option<String>,
}

impl ShapePatch {
    /// Validate a patch; at least one field must be present.
    pub fn try_new(
        name: Option<&str>,
        geometry: Option<String>,
    ) -> Result<Self, ShapeValidationError> {
        let name = name.map(RecordName::new).transpose()?;
        let geometry = geometry.map(validate_geometry).transpose()?;
        if name.is_none() && geometry.is_none() {
            return Err(ShapeValidationError::EmptyPatch);
        }
        Ok(Self { name, geometry })
    }

    pub fn name(&self) -> Option<&RecordName> {
        self.name.as_ref()
    }

    pub fn geometry(&self) -> Option<&str> {
        self.geometry.as_deref()
    }
}

/// A stored shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub id: RecordId,
    pub owner_id: UserId,
    pub name: RecordName,
    pub geometry: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OwnedRecord for Shape {
    type Draft = ShapeDraft;
    type Patch = ShapePatch;

    const LABEL: &'static str = "shape";

    fn from_draft(id: RecordId, owner_id: UserId, draft: ShapeDraft, at: DateTime<Utc>) -> Self {
        Self {
            id,
            owner_id,
            name: draft.name,
            geometry: draft.geometry,
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

    fn apply_patch(&mut self, patch: ShapePatch, at: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(geometry) = patch.geometry {
            self.geometry = geometry;
        }
        self.updated_at = at;
    }
}
