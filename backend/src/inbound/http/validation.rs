//! Shared validation helpers for inbound HTTP adapters.
//!
//! Domain constructors report what is wrong; these helpers attach the
//! `{field, code}` details clients use to highlight the offending input.

use serde_json::json;

use crate::domain::{
    Error, GeoFileValidationError, LoginValidationError, RecordId, RecordValidationError,
    ShapeValidationError, UserValidationError,
};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    Empty,
    TooLong,
    InvalidCharacters,
    UnknownKind,
    EmptyPatch,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Empty => "empty",
            ErrorCode::TooLong => "too_long",
            ErrorCode::InvalidCharacters => "invalid_characters",
            ErrorCode::UnknownKind => "unknown_kind",
            ErrorCode::EmptyPatch => "empty_patch",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

const USERNAME: FieldName = FieldName::new("username");
const PASSWORD: FieldName = FieldName::new("password");
const NAME: FieldName = FieldName::new("name");
const KIND: FieldName = FieldName::new("kind");
const CONTENT: FieldName = FieldName::new("content");
const GEOMETRY: FieldName = FieldName::new("geometry");
const BODY: FieldName = FieldName::new("body");

/// Builder for validation errors with field context.
struct ValidationError {
    field: FieldName,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl ToString) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field.as_str(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn credentials_error(err: LoginValidationError) -> Error {
    let (field, code) = match err {
        LoginValidationError::EmptyUsername => (USERNAME, ErrorCode::Empty),
        LoginValidationError::EmptyPassword => (PASSWORD, ErrorCode::Empty),
        LoginValidationError::PasswordTooLong { .. } => (PASSWORD, ErrorCode::TooLong),
    };
    ValidationError::new(field, err).with_code(code)
}

pub(crate) fn username_error(err: UserValidationError) -> Error {
    let code = match err {
        UserValidationError::UsernameTooLong { .. } => ErrorCode::TooLong,
        UserValidationError::UsernameInvalidCharacters => ErrorCode::InvalidCharacters,
        UserValidationError::EmptyUsername | UserValidationError::NegativeId => ErrorCode::Empty,
    };
    ValidationError::new(USERNAME, err).with_code(code)
}

fn record_name_error(err: &RecordValidationError) -> Error {
    let code = match err {
        RecordValidationError::NameTooLong { .. } => ErrorCode::TooLong,
        RecordValidationError::EmptyName | RecordValidationError::NonPositiveId => ErrorCode::Empty,
    };
    ValidationError::new(NAME, err).with_code(code)
}

pub(crate) fn geo_file_error(err: GeoFileValidationError) -> Error {
    match &err {
        GeoFileValidationError::Name(inner) => record_name_error(inner),
        GeoFileValidationError::EmptyContent => {
            ValidationError::new(CONTENT, err).with_code(ErrorCode::Empty)
        }
        GeoFileValidationError::UnknownKind { .. } => {
            ValidationError::new(KIND, err).with_code(ErrorCode::UnknownKind)
        }
    }
}

pub(crate) fn shape_error(err: ShapeValidationError) -> Error {
    match &err {
        ShapeValidationError::Name(inner) => record_name_error(inner),
        ShapeValidationError::EmptyGeometry => {
            ValidationError::new(GEOMETRY, err).with_code(ErrorCode::Empty)
        }
        ShapeValidationError::EmptyPatch => {
            ValidationError::new(BODY, err).with_code(ErrorCode::EmptyPatch)
        }
    }
}

/// Parse a record id from a path segment.
///
/// Ids that are not positive integers cannot name a stored record, so they
/// produce the same not-found error as a foreign or missing record.
pub(crate) fn parse_record_id(raw: &str, label: &str) -> Result<RecordId, Error> {
    raw.parse::<i64>()
        .ok()
        .and_then(|id| RecordId::new(id).ok())
        .ok_or_else(|| Error::not_found(format!("{label} not found")))
}
