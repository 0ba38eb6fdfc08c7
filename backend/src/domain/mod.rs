//! Domain primitives, ports, and services.
//!
//! Purpose: define strongly typed entities and the authentication and
//! ownership rules that every adapter relies on. Types are transport
//! agnostic; inbound adapters translate them into HTTP payloads and outbound
//! adapters translate them into rows.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - UserId, Username, User, NewUser: account identity.
//! - LoginCredentials, PasswordHash, SessionToken: authentication values.
//! - RecordId, RecordName, OwnedRecord: ownership-scoped record contract.
//! - GeoFile and Shape: the stored artefacts.
//! - AccountService and OwnedRecordService: use-case orchestration.

pub mod account_service;
pub mod auth;
pub mod error;
pub mod geo_file;
pub mod owned_record_service;
pub mod ownership;
pub mod ports;
pub mod shape;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{
    LoginCredentials, LoginValidationError, PasswordHash, SESSION_TOKEN_TTL_SECS, SessionToken,
    session_token_ttl,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::geo_file::{
    GeoFile, GeoFileDraft, GeoFileKind, GeoFilePatch, GeoFileValidationError,
};
pub use self::owned_record_service::OwnedRecordService;
pub use self::ownership::{OwnedRecord, RecordId, RecordName, RecordValidationError};
pub use self::shape::{Shape, ShapeDraft, ShapePatch, ShapeValidationError};
pub use self::trace_id::TraceId;
pub use self::user::{NewUser, User, UserId, UserValidationError, Username};

/// HTTP header name used to propagate trace identifiers.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use geodata::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<()> {
///     Err(Error::not_found("shape not found"))
/// }
/// # assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
