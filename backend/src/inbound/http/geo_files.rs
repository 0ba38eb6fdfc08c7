//! Geo file handlers.
//!
//! Mounted under `/api/v1/files` behind the identity gate. The owner of every
//! record is the authenticated caller; request bodies cannot name one.
//!
//! ```text
//! POST   /api/v1/files              {"name":"parks.geojson","content":"{...}"}
//! GET    /api/v1/files
//! GET    /api/v1/files/{id}/content
//! PUT    /api/v1/files/{id}/content {"content":"{...}"}
//! DELETE /api/v1/files/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Error, GeoFile, GeoFileDraft, GeoFileKind, GeoFilePatch, OwnedRecord, RecordId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{geo_file_error, parse_record_id};

/// Upload body for `POST /files`. `kind` is inferred from `name` when absent.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadGeoFileRequest {
    pub name: String,
    pub content: String,
    /// `geojson` or `kml`.
    #[serde(default)]
    pub kind: Option<String>,
}

impl TryFrom<UploadGeoFileRequest> for GeoFileDraft {
    type Error = Error;

    fn try_from(value: UploadGeoFileRequest) -> Result<Self, Self::Error> {
        let kind = value
            .kind
            .as_deref()
            .map(str::parse::<GeoFileKind>)
            .transpose()
            .map_err(geo_file_error)?;
        Self::try_new(&value.name, kind, value.content).map_err(geo_file_error)
    }
}

/// Body for `PUT /files/{id}/content`.
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceContentRequest {
    pub content: String,
}

/// Geo file metadata; content is only returned by the content endpoint.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeoFileResponse {
    pub id: i64,
    pub name: String,
    pub kind: GeoFileKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&GeoFile> for GeoFileResponse {
    fn from(file: &GeoFile) -> Self {
        Self {
            id: file.id.as_i64(),
            name: file.name.to_string(),
            kind: file.kind,
            created_at: file.created_at,
            updated_at: file.updated_at,
        }
    }
}

/// Metadata plus stored content.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeoFileContentResponse {
    pub file: GeoFileResponse,
    pub content: String,
}

impl From<GeoFile> for GeoFileContentResponse {
    fn from(file: GeoFile) -> Self {
        Self {
            file: GeoFileResponse::from(&file),
            content: file.content,
        }
    }
}

fn file_id(raw: &str) -> ApiResult<RecordId> {
    parse_record_id(raw, GeoFile::LABEL)
}

/// Upload a geo file owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/files",
    request_body = UploadGeoFileRequest,
    responses(
        (status = 201, description = "File stored", body = GeoFileResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["files"],
    operation_id = "uploadGeoFile"
)]
#[post("")]
pub async fn upload_geo_file(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<UploadGeoFileRequest>,
) -> ApiResult<HttpResponse> {
    let draft = GeoFileDraft::try_from(payload.into_inner())?;
    let file = state.geo_files.create(user.user_id(), draft).await?;
    Ok(HttpResponse::Created().json(GeoFileResponse::from(&file)))
}

/// List the caller's geo files.
#[utoipa::path(
    get,
    path = "/api/v1/files",
    responses(
        (status = 200, description = "Files owned by the caller", body = [GeoFileResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["files"],
    operation_id = "listGeoFiles"
)]
#[get("")]
pub async fn list_geo_files(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<GeoFileResponse>>> {
    let files = state.geo_files.list_by_owner(user.user_id()).await?;
    Ok(web::Json(files.iter().map(GeoFileResponse::from).collect()))
}

/// Fetch a geo file with its content.
#[utoipa::path(
    get,
    path = "/api/v1/files/{id}/content",
    params(("id" = i64, Path, description = "Geo file id")),
    responses(
        (status = 200, description = "File content", body = GeoFileContentResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["files"],
    operation_id = "getGeoFileContent"
)]
#[get("/{id}/content")]
pub async fn get_geo_file_content(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<GeoFileContentResponse>> {
    let id = file_id(&path)?;
    let file = state.geo_files.get_by_owner_and_id(user.user_id(), id).await?;
    Ok(web::Json(GeoFileContentResponse::from(file)))
}

/// Replace a geo file's content.
#[utoipa::path(
    put,
    path = "/api/v1/files/{id}/content",
    params(("id" = i64, Path, description = "Geo file id")),
    request_body = ReplaceContentRequest,
    responses(
        (status = 200, description = "Content replaced", body = GeoFileResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["files"],
    operation_id = "replaceGeoFileContent"
)]
#[put("/{id}/content")]
pub async fn replace_geo_file_content(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<ReplaceContentRequest>,
) -> ApiResult<web::Json<GeoFileResponse>> {
    let id = file_id(&path)?;
    let patch =
        GeoFilePatch::replace_content(payload.into_inner().content).map_err(geo_file_error)?;
    let file = state
        .geo_files
        .update_by_owner_and_id(user.user_id(), id, patch)
        .await?;
    Ok(web::Json(GeoFileResponse::from(&file)))
}

/// Delete a geo file.
#[utoipa::path(
    delete,
    path = "/api/v1/files/{id}",
    params(("id" = i64, Path, description = "Geo file id")),
    responses(
        (status = 204, description = "File deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["files"],
    operation_id = "deleteGeoFile"
)]
#[delete("/{id}")]
pub async fn delete_geo_file(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = file_id(&path)?;
    state.geo_files.delete_by_owner_and_id(user.user_id(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests;
