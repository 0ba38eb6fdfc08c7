//! Shape handlers.
//!
//! Mounted under `/api/v1/shapes` behind the identity gate.
//!
//! ```text
//! POST   /api/v1/shapes      {"name":"S1","geometry":"{...}"}
//! GET    /api/v1/shapes
//! GET    /api/v1/shapes/{id}
//! PUT    /api/v1/shapes/{id} {"name":"S2"}
//! DELETE /api/v1/shapes/{id}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, OwnedRecord, RecordId, Shape, ShapeDraft, ShapePatch};
use crate::inbound::http::ApiResult;
use crate::inbound::http::identity::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{parse_record_id, shape_error};

#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateShapeRequest {
    pub name: String,
    /// Serialised geometry, stored verbatim.
    pub geometry: String,
}

impl TryFrom<CreateShapeRequest> for ShapeDraft {
    type Error = Error;

    fn try_from(value: CreateShapeRequest) -> Result<Self, Self::Error> {
        Self::try_new(&value.name, value.geometry).map_err(shape_error)
    }
}

/// Partial update; omitted fields keep their stored values.
#[derive(Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShapeRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub geometry: Option<String>,
}

impl TryFrom<UpdateShapeRequest> for ShapePatch {
    type Error = Error;

    fn try_from(value: UpdateShapeRequest) -> Result<Self, Self::Error> {
        Self::try_new(value.name.as_deref(), value.geometry).map_err(shape_error)
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShapeResponse {
    pub id: i64,
    pub name: String,
    pub geometry: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Shape> for ShapeResponse {
    fn from(shape: Shape) -> Self {
        Self {
            id: shape.id.as_i64(),
            name: shape.name.into(),
            geometry: shape.geometry,
            created_at: shape.created_at,
            updated_at: shape.updated_at,
        }
    }
}

fn shape_id(raw: &str) -> ApiResult<RecordId> {
    parse_record_id(raw, Shape::LABEL)
}

/// Create a shape owned by the caller.
#[utoipa::path(
    post,
    path = "/api/v1/shapes",
    request_body = CreateShapeRequest,
    responses(
        (status = 201, description = "Shape created", body = ShapeResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["shapes"],
    operation_id = "createShape"
)]
#[post("")]
pub async fn create_shape(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateShapeRequest>,
) -> ApiResult<HttpResponse> {
    let draft = ShapeDraft::try_from(payload.into_inner())?;
    let shape = state.shapes.create(user.user_id(), draft).await?;
    Ok(HttpResponse::Created().json(ShapeResponse::from(shape)))
}

/// List the caller's shapes.
#[utoipa::path(
    get,
    path = "/api/v1/shapes",
    responses(
        (status = 200, description = "Shapes owned by the caller", body = [ShapeResponse]),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["shapes"],
    operation_id = "listShapes"
)]
#[get("")]
pub async fn list_shapes(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
) -> ApiResult<web::Json<Vec<ShapeResponse>>> {
    let shapes = state.shapes.list_by_owner(user.user_id()).await?;
    Ok(web::Json(shapes.into_iter().map(ShapeResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/shapes/{id}",
    params(("id" = i64, Path, description = "Shape id")),
    responses(
        (status = 200, description = "Shape", body = ShapeResponse),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["shapes"],
    operation_id = "getShape"
)]
#[get("/{id}")]
pub async fn get_shape(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<ShapeResponse>> {
    let id = shape_id(&path)?;
    let shape = state.shapes.get_by_owner_and_id(user.user_id(), id).await?;
    Ok(web::Json(ShapeResponse::from(shape)))
}

/// Apply a partial update to a shape.
#[utoipa::path(
    put,
    path = "/api/v1/shapes/{id}",
    params(("id" = i64, Path, description = "Shape id")),
    request_body = UpdateShapeRequest,
    responses(
        (status = 200, description = "Shape updated", body = ShapeResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["shapes"],
    operation_id = "updateShape"
)]
#[put("/{id}")]
pub async fn update_shape(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
    payload: web::Json<UpdateShapeRequest>,
) -> ApiResult<web::Json<ShapeResponse>> {
    let id = shape_id(&path)?;
    let patch = ShapePatch::try_from(payload.into_inner())?;
    let shape = state
        .shapes
        .update_by_owner_and_id(user.user_id(), id, patch)
        .await?;
    Ok(web::Json(ShapeResponse::from(shape)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/shapes/{id}",
    params(("id" = i64, Path, description = "Shape id")),
    responses(
        (status = 204, description = "Shape deleted"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["shapes"],
    operation_id = "deleteShape"
)]
#[delete("/{id}")]
pub async fn delete_shape(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = shape_id(&path)?;
    state.shapes.delete_by_owner_and_id(user.user_id(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests;
