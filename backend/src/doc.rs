//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer, the request
//! and response bodies they exchange, and the bearer token security scheme.
//! The document backs Swagger UI in debug builds and is exported via
//! `cargo run --bin openapi-dump` for external tooling.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, GeoFileKind};
use crate::inbound::http::accounts::{CredentialsRequest, LoginResponse, RegisteredUserResponse};
use crate::inbound::http::geo_files::{
    GeoFileContentResponse, GeoFileResponse, ReplaceContentRequest, UploadGeoFileRequest,
};
use crate::inbound::http::shapes::{CreateShapeRequest, ShapeResponse, UpdateShapeRequest};

/// Name of the bearer security scheme in the generated document.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        let mut scheme = Http::new(HttpAuthScheme::Bearer);
        scheme.bearer_format = Some("JWT".to_owned());
        scheme.description = Some("Token issued by POST /api/v1/login.".to_owned());
        components.add_security_scheme(BEARER_SCHEME, SecurityScheme::Http(scheme));
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "geodata API",
        description = "Per-user storage of geo files and map shapes behind bearer token authentication."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::geo_files::upload_geo_file,
        crate::inbound::http::geo_files::list_geo_files,
        crate::inbound::http::geo_files::get_geo_file_content,
        crate::inbound::http::geo_files::replace_geo_file_content,
        crate::inbound::http::geo_files::delete_geo_file,
        crate::inbound::http::shapes::create_shape,
        crate::inbound::http::shapes::list_shapes,
        crate::inbound::http::shapes::get_shape,
        crate::inbound::http::shapes::update_shape,
        crate::inbound::http::shapes::delete_shape,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        GeoFileKind,
        CredentialsRequest,
        RegisteredUserResponse,
        LoginResponse,
        UploadGeoFileRequest,
        ReplaceContentRequest,
        GeoFileResponse,
        GeoFileContentResponse,
        CreateShapeRequest,
        UpdateShapeRequest,
        ShapeResponse,
    )),
    tags(
        (name = "accounts", description = "Registration and login"),
        (name = "files", description = "Uploaded GeoJSON and KML files"),
        (name = "shapes", description = "Shapes drawn on the map"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated OpenAPI document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("LoginResponse", "tokenType")]
    #[case("LoginResponse", "expiresAt")]
    #[case("GeoFileContentResponse", "content")]
    #[case("ShapeResponse", "geometry")]
    #[case("RegisteredUserResponse", "username")]
    fn response_schemas_use_camel_case(#[case] schema: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        assert_object_schema_has_field(schemas.get(schema).expect("schema registered"), field);
    }

    #[rstest]
    #[case("/api/v1/register")]
    #[case("/api/v1/login")]
    #[case("/api/v1/files")]
    #[case("/api/v1/files/{id}/content")]
    #[case("/api/v1/shapes/{id}")]
    #[case("/health/ready")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }

    #[rstest]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key(BEARER_SCHEME));
    }
}
