//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the athlete profile and health endpoints, the schema
//! wrappers from [`crate::inbound::http::schemas`] and the bearer token
//! security scheme. The document backs Swagger UI in debug builds and is
//! exported by `cargo run --bin openapi-dump`.

use crate::inbound::http::athletes::{
    CreateAthleteProfileRequest, MessageResponse, UpdateAthleteProfileRequest,
};
use crate::inbound::http::schemas::{AthleteProfileSchema, ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Access token issued by the identity provider."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Coaching backend API",
        description = "Athlete profile management and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::athletes::create_profile,
        crate::inbound::http::athletes::retrieve_profile,
        crate::inbound::http::athletes::update_profile,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        AthleteProfileSchema,
        CreateAthleteProfileRequest,
        UpdateAthleteProfileRequest,
        MessageResponse
    )),
    tags(
        (name = "athletes", description = "Athlete profile operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
