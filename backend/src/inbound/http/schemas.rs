//! OpenAPI schema definitions for domain types.
//!
//! Domain types stay framework-agnostic and do not derive `ToSchema`. The
//! wrappers here mirror their shape so utoipa can document them from the
//! adapter layer.

use utoipa::ToSchema;

use crate::domain::ports::Row;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails a precondition.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// The bearer token is missing or was rejected.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The athlete or a referenced catalogue entry does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The profile store or identity provider could not be reached.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// `details.code` carries the precise failure kind, for example
/// `invalid_query` or `reference_not_found`.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    #[schema(example = "Invalid query: 'users.password'")]
    message: String,
    #[schema(example = "01HZY8B2W6X5Y7Z9ABCD1234")]
    trace_id: Option<String>,
    details: Option<serde_json::Value>,
}

/// Athlete profile as returned by the store.
///
/// The shape follows the requested field list: direct columns appear as
/// scalars and embedded tables as nested objects keyed by table name.
#[derive(ToSchema)]
#[schema(
    as = crate::domain::AthleteProfile,
    value_type = Object,
    example = json!({
        "federation_id": "7d0f0c1e-8f52-4a9b-9f55-2a4a3b1f7c10",
        "users": { "name": "Christian Lifter" },
        "weight_classes": { "id": "b1", "name": "67.5kg" }
    })
)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct AthleteProfileSchema(Row);
