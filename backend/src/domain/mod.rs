//! Domain primitives, use cases and ports.
//!
//! Purpose: keep athlete profile rules independent of HTTP and of the store
//! client. Adapters depend on this module; it depends on neither.
//!
//! Public surface:
//! - Error / ErrorCode: client-facing error payload.
//! - ProfileError: failure taxonomy for profile operations.
//! - SchemaRegistry / SelectCompiler: field list whitelisting and compilation.
//! - ReferenceResolver: federation, division and weight class lookups.
//! - AthleteProfileService: create, update and retrieve use cases.

pub mod athlete;
pub mod athlete_profile_service;
pub mod error;
pub mod ports;
pub mod profile_error;
pub mod reference_resolver;
pub mod schema_registry;
pub mod select_compiler;
pub mod trace_id;
pub mod user;

pub use self::athlete::{
    AthleteId, AthleteProfileChange, AthleteProfilePatch, CreateAthleteProfile,
};
pub use self::athlete_profile_service::AthleteProfileService;
pub use self::error::{Error, ErrorCode};
pub use self::profile_error::{ProfileError, ReferenceKind, StoreFailure};
pub use self::reference_resolver::{
    ReferenceRequest, ReferenceResolver, ResolvedFederation, ResolvedReferences,
};
pub use self::schema_registry::{SchemaRegistry, SchemaRegistryBuilder};
pub use self::select_compiler::{
    CompiledSelect, RelationColumns, RelationSelect, SelectCompiler, parse_field_list,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    FullName, Gender, UserId, UserRole, UserValidationError, Username, parse_date_of_birth,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use coaching_backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("Athlete with ID 42 could not be found"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
