//! Athlete profile API handlers.
//!
//! ```text
//! POST  /api/v1/athlete/profile       {"name":"Ada","username":"ada_l","gender":"Female","date_of_birth":"1990-12-10"}
//! GET   /api/v1/athlete/profile/{id}?data=federation_id,users.name,weight_classes
//! PATCH /api/v1/athlete/profile       {"division":"Junior"}
//! ```
//!
//! Request bodies use the store's snake_case field names.

use actix_web::{HttpResponse, get, patch, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::ports::Row;
use crate::domain::{
    AthleteProfileChange, AthleteProfilePatch, CreateAthleteProfile, Error, FullName, Username,
    parse_date_of_birth, parse_field_list,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::schemas::{AthleteProfileSchema, ErrorSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, parse_athlete_id, parse_optional, present, require,
};

const NAME: FieldName = FieldName::new("name");
const USERNAME: FieldName = FieldName::new("username");
const GENDER: FieldName = FieldName::new("gender");
const DATE_OF_BIRTH: FieldName = FieldName::new("date_of_birth");
const ATHLETE_ID: FieldName = FieldName::new("id");

/// Confirmation body returned by profile writes.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Profile created successfully")]
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Self {
        Self {
            message: message.to_owned(),
        }
    }
}

/// Request body for `POST /api/v1/athlete/profile`.
///
/// Blank competition references are treated as not supplied.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateAthleteProfileRequest {
    #[schema(example = "Christian Lifter")]
    pub name: Option<String>,
    #[schema(example = "chrrstian_")]
    pub username: Option<String>,
    #[schema(example = "Male")]
    pub gender: Option<String>,
    #[schema(example = "2001-07-14")]
    pub date_of_birth: Option<String>,
    #[schema(example = "IPF")]
    pub federation: Option<String>,
    #[schema(example = "Junior")]
    pub division: Option<String>,
    #[schema(example = "67.5kg")]
    pub weight_class: Option<String>,
    pub team: Option<String>,
}

impl TryFrom<CreateAthleteProfileRequest> for CreateAthleteProfile {
    type Error = Error;

    fn try_from(value: CreateAthleteProfileRequest) -> Result<Self, Self::Error> {
        let name = require(value.name, NAME)?;
        let username = require(value.username, USERNAME)?;
        let gender = require(value.gender, GENDER)?;
        let date_of_birth = require(value.date_of_birth, DATE_OF_BIRTH)?;

        Ok(Self {
            name: FullName::new(name).map_err(|err| invalid_field_error(NAME, &err))?,
            username: Username::new(username).map_err(|err| invalid_field_error(USERNAME, &err))?,
            gender: gender
                .parse()
                .map_err(|err| invalid_field_error(GENDER, &err))?,
            date_of_birth: parse_date_of_birth(&date_of_birth)
                .map_err(|err| invalid_field_error(DATE_OF_BIRTH, &err))?,
            federation: present(value.federation),
            division: present(value.division),
            weight_class: present(value.weight_class),
            team: value.team,
        })
    }
}

/// Request body for `PATCH /api/v1/athlete/profile`; exactly one field.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UpdateAthleteProfileRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub federation: Option<String>,
    pub division: Option<String>,
    pub weight_class: Option<String>,
    pub team: Option<String>,
}

impl TryFrom<UpdateAthleteProfileRequest> for AthleteProfilePatch {
    type Error = Error;

    fn try_from(value: UpdateAthleteProfileRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: parse_optional(value.name, NAME, FullName::new)?,
            username: parse_optional(value.username, USERNAME, Username::new)?,
            federation: value.federation,
            division: value.division,
            weight_class: value.weight_class,
            team: value.team,
        })
    }
}

/// Query string for `GET /api/v1/athlete/profile/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileFieldsQuery {
    /// Comma-separated field list, e.g. `federation_id,users.name,weight_classes`.
    pub data: Option<String>,
}

/// Complete the authenticated user's athlete profile.
#[utoipa::path(
    post,
    path = "/api/v1/athlete/profile",
    request_body = CreateAthleteProfileRequest,
    responses(
        (status = 201, description = "Profile created", body = MessageResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Profile store unavailable", body = ErrorSchema)
    ),
    tags = ["athletes"],
    operation_id = "createAthleteProfile"
)]
#[post("/athlete/profile")]
pub async fn create_profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<CreateAthleteProfileRequest>,
) -> ApiResult<HttpResponse> {
    let request = CreateAthleteProfile::try_from(payload.into_inner())?;
    state.profiles.create_profile(user.user_id(), request).await?;
    Ok(HttpResponse::Created().json(MessageResponse::new("Profile created successfully")))
}

/// Read an athlete's profile, optionally restricted to a field list.
#[utoipa::path(
    get,
    path = "/api/v1/athlete/profile/{id}",
    params(
        ("id" = String, Path, description = "Athlete identifier"),
        ("data" = Option<String>, Query, description = "Comma-separated field list")
    ),
    responses(
        (status = 200, description = "Profile fields", body = AthleteProfileSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Athlete not found", body = ErrorSchema),
        (status = 503, description = "Profile store unavailable", body = ErrorSchema)
    ),
    tags = ["athletes"],
    operation_id = "retrieveAthleteProfile"
)]
#[get("/athlete/profile/{id}")]
pub async fn retrieve_profile(
    state: web::Data<HttpState>,
    _user: AuthenticatedUser,
    path: web::Path<String>,
    query: web::Query<ProfileFieldsQuery>,
) -> ApiResult<web::Json<Row>> {
    let athlete_id = parse_athlete_id(&path.into_inner(), ATHLETE_ID)?;
    let fields = query
        .into_inner()
        .data
        .as_deref()
        .map(parse_field_list)
        .unwrap_or_default();
    let profile = state
        .profiles_query
        .retrieve_profile(&athlete_id, &fields)
        .await?;
    Ok(web::Json(profile))
}

/// Change one field of the authenticated user's athlete profile.
#[utoipa::path(
    patch,
    path = "/api/v1/athlete/profile",
    request_body = UpdateAthleteProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = MessageResponse),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 503, description = "Profile store unavailable", body = ErrorSchema)
    ),
    tags = ["athletes"],
    operation_id = "updateAthleteProfile"
)]
#[patch("/athlete/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    user: AuthenticatedUser,
    payload: web::Json<UpdateAthleteProfileRequest>,
) -> ApiResult<web::Json<MessageResponse>> {
    let patch = AthleteProfilePatch::try_from(payload.into_inner())?;
    let change = AthleteProfileChange::try_from(patch)?;
    state.profiles.update_profile(user.user_id(), change).await?;
    Ok(web::Json(MessageResponse::new(
        "Athlete profile updated successfully",
    )))
}

#[cfg(test)]
#[path = "athletes_tests.rs"]
mod tests;
