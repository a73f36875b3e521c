//! Failure taxonomy for athlete profile operations and its translation into
//! client-facing [`Error`] payloads.

use serde_json::json;
use thiserror::Error as ThisError;
use tracing::warn;

use crate::domain::Error;
use crate::domain::ports::ProfileStoreError;

/// Kind of human-readable reference that failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Federation,
    Division,
    WeightClass,
}

impl ReferenceKind {
    /// Name used in client messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Federation => "federation",
            Self::Division => "division",
            Self::WeightClass => "weight_class",
        }
    }
}

impl std::fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Code and message reported by the store for a rejected operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFailure {
    pub code: String,
    pub message: String,
}

impl StoreFailure {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for StoreFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.code, self.message)
    }
}

/// Code used when a lookup returns no row rather than a store error.
pub const NO_ROWS_CODE: &str = "PGRST116";

/// Everything that can go wrong while reading or writing an athlete profile.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum ProfileError {
    #[error("Invalid query: '{0}'")]
    InvalidQuery(String),
    #[error("{0}")]
    PreconditionFailed(String),
    #[error("{kind} does not exist")]
    ReferenceNotFound { kind: ReferenceKind, name: String },
    #[error("Failed to insert athlete profile: {0}")]
    ProfileInsertFailed(StoreFailure),
    #[error("Failed to update profile: {0}")]
    ProfileUpdateFailed(StoreFailure),
    #[error("Failed to retrieve profile details: {0}")]
    ProfileLookupFailed(StoreFailure),
    #[error("Failed to locate {kind} '{name}': {failure}")]
    ReferenceLookupFailed {
        kind: ReferenceKind,
        name: String,
        failure: StoreFailure,
    },
    #[error("username must be unique")]
    UsernameTaken(String),
    #[error("Athlete with ID {0} could not be found")]
    AthleteNotFound(String),
    #[error("profile store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Precondition message for weight classes without a federation or gender.
pub const WEIGHT_CLASS_PRECONDITION: &str = "weight class requires a federation and gender";
/// Precondition message for divisions without a federation.
pub const DIVISION_PRECONDITION: &str = "division requires a federation";
/// Precondition message for updates that do not carry exactly one field.
pub const SINGLE_FIELD_PRECONDITION: &str = "exactly one field must be provided for update";

impl ProfileError {
    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::PreconditionFailed(reason.into())
    }

    pub fn reference_not_found(kind: ReferenceKind, name: impl Into<String>) -> Self {
        Self::ReferenceNotFound {
            kind,
            name: name.into(),
        }
    }

    /// Classify a store failure raised while inserting the athlete row.
    pub fn on_insert(error: ProfileStoreError) -> Self {
        Self::from_store(error, Self::ProfileInsertFailed)
    }

    /// Classify a store failure raised while updating a row.
    pub fn on_update(error: ProfileStoreError) -> Self {
        Self::from_store(error, Self::ProfileUpdateFailed)
    }

    /// Classify a store failure raised while selecting a row.
    pub fn on_lookup(error: ProfileStoreError) -> Self {
        Self::from_store(error, Self::ProfileLookupFailed)
    }

    /// Classify a store failure raised while resolving a named reference.
    pub fn on_reference_lookup(
        kind: ReferenceKind,
        name: &str,
        error: ProfileStoreError,
    ) -> Self {
        Self::from_store(error, |failure| Self::ReferenceLookupFailed {
            kind,
            name: name.to_owned(),
            failure,
        })
    }

    fn from_store(error: ProfileStoreError, rejected: impl FnOnce(StoreFailure) -> Self) -> Self {
        match error {
            ProfileStoreError::Rejected { code, message } => {
                rejected(StoreFailure::new(code, message))
            }
            ProfileStoreError::Decode { message } => {
                rejected(StoreFailure::new("decode_error", message))
            }
            ProfileStoreError::Unavailable { message } => Self::StoreUnavailable(message),
        }
    }

    fn store_details(code: &str, failure: &StoreFailure) -> serde_json::Value {
        json!({
            "code": code,
            "storeCode": failure.code,
            "storeMessage": failure.message,
        })
    }
}

/// Log a store failure at `warn`, keeping the store's own code when it sent one.
pub(crate) fn log_store_failure(operation: &'static str, table: &str, error: &ProfileStoreError) {
    match error {
        ProfileStoreError::Rejected { code, message } => {
            warn!(
                operation,
                table,
                store_code = %code,
                store_message = %message,
                "store rejected request"
            );
        }
        other => warn!(operation, table, error = %other, "store request failed"),
    }
}

impl From<ProfileError> for Error {
    fn from(value: ProfileError) -> Self {
        let message = value.to_string();
        match value {
            ProfileError::InvalidQuery(token) => Error::invalid_request(message)
                .with_details(json!({ "code": "invalid_query", "token": token })),
            ProfileError::PreconditionFailed(_) => Error::invalid_request(message)
                .with_details(json!({ "code": "precondition_failed" })),
            ProfileError::ReferenceNotFound { kind, name } => Error::invalid_request(message)
                .with_details(json!({
                    "code": "reference_not_found",
                    "kind": kind.as_str(),
                    "value": name,
                })),
            ProfileError::ProfileInsertFailed(failure) => Error::invalid_request(message)
                .with_details(ProfileError::store_details("profile_insert_failed", &failure)),
            ProfileError::ProfileUpdateFailed(failure) => Error::invalid_request(message)
                .with_details(ProfileError::store_details("profile_update_failed", &failure)),
            ProfileError::ProfileLookupFailed(failure) => Error::invalid_request(message)
                .with_details(ProfileError::store_details("profile_lookup_failed", &failure)),
            ProfileError::ReferenceLookupFailed {
                kind,
                name,
                failure,
            } => {
                let mut details = ProfileError::store_details("reference_lookup_failed", &failure);
                if let Some(fields) = details.as_object_mut() {
                    fields.insert("kind".into(), json!(kind.as_str()));
                    fields.insert("value".into(), json!(name));
                }
                Error::invalid_request(message).with_details(details)
            }
            ProfileError::UsernameTaken(username) => Error::invalid_request(message)
                .with_details(json!({ "code": "username_taken", "value": username })),
            ProfileError::AthleteNotFound(id) => Error::not_found(message)
                .with_details(json!({ "code": "athlete_not_found", "athleteId": id })),
            ProfileError::StoreUnavailable(_) => Error::service_unavailable(
                "profile store unavailable",
            )
            .with_details(json!({ "code": "store_unavailable" })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[test]
    fn invalid_query_names_the_token_verbatim() {
        let error = Error::from(ProfileError::InvalidQuery("users.password".to_owned()));
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.message(), "Invalid query: 'users.password'");
        assert_eq!(
            error.details(),
            Some(&json!({ "code": "invalid_query", "token": "users.password" }))
        );
    }

    #[rstest]
    #[case(ReferenceKind::Federation, "federation does not exist")]
    #[case(ReferenceKind::Division, "division does not exist")]
    #[case(ReferenceKind::WeightClass, "weight_class does not exist")]
    fn reference_not_found_names_the_kind(#[case] kind: ReferenceKind, #[case] message: &str) {
        let error = Error::from(ProfileError::reference_not_found(kind, "Im fake"));
        assert_eq!(error.message(), message);
        let details = error.details().expect("details");
        assert_eq!(details.get("value"), Some(&json!("Im fake")));
    }

    #[test]
    fn store_failures_keep_code_and_message() {
        let error = Error::from(ProfileError::on_update(ProfileStoreError::rejected(
            "23505",
            "duplicate key value violates unique constraint \"users_username_key\"",
        )));
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert!(error.message().starts_with("Failed to update profile: 23505 - "));
        let details = error.details().expect("details");
        assert_eq!(details.get("storeCode"), Some(&json!("23505")));
        assert_eq!(details.get("code"), Some(&json!("profile_update_failed")));
    }

    #[test]
    fn unreachable_store_is_service_unavailable() {
        let error = Error::from(ProfileError::on_insert(ProfileStoreError::unavailable(
            "connection refused",
        )));
        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
        assert_eq!(error.message(), "profile store unavailable");
    }

    #[test]
    fn rejected_reference_lookup_names_the_reference() {
        let error = Error::from(ProfileError::on_reference_lookup(
            ReferenceKind::Division,
            "Junior",
            ProfileStoreError::rejected("42P01", "relation \"divisions\" does not exist"),
        ));
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            error.message(),
            "Failed to locate division 'Junior': 42P01 - relation \"divisions\" does not exist"
        );
        let details = error.details().expect("details");
        assert_eq!(details.get("code"), Some(&json!("reference_lookup_failed")));
        assert_eq!(details.get("kind"), Some(&json!("division")));
        assert_eq!(details.get("storeCode"), Some(&json!("42P01")));
    }

    #[test]
    fn unreachable_store_during_reference_lookup_is_unavailable() {
        let error = ProfileError::on_reference_lookup(
            ReferenceKind::Federation,
            "IPF",
            ProfileStoreError::unavailable("timeout"),
        );
        assert_eq!(error, ProfileError::StoreUnavailable("timeout".into()));
    }

    #[test]
    fn taken_username_is_a_bad_request() {
        let error = Error::from(ProfileError::UsernameTaken("chrrstian_".into()));
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(error.message(), "username must be unique");
        assert_eq!(
            error.details(),
            Some(&json!({ "code": "username_taken", "value": "chrrstian_" }))
        );
    }

    #[test]
    fn missing_athlete_is_not_found() {
        let error = Error::from(ProfileError::AthleteNotFound("42".to_owned()));
        assert_eq!(error.code(), ErrorCode::NotFound);
        assert_eq!(error.message(), "Athlete with ID 42 could not be found");
    }

    #[rstest]
    #[case(WEIGHT_CLASS_PRECONDITION)]
    #[case(DIVISION_PRECONDITION)]
    #[case(SINGLE_FIELD_PRECONDITION)]
    fn preconditions_surface_the_literal_reason(#[case] reason: &str) {
        let error = Error::from(ProfileError::precondition(reason));
        assert_eq!(error.message(), reason);
    }
}
