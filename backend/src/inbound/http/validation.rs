//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::{AthleteId, Error, UserValidationError};

/// Validation error codes reported in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    MissingField,
    InvalidField,
    InvalidUuid,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidField => "invalid_field",
            Self::InvalidUuid => "invalid_uuid",
        }
    }
}

/// Name of a request field, as the client spells it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) fn as_str(self) -> &'static str {
        self.0
    }
}

fn field_error(field: FieldName, code: ValidationCode, message: String) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        ValidationCode::MissingField,
        format!("missing required field: {name}"),
    )
}

/// Report a value rejected by a domain constructor.
pub(crate) fn invalid_field_error(field: FieldName, err: &UserValidationError) -> Error {
    field_error(field, ValidationCode::InvalidField, err.to_string())
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    Error::invalid_request(format!("{name} must be a valid UUID")).with_details(json!({
        "field": name,
        "value": value,
        "code": ValidationCode::InvalidUuid.as_str(),
    }))
}

/// Require a field that serde left as `None`.
pub(crate) fn require<T>(value: Option<T>, field: FieldName) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(field))
}

/// Treat a blank optional value as absent.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|raw| !raw.trim().is_empty())
}

/// Parse an optional field through a domain constructor.
pub(crate) fn parse_optional<T>(
    value: Option<String>,
    field: FieldName,
    parse: impl FnOnce(String) -> Result<T, UserValidationError>,
) -> Result<Option<T>, Error> {
    value
        .map(|raw| parse(raw).map_err(|err| invalid_field_error(field, &err)))
        .transpose()
}

pub(crate) fn parse_athlete_id(value: &str, field: FieldName) -> Result<AthleteId, Error> {
    AthleteId::new(value).map_err(|_| invalid_uuid_error(field, value))
}
