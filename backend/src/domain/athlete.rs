//! Athlete profile commands.
//!
//! Create carries every user-row field plus optional competition references.
//! Update is modelled as [`AthleteProfileChange`], which holds exactly one
//! populated field; the loosely shaped [`AthleteProfilePatch`] is converted
//! into it at the boundary.

use std::fmt;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::profile_error::{ProfileError, SINGLE_FIELD_PRECONDITION};
use crate::domain::{FullName, Gender, UserValidationError, Username};

/// Identifier of an athlete row, as used in profile lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AthleteId(Uuid);

impl AthleteId {
    /// Parse an athlete id from its textual form.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = raw.as_ref();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for AthleteId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for AthleteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Profile-completion payload for a freshly registered user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAthleteProfile {
    pub name: FullName,
    pub username: Username,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    /// Federation code, e.g. `IPF`.
    pub federation: Option<String>,
    /// Division name within the federation.
    pub division: Option<String>,
    /// Weight class name within the federation and gender.
    pub weight_class: Option<String>,
    pub team: Option<String>,
}

/// Partially populated update payload as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AthleteProfilePatch {
    pub name: Option<FullName>,
    pub username: Option<Username>,
    pub federation: Option<String>,
    pub division: Option<String>,
    pub weight_class: Option<String>,
    pub team: Option<String>,
}

/// A single semantic change to an athlete profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AthleteProfileChange {
    Name(FullName),
    Username(Username),
    Federation(String),
    Division(String),
    WeightClass(String),
    Team(String),
}

impl AthleteProfileChange {
    /// Field name as it appears in request bodies.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Username(_) => "username",
            Self::Federation(_) => "federation",
            Self::Division(_) => "division",
            Self::WeightClass(_) => "weight_class",
            Self::Team(_) => "team",
        }
    }

    /// Whether the change lands on the `users` row rather than `athletes`.
    #[must_use]
    pub const fn targets_user(&self) -> bool {
        matches!(self, Self::Name(_) | Self::Username(_))
    }
}

impl TryFrom<AthleteProfilePatch> for AthleteProfileChange {
    type Error = ProfileError;

    fn try_from(patch: AthleteProfilePatch) -> Result<Self, Self::Error> {
        let AthleteProfilePatch {
            name,
            username,
            federation,
            division,
            weight_class,
            team,
        } = patch;
        let mut changes = [
            name.map(Self::Name),
            username.map(Self::Username),
            federation.map(Self::Federation),
            division.map(Self::Division),
            weight_class.map(Self::WeightClass),
            team.map(Self::Team),
        ]
        .into_iter()
        .flatten();

        match (changes.next(), changes.next()) {
            (Some(change), None) => Ok(change),
            _ => Err(ProfileError::precondition(SINGLE_FIELD_PRECONDITION)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn name(raw: &str) -> FullName {
        FullName::new(raw).expect("valid name")
    }

    #[rstest]
    #[case(AthleteProfilePatch { name: Some(name("Ada")), ..Default::default() }, "name", true)]
    #[case(AthleteProfilePatch { username: Some(Username::new("ada_l").expect("valid")), ..Default::default() }, "username", true)]
    #[case(AthleteProfilePatch { federation: Some("IPF".into()), ..Default::default() }, "federation", false)]
    #[case(AthleteProfilePatch { division: Some("Junior".into()), ..Default::default() }, "division", false)]
    #[case(AthleteProfilePatch { weight_class: Some("67.5kg".into()), ..Default::default() }, "weight_class", false)]
    #[case(AthleteProfilePatch { team: Some("Iron Club".into()), ..Default::default() }, "team", false)]
    fn single_field_patch_becomes_change(
        #[case] patch: AthleteProfilePatch,
        #[case] field: &str,
        #[case] targets_user: bool,
    ) {
        let change = AthleteProfileChange::try_from(patch).expect("exactly one field");
        assert_eq!(change.field(), field);
        assert_eq!(change.targets_user(), targets_user);
    }

    #[rstest]
    #[case(AthleteProfilePatch::default())]
    #[case(AthleteProfilePatch {
        name: Some(name("Ada")),
        team: Some("Iron Club".into()),
        ..Default::default()
    })]
    #[case(AthleteProfilePatch {
        federation: Some("IPF".into()),
        division: Some("Junior".into()),
        weight_class: Some("67.5kg".into()),
        ..Default::default()
    })]
    fn zero_or_many_fields_are_rejected(#[case] patch: AthleteProfilePatch) {
        let err = AthleteProfileChange::try_from(patch).expect_err("not exactly one");
        assert_eq!(err, ProfileError::precondition(SINGLE_FIELD_PRECONDITION));
    }

    #[test]
    fn athlete_id_rejects_non_uuid() {
        assert_eq!(
            AthleteId::new("42").expect_err("invalid"),
            UserValidationError::InvalidId
        );
    }
}
