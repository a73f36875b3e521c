//! Athlete profile use cases.
//!
//! The service implements the driving ports for profile reads and writes on
//! top of a [`ProfileStore`]. Reads compile the requested field list before
//! touching the store. Writes check cross-field preconditions, resolve
//! competition references through [`ReferenceResolver`], make sure a new
//! username is not held by another user, and then issue their mutations one
//! after another, stopping at the first failure.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::domain::ports::{
    AthleteProfileCommand, AthleteProfileQuery, Filter, ProfileStore, ProfileStoreError, Row,
    SelectQuery,
};
use crate::domain::profile_error::{
    DIVISION_PRECONDITION, NO_ROWS_CODE, WEIGHT_CLASS_PRECONDITION, log_store_failure,
};
use crate::domain::reference_resolver::column_text;
use crate::domain::schema_registry::{ATHLETES_TABLE, USERS_TABLE};
use crate::domain::{
    AthleteId, AthleteProfileChange, CreateAthleteProfile, Error, Gender, ProfileError,
    ReferenceRequest, ReferenceResolver, ResolvedFederation, SchemaRegistry, SelectCompiler,
    StoreFailure, UserId, UserRole, Username,
};

/// Athlete profile service implementing the driving ports.
#[derive(Clone)]
pub struct AthleteProfileService<S> {
    store: Arc<S>,
    compiler: SelectCompiler,
}

impl<S> AthleteProfileService<S> {
    /// Create a service over `store` using the whitelists in `registry`.
    pub fn new(store: Arc<S>, registry: Arc<SchemaRegistry>) -> Self {
        Self {
            store,
            compiler: SelectCompiler::new(registry),
        }
    }
}

impl<S> AthleteProfileService<S>
where
    S: ProfileStore + 'static,
{
    fn resolver(&self) -> ReferenceResolver<'_> {
        ReferenceResolver::new(self.store.as_ref())
    }

    /// Complete a profile: update the user row, then insert the athlete row.
    pub async fn create(
        &self,
        user_id: &UserId,
        request: CreateAthleteProfile,
    ) -> Result<(), ProfileError> {
        let CreateAthleteProfile {
            name,
            username,
            gender,
            date_of_birth,
            federation,
            division,
            weight_class,
            team,
        } = request;

        let references =
            ReferenceRequest::from_parts(federation, division, weight_class, Some(gender))?;
        self.ensure_username_available(user_id, &username).await?;
        let resolved = self.resolver().resolve(references).await?;

        let mut user_row = Row::new();
        user_row.insert("name".into(), json!(name));
        user_row.insert("username".into(), json!(username));
        user_row.insert("gender".into(), json!(gender.as_str()));
        user_row.insert(
            "date_of_birth".into(),
            json!(date_of_birth.format("%Y-%m-%d").to_string()),
        );
        user_row.insert("role".into(), json!(UserRole::Athlete.as_str()));
        self.update_row(USERS_TABLE, &user_row, Filter::eq("id", user_id.to_string()))
            .await?;

        let mut athlete_row = Row::new();
        athlete_row.insert("user_id".into(), json!(user_id.to_string()));
        let optional = [
            ("federation_id", resolved.federation_id),
            ("division_id", resolved.division_id),
            ("weight_class_id", resolved.weight_class_id),
            ("team", team),
        ];
        for (column, value) in optional {
            if let Some(value) = value {
                athlete_row.insert(column.into(), Value::String(value));
            }
        }
        self.store
            .insert(ATHLETES_TABLE, &athlete_row)
            .await
            .map_err(|err| {
                log_store_failure("insert", ATHLETES_TABLE, &err);
                ProfileError::on_insert(err)
            })?;

        info!(user_id = %user_id, "athlete profile created");
        Ok(())
    }

    /// Apply a single change to the caller's user or athlete row.
    pub async fn update(
        &self,
        user_id: &UserId,
        change: AthleteProfileChange,
    ) -> Result<(), ProfileError> {
        let field = change.field();
        let user_filter = Filter::eq("id", user_id.to_string());
        let athlete_filter = Filter::eq("user_id", user_id.to_string());

        let (table, changes, filter) = match change {
            AthleteProfileChange::Name(name) => {
                (USERS_TABLE, single("name", json!(name)), user_filter)
            }
            AthleteProfileChange::Username(username) => {
                self.ensure_username_available(user_id, &username).await?;
                (USERS_TABLE, single("username", json!(username)), user_filter)
            }
            AthleteProfileChange::Federation(code) => {
                let federation = self.resolver().federation(&code).await?;
                let mut changes = single("federation_id", json!(federation.id()));
                changes.insert("division_id".into(), Value::Null);
                changes.insert("weight_class_id".into(), Value::Null);
                (ATHLETES_TABLE, changes, athlete_filter)
            }
            AthleteProfileChange::Division(name) => {
                let current = self.current_competition(user_id, "federation_id").await?;
                let federation = current
                    .federation
                    .ok_or_else(|| ProfileError::precondition(DIVISION_PRECONDITION))?;
                let division_id = self.resolver().division(&federation, &name).await?;
                (ATHLETES_TABLE, single("division_id", json!(division_id)), athlete_filter)
            }
            AthleteProfileChange::WeightClass(name) => {
                let current = self
                    .current_competition(user_id, "federation_id, users (gender)")
                    .await?;
                let (Some(federation), Some(gender)) = (current.federation, current.gender) else {
                    return Err(ProfileError::precondition(WEIGHT_CLASS_PRECONDITION));
                };
                let weight_class_id = self
                    .resolver()
                    .weight_class(&federation, gender, &name)
                    .await?;
                (
                    ATHLETES_TABLE,
                    single("weight_class_id", json!(weight_class_id)),
                    athlete_filter,
                )
            }
            AthleteProfileChange::Team(team) => {
                (ATHLETES_TABLE, single("team", json!(team)), athlete_filter)
            }
        };

        self.update_row(table, &changes, filter).await?;
        info!(user_id = %user_id, table, field, "athlete profile updated");
        Ok(())
    }

    /// Read the requested projection of an athlete's profile.
    pub async fn retrieve(
        &self,
        athlete_id: &AthleteId,
        fields: &[String],
    ) -> Result<Row, ProfileError> {
        let select = self.compiler.compile(fields)?;
        let id = athlete_id.to_string();

        let exists = self
            .select(&SelectQuery::new(ATHLETES_TABLE, "id").filter("id", id.as_str()))
            .await?;
        if exists.is_none() {
            return Err(ProfileError::AthleteNotFound(id));
        }

        self.select(&SelectQuery::new(ATHLETES_TABLE, select.expression()).filter("id", id))
            .await?
            .ok_or_else(|| {
                ProfileError::ProfileLookupFailed(StoreFailure::new(
                    NO_ROWS_CODE,
                    "no athlete row matched the request",
                ))
            })
    }

    /// Fail when `username` already belongs to a user other than `user_id`.
    async fn ensure_username_available(
        &self,
        user_id: &UserId,
        username: &Username,
    ) -> Result<(), ProfileError> {
        let name: &str = username.as_ref();
        let query = SelectQuery::new(USERS_TABLE, "id").filter("username", name);
        let holder = self
            .select(&query)
            .await?
            .and_then(|row| column_text(&row, "id"))
            .and_then(|id| UserId::new(id).ok());
        match holder {
            Some(holder) if &holder != user_id => {
                debug!(user_id = %user_id, username = name, "username already taken");
                Err(ProfileError::UsernameTaken(name.to_owned()))
            }
            _ => Ok(()),
        }
    }

    async fn select(&self, query: &SelectQuery) -> Result<Option<Row>, ProfileError> {
        self.store.select_single(query).await.map_err(|err| {
            log_store_failure("select", &query.table, &err);
            ProfileError::on_lookup(err)
        })
    }

    async fn update_row(
        &self,
        table: &'static str,
        changes: &Row,
        filter: Filter,
    ) -> Result<(), ProfileError> {
        self.store
            .update(table, changes, &filter)
            .await
            .map_err(|err| {
                log_store_failure("update", table, &err);
                ProfileError::on_update(err)
            })
    }

    /// Load the caller's stored federation and, when embedded, gender.
    async fn current_competition(
        &self,
        user_id: &UserId,
        columns: &str,
    ) -> Result<CurrentCompetition, ProfileError> {
        let query = SelectQuery::new(ATHLETES_TABLE, columns).filter("user_id", user_id.to_string());
        let row = self
            .select(&query)
            .await?
            .ok_or_else(|| ProfileError::AthleteNotFound(user_id.to_string()))?;

        let federation = column_text(&row, "federation_id").map(ResolvedFederation::from_stored);
        let gender = row
            .get(USERS_TABLE)
            .and_then(Value::as_object)
            .and_then(|user| user.get("gender"))
            .and_then(Value::as_str)
            .and_then(|raw| raw.parse::<Gender>().ok());
        Ok(CurrentCompetition { federation, gender })
    }
}

struct CurrentCompetition {
    federation: Option<ResolvedFederation>,
    gender: Option<Gender>,
}

fn single(column: &str, value: Value) -> Row {
    let mut row = Row::new();
    row.insert(column.to_owned(), value);
    row
}

#[async_trait]
impl<S> AthleteProfileCommand for AthleteProfileService<S>
where
    S: ProfileStore + 'static,
{
    async fn create_profile(
        &self,
        user_id: &UserId,
        request: CreateAthleteProfile,
    ) -> Result<(), Error> {
        self.create(user_id, request).await.map_err(Error::from)
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        change: AthleteProfileChange,
    ) -> Result<(), Error> {
        self.update(user_id, change).await.map_err(Error::from)
    }
}

#[async_trait]
impl<S> AthleteProfileQuery for AthleteProfileService<S>
where
    S: ProfileStore + 'static,
{
    async fn retrieve_profile(
        &self,
        athlete_id: &AthleteId,
        fields: &[String],
    ) -> Result<Row, Error> {
        self.retrieve(athlete_id, fields).await.map_err(Error::from)
    }
}

#[cfg(test)]
#[path = "athlete_profile_service_tests.rs"]
mod tests;
