//! Resolve human-readable competition references to row identifiers.
//!
//! Divisions and weight classes only have meaning inside a federation, so the
//! lookups are ordered: a [`ResolvedFederation`] must exist before either of
//! the dependent lookups can be called. [`ReferenceRequest`] captures which
//! references a create request carries and rejects combinations that skip the
//! federation before any lookup happens.

use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{ProfileStore, ProfileStoreError, Row, SelectQuery};
use crate::domain::profile_error::{
    DIVISION_PRECONDITION, WEIGHT_CLASS_PRECONDITION, log_store_failure,
};
use crate::domain::schema_registry::{DIVISIONS_TABLE, FEDERATIONS_TABLE, WEIGHT_CLASSES_TABLE};
use crate::domain::{Gender, ProfileError, ReferenceKind};

/// Federation whose identifier is known.
///
/// Only the resolver and stored athlete rows produce this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFederation {
    id: String,
}

impl ResolvedFederation {
    /// Federation already recorded on an athlete row.
    pub(crate) fn from_stored(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Competition references named by a create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceRequest {
    None,
    Federation {
        code: String,
        division: Option<String>,
        weight_class: Option<(String, Gender)>,
    },
}

impl ReferenceRequest {
    /// Check that dependent references come with what they depend on.
    ///
    /// # Examples
    /// ```
    /// use coaching_backend::domain::{Gender, ProfileError, ReferenceRequest};
    ///
    /// let err = ReferenceRequest::from_parts(None, None, Some("67.5kg".into()), Some(Gender::Male))
    ///     .expect_err("weight class needs a federation");
    /// assert_eq!(err.to_string(), "weight class requires a federation and gender");
    /// ```
    pub fn from_parts(
        federation: Option<String>,
        division: Option<String>,
        weight_class: Option<String>,
        gender: Option<Gender>,
    ) -> Result<Self, ProfileError> {
        let weight_class = match (weight_class, federation.is_some(), gender) {
            (None, _, _) => None,
            (Some(name), true, Some(gender)) => Some((name, gender)),
            (Some(_), _, _) => return Err(ProfileError::precondition(WEIGHT_CLASS_PRECONDITION)),
        };
        match federation {
            Some(code) => Ok(Self::Federation {
                code,
                division,
                weight_class,
            }),
            None if division.is_some() => Err(ProfileError::precondition(DIVISION_PRECONDITION)),
            None => Ok(Self::None),
        }
    }
}

/// Identifiers produced by resolving a [`ReferenceRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedReferences {
    pub federation_id: Option<String>,
    pub division_id: Option<String>,
    pub weight_class_id: Option<String>,
}

/// Looks references up through a [`ProfileStore`].
pub struct ReferenceResolver<'a> {
    store: &'a dyn ProfileStore,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(store: &'a dyn ProfileStore) -> Self {
        Self { store }
    }

    /// Resolve every reference in `request`, federation first.
    pub async fn resolve(
        &self,
        request: ReferenceRequest,
    ) -> Result<ResolvedReferences, ProfileError> {
        let ReferenceRequest::Federation {
            code,
            division,
            weight_class,
        } = request
        else {
            return Ok(ResolvedReferences::default());
        };

        let federation = self.federation(&code).await?;
        let division_id = match division {
            Some(name) => Some(self.division(&federation, &name).await?),
            None => None,
        };
        let weight_class_id = match weight_class {
            Some((name, gender)) => Some(self.weight_class(&federation, gender, &name).await?),
            None => None,
        };

        Ok(ResolvedReferences {
            federation_id: Some(federation.id),
            division_id,
            weight_class_id,
        })
    }

    /// Look a federation up by its code.
    pub async fn federation(&self, code: &str) -> Result<ResolvedFederation, ProfileError> {
        let query = SelectQuery::new(FEDERATIONS_TABLE, "id").filter("code", code);
        let id = self.lookup_id(&query, ReferenceKind::Federation, code).await?;
        Ok(ResolvedFederation { id })
    }

    /// Look a division up by name within `federation`.
    pub async fn division(
        &self,
        federation: &ResolvedFederation,
        name: &str,
    ) -> Result<String, ProfileError> {
        let query = SelectQuery::new(DIVISIONS_TABLE, "id")
            .filter("federation_id", federation.id())
            .filter("name", name);
        self.lookup_id(&query, ReferenceKind::Division, name).await
    }

    /// Look a weight class up by name within `federation` and `gender`.
    pub async fn weight_class(
        &self,
        federation: &ResolvedFederation,
        gender: Gender,
        name: &str,
    ) -> Result<String, ProfileError> {
        let query = SelectQuery::new(WEIGHT_CLASSES_TABLE, "id")
            .filter("federation_id", federation.id())
            .filter("gender", gender.as_str())
            .filter("name", name);
        self.lookup_id(&query, ReferenceKind::WeightClass, name).await
    }

    async fn lookup_id(
        &self,
        query: &SelectQuery,
        kind: ReferenceKind,
        name: &str,
    ) -> Result<String, ProfileError> {
        let row = self.store.select_single(query).await.map_err(|err| {
            log_store_failure("select", &query.table, &err);
            ProfileError::on_reference_lookup(kind, name, err)
        })?;
        let Some(row) = row else {
            debug!(kind = %kind, name, "reference did not resolve");
            return Err(ProfileError::reference_not_found(kind, name));
        };
        column_text(&row, "id").ok_or_else(|| {
            let err = ProfileStoreError::decode(format!("{} row is missing an id", query.table));
            log_store_failure("select", &query.table, &err);
            ProfileError::on_reference_lookup(kind, name, err)
        })
    }
}

/// Read a scalar column as text, accepting both string and numeric ids.
pub(crate) fn column_text(row: &Row, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests;
