//! Whitelists describing which parts of the athlete profile may be queried.
//!
//! The registry is plain read-only data. The production layout comes from
//! [`SchemaRegistry::athlete_profiles`]; tests assemble alternate layouts with
//! [`SchemaRegistry::builder`].

use std::collections::{BTreeMap, BTreeSet};

/// Table holding one row per athlete.
pub const ATHLETES_TABLE: &str = "athletes";
/// Table holding identity-level user fields.
pub const USERS_TABLE: &str = "users";
/// Federation reference data.
pub const FEDERATIONS_TABLE: &str = "federations";
/// Division reference data, scoped by federation.
pub const DIVISIONS_TABLE: &str = "divisions";
/// Weight class reference data, scoped by federation and gender.
pub const WEIGHT_CLASSES_TABLE: &str = "weight_classes";

/// Static description of the queryable athlete profile surface.
///
/// # Examples
/// ```
/// use coaching_backend::domain::SchemaRegistry;
///
/// let registry = SchemaRegistry::athlete_profiles();
/// assert!(registry.is_direct_column("federation_id"));
/// assert!(registry.is_full_table("weight_classes"));
/// assert!(registry.permits_nested("users", "username"));
/// assert!(!registry.permits_nested("users", "password"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRegistry {
    table_fields: BTreeMap<String, Vec<String>>,
    full_tables: BTreeSet<String>,
    direct_columns: Vec<String>,
    default_fields: Vec<String>,
}

impl SchemaRegistry {
    /// Registry for the athlete profile endpoints.
    #[must_use]
    pub fn athlete_profiles() -> Self {
        Self::builder()
            .table(USERS_TABLE, ["name", "username", "email", "role", "gender"])
            .table(FEDERATIONS_TABLE, ["id", "name", "code"])
            .table(
                DIVISIONS_TABLE,
                ["id", "federation_id", "name", "minimum_age", "maximum_age"],
            )
            .table(
                WEIGHT_CLASSES_TABLE,
                [
                    "id",
                    "federation_id",
                    "name",
                    "gender",
                    "min_weight",
                    "max_weight",
                    "sort_order",
                    "active",
                ],
            )
            .full_table(FEDERATIONS_TABLE)
            .full_table(DIVISIONS_TABLE)
            .full_table(WEIGHT_CLASSES_TABLE)
            .direct_columns([
                "id",
                "federation_id",
                "division_id",
                "weight_class_id",
                "team",
                "coach_id",
            ])
            .default_fields(["users.name", "users.username", "users.email"])
            .build()
    }

    /// Start an empty registry.
    #[must_use]
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    /// Whether `column` may be requested as a bare token.
    #[must_use]
    pub fn is_direct_column(&self, column: &str) -> bool {
        self.direct_columns.iter().any(|c| c == column)
    }

    /// Whether `table` may be requested as a whole row.
    #[must_use]
    pub fn is_full_table(&self, table: &str) -> bool {
        self.full_tables.contains(table)
    }

    /// Whether `table.column` is a permitted nested token.
    #[must_use]
    pub fn permits_nested(&self, table: &str, column: &str) -> bool {
        self.table_fields
            .get(table)
            .is_some_and(|columns| columns.iter().any(|c| c == column))
    }

    /// Direct columns in declaration order.
    pub fn direct_columns(&self) -> impl Iterator<Item = &str> {
        self.direct_columns.iter().map(String::as_str)
    }

    /// Tokens making up the projection used when no field list is supplied.
    ///
    /// Every direct column comes first, followed by the configured nested
    /// defaults.
    pub fn default_tokens(&self) -> impl Iterator<Item = &str> {
        self.direct_columns
            .iter()
            .chain(self.default_fields.iter())
            .map(String::as_str)
    }
}

/// Incremental constructor for [`SchemaRegistry`].
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    table_fields: BTreeMap<String, Vec<String>>,
    full_tables: BTreeSet<String>,
    direct_columns: Vec<String>,
    default_fields: Vec<String>,
}

impl SchemaRegistryBuilder {
    /// Permit nested queries of `columns` through `table`.
    #[must_use]
    pub fn table<I, S>(mut self, table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.table_fields.entry(table.into()).or_default();
        for column in columns {
            let column = column.into();
            if !entry.contains(&column) {
                entry.push(column);
            }
        }
        self
    }

    /// Permit whole-row queries of `table`.
    #[must_use]
    pub fn full_table(mut self, table: impl Into<String>) -> Self {
        self.full_tables.insert(table.into());
        self
    }

    /// Permit bare tokens for `columns` of the athlete row.
    #[must_use]
    pub fn direct_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            let column = column.into();
            if !self.direct_columns.contains(&column) {
                self.direct_columns.push(column);
            }
        }
        self
    }

    /// Nested tokens appended to the direct columns in the default projection.
    #[must_use]
    pub fn default_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn build(self) -> SchemaRegistry {
        SchemaRegistry {
            table_fields: self.table_fields,
            full_tables: self.full_tables,
            direct_columns: self.direct_columns,
            default_fields: self.default_fields,
        }
    }
}
