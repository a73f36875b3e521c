//! Compile client-supplied field lists into select expressions.
//!
//! A field list is a sequence of tokens, each one of:
//! - a direct column of the athlete row (`federation_id`);
//! - a whole related table (`weight_classes`), rendered as `table (*)`;
//! - a nested column (`users.name`), grouped per table as `table (a, b)`.
//!
//! Duplicate tokens collapse onto their first occurrence and a whole-table
//! token subsumes every nested token for the same table. Validation happens
//! before anything is rendered, so a single bad token rejects the whole list.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::domain::{ProfileError, SchemaRegistry};

/// Columns selected from one related table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationColumns {
    All,
    Listed(Vec<String>),
}

/// One related table in a compiled select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationSelect {
    pub table: String,
    pub columns: RelationColumns,
}

impl fmt::Display for RelationSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.columns {
            RelationColumns::All => write!(f, "{} (*)", self.table),
            RelationColumns::Listed(columns) => {
                write!(f, "{} ({})", self.table, columns.join(", "))
            }
        }
    }
}

/// Validated projection over the athlete row and its relations.
///
/// The [`fmt::Display`] form is the select expression handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSelect {
    direct: Vec<String>,
    relations: Vec<RelationSelect>,
}

impl CompiledSelect {
    pub fn direct_columns(&self) -> &[String] {
        &self.direct
    }

    pub fn relations(&self) -> &[RelationSelect] {
        &self.relations
    }

    /// Render the select expression.
    #[must_use]
    pub fn expression(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CompiledSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .direct
            .iter()
            .map(ToString::to_string)
            .chain(self.relations.iter().map(ToString::to_string));
        for (index, part) in parts.enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&part)?;
        }
        Ok(())
    }
}

enum Token<'a> {
    Direct(&'a str),
    Table(&'a str),
    Nested { table: &'a str, column: &'a str },
}

/// Turns field lists into [`CompiledSelect`] values against a registry.
#[derive(Debug, Clone)]
pub struct SelectCompiler {
    registry: Arc<SchemaRegistry>,
}

impl SelectCompiler {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Compile `requested`; an empty list yields the default projection.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use coaching_backend::domain::{SchemaRegistry, SelectCompiler};
    ///
    /// let compiler = SelectCompiler::new(Arc::new(SchemaRegistry::athlete_profiles()));
    /// let select = compiler
    ///     .compile(&["users.name", "users.name", "weight_classes", "weight_classes.name"])
    ///     .expect("valid field list");
    /// assert_eq!(select.to_string(), "users (name), weight_classes (*)");
    /// ```
    pub fn compile<S: AsRef<str>>(&self, requested: &[S]) -> Result<CompiledSelect, ProfileError> {
        if requested.is_empty() {
            return self.default_projection();
        }
        self.compile_tokens(requested.iter().map(AsRef::as_ref))
    }

    /// Projection used when the client asks for nothing in particular.
    pub fn default_projection(&self) -> Result<CompiledSelect, ProfileError> {
        self.compile_tokens(self.registry.default_tokens())
    }

    fn compile_tokens<'a>(
        &self,
        tokens: impl Iterator<Item = &'a str>,
    ) -> Result<CompiledSelect, ProfileError> {
        let mut seen = HashSet::new();
        let unique: Vec<&str> = tokens.filter(|token| seen.insert(*token)).collect();

        let whole_tables: HashSet<&str> = unique
            .iter()
            .copied()
            .filter(|token| !token.contains('.') && self.registry.is_full_table(token))
            .collect();

        let classified = unique
            .into_iter()
            .filter(|token| {
                token
                    .split_once('.')
                    .is_none_or(|(table, _)| !whole_tables.contains(table))
            })
            .map(|token| self.classify(token))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::assemble(classified))
    }

    fn classify<'a>(&self, token: &'a str) -> Result<Token<'a>, ProfileError> {
        let invalid = || ProfileError::InvalidQuery(token.to_owned());
        if let Some((table, column)) = token.split_once('.') {
            return if self.registry.permits_nested(table, column) {
                Ok(Token::Nested { table, column })
            } else {
                Err(invalid())
            };
        }
        if self.registry.is_full_table(token) {
            Ok(Token::Table(token))
        } else if self.registry.is_direct_column(token) {
            Ok(Token::Direct(token))
        } else {
            Err(invalid())
        }
    }

    fn assemble(tokens: Vec<Token<'_>>) -> CompiledSelect {
        let mut direct = Vec::new();
        let mut relations: Vec<RelationSelect> = Vec::new();

        for token in tokens {
            match token {
                Token::Direct(column) => direct.push(column.to_owned()),
                Token::Table(table) => relations.push(RelationSelect {
                    table: table.to_owned(),
                    columns: RelationColumns::All,
                }),
                Token::Nested { table, column } => {
                    match relations.iter_mut().find(|relation| relation.table == table) {
                        Some(RelationSelect {
                            columns: RelationColumns::Listed(columns),
                            ..
                        }) => columns.push(column.to_owned()),
                        // Whole-table requests have already absorbed their nested tokens.
                        Some(_) => {}
                        None => relations.push(RelationSelect {
                            table: table.to_owned(),
                            columns: RelationColumns::Listed(vec![column.to_owned()]),
                        }),
                    }
                }
            }
        }

        CompiledSelect { direct, relations }
    }
}

/// Split a comma-separated `data` query value into tokens.
///
/// Tokens are trimmed and empty segments dropped.
///
/// # Examples
/// ```
/// use coaching_backend::domain::parse_field_list;
///
/// assert_eq!(
///     parse_field_list(" federation_id, users.name,,weight_classes "),
///     ["federation_id", "users.name", "weight_classes"]
/// );
/// ```
#[must_use]
pub fn parse_field_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}
