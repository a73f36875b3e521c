//! Test utilities shared by unit and integration tests.
//!
//! Compiled only with the `test-support` feature.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::ports::{Filter, ProfileStore, ProfileStoreError, Row, SelectQuery};
use crate::domain::schema_registry::{
    ATHLETES_TABLE, DIVISIONS_TABLE, FEDERATIONS_TABLE, USERS_TABLE, WEIGHT_CLASSES_TABLE,
};

/// One call observed by [`InMemoryProfileStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Select(SelectQuery),
    Insert { table: String, row: Row },
    Update { table: String, changes: Row, filter: Filter },
}

impl StoreCall {
    /// Table the call targeted.
    pub fn table(&self) -> &str {
        match self {
            Self::Select(query) => &query.table,
            Self::Insert { table, .. } | Self::Update { table, .. } => table,
        }
    }
}

/// Store operation, used to script failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StoreOp {
    Select,
    Insert,
    Update,
}

/// Profile store holding rows in memory.
///
/// Selects understand the embedded-relation syntax the query compiler emits
/// (`users (name)`, `weight_classes (*)`): the related row is found through
/// the foreign key column registered for the relation, e.g. `user_id` for
/// `users`.
pub struct InMemoryProfileStore {
    tables: Mutex<BTreeMap<String, Vec<Row>>>,
    foreign_keys: BTreeMap<String, String>,
    failures: Mutex<BTreeMap<(StoreOp, String), ProfileStoreError>>,
    calls: Mutex<Vec<StoreCall>>,
}

impl Default for InMemoryProfileStore {
    fn default() -> Self {
        let foreign_keys = [
            (USERS_TABLE, "user_id"),
            (FEDERATIONS_TABLE, "federation_id"),
            (DIVISIONS_TABLE, "division_id"),
            (WEIGHT_CLASSES_TABLE, "weight_class_id"),
        ]
        .into_iter()
        .map(|(table, column)| (table.to_owned(), column.to_owned()))
        .collect();
        Self {
            tables: Mutex::new(BTreeMap::new()),
            foreign_keys,
            failures: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn value_matches(value: Option<&Value>, expected: &str) -> bool {
    match value {
        Some(Value::String(text)) => text == expected,
        Some(Value::Number(number)) => number.to_string() == expected,
        Some(Value::Bool(flag)) => flag.to_string() == expected,
        _ => false,
    }
}

fn row_matches(row: &Row, filters: &[Filter]) -> bool {
    filters
        .iter()
        .all(|filter| value_matches(row.get(&filter.column), &filter.value))
}

/// Split a select expression on commas that sit outside parentheses.
fn split_select(expression: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0;
    for (index, ch) in expression.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(expression[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    items.push(expression[start..].trim());
    items.retain(|item| !item.is_empty());
    items
}

fn project_columns(source: &Row, columns: &str) -> Row {
    if columns.trim() == "*" {
        return source.clone();
    }
    split_select(columns)
        .into_iter()
        .map(|column| {
            let value = source.get(column).cloned().unwrap_or(Value::Null);
            (column.to_owned(), value)
        })
        .collect()
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row into `table`.
    pub fn seed(&self, table: &str, row: Row) {
        lock(&self.tables)
            .entry(table.to_owned())
            .or_default()
            .push(row);
    }

    /// Make the next `op` against `table` fail with `error`.
    pub fn fail_next(&self, op: StoreOp, table: &str, error: ProfileStoreError) {
        lock(&self.failures).insert((op, table.to_owned()), error);
    }

    /// Snapshot of the rows in `table`.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        lock(&self.tables).get(table).cloned().unwrap_or_default()
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        lock(&self.calls).clone()
    }

    /// Calls that wrote to the store.
    pub fn writes(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, StoreCall::Select(_)))
            .collect()
    }

    fn record(&self, call: StoreCall) {
        lock(&self.calls).push(call);
    }

    fn take_failure(&self, op: StoreOp, table: &str) -> Result<(), ProfileStoreError> {
        match lock(&self.failures).remove(&(op, table.to_owned())) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn embed(&self, tables: &BTreeMap<String, Vec<Row>>, row: &Row, item: &str) -> (String, Value) {
        let Some((relation, rest)) = item.split_once('(') else {
            return (
                item.to_owned(),
                row.get(item).cloned().unwrap_or(Value::Null),
            );
        };
        let relation = relation.trim();
        let columns = rest.trim_end_matches(')');
        let related = self
            .foreign_keys
            .get(relation)
            .and_then(|column| row.get(column))
            .and_then(|key| {
                tables.get(relation)?.iter().find(|candidate| {
                    key.as_str()
                        .is_some_and(|key| value_matches(candidate.get("id"), key))
                })
            });
        let value = related.map_or(Value::Null, |related| {
            Value::Object(project_columns(related, columns))
        });
        (relation.to_owned(), value)
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn select_single(&self, query: &SelectQuery) -> Result<Option<Row>, ProfileStoreError> {
        self.record(StoreCall::Select(query.clone()));
        self.take_failure(StoreOp::Select, &query.table)?;

        let tables = lock(&self.tables);
        let mut matches = tables
            .get(&query.table)
            .into_iter()
            .flatten()
            .filter(|row| row_matches(row, &query.filters));
        let Some(row) = matches.next() else {
            return Ok(None);
        };
        if matches.next().is_some() {
            return Err(ProfileStoreError::rejected(
                "PGRST116",
                "JSON object requested, multiple (or no) rows returned",
            ));
        }
        let projected = split_select(&query.columns)
            .into_iter()
            .map(|item| self.embed(&tables, row, item))
            .collect();
        Ok(Some(projected))
    }

    async fn insert(&self, table: &str, row: &Row) -> Result<(), ProfileStoreError> {
        self.record(StoreCall::Insert {
            table: table.to_owned(),
            row: row.clone(),
        });
        self.take_failure(StoreOp::Insert, table)?;

        let mut stored = row.clone();
        if table == ATHLETES_TABLE && !stored.contains_key("id") {
            stored.insert("id".to_owned(), Value::String(uuid::Uuid::new_v4().to_string()));
        }
        lock(&self.tables)
            .entry(table.to_owned())
            .or_default()
            .push(stored);
        Ok(())
    }

    async fn update(
        &self,
        table: &str,
        changes: &Row,
        filter: &Filter,
    ) -> Result<(), ProfileStoreError> {
        self.record(StoreCall::Update {
            table: table.to_owned(),
            changes: changes.clone(),
            filter: filter.clone(),
        });
        self.take_failure(StoreOp::Update, table)?;

        let mut tables = lock(&self.tables);
        let filters = std::slice::from_ref(filter);
        for row in tables
            .entry(table.to_owned())
            .or_default()
            .iter_mut()
            .filter(|row| row_matches(row, filters))
        {
            row.extend(changes.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn select_items_split_outside_parentheses() {
        assert_eq!(
            split_select("id, users (name, email), weight_classes (*)"),
            vec!["id", "users (name, email)", "weight_classes (*)"]
        );
    }

    #[tokio::test]
    async fn embedded_relations_follow_foreign_keys() {
        let store = InMemoryProfileStore::new();
        store.seed(USERS_TABLE, row(json!({ "id": "u1", "name": "Ada", "email": "a@x" })));
        store.seed(
            ATHLETES_TABLE,
            row(json!({ "id": "a1", "user_id": "u1", "team": null })),
        );

        let query = SelectQuery::new(ATHLETES_TABLE, "team, users (name)").filter("id", "a1");
        let found = store
            .select_single(&query)
            .await
            .expect("select succeeds")
            .expect("row present");
        assert_eq!(Value::Object(found), json!({ "team": null, "users": { "name": "Ada" } }));
    }

    #[tokio::test]
    async fn scripted_failures_fire_once() {
        let store = InMemoryProfileStore::new();
        store.fail_next(
            StoreOp::Insert,
            ATHLETES_TABLE,
            ProfileStoreError::unavailable("down"),
        );
        let first = store.insert(ATHLETES_TABLE, &Row::new()).await;
        let second = store.insert(ATHLETES_TABLE, &Row::new()).await;
        assert!(first.is_err());
        assert!(second.is_ok());
        assert_eq!(store.rows(ATHLETES_TABLE).len(), 1);
    }
}
