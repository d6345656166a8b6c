//! Table handles: the usual entry point for building statements.

use crate::error::{WeaveError, WeaveResult};
use crate::qb::query::{Query, StatementKind};
use crate::qb::schema::Schema;
use crate::value::Value;

/// A named table bound to a [`Schema`].
///
/// Each method returns a fresh [`Query`] anchored at this table.
#[derive(Clone, Debug)]
pub struct Table {
    name: String,
    schema: Schema,
}

impl Table {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn query(&self, kind: StatementKind) -> Query {
        Query::new(kind, self.schema.clone()).table(self.name.as_str())
    }

    /// `SELECT <fields> FROM <table>`.
    pub fn select<I, S>(&self, fields: I) -> Query
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        fields
            .into_iter()
            .fold(self.query(StatementKind::Select), |q, f| q.field(f.as_ref()))
    }

    /// `SELECT * FROM <table>`.
    pub fn select_all(&self) -> Query {
        self.query(StatementKind::Select)
    }

    /// `INSERT INTO <table>`; columns follow the iteration order of `values`.
    pub fn insert<I, K, V>(&self, values: I) -> Query
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        values
            .into_iter()
            .fold(self.query(StatementKind::Insert), |q, (k, v)| q.set(k.as_ref(), v))
    }

    /// `UPDATE <table> SET ...`; assignments follow the iteration order of `values`.
    pub fn update<I, K, V>(&self, values: I) -> Query
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        values
            .into_iter()
            .fold(self.query(StatementKind::Update), |q, (k, v)| q.set(k.as_ref(), v))
    }

    /// INSERT from a JSON object, keeping its key order.
    pub fn insert_json(&self, object: &serde_json::Value) -> WeaveResult<Query> {
        Ok(self.insert(json_pairs(object)?))
    }

    /// UPDATE from a JSON object, keeping its key order.
    pub fn update_json(&self, object: &serde_json::Value) -> WeaveResult<Query> {
        Ok(self.update(json_pairs(object)?))
    }

    /// `DELETE FROM <table>`.
    pub fn delete(&self) -> Query {
        self.query(StatementKind::Delete)
    }

    /// Alias for [`Table::delete`].
    pub fn remove(&self) -> Query {
        self.delete()
    }
}

fn json_pairs(object: &serde_json::Value) -> WeaveResult<Vec<(String, Value)>> {
    let map = object.as_object().ok_or_else(|| {
        WeaveError::validation(format!("expected a JSON object, got {object}"))
    })?;
    Ok(map
        .iter()
        .map(|(k, v)| (k.clone(), Value::from(v.clone())))
        .collect())
}
