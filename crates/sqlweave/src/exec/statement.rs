//! Prepared-statement collaborator traits.

use crate::error::{WeaveError, WeaveResult};
use crate::value::Value;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Parameters to bind before stepping a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    /// Bound to `1..=n` in order.
    Positional(Vec<Value>),
    /// Bound by parameter name.
    Named(Vec<(String, Value)>),
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        Params::Positional(values)
    }
}

impl From<Vec<(String, Value)>> for Params {
    fn from(pairs: Vec<(String, Value)>) -> Self {
        Params::Named(pairs)
    }
}

/// One result row in the requested shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Array(Vec<Value>),
    /// Column name/value pairs in column order.
    Object(Vec<(String, Value)>),
}

impl Row {
    /// Value by column position.
    pub fn get(&self, index: usize) -> Option<&Value> {
        match self {
            Row::Array(values) => values.get(index),
            Row::Object(pairs) => pairs.get(index).map(|(_, v)| v),
        }
    }

    /// Value by column name (object rows only).
    pub fn get_named(&self, name: &str) -> Option<&Value> {
        match self {
            Row::Array(_) => None,
            Row::Object(pairs) => pairs.iter().find(|(k, _)| k == name).map(|(_, v)| v),
        }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Row::Array(values) => values.serialize(serializer),
            Row::Object(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (k, v) in pairs {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

/// A prepared statement.
///
/// Parameter indices are 1-based, column indices 0-based. Dropping the
/// statement finalizes it.
pub trait Statement {
    /// The SQL this statement was prepared from.
    fn sql(&self) -> &str;

    /// Number of bindable parameters.
    fn param_count(&self) -> usize;

    /// Number of result columns.
    fn column_count(&self) -> usize;

    /// Name of result column `index`.
    fn column_name(&self, index: usize) -> Option<String>;

    /// Bind `value` to parameter `index` (1-based).
    fn bind(&mut self, index: usize, value: Value) -> WeaveResult<()>;

    /// Name of parameter `index` (1-based), as written in the SQL (`:id`).
    /// `None` for positional parameters or drivers without parameter names.
    fn param_name(&self, index: usize) -> Option<String> {
        let _ = index;
        None
    }

    /// 1-based index of the parameter called `name`.
    fn param_index(&self, name: &str) -> WeaveResult<usize> {
        (1..=self.param_count())
            .find(|&i| self.param_name(i).as_deref() == Some(name))
            .ok_or_else(|| WeaveError::bind(format!("no parameter named '{name}'")))
    }

    /// Bind `value` to a named parameter.
    fn bind_named(&mut self, name: &str, value: Value) -> WeaveResult<()> {
        let index = self.param_index(name)?;
        self.bind(index, value)
    }

    /// Rewind so the statement can be stepped again. Bindings are kept.
    fn reset(&mut self) -> WeaveResult<()> {
        Err(WeaveError::statement("reset is not supported by this statement"))
    }

    /// Advance to the next row. Returns `false` once the statement is done.
    fn step(&mut self) -> WeaveResult<bool>;

    /// Column `index` of the current row.
    fn get(&self, index: usize) -> WeaveResult<Value>;

    /// Bind a whole parameter set.
    fn bind_all(&mut self, params: &Params) -> WeaveResult<()> {
        match params {
            Params::Positional(values) => {
                for (i, value) in values.iter().enumerate() {
                    self.bind(i + 1, value.clone())?;
                }
            }
            Params::Named(pairs) => {
                for (name, value) in pairs {
                    self.bind_named(name, value.clone())?;
                }
            }
        }
        Ok(())
    }

    /// Bind the current row of `source` to this statement's parameters.
    ///
    /// `source` must have at least one column and exactly as many columns as
    /// this statement has parameters.
    fn bind_from<S: Statement + ?Sized>(&mut self, source: &S) -> WeaveResult<()>
    where
        Self: Sized,
    {
        let columns = source.column_count();
        if columns == 0 {
            return Err(WeaveError::bind("statement to bind from has no result columns"));
        }
        if columns != self.param_count() {
            return Err(WeaveError::bind(format!(
                "source and destination column counts do not match: {} vs. {}",
                columns,
                self.param_count()
            )));
        }
        for i in 0..columns {
            self.bind(i + 1, source.get(i)?)?;
        }
        Ok(())
    }

    /// Every parameter name by position; unnamed parameters are `None`.
    fn param_names(&self) -> Vec<Option<String>> {
        (1..=self.param_count()).map(|i| self.param_name(i)).collect()
    }

    /// All result column names, in order.
    fn column_names(&self) -> Vec<String> {
        (0..self.column_count())
            .map(|i| self.column_name(i).unwrap_or_default())
            .collect()
    }

    /// The current row as an array.
    fn row_array(&self) -> WeaveResult<Vec<Value>> {
        (0..self.column_count()).map(|i| self.get(i)).collect()
    }

    /// The current row as name/value pairs.
    fn row_object(&self) -> WeaveResult<Vec<(String, Value)>> {
        (0..self.column_count())
            .map(|i| Ok((self.column_name(i).unwrap_or_default(), self.get(i)?)))
            .collect()
    }

    /// Step and return the row as an array, `None` when done.
    fn step_array(&mut self) -> WeaveResult<Option<Vec<Value>>> {
        if self.step()? {
            self.row_array().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Step and return the row as name/value pairs, `None` when done.
    fn step_object(&mut self) -> WeaveResult<Option<Vec<(String, Value)>>> {
        if self.step()? {
            self.row_object().map(Some)
        } else {
            Ok(None)
        }
    }
}

/// A connection able to prepare statements.
pub trait Connection {
    type Statement: Statement;

    /// Prepare `sql`.
    fn prepare(&self, sql: &str) -> WeaveResult<Self::Statement>;

    /// Run `sql` once, discarding any rows.
    fn exec_sql(&self, sql: &str) -> WeaveResult<()> {
        let mut stmt = self.prepare(sql)?;
        while stmt.step()? {}
        Ok(())
    }

    /// Row id generated by the most recent insert. `hint` names the sequence
    /// or table for drivers that need one.
    fn last_insert_id(&self, hint: Option<&str>) -> WeaveResult<i64> {
        let _ = hint;
        Err(WeaveError::database(
            "last insert id is not supported by this connection",
        ))
    }
}
