use crate::config::QbConfig;
use crate::error::{WeaveError, WeaveResult};
use crate::exec::statement::{Connection, Params, Row, Statement};
use crate::macros::trace_exec;
use serde::Serialize;

/// Shape of the row handed to an `exec_each` callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowMode {
    Array,
    Object,
    /// No row is materialized; read columns from the statement instead.
    #[default]
    Statement,
}

/// Shape of the rows collected by [`fetch_all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    #[default]
    Array,
    Object,
}

impl From<FetchMode> for RowMode {
    fn from(mode: FetchMode) -> Self {
        match mode {
            FetchMode::Array => RowMode::Array,
            FetchMode::Object => RowMode::Object,
        }
    }
}

enum Source<'a, S> {
    Sql(String),
    Prepared(&'a mut S),
}

type Binder<'a, S> = Box<dyn FnOnce(&mut S) -> WeaveResult<()> + 'a>;

/// What to run and how to bind it.
///
/// A statement prepared here is finalized when the run ends, whether it
/// succeeded or not. A caller-supplied statement is never finalized.
pub struct ExecOptions<'a, S> {
    source: Source<'a, S>,
    params: Option<Params>,
    binder: Option<Binder<'a, S>>,
    debug: bool,
    max_sql_length: Option<usize>,
}

impl<'a, S: Statement> ExecOptions<'a, S> {
    /// Prepare and run `sql`.
    pub fn sql(sql: impl Into<String>) -> Self {
        Self::from_source(Source::Sql(sql.into()))
    }

    /// Run an already prepared statement.
    pub fn prepared(stmt: &'a mut S) -> Self {
        Self::from_source(Source::Prepared(stmt))
    }

    fn from_source(source: Source<'a, S>) -> Self {
        let config = QbConfig::default();
        Self {
            source,
            params: None,
            binder: None,
            debug: config.debug,
            max_sql_length: config.max_sql_length,
        }
    }

    /// Bind these parameters before stepping.
    pub fn bind(mut self, params: impl Into<Params>) -> Self {
        self.params = Some(params.into());
        self
    }

    /// Initialize bindings with a callback (runs after [`ExecOptions::bind`]).
    pub fn bind_with(mut self, f: impl FnOnce(&mut S) -> WeaveResult<()> + 'a) -> Self {
        self.binder = Some(Box::new(f));
        self
    }

    /// Log statement prepare/finalize events.
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Take logging settings from `config`.
    pub fn with_config(mut self, config: &QbConfig) -> Self {
        self.debug = config.debug;
        self.max_sql_length = config.max_sql_length;
        self
    }
}

/// Options for [`fetch_all`].
pub struct FetchOptions<'a, S> {
    exec: ExecOptions<'a, S>,
    mode: FetchMode,
}

impl<'a, S: Statement> FetchOptions<'a, S> {
    pub fn sql(sql: impl Into<String>) -> Self {
        ExecOptions::sql(sql).into()
    }

    pub fn prepared(stmt: &'a mut S) -> Self {
        ExecOptions::prepared(stmt).into()
    }

    pub fn bind(mut self, params: impl Into<Params>) -> Self {
        self.exec = self.exec.bind(params);
        self
    }

    pub fn mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn debug(mut self, enabled: bool) -> Self {
        self.exec = self.exec.debug(enabled);
        self
    }
}

impl<'a, S: Statement> From<ExecOptions<'a, S>> for FetchOptions<'a, S> {
    fn from(exec: ExecOptions<'a, S>) -> Self {
        Self {
            exec,
            mode: FetchMode::default(),
        }
    }
}

/// Column names plus every row of a result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rows {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Rows {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serialize as `{"columns": [...], "rows": [...]}`.
    pub fn to_json(&self) -> WeaveResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn run<C, F>(conn: &C, opts: ExecOptions<'_, C::Statement>, body: F) -> WeaveResult<()>
where
    C: Connection + ?Sized,
    F: FnOnce(&mut C::Statement) -> WeaveResult<()>,
{
    let ExecOptions {
        source,
        params,
        binder,
        debug,
        max_sql_length,
    } = opts;
    let log_config = QbConfig {
        max_sql_length,
        ..QbConfig::default()
    };

    let mut owned;
    let (stmt, finalize) = match source {
        Source::Sql(sql) => {
            if sql.trim().is_empty() {
                return Err(WeaveError::validation("exec requires non-empty SQL"));
            }
            owned = conn.prepare(&sql)?;
            trace_exec!(debug, "prepared statement", log_config.truncate_sql(&sql));
            (&mut owned, true)
        }
        Source::Prepared(stmt) => (stmt, false),
    };

    let result = (|| {
        if let Some(params) = &params {
            stmt.bind_all(params)?;
        }
        if let Some(binder) = binder {
            binder(&mut *stmt)?;
        }
        body(&mut *stmt)
    })();

    if finalize {
        trace_exec!(debug, "finalizing statement", log_config.truncate_sql(stmt.sql()));
    }
    result
}

/// Run a statement once (a single `step`).
pub fn exec<C>(conn: &C, opts: ExecOptions<'_, C::Statement>) -> WeaveResult<()>
where
    C: Connection + ?Sized,
{
    run(conn, opts, |stmt| stmt.step().map(|_| ()))
}

/// Step through every row, calling `each` with the statement and, unless
/// `mode` is [`RowMode::Statement`], the row in the requested shape.
pub fn exec_each<C, F>(
    conn: &C,
    opts: ExecOptions<'_, C::Statement>,
    mode: RowMode,
    mut each: F,
) -> WeaveResult<()>
where
    C: Connection + ?Sized,
    F: FnMut(&C::Statement, Option<Row>) -> WeaveResult<()>,
{
    run(conn, opts, |stmt| {
        loop {
            let row = match mode {
                RowMode::Array => match stmt.step_array()? {
                    Some(values) => Some(Row::Array(values)),
                    None => break,
                },
                RowMode::Object => match stmt.step_object()? {
                    Some(pairs) => Some(Row::Object(pairs)),
                    None => break,
                },
                RowMode::Statement => {
                    if !stmt.step()? {
                        break;
                    }
                    None
                }
            };
            each(&*stmt, row)?;
        }
        Ok(())
    })
}

/// Fetch every row together with the column names.
pub fn fetch_all<C>(conn: &C, opts: FetchOptions<'_, C::Statement>) -> WeaveResult<Rows>
where
    C: Connection + ?Sized,
{
    let mut rows = Rows::default();
    exec_each(conn, opts.exec, opts.mode.into(), |stmt, row| {
        if rows.columns.is_empty() {
            rows.columns = stmt.column_names();
        }
        rows.rows.extend(row);
        Ok(())
    })?;
    Ok(rows)
}
