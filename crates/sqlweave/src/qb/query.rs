//! The statement accumulator.

use crate::dialect::{Database, Dialect};
use crate::error::{WeaveError, WeaveResult};
use crate::macros::{trace_sql, warn_unjoined};
use crate::qb::expand::{TemplateError, expand_lossy};
use crate::qb::schema::Schema;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;

/// The four statement kinds a [`Query`] renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

/// The keyword placed in front of `JOIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

impl JoinType {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
            JoinType::Full => "FULL",
            JoinType::Cross => "CROSS",
        }
    }
}

/// A table reference in a query's table list.
///
/// The first reference is the anchor table; every later one becomes a JOIN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: String,
    pub join_type: Option<JoinType>,
    /// Restrict relation lookup to relations using this field.
    pub join_field: Option<String>,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            join_type: None,
            join_field: None,
        }
    }

    /// Set the join keyword.
    pub fn join_type(mut self, join_type: JoinType) -> Self {
        self.join_type = Some(join_type);
        self
    }

    /// Only join through relations that use `field`.
    pub fn via(mut self, field: impl Into<String>) -> Self {
        self.join_field = Some(field.into());
        self
    }
}

impl From<&str> for TableRef {
    fn from(name: &str) -> Self {
        TableRef::new(name)
    }
}

impl From<String> for TableRef {
    fn from(name: String) -> Self {
        TableRef::new(name)
    }
}

/// A join that found no relation to any earlier table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Unjoined {
    pub table: String,
    pub alias: String,
}

/// Builder for a single SELECT / INSERT / UPDATE / DELETE statement.
///
/// Identifiers and values are qualified/escaped as they are added; tables,
/// aliases and join conditions are resolved when the query is rendered.
///
/// # Example
/// ```ignore
/// use sqlweave::{JoinType, Schema, TableRef};
///
/// let schema = Schema::default();
/// schema.relate("orders", "user_id", "users", "id");
///
/// let sql = schema
///     .table("users")
///     .select(["users.name", "orders.total"])
///     .join(TableRef::new("orders").join_type(JoinType::Left))
///     .where_fmt("%f > %n", ["orders.total", "100"])
///     .limit(10)
///     .to_sql();
/// assert_eq!(
///     sql,
///     "SELECT users.name, orders.total FROM users AS users \
///      LEFT JOIN orders AS orders ON orders.user_id = users.id \
///      WHERE orders.total > 100 LIMIT 10"
/// );
/// ```
#[derive(Clone, Debug)]
#[must_use]
pub struct Query {
    kind: StatementKind,
    tables: Vec<TableRef>,
    fields: Vec<String>,
    values: Vec<String>,
    where_clauses: Vec<String>,
    order_clauses: Vec<String>,
    group_clauses: Vec<String>,
    having_clauses: Vec<String>,
    limit: Option<u64>,
    offset: u64,
    build_error: Option<TemplateError>,
    schema: Schema,
}

impl Query {
    /// Create an empty query of `kind` bound to `schema`.
    pub fn new(kind: StatementKind, schema: Schema) -> Self {
        Self {
            kind,
            tables: Vec::new(),
            fields: Vec::new(),
            values: Vec::new(),
            where_clauses: Vec::new(),
            order_clauses: Vec::new(),
            group_clauses: Vec::new(),
            having_clauses: Vec::new(),
            limit: None,
            offset: 0,
            build_error: None,
            schema,
        }
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn tables(&self) -> &[TableRef] {
        &self.tables
    }

    fn dialect(&self) -> &dyn Dialect {
        self.schema.dialect()
    }

    fn expand<I, V>(&mut self, template: &str, args: I) -> String
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let args: Vec<Value> = args.into_iter().map(Into::into).collect();
        let (sql, err) = expand_lossy(self.dialect(), template, &args);
        if self.build_error.is_none() {
            self.build_error = err;
        }
        sql
    }

    // ==================== Tables ====================

    /// Append a table. The first one is the anchor; later ones are joined.
    pub fn table(mut self, table: impl Into<TableRef>) -> Self {
        self.tables.push(table.into());
        self
    }

    /// Alias for [`Query::table`].
    pub fn join(self, table: impl Into<TableRef>) -> Self {
        self.table(table)
    }

    /// Append a `LEFT JOIN`.
    pub fn left_join(self, name: &str) -> Self {
        self.table(TableRef::new(name).join_type(JoinType::Left))
    }

    /// Append an `INNER JOIN`.
    pub fn inner_join(self, name: &str) -> Self {
        self.table(TableRef::new(name).join_type(JoinType::Inner))
    }

    // ==================== Fields & values ====================

    /// Add a (dotted) column identifier; `*` segments stay unqualified.
    pub fn field(mut self, ident: &str) -> Self {
        let field = self.dialect().qualify_path(ident);
        self.fields.push(field);
        self
    }

    /// Add a field expression built from a `%f`/`%s`/`%n` template.
    pub fn field_fmt<I, V>(mut self, template: &str, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let field = self.expand(template, args);
        self.fields.push(field);
        self
    }

    /// Add an escaped value (INSERT/UPDATE, paired with the field at the same index).
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        let literal = self.dialect().quote(&value.into());
        self.values.push(literal);
        self
    }

    /// Add a raw SQL expression as a value, e.g. `NOW()`.
    pub fn value_raw(mut self, expr: &str) -> Self {
        self.values.push(expr.to_string());
        self
    }

    /// Add a field and its value in one call.
    pub fn set(self, ident: &str, value: impl Into<Value>) -> Self {
        self.field(ident).value(value)
    }

    // ==================== Conditions ====================

    /// Add a WHERE fragment verbatim.
    ///
    /// Fragments are space-joined; include `AND`/`OR` yourself.
    pub fn where_raw(mut self, condition: &str) -> Self {
        self.where_clauses.push(condition.to_string());
        self
    }

    /// Add a WHERE fragment built from a template.
    pub fn where_fmt<I, V>(mut self, template: &str, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let condition = self.expand(template, args);
        self.where_clauses.push(condition);
        self
    }

    /// Add a HAVING fragment verbatim.
    pub fn having_raw(mut self, condition: &str) -> Self {
        self.having_clauses.push(condition.to_string());
        self
    }

    /// Add a HAVING fragment built from a template.
    pub fn having_fmt<I, V>(mut self, template: &str, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let condition = self.expand(template, args);
        self.having_clauses.push(condition);
        self
    }

    // ==================== Ordering, grouping, paging ====================

    /// Add an ORDER BY clause verbatim, e.g. `"created_at DESC"`.
    pub fn order(mut self, clause: &str) -> Self {
        self.order_clauses.push(clause.to_string());
        self
    }

    /// Add an ORDER BY clause built from a template.
    pub fn order_fmt<I, V>(mut self, template: &str, args: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let clause = self.expand(template, args);
        self.order_clauses.push(clause);
        self
    }

    /// Add a GROUP BY column.
    pub fn group(mut self, ident: &str) -> Self {
        let group = self.dialect().qualify_path(ident);
        self.group_clauses.push(group);
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    /// Set OFFSET. `0` renders nothing.
    pub fn offset(mut self, n: u64) -> Self {
        self.offset = n;
        self
    }

    // ==================== Rendering ====================

    /// Render the statement.
    ///
    /// Rendering never fails and does not modify the query: rendering twice
    /// yields the same string.
    pub fn to_sql(&self) -> String {
        self.render().0
    }

    fn render(&self) -> (String, Vec<Unjoined>) {
        let mut unjoined = Vec::new();
        let mut parts: Vec<String> = Vec::with_capacity(9);

        match self.kind {
            StatementKind::Select => {
                parts.push("SELECT".to_string());
                if self.fields.is_empty() {
                    parts.push("*".to_string());
                } else {
                    parts.push(self.fields.join(", "));
                }
                parts.push(self.render_tables(&mut unjoined));
                parts.push(self.render_where());
                parts.push(self.render_group());
                parts.push(self.render_having());
                parts.push(self.render_order());
                parts.push(self.render_limit());
                parts.push(self.render_offset());
            }
            StatementKind::Insert => {
                parts.push("INSERT".to_string());
                parts.push(self.render_tables(&mut unjoined));
                parts.push(format!(
                    "({}) VALUES ({})",
                    self.fields.join(", "),
                    self.values.join(", ")
                ));
            }
            StatementKind::Update => {
                parts.push("UPDATE".to_string());
                parts.push(self.render_tables(&mut unjoined));
                let assignments: Vec<String> = self
                    .fields
                    .iter()
                    .zip(&self.values)
                    .map(|(field, value)| format!("{field}={value}"))
                    .collect();
                parts.push(format!("SET {}", assignments.join(", ")));
                parts.push(self.render_where());
                parts.push(self.render_order());
                parts.push(self.render_limit());
                parts.push(self.render_offset());
            }
            StatementKind::Delete => {
                parts.push("DELETE".to_string());
                parts.push(self.render_tables(&mut unjoined));
                parts.push(self.render_where());
                parts.push(self.render_order());
                parts.push(self.render_limit());
                parts.push(self.render_offset());
            }
        }

        parts.retain(|p| !p.is_empty());
        (parts.join(" "), unjoined)
    }

    fn render_tables(&self, unjoined: &mut Vec<Unjoined>) -> String {
        let dialect = self.dialect();
        let Some(anchor) = self.tables.first() else {
            return String::new();
        };

        match self.kind {
            StatementKind::Insert => return format!("INTO {}", dialect.qualify_path(&anchor.name)),
            StatementKind::Update => return dialect.qualify_path(&anchor.name),
            StatementKind::Delete => return format!("FROM {}", dialect.qualify_path(&anchor.name)),
            StatementKind::Select => {}
        }

        // Per-render occurrence counter: the k-th use of a name is aliased `name#k`.
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut aliases: Vec<String> = Vec::with_capacity(self.tables.len());
        let mut out = String::from("FROM ");

        for (i, table) in self.tables.iter().enumerate() {
            let count = counts.entry(table.name.as_str()).or_insert(0);
            *count += 1;
            let alias = alias_for(&table.name, *count);
            let full = format!(
                "{} AS {}",
                dialect.qualify_path(&table.name),
                dialect.qualify(&alias)
            );

            if i == 0 {
                out.push_str(&full);
                aliases.push(alias);
                continue;
            }

            out.push(' ');
            if let Some(join_type) = table.join_type {
                out.push_str(join_type.as_sql());
                out.push(' ');
            }
            out.push_str("JOIN ");
            out.push_str(&full);

            let relations = self.schema.relations();
            let hit = self.tables[..i].iter().enumerate().find_map(|(j, earlier)| {
                relations
                    .find(&table.name, &earlier.name, table.join_field.as_deref())
                    .map(|rel| (rel, j))
            });

            match hit {
                Some((rel, j)) => {
                    let current_alias = |name: &str| -> String {
                        alias_for(name, counts.get(name).copied().unwrap_or(0))
                    };
                    let (left, right) = if rel.table1 == rel.table2 {
                        // Self-relation: current occurrence on the first endpoint.
                        (alias.clone(), aliases[j].clone())
                    } else {
                        (current_alias(&rel.table1), current_alias(&rel.table2))
                    };
                    out.push_str(&format!(
                        " ON {}.{} = {}.{}",
                        dialect.qualify(&left),
                        dialect.qualify_path(&rel.field1),
                        dialect.qualify(&right),
                        dialect.qualify_path(&rel.field2),
                    ));
                }
                None => unjoined.push(Unjoined {
                    table: table.name.clone(),
                    alias: alias.clone(),
                }),
            }

            aliases.push(alias);
        }

        out
    }

    fn render_where(&self) -> String {
        if self.where_clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.where_clauses.join(" "))
        }
    }

    fn render_group(&self) -> String {
        if self.group_clauses.is_empty() {
            String::new()
        } else {
            format!("GROUP BY {}", self.group_clauses.join(", "))
        }
    }

    fn render_having(&self) -> String {
        if self.having_clauses.is_empty() {
            String::new()
        } else {
            format!("HAVING {}", self.having_clauses.join(" "))
        }
    }

    fn render_order(&self) -> String {
        if self.order_clauses.is_empty() {
            String::new()
        } else {
            format!("ORDER BY {}", self.order_clauses.join(", "))
        }
    }

    fn render_limit(&self) -> String {
        self.limit.map(|n| format!("LIMIT {n}")).unwrap_or_default()
    }

    fn render_offset(&self) -> String {
        if self.offset > 0 {
            format!("OFFSET {}", self.offset)
        } else {
            String::new()
        }
    }

    // ==================== Validation & execution ====================

    fn check_build(&self) -> WeaveResult<()> {
        if let Some(err) = &self.build_error {
            return Err(err.clone().into());
        }
        if self.tables.is_empty() {
            return Err(WeaveError::validation("query has no table"));
        }
        if matches!(self.kind, StatementKind::Insert | StatementKind::Update)
            && self.fields.len() != self.values.len()
        {
            return Err(WeaveError::validation(format!(
                "{} fields but {} values",
                self.fields.len(),
                self.values.len()
            )));
        }
        Ok(())
    }

    fn check_joins(&self, unjoined: &[Unjoined]) -> WeaveResult<()> {
        for miss in unjoined {
            if self.schema.config().strict_joins {
                return Err(WeaveError::MissingRelation {
                    table: miss.table.clone(),
                    alias: miss.alias.clone(),
                });
            }
            warn_unjoined!(miss.table, miss.alias);
        }
        Ok(())
    }

    /// Check that the query is executable.
    ///
    /// Fails on a recorded template error, an empty table list, mismatched
    /// field/value counts for INSERT/UPDATE, and (with `strict_joins`) any join
    /// that renders without an ON clause.
    pub fn validate(&self) -> WeaveResult<()> {
        self.check_build()?;
        if self.schema.config().strict_joins {
            self.check_joins(&self.render().1)?;
        }
        Ok(())
    }

    /// Validate, render and hand the statement to `db`.
    pub fn execute<D: Database + ?Sized>(&self, db: &D) -> WeaveResult<D::Output> {
        self.check_build()?;
        let (sql, unjoined) = self.render();
        self.check_joins(&unjoined)?;
        trace_sql!(self.schema.config().truncate_sql(&sql), self.kind);
        db.query(&sql)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Alias for the `occurrence`-th use of a table. Schema-qualified names are
/// aliased by their last segment (`public.users` -> `users`), so fields can
/// refer to them as `users.id`.
fn alias_for(name: &str, occurrence: usize) -> String {
    let base = name.rsplit('.').next().unwrap_or(name);
    if occurrence > 1 {
        format!("{base}#{occurrence}")
    } else {
        base.to_string()
    }
}
