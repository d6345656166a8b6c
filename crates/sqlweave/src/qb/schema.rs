//! The injection point tying a dialect, a relation registry and configuration
//! together.

use crate::config::QbConfig;
use crate::dialect::{AnsiDialect, Dialect};
use crate::qb::query::{Query, StatementKind};
use crate::qb::relations::RelationRegistry;
use crate::qb::table::Table;
use std::fmt;
use std::sync::Arc;

/// Everything a [`Query`] consults while it is built and rendered.
///
/// Cloning is cheap: the dialect and the registry are shared.
#[derive(Clone)]
pub struct Schema {
    dialect: Arc<dyn Dialect>,
    relations: Arc<RelationRegistry>,
    config: QbConfig,
}

impl Schema {
    /// Create a schema with its own, empty relation registry.
    pub fn new(dialect: impl Dialect + 'static) -> Self {
        Self {
            dialect: Arc::new(dialect),
            relations: Arc::new(RelationRegistry::new()),
            config: QbConfig::default(),
        }
    }

    /// Create a schema backed by the process-wide relation registry.
    pub fn shared(dialect: impl Dialect + 'static) -> Self {
        Self::new(dialect).with_relations(RelationRegistry::global())
    }

    /// Use `relations` instead of the current registry.
    pub fn with_relations(mut self, relations: Arc<RelationRegistry>) -> Self {
        self.relations = relations;
        self
    }

    pub fn with_config(mut self, config: QbConfig) -> Self {
        self.config = config;
        self
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn relations(&self) -> &Arc<RelationRegistry> {
        &self.relations
    }

    pub fn config(&self) -> &QbConfig {
        &self.config
    }

    /// Declare that `table1.field1` joins `table2.field2`.
    pub fn relate(
        &self,
        table1: impl Into<String>,
        field1: impl Into<String>,
        table2: impl Into<String>,
        field2: impl Into<String>,
    ) -> &Self {
        self.relations.add(table1, field1, table2, field2);
        self
    }

    /// A table handle bound to this schema.
    pub fn table(&self, name: impl Into<String>) -> Table {
        Table::new(name, self.clone())
    }

    /// An empty query of `kind`; add tables with [`Query::table`].
    pub fn query(&self, kind: StatementKind) -> Query {
        Query::new(kind, self.clone())
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new(AnsiDialect)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("relations", &self.relations.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
