/// Configuration shared by every query a [`Schema`](crate::Schema) creates.
///
/// By default joins without an inferable ON clause are tolerated (with a
/// warning) and statement lifecycle logging is off.
#[derive(Debug, Clone)]
pub struct QbConfig {
    /// Reject joins that render without an ON clause in `Query::validate`.
    pub strict_joins: bool,
    /// Truncate logged SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Log statement prepare/finalize events.
    pub debug: bool,
}

impl Default for QbConfig {
    fn default() -> Self {
        Self {
            strict_joins: false,
            max_sql_length: Some(200),
            debug: false,
        }
    }
}

impl QbConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat a join without an inferable ON clause as a validation error.
    pub fn strict_joins(mut self, strict: bool) -> Self {
        self.strict_joins = strict;
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation in logs.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    /// Enable statement lifecycle logging.
    pub fn enable_debug(mut self) -> Self {
        self.debug = true;
        self
    }

    pub(crate) fn truncate_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_sql_length {
            Some(max) if sql.len() > max => {
                format!("{}...", truncate_sql_bytes(sql, max)).into()
            }
            _ => sql.into(),
        }
    }
}

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
