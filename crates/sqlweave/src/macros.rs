//! Logging macros that compile to nothing without the `tracing` feature.

/// Emit the SQL handed to a database collaborator.
macro_rules! trace_sql {
    ($sql:expr, $kind:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "sqlweave.sql", kind = ?$kind, sql = %$sql, "execute");
    };
}

/// Warn about a join that renders without an ON clause.
macro_rules! warn_unjoined {
    ($table:expr, $alias:expr) => {
        #[cfg(feature = "tracing")]
        tracing::warn!(
            target: "sqlweave.join",
            table = %$table,
            alias = %$alias,
            "no relation found; join renders without ON clause"
        );
    };
}

/// Statement lifecycle events, gated on a runtime debug flag.
macro_rules! trace_exec {
    ($enabled:expr, $event:literal, $sql:expr) => {
        if $enabled {
            #[cfg(feature = "tracing")]
            tracing::debug!(target: "sqlweave.exec", sql = %$sql, $event);
        }
    };
}

pub(crate) use {trace_exec, trace_sql, warn_unjoined};
