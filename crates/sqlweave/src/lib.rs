//! # sqlweave
//!
//! A fluent SQL statement builder.
//!
//! ## Features
//!
//! - **Four statement kinds**: SELECT / INSERT / UPDATE / DELETE rendered from
//!   accumulated clause fragments
//! - **Join inference**: declare relations once, joins find their ON clause
//! - **Self-join aware**: repeated tables get per-render aliases (`users#2`)
//! - **Templates**: `%f` (identifier), `%s` (escaped value), `%n` (number)
//! - **Pluggable dialects**: identifier qualification and value escaping hooks
//! - **Execution helpers**: `exec` / `fetch_all` over a prepared-statement API
//!
//! ## Example
//!
//! ```ignore
//! use sqlweave::Schema;
//!
//! let schema = Schema::default();
//! schema.relate("employees", "manager_id", "employees", "id");
//!
//! let sql = schema
//!     .table("employees")
//!     .select(["employees.name", "employees#2.name"])
//!     .left_join("employees")
//!     .to_sql();
//!
//! assert_eq!(
//!     sql,
//!     r#"SELECT employees.name, "employees#2".name FROM employees AS employees LEFT JOIN employees AS "employees#2" ON "employees#2".manager_id = employees.id"#
//! );
//! ```

mod macros;

pub mod config;
pub mod dialect;
pub mod error;
pub mod exec;
pub mod qb;
pub mod value;

pub use config::QbConfig;
pub use dialect::{AnsiDialect, Database, Dialect, Escaped, MySqlDialect};
pub use error::{WeaveError, WeaveResult};
pub use exec::{
    Connection, ExecOptions, FetchMode, FetchOptions, Params, Row, RowMode, Rows, Statement, exec,
    exec_each, fetch_all,
};
pub use qb::{
    JoinType, Query, Relation, RelationRegistry, Schema, StatementKind, Table, TableRef,
    TemplateError, expand, try_expand,
};
pub use value::Value;
