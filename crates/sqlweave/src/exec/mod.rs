//! Statement execution helpers.
//!
//! The builder renders SQL; this module runs it through any driver that
//! implements [`Connection`] / [`Statement`]:
//!
//! - [`exec`] prepares, binds and steps once
//! - [`exec_each`] steps through every row with a callback
//! - [`fetch_all`] collects column names and rows into [`Rows`]
//! - [`Statement::bind_from`] feeds one statement's current row into another's
//!   parameters
//!
//! # Example
//!
//! ```ignore
//! use sqlweave::{FetchMode, FetchOptions, Value, fetch_all};
//!
//! let rows = fetch_all(
//!     &conn,
//!     FetchOptions::sql("SELECT id, name FROM users WHERE id > ?")
//!         .bind(vec![Value::from(10)])
//!         .mode(FetchMode::Object),
//! )?;
//! println!("{}", rows.to_json()?);
//! ```

mod run;
mod statement;

pub use run::{ExecOptions, FetchMode, FetchOptions, RowMode, Rows, exec, exec_each, fetch_all};
pub use statement::{Connection, Params, Row, Statement};
