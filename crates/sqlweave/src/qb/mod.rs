//! Query builder.
//!
//! A [`Schema`] bundles the dialect, the relation registry and configuration.
//! [`Table`]s hand out [`Query`]s, which accumulate clause fragments and render
//! them on demand.
//!
//! # Usage
//!
//! ```ignore
//! use sqlweave::{Schema, Value};
//!
//! let schema = Schema::default();
//! schema.relate("posts", "author_id", "authors", "id");
//!
//! // SELECT with an inferred join
//! let sql = schema
//!     .table("authors")
//!     .select(["authors.name", "posts.title"])
//!     .join("posts")
//!     .order("posts.id DESC")
//!     .to_sql();
//!
//! // INSERT
//! let sql = schema
//!     .table("authors")
//!     .insert([("name", Value::from("Ann")), ("age", Value::from(41))])
//!     .to_sql();
//!
//! // UPDATE
//! let sql = schema
//!     .table("authors")
//!     .update([("name", "Anne")])
//!     .where_fmt("%f = %n", [Value::from("id"), Value::from(7)])
//!     .to_sql();
//!
//! // DELETE
//! let sql = schema.table("authors").delete().where_raw("id = 7").to_sql();
//! ```

mod expand;
mod query;
mod relations;
mod schema;
mod table;

pub use expand::{TemplateError, expand, try_expand};
pub use query::{JoinType, Query, StatementKind, TableRef};
pub use relations::{Relation, RelationRegistry};
pub use schema::Schema;
pub use table::Table;

#[cfg(test)]
mod tests;
