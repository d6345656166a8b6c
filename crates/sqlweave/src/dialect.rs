//! Identifier qualification and value escaping hooks.
//!
//! A [`Dialect`] decides how a bare identifier is made safe for the target SQL
//! flavour and how a [`Value`] becomes a literal. [`Database`] adds the one
//! execution entry point the query builder needs.
//!
//! Bundled dialects leave plain identifiers (`[A-Za-z_][A-Za-z0-9_$]*`) bare and
//! quote everything else:
//!
//! ```ignore
//! use sqlweave::{AnsiDialect, Dialect};
//!
//! assert_eq!(AnsiDialect.qualify("users"), "users");
//! assert_eq!(AnsiDialect.qualify("users#2"), r#""users#2""#);
//! assert_eq!(AnsiDialect.qualify_path("u.*"), "u.*");
//! ```

use crate::error::WeaveResult;
use crate::value::{Value, format_number};

/// The outcome of escaping a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Escaped {
    /// Escaped text that is safe to wrap in single quotes.
    Quoted(String),
    /// Render the SQL `NULL` keyword.
    Null,
    /// Emit verbatim (numbers, booleans).
    Bare(String),
}

/// Dialect-specific identifier and literal rendering.
pub trait Dialect: Send + Sync {
    /// Make a single identifier segment safe for this dialect.
    fn qualify(&self, ident: &str) -> String;

    /// Escape a value for embedding in a statement.
    fn escape(&self, value: &Value) -> Escaped;

    /// Qualify a dotted identifier segment by segment. A `*` segment passes
    /// through unqualified.
    fn qualify_path(&self, path: &str) -> String {
        path.split('.')
            .map(|part| {
                if part == "*" {
                    part.to_string()
                } else {
                    self.qualify(part)
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Render a value as a complete SQL literal.
    fn quote(&self, value: &Value) -> String {
        match self.escape(value) {
            Escaped::Quoted(s) => format!("'{s}'"),
            Escaped::Null => "NULL".to_string(),
            Escaped::Bare(s) => s,
        }
    }
}

/// A database connection as seen by `Query::execute`.
pub trait Database: Dialect {
    /// Whatever the connection returns for a statement.
    type Output;

    /// Run a complete SQL statement.
    fn query(&self, sql: &str) -> WeaveResult<Self::Output>;
}

impl<D: Dialect + ?Sized> Dialect for &D {
    fn qualify(&self, ident: &str) -> String {
        (**self).qualify(ident)
    }

    fn escape(&self, value: &Value) -> Escaped {
        (**self).escape(value)
    }
}

impl<D: Database + ?Sized> Database for &D {
    type Output = D::Output;

    fn query(&self, sql: &str) -> WeaveResult<Self::Output> {
        (**self).query(sql)
    }
}

/// Whether `s` can be emitted without quoting: `[A-Za-z_][A-Za-z0-9_$]*`.
pub fn is_plain_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c == '$' || c.is_ascii_alphanumeric())
}

fn quote_with(ident: &str, quote: char) -> String {
    let mut out = String::with_capacity(ident.len() + 2);
    out.push(quote);
    for ch in ident.chars() {
        if ch == quote {
            out.push(quote);
        }
        // NUL can't appear inside a quoted identifier
        if ch != '\0' {
            out.push(ch);
        }
    }
    out.push(quote);
    out
}

fn escape_scalar(value: &Value, true_lit: &str, false_lit: &str) -> Option<Escaped> {
    match value {
        Value::Null => Some(Escaped::Null),
        Value::Bool(true) => Some(Escaped::Bare(true_lit.to_string())),
        Value::Bool(false) => Some(Escaped::Bare(false_lit.to_string())),
        Value::Int(i) => Some(Escaped::Bare(i.to_string())),
        Value::Float(f) => Some(Escaped::Bare(format_number(*f))),
        Value::Text(_) => None,
    }
}

/// Standard SQL: `"identifier"` quoting, `''` string escaping.
///
/// Standard string literals cannot carry NUL, so NUL characters are removed
/// from text values (`"a\0b"` renders `'ab'`). Bind such values as statement
/// parameters instead.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiDialect;

impl Dialect for AnsiDialect {
    fn qualify(&self, ident: &str) -> String {
        if is_plain_ident(ident) {
            ident.to_string()
        } else {
            quote_with(ident, '"')
        }
    }

    fn escape(&self, value: &Value) -> Escaped {
        match value {
            Value::Text(s) => Escaped::Quoted(s.replace('\0', "").replace('\'', "''")),
            other => escape_scalar(other, "TRUE", "FALSE").unwrap_or(Escaped::Null),
        }
    }
}

/// MySQL: `` `identifier` `` quoting, backslash-aware string escaping.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn qualify(&self, ident: &str) -> String {
        if is_plain_ident(ident) {
            ident.to_string()
        } else {
            quote_with(ident, '`')
        }
    }

    fn escape(&self, value: &Value) -> Escaped {
        match value {
            Value::Text(s) => {
                let mut out = String::with_capacity(s.len());
                for ch in s.chars() {
                    match ch {
                        '\\' => out.push_str("\\\\"),
                        '\'' => out.push_str("\\'"),
                        '\0' => out.push_str("\\0"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\u{1a}' => out.push_str("\\Z"),
                        c => out.push(c),
                    }
                }
                Escaped::Quoted(out)
            }
            other => escape_scalar(other, "1", "0").unwrap_or(Escaped::Null),
        }
    }
}
