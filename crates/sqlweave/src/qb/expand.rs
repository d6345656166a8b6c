//! `%`-directive template expansion.
//!
//! | Directive | Consumes | Renders |
//! |-----------|----------|---------|
//! | `%f` | one argument | the argument qualified as a dotted identifier |
//! | `%s` | one argument | the argument quoted and escaped (`NULL` for null) |
//! | `%n` | one argument | the argument's numeric prefix, `0` if none |
//! | `%%` | nothing | a literal `%` |
//!
//! Any other character after `%` is emitted as-is and consumes nothing; the `%`
//! itself is dropped. Arguments are consumed strictly left to right.

use crate::dialect::Dialect;
use crate::error::WeaveError;
use crate::value::Value;
use thiserror::Error;

/// A template that could not be fully expanded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A directive had no argument left to consume.
    #[error("'%{directive}' at argument {position} has no matching argument")]
    MissingArgument { directive: char, position: usize },

    /// `%f` was given NULL.
    #[error("'%f' at argument {position} is NULL, expected an identifier")]
    NullIdentifier { position: usize },
}

impl From<TemplateError> for WeaveError {
    fn from(err: TemplateError) -> Self {
        WeaveError::Template(err.to_string())
    }
}

/// Expand `template`, returning the output together with the first problem hit.
///
/// Expansion never stops early: a directive without a usable argument renders
/// its empty form (`%f` -> nothing, `%s` -> `NULL`, `%n` -> `0`).
pub(crate) fn expand_lossy(
    dialect: &dyn Dialect,
    template: &str,
    args: &[Value],
) -> (String, Option<TemplateError>) {
    let mut out = String::with_capacity(template.len() + args.len() * 8);
    let mut error = None;
    let mut next_arg = 0;
    let mut armed = false;

    for ch in template.chars() {
        if !armed {
            if ch == '%' {
                armed = true;
            } else {
                out.push(ch);
            }
            continue;
        }
        armed = false;

        if !matches!(ch, 'f' | 's' | 'n') {
            // `%%` -> `%`, `%q` -> `q`
            out.push(ch);
            continue;
        }

        let position = next_arg;
        next_arg += 1;
        let arg = args.get(position);
        if arg.is_none() && error.is_none() {
            error = Some(TemplateError::MissingArgument {
                directive: ch,
                position,
            });
        }

        match (ch, arg) {
            ('f', Some(Value::Null)) => {
                if error.is_none() {
                    error = Some(TemplateError::NullIdentifier { position });
                }
            }
            ('f', Some(Value::Text(ident))) => out.push_str(&dialect.qualify_path(ident)),
            ('f', Some(other)) => out.push_str(&dialect.qualify_path(&other.to_string())),
            ('s', Some(value)) => out.push_str(&dialect.quote(value)),
            ('s', None) => out.push_str("NULL"),
            ('n', value) => {
                let numeral = value.and_then(Value::to_numeral);
                out.push_str(numeral.as_deref().unwrap_or("0"));
            }
            _ => {}
        }
    }

    (out, error)
}

/// Expand a template. Never fails; see [`try_expand`] for a checked variant.
///
/// # Example
/// ```ignore
/// use sqlweave::{AnsiDialect, Value, expand};
///
/// let sql = expand(&AnsiDialect, "%f = %s", &["u.name".into(), "bob".into()]);
/// assert_eq!(sql, "u.name = 'bob'");
/// ```
pub fn expand(dialect: &dyn Dialect, template: &str, args: &[Value]) -> String {
    expand_lossy(dialect, template, args).0
}

/// Expand a template, failing if any directive lacks a usable argument.
pub fn try_expand(
    dialect: &dyn Dialect,
    template: &str,
    args: &[Value],
) -> Result<String, TemplateError> {
    match expand_lossy(dialect, template, args) {
        (sql, None) => Ok(sql),
        (_, Some(err)) => Err(err),
    }
}
