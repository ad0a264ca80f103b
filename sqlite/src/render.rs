//! SQL fragment rendering for the target dialect.
//!
//! Every literal that reaches a statement goes through [`render_value`]; it
//! is the single place where the dialect's quoting rules live. Text
//! literals are single-quoted with no escaping of embedded quotes — a
//! compatibility contract of the generated SQL surface, not a security
//! model. A parameterized implementation can replace this module without
//! touching the chaining API.

use fluentlite_core::{ColumnSpec, DefaultValue, Value};

/// Renders one literal for inclusion in a statement.
///
/// `NULL` for null, `true`/`false` unquoted, numbers verbatim, text
/// single-quoted without escaping.
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Text(s) => format!("'{s}'"),
    }
}

/// Backtick-quotes an identifier.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("`{name}`")
}

/// The unquoted textual form of a literal, used inside quoted defaults.
fn raw_literal(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        other => render_value(other),
    }
}

/// Renders the `DEFAULT …` clause of a column definition, leading space
/// included, or an empty string when no default applies.
///
/// Text-family columns always quote their default; other columns render
/// the literal directly. An explicit `NULL` default renders `DEFAULT NULL`
/// either way.
pub(crate) fn default_clause(text_type: bool, default: &DefaultValue) -> String {
    match default {
        DefaultValue::Unset | DefaultValue::None => String::new(),
        DefaultValue::Literal(Value::Null) => " DEFAULT NULL".to_string(),
        DefaultValue::Literal(v) if text_type => format!(" DEFAULT '{}'", raw_literal(v)),
        DefaultValue::Literal(v) => format!(" DEFAULT {}", render_value(v)),
    }
}

/// The stored-SQL form of a declared default, for diffing against
/// `PRAGMA table_info`'s `dflt_value` column.
pub(crate) fn default_as_stored(spec: &ColumnSpec) -> Option<String> {
    match &spec.default {
        DefaultValue::Unset | DefaultValue::None => None,
        DefaultValue::Literal(Value::Null) => Some("NULL".to_string()),
        DefaultValue::Literal(v) if spec.is_text_type() => Some(format!("'{}'", raw_literal(v))),
        DefaultValue::Literal(v) => Some(render_value(v)),
    }
}

/// Renders a full column definition from a declared spec.
///
/// `` `key` TYPE[(length)] [DEFAULT …] [PRIMARY KEY] [AUTOINCREMENT]
/// [UNIQUE] `` — modifiers in exactly that relative order. Foreign keys are
/// table-level clauses and are not part of the column definition.
pub(crate) fn column_definition(spec: &ColumnSpec) -> String {
    let mut def = format!("{} {}", quote_ident(&spec.key), spec.full_type());
    def.push_str(&default_clause(spec.is_text_type(), &spec.default));
    if spec.options.primary {
        def.push_str(" PRIMARY KEY");
    }
    if spec.options.autoincrement {
        def.push_str(" AUTOINCREMENT");
    }
    if spec.options.unique {
        def.push_str(" UNIQUE");
    }
    def
}

/// Renders the table-level foreign-key clause for a spec, if it has one.
pub(crate) fn foreign_key_clause(spec: &ColumnSpec) -> Option<String> {
    spec.foreign_key.as_ref().map(|fk| {
        format!(
            "FOREIGN KEY ({}) REFERENCES {}({})",
            quote_ident(&spec.key),
            quote_ident(&fk.table),
            quote_ident(&fk.column)
        )
    })
}
