//! Literal values, operators, and column specifications.
//!
//! This module defines the data model shared by the query builder and the
//! migration planner. The types are designed for serialization with [`serde`]
//! so column specs and row data can round-trip through JSON, and every
//! "stringly" concept of the wire dialect (comparison operators, sort
//! directions, join kinds) is a closed enum parsed up front rather than a
//! raw string passed through to the engine.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// A single SQL literal.
///
/// `Value` is the payload type for conditions, insert/update rows, and
/// column defaults. The untagged serde representation maps JSON scalars
/// directly onto variants (`null` → `Null`, `true` → `Bool`, `42` →
/// `Integer`, `4.2` → `Real`, `"x"` → `Text`).
///
/// # Examples
///
/// ```
/// use fluentlite_core::Value;
///
/// let v: Value = serde_json::from_str("42").unwrap();
/// assert_eq!(v, Value::Integer(42));
///
/// let v: Value = serde_json::from_str("null").unwrap();
/// assert!(v.is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean literal, rendered unquoted as `true`/`false`.
    Bool(bool),
    /// Integer literal, rendered verbatim.
    Integer(i64),
    /// Floating-point literal, rendered verbatim.
    Real(f64),
    /// Text literal, rendered single-quoted.
    Text(String),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// One row of data, keyed by column name.
///
/// Used for query results and for `insert`/`update` payloads. The map is
/// ordered so rendered statements are deterministic.
pub type Record = BTreeMap<String, Value>;

/// Binary comparison operator for a WHERE condition.
///
/// `BETWEEN`, `IN`, and the NULL checks are not comparisons; they have
/// their own condition variants and dedicated builder methods.
///
/// # Examples
///
/// ```
/// use fluentlite_core::Comparison;
///
/// assert_eq!(">".parse::<Comparison>().unwrap(), Comparison::Gt);
/// assert_eq!(Comparison::NotEq.as_sql(), "!=");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `LIKE`
    Like,
}

impl Comparison {
    /// Returns the SQL token for this operator.
    pub fn as_sql(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::NotEq => "!=",
            Comparison::Lt => "<",
            Comparison::LtEq => "<=",
            Comparison::Gt => ">",
            Comparison::GtEq => ">=",
            Comparison::Like => "LIKE",
        }
    }
}

impl FromStr for Comparison {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "=" | "==" => Ok(Comparison::Eq),
            "!=" | "<>" => Ok(Comparison::NotEq),
            "<" => Ok(Comparison::Lt),
            "<=" => Ok(Comparison::LtEq),
            ">" => Ok(Comparison::Gt),
            ">=" => Ok(Comparison::GtEq),
            s if s.eq_ignore_ascii_case("LIKE") => Ok(Comparison::Like),
            other => Err(ValidationError::InvalidComparison(other.to_string())),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Logical connector between adjacent WHERE conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Connector {
    /// `AND` (the default).
    #[default]
    And,
    /// `OR`
    Or,
}

impl Connector {
    /// Returns the SQL keyword for this connector.
    pub fn as_sql(self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

/// Join flavor for a join clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinKind {
    /// Inner join, rendered as bare `JOIN`.
    Inner,
    /// `LEFT JOIN`
    Left,
    /// `RIGHT JOIN`
    Right,
}

impl JoinKind {
    /// Returns the SQL keyword for this join kind.
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
        }
    }
}

/// Sort direction for an ORDER BY pair.
///
/// # Examples
///
/// ```
/// use fluentlite_core::OrderDirection;
///
/// assert_eq!("desc".parse::<OrderDirection>().unwrap(), OrderDirection::Desc);
/// assert!("sideways".parse::<OrderDirection>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderDirection {
    /// Ascending (the default).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl OrderDirection {
    /// Returns the SQL keyword for this direction.
    pub fn as_sql(self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

impl FromStr for OrderDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("ASC") {
            Ok(OrderDirection::Asc)
        } else if s.eq_ignore_ascii_case("DESC") {
            Ok(OrderDirection::Desc)
        } else {
            Err(ValidationError::InvalidDirection(s.to_string()))
        }
    }
}

/// Which SQL form a query renders as.
///
/// The aggregate shapes replace the SELECT clause entirely and are mutually
/// exclusive with each other and with plain select; selecting a new shape
/// discards the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryShape {
    /// `SELECT [DISTINCT] cols` — an empty column list means `*`.
    Select(Vec<String>),
    /// `SELECT COUNT(col) AS count`
    Count(String),
    /// `SELECT SUM(col) AS sum`
    Sum(String),
    /// `SELECT AVG(col) AS avg`
    Avg(String),
    /// `SELECT MAX(col) AS max`
    Max(String),
    /// `SELECT MIN(col) AS min`
    Min(String),
}

impl QueryShape {
    /// Returns `true` for the aggregate shapes, which suppress ORDER BY.
    pub fn is_aggregate(&self) -> bool {
        !matches!(self, QueryShape::Select(_))
    }
}

impl Default for QueryShape {
    fn default() -> Self {
        QueryShape::Select(Vec::new())
    }
}

/// Default-value clause of a declared column.
///
/// Distinguishes "no default declared" from the explicit `NONE` sentinel
/// (both render no DEFAULT clause) and from a literal default, which may
/// itself be `NULL`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum DefaultValue {
    /// No default declared.
    #[default]
    Unset,
    /// Explicitly no default (the `NONE` sentinel).
    None,
    /// A literal default; `Value::Null` renders `DEFAULT NULL`.
    Literal(Value),
}

impl DefaultValue {
    /// Returns the literal, if one is declared.
    pub fn literal(&self) -> Option<&Value> {
        match self {
            DefaultValue::Literal(v) => Some(v),
            _ => None,
        }
    }
}

/// Foreign-key reference for a declared column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referenced table.
    pub table: String,
    /// Referenced column.
    pub column: String,
}

/// Key-role modifiers of a declared column.
///
/// When several apply they render in `PRIMARY KEY AUTOINCREMENT UNIQUE`
/// relative order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnOptions {
    /// `PRIMARY KEY`
    pub primary: bool,
    /// `AUTOINCREMENT`
    pub autoincrement: bool,
    /// `UNIQUE`
    pub unique: bool,
}

impl ColumnOptions {
    /// Returns `true` when no modifier is set.
    pub fn is_empty(&self) -> bool {
        !(self.primary || self.autoincrement || self.unique)
    }
}

/// One desired column of a declared table schema.
///
/// Build with [`ColumnSpec::new`] and the chaining methods, then hand a
/// list of specs to `create`, `add`, or `edit`.
///
/// # Examples
///
/// ```
/// use fluentlite_core::ColumnSpec;
///
/// let id = ColumnSpec::new("id", "INTEGER").primary().autoincrement();
/// let name = ColumnSpec::new("name", "VARCHAR")
///     .with_length(120)
///     .with_default("anonymous");
///
/// assert!(id.options.primary);
/// assert_eq!(name.length, Some(120));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name.
    pub key: String,
    /// Declared SQL type (e.g. `INTEGER`, `VARCHAR`, `TEXT`).
    pub column_type: String,
    /// Optional length, rendered as `TYPE(length)` except for `TEXT`.
    #[serde(default)]
    pub length: Option<u32>,
    /// Default-value clause.
    #[serde(default)]
    pub default: DefaultValue,
    /// Key-role modifiers.
    #[serde(default)]
    pub options: ColumnOptions,
    /// Optional foreign-key reference (honored by CREATE TABLE only).
    #[serde(default)]
    pub foreign_key: Option<ForeignKey>,
}

impl ColumnSpec {
    /// Creates a spec with the given name and type and no modifiers.
    pub fn new(key: impl Into<String>, column_type: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            column_type: column_type.into(),
            length: None,
            default: DefaultValue::Unset,
            options: ColumnOptions::default(),
            foreign_key: None,
        }
    }

    /// Sets the type length.
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Sets a literal default value.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = DefaultValue::Literal(value.into());
        self
    }

    /// Declares explicitly that the column has no default.
    pub fn without_default(mut self) -> Self {
        self.default = DefaultValue::None;
        self
    }

    /// Marks the column `PRIMARY KEY`.
    pub fn primary(mut self) -> Self {
        self.options.primary = true;
        self
    }

    /// Marks the column `AUTOINCREMENT`.
    pub fn autoincrement(mut self) -> Self {
        self.options.autoincrement = true;
        self
    }

    /// Marks the column `UNIQUE`.
    pub fn unique(mut self) -> Self {
        self.options.unique = true;
        self
    }

    /// Adds a foreign-key reference.
    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.foreign_key = Some(ForeignKey {
            table: table.into(),
            column: column.into(),
        });
        self
    }

    /// The full rendered type, `TYPE(length)` when a length applies.
    ///
    /// `TEXT` never carries a length in the target dialect.
    pub fn full_type(&self) -> String {
        match self.length {
            Some(len) if !self.column_type.eq_ignore_ascii_case("TEXT") => {
                format!("{}({len})", self.column_type)
            }
            _ => self.column_type.clone(),
        }
    }

    /// Returns `true` when the declared type takes quoted defaults.
    pub fn is_text_type(&self) -> bool {
        is_text_type(&self.column_type)
    }
}

/// Returns `true` for the type names whose defaults are rendered quoted.
pub fn is_text_type(column_type: &str) -> bool {
    ["VARCHAR", "CHAR", "TEXT", "ENUM", "SET"]
        .iter()
        .any(|t| column_type.eq_ignore_ascii_case(t))
}
