//! The fluent, table-scoped query builder.
//!
//! [`TableQuery`] accumulates a query shape (plain select or one
//! aggregate), a join list, grouping/ordering/pagination state, and a
//! condition tree, then serializes the whole thing to a single statement
//! at a terminal operation. The builder is one-shot: chaining methods
//! consume and return it, and the accumulated state is discarded with it.
//!
//! # Example
//!
//! ```no_run
//! use fluentlite_sqlite::Database;
//! use fluentlite_core::{Comparison, OrderDirection};
//!
//! let db = Database::open("app.db").unwrap();
//! let rows = db
//!     .table("users")
//!     .where_("age", Comparison::Gt, 18)
//!     .or_where("vip", Comparison::Eq, true)
//!     .order_by("name", OrderDirection::Asc)
//!     .limit(10)
//!     .page(2)
//!     .get()
//!     .unwrap();
//! ```

use fluentlite_core::{
    ColumnSpec, Comparison, Condition, ConditionKind, ConditionNode, ConditionSet, JoinKind,
    OrderDirection, QueryShape, Record, Value, validate_column_specs,
};
use rusqlite::Connection;
use tracing::warn;

use crate::convert::query_records;
use crate::error::{Result, SqliteError};
use crate::migration::TableColumns;
use crate::render::{column_definition, foreign_key_clause, quote_ident, render_value};

/// One join clause, rendered in insertion order.
#[derive(Debug, Clone)]
struct Join {
    kind: JoinKind,
    table: String,
    left: String,
    op: Comparison,
    right: String,
}

/// Fluent query builder scoped to one table.
///
/// Obtained from [`Database::table`](crate::Database::table). Chaining
/// methods consume the builder; terminal operations (`get`, `first`,
/// `insert`, `update`, `delete`, …) serialize the accumulated state and
/// perform a single round-trip on the shared connection.
pub struct TableQuery<'conn> {
    conn: &'conn Connection,
    table: String,
    shape: QueryShape,
    distinct: bool,
    joins: Vec<Join>,
    group_by: Vec<String>,
    order_by: Vec<(String, OrderDirection)>,
    conditions: ConditionSet,
    limit: Option<u64>,
    page: Option<u64>,
}

impl<'conn> TableQuery<'conn> {
    pub(crate) fn new(conn: &'conn Connection, table: String) -> Self {
        Self {
            conn,
            table,
            shape: QueryShape::default(),
            distinct: false,
            joins: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            conditions: ConditionSet::new(),
            limit: None,
            page: None,
        }
    }

    /// Returns the migration planner for this builder's table.
    pub fn columns(&self) -> TableColumns<'conn> {
        TableColumns::new(self.conn, self.table.clone())
    }

    // ---- shape selection -------------------------------------------------

    /// Selects specific columns; an empty list means `*`.
    ///
    /// Like every shape method, the last call wins.
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shape = QueryShape::Select(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Adds `DISTINCT` to the plain select shape.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Switches the shape to `COUNT(*)`.
    pub fn count(self) -> Self {
        self.count_column("*")
    }

    /// Switches the shape to `COUNT(column)`.
    pub fn count_column(mut self, column: impl Into<String>) -> Self {
        self.shape = QueryShape::Count(column.into());
        self
    }

    /// Switches the shape to `SUM(column)`.
    pub fn sum(mut self, column: impl Into<String>) -> Self {
        self.shape = QueryShape::Sum(column.into());
        self
    }

    /// Switches the shape to `AVG(column)`.
    pub fn avg(mut self, column: impl Into<String>) -> Self {
        self.shape = QueryShape::Avg(column.into());
        self
    }

    /// Switches the shape to `MAX(column)`.
    pub fn max(mut self, column: impl Into<String>) -> Self {
        self.shape = QueryShape::Max(column.into());
        self
    }

    /// Switches the shape to `MIN(column)`.
    pub fn min(mut self, column: impl Into<String>) -> Self {
        self.shape = QueryShape::Min(column.into());
        self
    }

    // ---- conditions ------------------------------------------------------

    /// Appends `column <op> value` under the pending connector, then
    /// resets the pending connector to AND.
    pub fn where_(mut self, column: impl Into<String>, op: Comparison, value: impl Into<Value>) -> Self {
        self.conditions.push_compare(column, op, value);
        self
    }

    /// Appends `column <op> value` with the connector forced to OR,
    /// leaving the pending connector untouched.
    pub fn or_where(mut self, column: impl Into<String>, op: Comparison, value: impl Into<Value>) -> Self {
        self.conditions.push_or_compare(column, op, value);
        self
    }

    /// Arms OR for the next `where_`-style call only.
    pub fn or(mut self) -> Self {
        self.conditions.or();
        self
    }

    /// Arms AND for the next `where_`-style call (the default).
    pub fn and(mut self) -> Self {
        self.conditions.and();
        self
    }

    /// Builds a parenthesized condition group via an isolated sub-builder.
    pub fn where_group(mut self, build: impl FnOnce(&mut ConditionSet)) -> Self {
        self.conditions.push_group(build);
        self
    }

    /// Appends `column BETWEEN low AND high`.
    pub fn where_between(
        mut self,
        column: impl Into<String>,
        bounds: (impl Into<Value>, impl Into<Value>),
    ) -> Self {
        self.conditions
            .push_between(column, Some(bounds.0.into()), Some(bounds.1.into()));
        self
    }

    /// Appends `column IN (…)`; a no-op on an empty value list.
    pub fn where_in<I, V>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.conditions
            .push_in(column, values.into_iter().map(Into::into).collect());
        self
    }

    /// Appends `column IS NULL`.
    pub fn where_null(mut self, column: impl Into<String>) -> Self {
        self.conditions.push_null(column);
        self
    }

    /// Appends `column IS NOT NULL`.
    pub fn where_not_null(mut self, column: impl Into<String>) -> Self {
        self.conditions.push_not_null(column);
        self
    }

    // ---- joins, grouping, ordering, pagination ---------------------------

    /// Appends an inner join clause.
    pub fn join(
        self,
        table: impl Into<String>,
        left: impl Into<String>,
        op: Comparison,
        right: impl Into<String>,
    ) -> Self {
        self.push_join(JoinKind::Inner, table, left, op, right)
    }

    /// Appends a `LEFT JOIN` clause.
    pub fn left_join(
        self,
        table: impl Into<String>,
        left: impl Into<String>,
        op: Comparison,
        right: impl Into<String>,
    ) -> Self {
        self.push_join(JoinKind::Left, table, left, op, right)
    }

    /// Appends a `RIGHT JOIN` clause.
    pub fn right_join(
        self,
        table: impl Into<String>,
        left: impl Into<String>,
        op: Comparison,
        right: impl Into<String>,
    ) -> Self {
        self.push_join(JoinKind::Right, table, left, op, right)
    }

    fn push_join(
        mut self,
        kind: JoinKind,
        table: impl Into<String>,
        left: impl Into<String>,
        op: Comparison,
        right: impl Into<String>,
    ) -> Self {
        self.joins.push(Join {
            kind,
            table: table.into(),
            left: left.into(),
            op,
            right: right.into(),
        });
        self
    }

    /// Appends a `GROUP BY` column.
    pub fn group_by(mut self, column: impl Into<String>) -> Self {
        self.group_by.push(column.into());
        self
    }

    /// Appends an `ORDER BY` pair.
    ///
    /// Ignored at render time when the shape is an aggregate.
    pub fn order_by(mut self, column: impl Into<String>, direction: OrderDirection) -> Self {
        self.order_by.push((column.into(), direction));
        self
    }

    /// Sets the row limit.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the 1-based page. Without a limit, no OFFSET is applied.
    pub fn page(mut self, page: u64) -> Self {
        self.page = Some(page);
        self
    }

    // ---- serialization ---------------------------------------------------

    fn base_clause(&self) -> String {
        let table = quote_ident(&self.table);
        match &self.shape {
            QueryShape::Select(columns) => {
                let distinct = if self.distinct { "DISTINCT " } else { "" };
                if columns.is_empty() {
                    format!("SELECT {distinct}* FROM {table}")
                } else {
                    format!("SELECT {distinct}{} FROM {table}", columns.join(", "))
                }
            }
            QueryShape::Count(col) => format!("SELECT COUNT({col}) AS count FROM {table}"),
            QueryShape::Sum(col) => format!("SELECT SUM({col}) AS sum FROM {table}"),
            QueryShape::Avg(col) => format!("SELECT AVG({col}) AS avg FROM {table}"),
            QueryShape::Max(col) => format!("SELECT MAX({col}) AS max FROM {table}"),
            QueryShape::Min(col) => format!("SELECT MIN({col}) AS min FROM {table}"),
        }
    }

    /// Renders the accumulated state as a single SQL statement.
    pub fn to_sql(&self) -> String {
        let mut sql = self.base_clause();

        for join in &self.joins {
            sql.push_str(&format!(
                " {} {} ON {} {} {}",
                join.kind.as_sql(),
                join.table,
                join.left,
                join.op.as_sql(),
                join.right
            ));
        }

        let conditions = render_nodes(self.conditions.nodes());
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions);
        }

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }

        if !self.order_by.is_empty() && !self.shape.is_aggregate() {
            let pairs = self
                .order_by
                .iter()
                .map(|(col, dir)| format!("{col} {}", dir.as_sql()))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(" ORDER BY ");
            sql.push_str(&pairs);
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
            if let Some(page) = self.page {
                sql.push_str(&format!(" OFFSET {}", page.saturating_sub(1) * limit));
            }
        }

        sql
    }

    // ---- terminal operations ---------------------------------------------

    /// Executes the query and returns all matching rows.
    pub fn get(&self) -> Result<Vec<Record>> {
        query_records(self.conn, &self.to_sql())
    }

    /// Executes the query and returns the first row, if any.
    ///
    /// An empty result is `Ok(None)`, not an error.
    pub fn first(&self) -> Result<Option<Record>> {
        Ok(self.get()?.into_iter().next())
    }

    /// Looks a row up by its `id` column.
    pub fn find(self, value: impl Into<Value>) -> Result<Option<Record>> {
        self.find_by("id", value)
    }

    /// Appends an equality condition on `column`, then behaves like
    /// [`first`](Self::first).
    pub fn find_by(mut self, column: impl Into<String>, value: impl Into<Value>) -> Result<Option<Record>> {
        self.conditions.push_compare(column, Comparison::Eq, value);
        self.first()
    }

    /// Inserts rows one statement at a time, in order, re-fetching each
    /// inserted row by the engine-reported insert id.
    ///
    /// Rows are validated up front: an empty row rejects the whole batch
    /// before any statement is sent. A mid-batch execution failure aborts
    /// the remaining rows; prior inserts remain applied (no wrapping
    /// transaction).
    pub fn insert(&self, rows: &[Record]) -> Result<Vec<Record>> {
        for row in rows {
            if row.is_empty() {
                return Err(SqliteError::InvalidInput(
                    "insert rows must contain at least one column".to_string(),
                ));
            }
        }

        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            let columns = row
                .keys()
                .map(|k| quote_ident(k))
                .collect::<Vec<_>>()
                .join(", ");
            let values = row
                .values()
                .map(render_value)
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "INSERT INTO {} ({columns}) VALUES ({values})",
                quote_ident(&self.table)
            );
            query_records(self.conn, &sql)?;

            let id = self.conn.last_insert_rowid();
            let fetched = TableQuery::new(self.conn, self.table.clone())
                .where_("id", Comparison::Eq, id)
                .first()?;
            match fetched {
                Some(record) => inserted.push(record),
                None => warn!(id, table = %self.table, "inserted row could not be re-fetched by id"),
            }
        }
        Ok(inserted)
    }

    /// Updates all rows matching the accumulated conditions.
    ///
    /// Returns the affected-row count.
    ///
    /// # Errors
    ///
    /// Rejects an empty payload, and rejects the call outright when no
    /// WHERE condition has been accumulated — a guard against accidental
    /// full-table mutation. Both checks run before any statement is sent.
    pub fn update(&self, data: &Record) -> Result<usize> {
        if data.is_empty() {
            return Err(SqliteError::InvalidInput(
                "update requires at least one column".to_string(),
            ));
        }
        if self.conditions.is_empty() {
            return Err(SqliteError::MissingWhereClause { operation: "update" });
        }

        let assignments = data
            .iter()
            .map(|(key, value)| format!("{key} = {}", render_value(value)))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE {}",
            quote_ident(&self.table),
            render_nodes(self.conditions.nodes())
        );
        query_records(self.conn, &sql)?;
        Ok(self.conn.changes() as usize)
    }

    /// Deletes all rows matching the accumulated conditions.
    ///
    /// Returns the affected-row count. Like [`update`](Self::update), the
    /// call is rejected before any statement is sent when no WHERE
    /// condition is present.
    pub fn delete(&self) -> Result<usize> {
        if self.conditions.is_empty() {
            return Err(SqliteError::MissingWhereClause { operation: "delete" });
        }

        let sql = format!(
            "DELETE FROM {} WHERE {}",
            quote_ident(&self.table),
            render_nodes(self.conditions.nodes())
        );
        query_records(self.conn, &sql)?;
        Ok(self.conn.changes() as usize)
    }

    /// Creates the table from the given column specs, if it does not exist.
    ///
    /// Specs are validated structurally before any SQL is rendered.
    /// Foreign-key references render as table-level clauses after the
    /// column definitions.
    pub fn create(&self, specs: &[ColumnSpec]) -> Result<()> {
        if specs.is_empty() {
            return Err(SqliteError::InvalidInput(
                "create requires at least one column spec".to_string(),
            ));
        }
        let errors = validate_column_specs(specs);
        if !errors.is_empty() {
            return Err(SqliteError::from_validation(errors));
        }

        let mut items: Vec<String> = specs.iter().map(column_definition).collect();
        items.extend(specs.iter().filter_map(foreign_key_clause));
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(&self.table),
            items.join(", ")
        );
        query_records(self.conn, &sql)?;
        Ok(())
    }

    /// Drops the table, if it exists.
    pub fn drop_table(&self) -> Result<()> {
        let sql = format!("DROP TABLE IF EXISTS {}", quote_ident(&self.table));
        query_records(self.conn, &sql)?;
        Ok(())
    }
}

/// Renders a condition node list in insertion order.
///
/// The first node never emits its connector; every later node emits
/// exactly one `AND`/`OR` with single surrounding spaces. Groups recurse,
/// parenthesized.
fn render_nodes(nodes: &[ConditionNode]) -> String {
    let mut out = String::new();
    for (index, node) in nodes.iter().enumerate() {
        if index > 0 {
            out.push_str(&format!(" {} ", node.connector().as_sql()));
        }
        match node {
            ConditionNode::Leaf(condition) => out.push_str(&render_condition(condition)),
            ConditionNode::Group { children, .. } => {
                out.push('(');
                out.push_str(&render_nodes(children));
                out.push(')');
            }
        }
    }
    out
}

fn render_condition(condition: &Condition) -> String {
    let column = &condition.column;
    match &condition.kind {
        ConditionKind::Compare { op, value } => {
            format!("{column} {} {}", op.as_sql(), render_value(value))
        }
        ConditionKind::Between { low, high } => {
            format!(
                "{column} BETWEEN {} AND {}",
                render_value(low),
                render_value(high)
            )
        }
        ConditionKind::In { values } => {
            let rendered = values
                .iter()
                .map(render_value)
                .collect::<Vec<_>>()
                .join(", ");
            format!("{column} IN ({rendered})")
        }
        ConditionKind::IsNull => format!("{column} IS NULL"),
        ConditionKind::IsNotNull => format!("{column} IS NOT NULL"),
    }
}
