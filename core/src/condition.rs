//! The WHERE condition tree and its accumulation state machine.
//!
//! Conditions are collected by [`ConditionSet`], which implements the
//! pending-connector rules of the chaining API: `where_`-style pushes attach
//! under the connector armed by the previous `or()`/`and()` call (one-shot,
//! resetting to AND afterwards), while `or_where` forces OR without touching
//! the armed state. Groups are built in an isolated child set and copied
//! into the parent at attach time, so the sub-builder can be discarded.
//!
//! Rendering lives in the backend crate; this module only owns structure.

use crate::{Comparison, Connector, Value};

/// Payload of one condition leaf.
///
/// Each variant corresponds to a distinct rendered form; the valueless
/// NULL checks and the multi-value forms are separate variants rather than
/// an operator string with an optional payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionKind {
    /// `col <op> value`
    Compare { op: Comparison, value: Value },
    /// `col BETWEEN low AND high`
    Between { low: Value, high: Value },
    /// `col IN (v1, v2, …)`
    In { values: Vec<Value> },
    /// `col IS NULL`
    IsNull,
    /// `col IS NOT NULL`
    IsNotNull,
}

/// One leaf of the WHERE tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Column the condition applies to.
    pub column: String,
    /// The comparison payload.
    pub kind: ConditionKind,
    /// Connector to the previous sibling; ignored for the first entry.
    pub connector: Connector,
}

/// A node of the condition tree: a leaf or a parenthesized group.
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionNode {
    /// A single condition.
    Leaf(Condition),
    /// A parenthesized sequence of child nodes under one connector.
    Group {
        /// Connector to the previous sibling; ignored for the first entry.
        connector: Connector,
        /// Ordered children, rendered inside the parentheses.
        children: Vec<ConditionNode>,
    },
}

impl ConditionNode {
    /// The connector linking this node to its previous sibling.
    pub fn connector(&self) -> Connector {
        match self {
            ConditionNode::Leaf(c) => c.connector,
            ConditionNode::Group { connector, .. } => *connector,
        }
    }
}

/// Ordered condition list plus the pending-connector state machine.
///
/// # Examples
///
/// ```
/// use fluentlite_core::{Comparison, ConditionSet, Connector};
///
/// let mut set = ConditionSet::new();
/// set.push_compare("age", Comparison::Gt, 18);
/// set.or();
/// set.push_compare("vip", Comparison::Eq, true);
/// set.push_compare("active", Comparison::Eq, true);
///
/// let nodes = set.nodes();
/// assert_eq!(nodes[1].connector(), Connector::Or);
/// // The one-shot OR was consumed; the third condition is back to AND.
/// assert_eq!(nodes[2].connector(), Connector::And);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConditionSet {
    nodes: Vec<ConditionNode>,
    pending: Connector,
}

impl ConditionSet {
    /// Creates an empty set with AND pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when no condition has been collected.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The collected nodes in insertion order.
    pub fn nodes(&self) -> &[ConditionNode] {
        &self.nodes
    }

    /// Consumes the set, returning its nodes.
    pub fn into_nodes(self) -> Vec<ConditionNode> {
        self.nodes
    }

    /// Arms OR for the next push only.
    pub fn or(&mut self) {
        self.pending = Connector::Or;
    }

    /// Arms AND for the next push (the default).
    pub fn and(&mut self) {
        self.pending = Connector::And;
    }

    /// Consumes the pending connector, resetting it to AND.
    fn take_pending(&mut self) -> Connector {
        std::mem::take(&mut self.pending)
    }

    /// Appends `col <op> value` under the pending connector.
    pub fn push_compare(&mut self, column: impl Into<String>, op: Comparison, value: impl Into<Value>) {
        let connector = self.take_pending();
        self.nodes.push(ConditionNode::Leaf(Condition {
            column: column.into(),
            kind: ConditionKind::Compare {
                op,
                value: value.into(),
            },
            connector,
        }));
    }

    /// Appends `col <op> value` with the connector forced to OR.
    ///
    /// Does not consume or reset the pending connector.
    pub fn push_or_compare(&mut self, column: impl Into<String>, op: Comparison, value: impl Into<Value>) {
        self.nodes.push(ConditionNode::Leaf(Condition {
            column: column.into(),
            kind: ConditionKind::Compare {
                op,
                value: value.into(),
            },
            connector: Connector::Or,
        }));
    }

    /// Appends `col BETWEEN low AND high`.
    ///
    /// A no-op unless both bounds are present; a no-op leaves the pending
    /// connector armed.
    pub fn push_between(&mut self, column: impl Into<String>, low: Option<Value>, high: Option<Value>) {
        let (Some(low), Some(high)) = (low, high) else {
            return;
        };
        let connector = self.take_pending();
        self.nodes.push(ConditionNode::Leaf(Condition {
            column: column.into(),
            kind: ConditionKind::Between { low, high },
            connector,
        }));
    }

    /// Appends `col IN (…)`.
    ///
    /// A no-op on an empty value list; a no-op leaves the pending connector
    /// armed.
    pub fn push_in(&mut self, column: impl Into<String>, values: Vec<Value>) {
        if values.is_empty() {
            return;
        }
        let connector = self.take_pending();
        self.nodes.push(ConditionNode::Leaf(Condition {
            column: column.into(),
            kind: ConditionKind::In { values },
            connector,
        }));
    }

    /// Appends `col IS NULL` under the pending connector.
    pub fn push_null(&mut self, column: impl Into<String>) {
        let connector = self.take_pending();
        self.nodes.push(ConditionNode::Leaf(Condition {
            column: column.into(),
            kind: ConditionKind::IsNull,
            connector,
        }));
    }

    /// Appends `col IS NOT NULL` under the pending connector.
    pub fn push_not_null(&mut self, column: impl Into<String>) {
        let connector = self.take_pending();
        self.nodes.push(ConditionNode::Leaf(Condition {
            column: column.into(),
            kind: ConditionKind::IsNotNull,
            connector,
        }));
    }

    /// Builds a parenthesized group via an isolated child set.
    ///
    /// The closure populates a fresh set; its nodes are copied into this
    /// set as one group under the pending connector. An empty group is
    /// dropped entirely and leaves the pending connector armed.
    pub fn push_group(&mut self, build: impl FnOnce(&mut ConditionSet)) {
        let mut child = ConditionSet::new();
        build(&mut child);
        if child.is_empty() {
            return;
        }
        let connector = self.take_pending();
        self.nodes.push(ConditionNode::Group {
            connector,
            children: child.into_nodes(),
        });
    }
}
