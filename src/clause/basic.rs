use slotmap::SlotMap;

use crate::{
    clause::{ClauseNode, Link, NodeKey, WhereClause, iter::ChainIter},
    condition::{Condition, LogicalOp},
};

impl WhereClause {
    /// Creates a chain holding a single condition.
    pub fn new(first: Condition) -> Self {
        let mut nodes = SlotMap::with_key();
        let head = nodes.insert(ClauseNode {
            condition: first,
            link: None,
        });
        Self { nodes, head }
    }

    /// Builds a chain from a first condition and `(join, condition)` pairs.
    ///
    /// # Example
    /// ```rust
    /// use wheremerge::{Condition, Literal, LogicalOp, WhereClause};
    ///
    /// let clause = WhereClause::from_conditions(
    ///     Condition::eq("a", Literal::number(1)),
    ///     [
    ///         (LogicalOp::And, Condition::eq("b", Literal::number(2))),
    ///         (LogicalOp::Or, Condition::eq("c", Literal::number(3))),
    ///     ],
    /// );
    /// assert_eq!(clause.to_string(), "a = 1 AND b = 2 OR c = 3");
    /// ```
    pub fn from_conditions(
        first: Condition,
        rest: impl IntoIterator<Item = (LogicalOp, Condition)>,
    ) -> Self {
        let mut clause = Self::new(first);
        let mut tail = clause.head;
        for (op, condition) in rest {
            tail = clause.append_after(tail, op, condition);
        }
        clause
    }

    /// Appends `condition` at the end of the chain, joined by `op`, and returns its key.
    pub fn push(&mut self, op: LogicalOp, condition: Condition) -> NodeKey {
        let tail = self.tail();
        self.append_after(tail, op, condition)
    }

    /// Appends `condition` joined by `AND`.
    pub fn and(mut self, condition: Condition) -> Self {
        self.push(LogicalOp::And, condition);
        self
    }

    /// Appends `condition` joined by `OR`.
    pub fn or(mut self, condition: Condition) -> Self {
        self.push(LogicalOp::Or, condition);
        self
    }

    // `tail` must be the current terminal node
    fn append_after(&mut self, tail: NodeKey, op: LogicalOp, condition: Condition) -> NodeKey {
        let key = self.nodes.insert(ClauseNode {
            condition,
            link: None,
        });
        self.nodes[tail].link = Some(Link { op, next: key });
        key
    }

    /// The key of the first node.
    pub fn head(&self) -> NodeKey {
        self.head
    }

    /// The key of the terminal node, found by walking the chain from the head.
    pub fn tail(&self) -> NodeKey {
        self.iter().last().map_or(self.head, |(key, _)| key)
    }

    /// Looks up a node by key.
    pub fn node(&self, key: NodeKey) -> Option<&ClauseNode> {
        self.nodes.get(key)
    }

    /// Looks up a node's condition by key.
    pub fn condition(&self, key: NodeKey) -> Option<&Condition> {
        self.nodes.get(key).map(|node| &node.condition)
    }

    /// Mutable access to a node's condition. The chain links themselves stay read-only.
    pub fn condition_mut(&mut self, key: NodeKey) -> Option<&mut Condition> {
        self.nodes.get_mut(key).map(|node| &mut node.condition)
    }

    /// The first condition of the chain.
    pub fn first(&self) -> &Condition {
        &self.nodes[self.head].condition
    }

    /// The last condition of the chain.
    pub fn last(&self) -> &Condition {
        &self.nodes[self.tail()].condition
    }

    /// Returns the number of conditions in the chain. Always at least one.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Iterates over the nodes from head to tail.
    pub fn iter(&self) -> ChainIter<'_> {
        ChainIter::new(self)
    }

    /// Iterates over the conditions from head to tail.
    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.iter().map(|(_, node)| &node.condition)
    }

    /// Iterates over the join operators from head to tail. Yields one fewer item than
    /// there are conditions.
    pub fn operators(&self) -> impl Iterator<Item = LogicalOp> + '_ {
        self.iter().filter_map(|(_, node)| node.op())
    }

    /// Sum of `open_parens` and `inner_parens` minus `close_parens` over the whole chain.
    ///
    /// Zero for every clause the parser produces, and preserved by wrapping and merging.
    pub fn paren_balance(&self) -> i64 {
        self.conditions()
            .map(|c| {
                i64::from(c.open_parens) + i64::from(c.inner_parens) - i64::from(c.close_parens)
            })
            .sum()
    }
}

impl<'a> IntoIterator for &'a WhereClause {
    type Item = (NodeKey, &'a ClauseNode);
    type IntoIter = ChainIter<'a>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<Condition> for WhereClause {
    fn from(condition: Condition) -> Self {
        Self::new(condition)
    }
}
