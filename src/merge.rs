use slotmap::SecondaryMap;
use tracing::{debug, trace};

use crate::{
    clause::{Link, NodeKey, WhereClause},
    condition::LogicalOp,
};

/// A chain enclosed in one new parenthesis scope, as returned by [`WhereClause::wrap`].
#[derive(Debug, Clone)]
pub struct Wrapped {
    /// The enclosed chain.
    pub clause: WhereClause,
    /// The terminal node of `clause`, the one carrying the new closing parenthesis.
    ///
    /// Further structure can be attached here without walking the chain again.
    pub tail: NodeKey,
}

impl WhereClause {
    /// Returns a copy of the chain enclosed in one more pair of parentheses.
    ///
    /// The head's `open_parens` and the tail's `close_parens` each grow by one; existing
    /// scopes are kept, so the text becomes `(<original>)` however deeply the original is
    /// already nested. `self` is not touched.
    ///
    /// # Example
    /// ```rust
    /// use wheremerge::parse_where;
    ///
    /// let clause = parse_where("(a = 1 OR b = 2)").unwrap();
    /// let wrapped = clause.wrap();
    ///
    /// assert_eq!(wrapped.clause.to_string(), "((a = 1 OR b = 2))");
    /// assert_eq!(wrapped.clause.first().open_parens, 2);
    /// assert_eq!(clause.to_string(), "(a = 1 OR b = 2)");
    /// ```
    pub fn wrap(&self) -> Wrapped {
        self.clone().wrapped()
    }

    /// Same as [`wrap`](Self::wrap), but consumes the chain instead of copying it.
    pub fn wrapped(mut self) -> Wrapped {
        let head = self.head;
        self.nodes[head].condition.open_parens += 1;

        let tail = self.tail();
        self.nodes[tail].condition.close_parens += 1;

        Wrapped { clause: self, tail }
    }

    /// Joins two chains as `(self) op (other)`.
    ///
    /// Both sides are wrapped first, so the join can never re-associate the conditions of
    /// either side: `a AND b` merged by `OR` with `c OR d` stays
    /// `(a AND b) OR (c OR d)`.
    ///
    /// # Example
    /// ```rust
    /// use wheremerge::{LogicalOp, parse_where};
    ///
    /// let left = parse_where("f1 = 'v1' AND f3 = 'v3'").unwrap();
    /// let right = parse_where("f2 = 'v2' OR f4 = 'v4'").unwrap();
    ///
    /// let merged = left.merge(right, LogicalOp::Or);
    /// assert_eq!(
    ///     merged.to_string(),
    ///     "(f1 = 'v1' AND f3 = 'v3') OR (f2 = 'v2' OR f4 = 'v4')"
    /// );
    /// ```
    pub fn merge(self, other: WhereClause, op: LogicalOp) -> WhereClause {
        debug!(
            left = self.node_count(),
            right = other.node_count(),
            op = op.as_str(),
            "merging where clauses"
        );
        let Wrapped {
            clause: mut merged,
            tail,
        } = self.wrapped();
        merged.attach(tail, op, other.wrapped().clause);
        merged
    }

    // moves `other` into this arena and links it after `tail`
    fn attach(&mut self, tail: NodeKey, op: LogicalOp, other: WhereClause) {
        let next = self.absorb(other);
        self.nodes[tail].link = Some(Link { op, next });
    }

    // moves every node of `other` into this arena, returning the new key of its head
    fn absorb(&mut self, other: WhereClause) -> NodeKey {
        let mut map = SecondaryMap::with_capacity(other.nodes.len());
        let mut moved = Vec::with_capacity(other.nodes.len());

        // insert first, links are remapped once every key is known
        for (old, mut node) in other.nodes {
            let link = node.link.take();
            let new = self.nodes.insert(node);
            map.insert(old, new);
            moved.push((new, link));
        }
        for (new, link) in moved {
            self.nodes[new].link = link.map(|link| Link {
                op: link.op,
                next: map[link.next],
            });
        }

        map[other.head]
    }
}

/// Merges two optional where clauses into one, joined by `op`.
///
/// * Both absent: `None`.
/// * One absent: a copy of the other, **unwrapped**. Merging with nothing does not add
///   parentheses.
/// * Both present: `(left) op (right)`, see [`WhereClause::merge`].
///
/// The inputs are only borrowed and remain valid and unchanged afterwards. Pass
/// [`LogicalOp::default()`] for the usual `AND` join.
///
/// # Example
/// ```rust
/// use wheremerge::{LogicalOp, merge_where_clauses, parse_where};
///
/// let left = parse_where("f1 = 'v1'").unwrap();
/// let right = parse_where("f2 = 'v2'").unwrap();
///
/// let merged = merge_where_clauses(Some(&left), Some(&right), LogicalOp::And).unwrap();
/// assert_eq!(merged.to_string(), "(f1 = 'v1') AND (f2 = 'v2')");
///
/// // identity
/// let same = merge_where_clauses(None, Some(&right), LogicalOp::And).unwrap();
/// assert_eq!(same.to_string(), "f2 = 'v2'");
/// assert!(merge_where_clauses(None, None, LogicalOp::Or).is_none());
/// ```
pub fn merge_where_clauses(
    left: Option<&WhereClause>,
    right: Option<&WhereClause>,
    op: LogicalOp,
) -> Option<WhereClause> {
    match (left, right) {
        (None, None) => {
            trace!("nothing to merge");
            None
        }
        (Some(only), None) | (None, Some(only)) => {
            trace!(nodes = only.node_count(), "merging with an absent clause");
            Some(only.clone())
        }
        (Some(left), Some(right)) => Some(left.clone().merge(right.clone(), op)),
    }
}
