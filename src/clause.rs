use serde::{Deserialize, Serialize, Serializer};
use slotmap::{SlotMap, new_key_type};

use crate::{
    condition::{Condition, LogicalOp},
    error::ClauseError,
};

mod basic;
mod iter;
mod ops;

pub use iter::ChainIter;

new_key_type! {
    /// A handle to a node within a [`WhereClause`].
    ///
    /// Keys stay valid for the lifetime of the clause that created them, including across
    /// a splice: after [`WhereClause::merge`] the left side's keys still point at the same
    /// conditions.
    pub struct NodeKey;
}

/// The join from one node to the following one.
///
/// The operator and the `next` reference travel together, so a node either has both or
/// neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub op: LogicalOp,
    pub next: NodeKey,
}

/// One node of a chain: a condition and the optional link to the node after it.
#[derive(Debug, Clone)]
pub struct ClauseNode {
    pub(crate) condition: Condition,
    pub(crate) link: Option<Link>,
}

impl ClauseNode {
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn link(&self) -> Option<Link> {
        self.link
    }

    /// The operator joining this node to the next one, if there is a next one.
    pub fn op(&self) -> Option<LogicalOp> {
        self.link.map(|link| link.op)
    }
}

/// A flattened filter expression: conditions joined left to right by `AND` / `OR`.
///
/// Grouping is not stored as a tree. It is written onto the conditions themselves as
/// scope markers ([`Condition::open_parens`], [`Condition::inner_parens`],
/// [`Condition::close_parens`]), the same way
/// the text reads: `(a = 1 OR b = 2) AND c = 3` is three nodes, the first opening one
/// scope and the second closing it.
///
/// # Storage
/// Nodes live in an arena and point to their successor through a [`NodeKey`]. A clause
/// always holds at least one condition, and every node in the arena belongs to the chain
/// reachable from [`head`](WhereClause::head).
///
/// # Equality
/// Two clauses are equal when their chains read the same from head to tail. The arena
/// layout is not compared.
///
/// # Example
/// ```rust
/// use wheremerge::{Condition, Literal, WhereClause};
///
/// let clause = WhereClause::new(Condition::eq("a", Literal::number(1)).open(1))
///     .or(Condition::eq("b", Literal::number(2)).close(1))
///     .and(Condition::eq("c", Literal::number(3)));
///
/// assert_eq!(clause.to_string(), "(a = 1 OR b = 2) AND c = 3");
/// assert_eq!(clause.node_count(), 3);
/// ```
#[derive(Clone, Deserialize)]
#[serde(try_from = "Vec<ClauseStep>")]
pub struct WhereClause {
    pub(crate) nodes: SlotMap<NodeKey, ClauseNode>,
    pub(crate) head: NodeKey,
}

impl PartialEq for WhereClause {
    fn eq(&self, other: &Self) -> bool {
        self.node_count() == other.node_count()
            && self
                .iter()
                .zip(other.iter())
                .all(|((_, a), (_, b))| a.op() == b.op() && a.condition == b.condition)
    }
}

impl std::fmt::Debug for WhereClause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.iter().map(|(_, node)| (node.op(), &node.condition)))
            .finish()
    }
}

// serialized as the chain read in order: [{ condition, op? }, ...]
#[derive(Serialize)]
struct ClauseStepRef<'a> {
    condition: &'a Condition,
    #[serde(skip_serializing_if = "Option::is_none")]
    op: Option<LogicalOp>,
}

#[derive(Deserialize)]
struct ClauseStep {
    condition: Condition,
    #[serde(default)]
    op: Option<LogicalOp>,
}

impl Serialize for WhereClause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(|(_, node)| ClauseStepRef {
            condition: &node.condition,
            op: node.op(),
        }))
    }
}

impl TryFrom<Vec<ClauseStep>> for WhereClause {
    type Error = ClauseError;

    fn try_from(steps: Vec<ClauseStep>) -> Result<Self, Self::Error> {
        let mut steps = steps.into_iter();
        let first = steps.next().ok_or(ClauseError::Empty)?;

        // every step but the last carries the join to its successor
        let mut pending = first.op;
        let mut clause = WhereClause::new(first.condition);
        for (index, step) in steps.enumerate() {
            let op = pending.ok_or(ClauseError::MissingJoin { index })?;
            clause.push(op, step.condition);
            pending = step.op;
        }
        if pending.is_some() {
            return Err(ClauseError::TrailingJoin {
                index: clause.node_count() - 1,
            });
        }
        Ok(clause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Literal;

    fn sample() -> WhereClause {
        WhereClause::new(Condition::eq("a", Literal::number(1)).open(1))
            .or(Condition::eq("b", Literal::string("x")).close(1))
            .and(Condition::eq("c", Literal::Null).not())
    }

    #[test]
    fn json_round_trip_keeps_the_chain() {
        let clause = sample();
        let json = serde_json::to_string(&clause).unwrap();
        let back: WhereClause = serde_json::from_str(&json).unwrap();
        assert_eq!(back, clause);
    }

    #[test]
    fn json_lists_steps_in_chain_order() {
        let json = serde_json::to_value(sample()).unwrap();
        let steps = json.as_array().unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0]["op"], "OR");
        assert_eq!(steps[1]["op"], "AND");
        assert!(steps[2].get("op").is_none());
        assert_eq!(steps[2]["condition"]["negated"], true);
    }

    #[test]
    fn deserializing_an_empty_chain_fails() {
        let err = serde_json::from_str::<WhereClause>("[]").unwrap_err();
        assert!(err.to_string().contains("at least one condition"));
    }

    #[test]
    fn deserializing_a_broken_chain_fails() {
        let cond = serde_json::to_value(Condition::eq("a", Literal::number(1))).unwrap();

        let trailing = serde_json::json!([{ "condition": cond, "op": "AND" }]);
        assert!(serde_json::from_value::<WhereClause>(trailing).is_err());

        let missing = serde_json::json!([{ "condition": cond }, { "condition": cond }]);
        let err = serde_json::from_value::<WhereClause>(missing).unwrap_err();
        assert!(err.to_string().contains("condition 0"));
    }

    #[test]
    fn equality_ignores_arena_layout() {
        // same text, but the left arena recycles a freed slot
        let mut left = WhereClause::new(Condition::eq("x", Literal::number(0)));
        let _ = left.nodes.insert(ClauseNode {
            condition: Condition::eq("junk", Literal::Null),
            link: None,
        });
        left.nodes.retain(|_, node| node.condition.predicate.field() != "junk");
        let left = left.and(Condition::eq("y", Literal::number(1)));

        let right = WhereClause::new(Condition::eq("x", Literal::number(0)))
            .and(Condition::eq("y", Literal::number(1)));
        assert_eq!(left, right);

        let different = WhereClause::new(Condition::eq("x", Literal::number(0)))
            .or(Condition::eq("y", Literal::number(1)));
        assert_ne!(left, different);
    }
}
