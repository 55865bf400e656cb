use serde::{Deserialize, Serialize};

use crate::query::Query;

/// The connective joining one condition to the next in a [`WhereClause`](crate::WhereClause).
///
/// Defaults to [`LogicalOp::And`], which is the operator used when a caller does not
/// ask for a specific join.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOp {
    /// Both sides must hold.
    #[default]
    And,
    /// At least one side must hold.
    Or,
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }
}

/// A single comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    /// `<>`, kept apart from `!=` so the text survives a round trip.
    #[serde(rename = "<>")]
    NotEqAlt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    LtEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    GtEq,
    #[serde(rename = "LIKE")]
    Like,
}

impl CompareOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "!=",
            CompareOp::NotEqAlt => "<>",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
            CompareOp::Like => "LIKE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MembershipOp {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "NOT IN")]
    NotIn,
}

impl MembershipOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipOp::In => "IN",
            MembershipOp::NotIn => "NOT IN",
        }
    }
}

/// A literal value on the right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Literal {
    String(String),
    /// Numbers keep their source lexeme (`1`, `-2.50`) so composing does not reformat them.
    Number(String),
    Boolean(bool),
    Null,
}

impl Literal {
    pub fn string(value: impl Into<String>) -> Self {
        Literal::String(value.into())
    }

    pub fn number(value: impl ToString) -> Self {
        Literal::Number(value.to_string())
    }
}

/// What a membership test is checked against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MembershipSource {
    /// `field IN ('a', 'b')`
    Values(Vec<Literal>),
    /// `field IN (SELECT Id FROM Other WHERE ...)`
    ///
    /// The sub-select owns its own where clause; merging the outer chain never touches it.
    Subquery(Box<Query>),
}

/// The atomic predicate held by one node of a chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Predicate {
    /// `field <op> value`
    Compare {
        field: String,
        op: CompareOp,
        value: Literal,
    },
    /// `field [NOT] IN (...)`
    Membership {
        field: String,
        op: MembershipOp,
        source: MembershipSource,
    },
}

impl Predicate {
    /// The field the predicate tests.
    pub fn field(&self) -> &str {
        match self {
            Predicate::Compare { field, .. } | Predicate::Membership { field, .. } => field,
        }
    }
}

/// One operand of a chain together with its scope markers.
///
/// * `open_parens`: number of `(` written immediately before the operand, ahead of
///   any `NOT`.
/// * `inner_parens`: number of `(` written between `NOT` and the predicate, so
///   `NOT (a = 1 OR b = 2)` negates a whole group. Zero unless `negated` is set.
/// * `close_parens`: number of `)` written immediately after it.
///
/// A marker of `0` means "absent". Markers only have meaning across a whole
/// [`WhereClause`](crate::WhereClause); a single condition may be unbalanced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub open_parens: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub inner_parens: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub close_parens: u32,
    /// A `NOT`, written after `open_parens` and before `inner_parens`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub negated: bool,
    pub predicate: Predicate,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl Condition {
    pub fn new(predicate: Predicate) -> Self {
        Self {
            open_parens: 0,
            inner_parens: 0,
            close_parens: 0,
            negated: false,
            predicate,
        }
    }

    /// `field <op> value`
    pub fn compare(field: impl Into<String>, op: CompareOp, value: Literal) -> Self {
        Self::new(Predicate::Compare {
            field: field.into(),
            op,
            value,
        })
    }

    /// Shorthand for `field = value`.
    ///
    /// # Example
    /// ```rust
    /// use wheremerge::{Condition, Literal};
    ///
    /// let cond = Condition::eq("Name", Literal::string("Acme"));
    /// assert_eq!(cond.to_string(), "Name = 'Acme'");
    /// ```
    pub fn eq(field: impl Into<String>, value: Literal) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    /// `field IN (values...)`
    pub fn is_in(field: impl Into<String>, values: impl IntoIterator<Item = Literal>) -> Self {
        Self::new(Predicate::Membership {
            field: field.into(),
            op: MembershipOp::In,
            source: MembershipSource::Values(values.into_iter().collect()),
        })
    }

    /// `field IN (SELECT ...)`
    pub fn in_subquery(field: impl Into<String>, query: Query) -> Self {
        Self::new(Predicate::Membership {
            field: field.into(),
            op: MembershipOp::In,
            source: MembershipSource::Subquery(Box::new(query)),
        })
    }

    /// Prefixes the condition with `NOT`.
    pub fn not(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// Opens `n` scopes under a `NOT`, negating the group that starts here.
    ///
    /// # Example
    /// ```rust
    /// use wheremerge::{Condition, Literal, WhereClause};
    ///
    /// let clause = WhereClause::new(Condition::eq("a", Literal::number(1)).not_group(1))
    ///     .or(Condition::eq("b", Literal::number(2)).close(1));
    /// assert_eq!(clause.to_string(), "NOT (a = 1 OR b = 2)");
    /// ```
    pub fn not_group(mut self, n: u32) -> Self {
        self.negated = true;
        self.inner_parens += n;
        self
    }

    /// Adds `n` opening parentheses in front of the condition.
    pub fn open(mut self, n: u32) -> Self {
        self.open_parens += n;
        self
    }

    /// Adds `n` closing parentheses after the condition.
    pub fn close(mut self, n: u32) -> Self {
        self.close_parens += n;
        self
    }
}
