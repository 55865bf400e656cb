use serde::{Deserialize, Serialize};

use crate::{clause::WhereClause, condition::LogicalOp};

/// A parsed `SELECT ... FROM ... [WHERE ...] [LIMIT n]` query.
///
/// Only the where clause takes part in merging; the other parts are carried along so a
/// merged clause can be composed back into a full query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub fields: Vec<String>,
    pub sobject: String,
    #[serde(rename = "where", default, skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<WhereClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl Query {
    /// Creates a query selecting `fields` from `sobject`, with no filter.
    pub fn new<F: Into<String>>(
        fields: impl IntoIterator<Item = F>,
        sobject: impl Into<String>,
    ) -> Self {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            sobject: sobject.into(),
            where_clause: None,
            limit: None,
        }
    }

    pub fn with_where(mut self, clause: WhereClause) -> Self {
        self.where_clause = Some(clause);
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Replaces this query's filter with `(self.where) op (other)`.
    ///
    /// Follows the identity rules of [`merge_where_clauses`](crate::merge_where_clauses):
    /// if either side is missing the other one is kept as it is.
    ///
    /// # Example
    /// ```rust
    /// use wheremerge::{LogicalOp, parse_query};
    ///
    /// let mut query = parse_query("SELECT Id FROM Account WHERE Type = 'Customer'").unwrap();
    /// let other = parse_query("SELECT Id FROM Account WHERE Rating = 'Hot'").unwrap();
    ///
    /// query.merge_where(other.where_clause.as_ref(), LogicalOp::Or);
    /// assert_eq!(
    ///     query.to_string(),
    ///     "SELECT Id FROM Account WHERE (Type = 'Customer') OR (Rating = 'Hot')"
    /// );
    /// ```
    pub fn merge_where(&mut self, other: Option<&WhereClause>, op: LogicalOp) {
        match (self.where_clause.take(), other) {
            (Some(own), Some(other)) => self.where_clause = Some(own.merge(other.clone(), op)),
            (own, other) => self.where_clause = own.or_else(|| other.cloned()),
        }
    }
}
