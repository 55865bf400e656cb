pub mod clause;
pub mod compose;
pub mod condition;
pub mod error;
pub mod format;
pub mod merge;
pub mod parse;
pub mod query;

pub mod prelude {
    pub use crate::clause::{ClauseNode, Link, NodeKey, WhereClause};
    pub use crate::compose::compose_query;
    pub use crate::condition::{
        CompareOp, Condition, Literal, LogicalOp, MembershipOp, MembershipSource, Predicate,
    };
    pub use crate::error::{ClauseError, ParseError};
    pub use crate::format::{FormatFlags, FormatOptions, format_query};
    pub use crate::merge::{Wrapped, merge_where_clauses};
    pub use crate::parse::{parse_query, parse_where};
    pub use crate::query::Query;
}

pub use clause::WhereClause;
pub use compose::compose_query;
pub use condition::{Condition, Literal, LogicalOp};
pub use error::ParseError;
pub use merge::merge_where_clauses;
pub use parse::{parse_query, parse_where};
pub use query::Query;
