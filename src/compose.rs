use std::fmt::{self, Display, Formatter, Write};

use crate::{
    clause::WhereClause,
    condition::{Condition, Literal, LogicalOp, MembershipSource, Predicate},
    query::Query,
};

/// Turns a query back into single-line text.
///
/// The output is canonical: keywords upper-case, one space around operators,
/// `", "` between list items. Parsing it gives back an equal [`Query`].
///
/// # Example
/// ```rust
/// use wheremerge::{compose_query, parse_query};
///
/// let query = parse_query("select Id,Name from Account where Name like 'A%' limit 5").unwrap();
/// assert_eq!(
///     compose_query(&query),
///     "SELECT Id, Name FROM Account WHERE Name LIKE 'A%' LIMIT 5"
/// );
/// ```
pub fn compose_query(query: &Query) -> String {
    query.to_string()
}

impl Display for LogicalOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => {
                f.write_char('\'')?;
                for c in s.chars() {
                    match c {
                        '\'' => f.write_str("\\'")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        '\r' => f.write_str("\\r")?,
                        c => f.write_char(c)?,
                    }
                }
                f.write_char('\'')
            }
            Literal::Number(n) => f.write_str(n),
            Literal::Boolean(true) => f.write_str("TRUE"),
            Literal::Boolean(false) => f.write_str("FALSE"),
            Literal::Null => f.write_str("NULL"),
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare { field, op, value } => {
                write!(f, "{field} {} {value}", op.as_str())
            }
            Predicate::Membership { field, op, source } => {
                write!(f, "{field} {} (", op.as_str())?;
                match source {
                    MembershipSource::Values(values) => write_list(f, values)?,
                    MembershipSource::Subquery(query) => write!(f, "{query}")?,
                }
                f.write_char(')')
            }
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for _ in 0..self.open_parens {
            f.write_char('(')?;
        }
        if self.negated {
            f.write_str("NOT ")?;
        }
        for _ in 0..self.inner_parens {
            f.write_char('(')?;
        }
        write!(f, "{}", self.predicate)?;
        for _ in 0..self.close_parens {
            f.write_char(')')?;
        }
        Ok(())
    }
}

impl Display for WhereClause {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (_, node) in self {
            write!(f, "{}", node.condition())?;
            if let Some(op) = node.op() {
                write!(f, " {op} ")?;
            }
        }
        Ok(())
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        write_list(f, &self.fields)?;
        write!(f, " FROM {}", self.sobject)?;
        if let Some(clause) = &self.where_clause {
            write!(f, " WHERE {clause}")?;
        }
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {limit}")?;
        }
        Ok(())
    }
}

fn write_list<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}
