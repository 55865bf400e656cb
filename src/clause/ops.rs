use std::ops::{BitAnd, BitOr};

use crate::{clause::WhereClause, condition::LogicalOp};

// `a & b` and `a | b` are shorthands for `merge`, so both sides keep their own grouping

impl BitAnd for WhereClause {
    type Output = WhereClause;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.merge(rhs, LogicalOp::And)
    }
}

impl BitOr for WhereClause {
    type Output = WhereClause;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.merge(rhs, LogicalOp::Or)
    }
}

impl BitAnd for &WhereClause {
    type Output = WhereClause;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.clone().merge(rhs.clone(), LogicalOp::And)
    }
}

impl BitOr for &WhereClause {
    type Output = WhereClause;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.clone().merge(rhs.clone(), LogicalOp::Or)
    }
}

#[cfg(test)]
mod tests {
    use crate::{Condition, Literal, WhereClause};

    #[test]
    fn operators_wrap_both_sides() {
        let a = WhereClause::new(Condition::eq("a", Literal::number(1)))
            .or(Condition::eq("b", Literal::number(2)));
        let c = WhereClause::new(Condition::eq("c", Literal::number(3)));

        assert_eq!((&a & &c).to_string(), "(a = 1 OR b = 2) AND (c = 3)");
        assert_eq!((&a | &c).to_string(), "(a = 1 OR b = 2) OR (c = 3)");

        // chaining nests the earlier merge
        let chained = a & c.clone() | c;
        assert_eq!(chained.to_string(), "((a = 1 OR b = 2) AND (c = 3)) OR (c = 3)");
    }
}
