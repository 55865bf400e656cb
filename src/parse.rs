use tracing::trace;

use crate::{
    clause::WhereClause,
    condition::{Condition, Literal, LogicalOp, MembershipOp, MembershipSource, Predicate},
    error::ParseError,
    query::Query,
};

mod lexer;

use lexer::{Keyword, Token, TokenKind, tokenize};

/// Parses a `SELECT ... FROM ... [WHERE ...] [LIMIT n]` query.
///
/// The grammar is a small SOQL subset:
/// * comparisons `field <op> literal` with `=`, `!=`, `<>`, `<`, `<=`, `>`, `>=`, `LIKE`,
/// * membership `field [NOT] IN (literal, ...)` or `field [NOT] IN (SELECT ...)`,
/// * a `NOT` prefix before a condition or a parenthesized group,
/// * conditions joined by `AND` / `OR`, grouped with parentheses.
///
/// Parentheses are recorded as scope markers on the conditions they surround; no
/// precedence is applied, the chain is kept exactly as written.
///
/// # Example
/// ```rust
/// use wheremerge::parse_query;
///
/// let query = parse_query("SELECT Id, Name FROM Account WHERE (a = 1 OR b = 2) LIMIT 10").unwrap();
/// assert_eq!(query.fields, ["Id", "Name"]);
/// assert_eq!(query.sobject, "Account");
/// assert_eq!(query.limit, Some(10));
///
/// let clause = query.where_clause.unwrap();
/// assert_eq!(clause.first().open_parens, 1);
/// assert_eq!(clause.last().close_parens, 1);
/// ```
pub fn parse_query(source: &str) -> Result<Query, ParseError> {
    let tokens = tokenize(source)?;
    trace!(tokens = tokens.len(), "parsing query");
    let mut parser = Parser::new(&tokens);
    let query = parser.query()?;
    parser.finish()?;
    Ok(query)
}

/// Parses a bare condition list, as it would appear after `WHERE`.
pub fn parse_where(source: &str) -> Result<WhereClause, ParseError> {
    let tokens = tokenize(source)?;
    trace!(tokens = tokens.len(), "parsing where clause");
    let mut parser = Parser::new(&tokens);
    let clause = parser.where_clause()?;
    parser.finish()?;
    Ok(clause)
}

struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn query(&mut self) -> Result<Query, ParseError> {
        self.expect_keyword(Keyword::Select, "SELECT")?;
        let mut fields = vec![self.ident("field name")?];
        while self.eat(&TokenKind::Comma) {
            fields.push(self.ident("field name")?);
        }

        self.expect_keyword(Keyword::From, "FROM")?;
        let sobject = self.ident("object name")?;

        let mut where_clause = None;
        if self.eat_keyword(Keyword::Where) {
            where_clause = Some(self.where_clause()?);
        }
        let mut limit = None;
        if self.eat_keyword(Keyword::Limit) {
            limit = Some(self.limit()?);
        }

        Ok(Query {
            fields,
            sobject,
            where_clause,
            limit,
        })
    }

    // ends at the first token that is not a join, or at a `)` closing an outer scope
    fn where_clause(&mut self) -> Result<WhereClause, ParseError> {
        let mut depth = 0;
        let first = self.condition(&mut depth)?;
        let mut rest = Vec::new();
        while let Some(op) = self.logical_op() {
            rest.push((op, self.condition(&mut depth)?));
        }
        if depth > 0 {
            return Err(ParseError::UnclosedScope { open: depth });
        }
        Ok(WhereClause::from_conditions(first, rest))
    }

    fn condition(&mut self, depth: &mut u32) -> Result<Condition, ParseError> {
        let mut open_parens = 0;
        while self.eat(&TokenKind::LParen) {
            open_parens += 1;
        }
        *depth += open_parens;

        let negated = self.eat_keyword(Keyword::Not);
        let mut inner_parens = 0;
        if negated {
            while self.eat(&TokenKind::LParen) {
                inner_parens += 1;
            }
            *depth += inner_parens;
        }

        let field = self.ident("field name")?;
        let predicate = if self.eat_keyword(Keyword::Not) {
            self.expect_keyword(Keyword::In, "IN")?;
            self.membership(field, MembershipOp::NotIn)?
        } else if self.eat_keyword(Keyword::In) {
            self.membership(field, MembershipOp::In)?
        } else {
            let op = match self.peek() {
                Some(TokenKind::Op(op)) => *op,
                _ => return Err(self.unexpected("comparison operator")),
            };
            self.pos += 1;
            Predicate::Compare {
                field,
                op,
                value: self.literal()?,
            }
        };

        // only close what this chain opened, the rest belongs to an enclosing IN (...)
        let mut close_parens = 0;
        while *depth > 0 && self.eat(&TokenKind::RParen) {
            close_parens += 1;
            *depth -= 1;
        }

        Ok(Condition {
            open_parens,
            inner_parens,
            close_parens,
            negated,
            predicate,
        })
    }

    fn membership(&mut self, field: String, op: MembershipOp) -> Result<Predicate, ParseError> {
        self.expect(&TokenKind::LParen, "'('")?;
        let source = if self.peek() == Some(&TokenKind::Keyword(Keyword::Select)) {
            MembershipSource::Subquery(Box::new(self.query()?))
        } else {
            let mut values = vec![self.literal()?];
            while self.eat(&TokenKind::Comma) {
                values.push(self.literal()?);
            }
            MembershipSource::Values(values)
        };
        self.expect(&TokenKind::RParen, "')'")?;
        Ok(Predicate::Membership { field, op, source })
    }

    fn logical_op(&mut self) -> Option<LogicalOp> {
        if self.eat_keyword(Keyword::And) {
            Some(LogicalOp::And)
        } else if self.eat_keyword(Keyword::Or) {
            Some(LogicalOp::Or)
        } else {
            None
        }
    }

    fn literal(&mut self) -> Result<Literal, ParseError> {
        match self.peek() {
            Some(TokenKind::Literal(lit)) => {
                let lit = lit.clone();
                self.pos += 1;
                Ok(lit)
            }
            _ => Err(self.unexpected("literal value")),
        }
    }

    fn limit(&mut self) -> Result<u64, ParseError> {
        let Some(token) = self.tokens.get(self.pos) else {
            return Err(ParseError::UnexpectedEnd {
                expected: "LIMIT value",
            });
        };
        match &token.kind {
            TokenKind::Literal(Literal::Number(n)) => {
                let limit = n.parse().map_err(|_| ParseError::InvalidLimit {
                    value: n.clone(),
                    pos: token.pos,
                })?;
                self.pos += 1;
                Ok(limit)
            }
            _ => Err(self.unexpected("LIMIT value")),
        }
    }

    fn ident(&mut self, expected: &'static str) -> Result<String, ParseError> {
        match self.peek() {
            Some(TokenKind::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    fn peek(&self) -> Option<&'t TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, kw: Keyword) -> bool {
        self.eat(&TokenKind::Keyword(kw))
    }

    fn expect(&mut self, kind: &TokenKind, expected: &'static str) -> Result<(), ParseError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_keyword(&mut self, kw: Keyword, expected: &'static str) -> Result<(), ParseError> {
        self.expect(&TokenKind::Keyword(kw), expected)
    }

    fn finish(&self) -> Result<(), ParseError> {
        match self.tokens.get(self.pos) {
            None => Ok(()),
            Some(Token {
                kind: TokenKind::RParen,
                pos,
            }) => Err(ParseError::UnmatchedClose { pos: *pos }),
            Some(_) => Err(self.unexpected("end of input")),
        }
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(token) => ParseError::Unexpected {
                expected,
                found: token.kind.to_string(),
                pos: token.pos,
            },
            None => ParseError::UnexpectedEnd { expected },
        }
    }
}
