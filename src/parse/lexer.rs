use std::{fmt, iter::Peekable, str::CharIndices};

use crate::{
    condition::{CompareOp, Literal},
    error::ParseError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Keyword {
    Select,
    From,
    Where,
    And,
    Or,
    Not,
    In,
    Limit,
}

impl Keyword {
    fn lookup(word: &str) -> Option<Self> {
        let kw = match word.to_ascii_uppercase().as_str() {
            "SELECT" => Keyword::Select,
            "FROM" => Keyword::From,
            "WHERE" => Keyword::Where,
            "AND" => Keyword::And,
            "OR" => Keyword::Or,
            "NOT" => Keyword::Not,
            "IN" => Keyword::In,
            "LIMIT" => Keyword::Limit,
            _ => return None,
        };
        Some(kw)
    }

    fn as_str(&self) -> &'static str {
        match self {
            Keyword::Select => "SELECT",
            Keyword::From => "FROM",
            Keyword::Where => "WHERE",
            Keyword::And => "AND",
            Keyword::Or => "OR",
            Keyword::Not => "NOT",
            Keyword::In => "IN",
            Keyword::Limit => "LIMIT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Keyword(Keyword),
    Literal(Literal),
    Op(CompareOp),
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(name) => f.write_str(name),
            TokenKind::Keyword(kw) => f.write_str(kw.as_str()),
            TokenKind::Literal(lit) => write!(f, "{lit}"),
            TokenKind::Op(op) => f.write_str(op.as_str()),
            TokenKind::LParen => f.write_str("("),
            TokenKind::RParen => f.write_str(")"),
            TokenKind::Comma => f.write_str(","),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub pos: usize,
}

/// Splits query text into tokens. Keywords are matched case-insensitively.
pub(crate) fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer {
        source,
        chars: source.char_indices().peekable(),
    };
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}

struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl Lexer<'_> {
    fn next_token(&mut self) -> Result<Option<Token>, ParseError> {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

        let Some((pos, ch)) = self.chars.next() else {
            return Ok(None);
        };
        let kind = match ch {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            '=' => TokenKind::Op(CompareOp::Eq),
            '!' if self.chars.next_if(|&(_, c)| c == '=').is_some() => {
                TokenKind::Op(CompareOp::NotEq)
            }
            '<' => match self.chars.next_if(|&(_, c)| c == '=' || c == '>') {
                Some((_, '=')) => TokenKind::Op(CompareOp::LtEq),
                Some(_) => TokenKind::Op(CompareOp::NotEqAlt),
                None => TokenKind::Op(CompareOp::Lt),
            },
            '>' => match self.chars.next_if(|&(_, c)| c == '=') {
                Some(_) => TokenKind::Op(CompareOp::GtEq),
                None => TokenKind::Op(CompareOp::Gt),
            },
            '\'' => TokenKind::Literal(Literal::String(self.string(pos)?)),
            '-' if self.chars.peek().is_some_and(|(_, c)| c.is_ascii_digit()) => {
                TokenKind::Literal(Literal::Number(self.number(pos)))
            }
            c if c.is_ascii_digit() => TokenKind::Literal(Literal::Number(self.number(pos))),
            c if c.is_alphabetic() || c == '_' => self.word(pos),
            ch => return Err(ParseError::UnexpectedChar { ch, pos }),
        };
        Ok(Some(Token { kind, pos }))
    }

    // opening quote already consumed
    fn string(&mut self, start: usize) -> Result<String, ParseError> {
        let mut value = String::new();
        loop {
            match self.chars.next() {
                Some((_, '\'')) => return Ok(value),
                Some((_, '\\')) => match self.chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, 'r')) => value.push('\r'),
                    Some((_, c)) => value.push(c),
                    None => break,
                },
                Some((_, c)) => value.push(c),
                None => break,
            }
        }
        Err(ParseError::UnterminatedString { pos: start })
    }

    fn number(&mut self, start: usize) -> String {
        let mut seen_dot = false;
        let end = loop {
            match self.chars.peek() {
                Some(&(_, c)) if c.is_ascii_digit() => {}
                Some(&(_, '.')) if !seen_dot => seen_dot = true,
                Some(&(i, _)) => break i,
                None => break self.source.len(),
            }
            self.chars.next();
        };
        self.source[start..end].to_string()
    }

    fn word(&mut self, start: usize) -> TokenKind {
        let end = loop {
            match self.chars.peek() {
                Some(&(_, c)) if c.is_alphanumeric() || c == '_' || c == '.' => {}
                Some(&(i, _)) => break i,
                None => break self.source.len(),
            }
            self.chars.next();
        };
        let word = &self.source[start..end];

        if let Some(kw) = Keyword::lookup(word) {
            return TokenKind::Keyword(kw);
        }
        match word.to_ascii_uppercase().as_str() {
            "LIKE" => TokenKind::Op(CompareOp::Like),
            "TRUE" => TokenKind::Literal(Literal::Boolean(true)),
            "FALSE" => TokenKind::Literal(Literal::Boolean(false)),
            "NULL" => TokenKind::Literal(Literal::Null),
            _ => TokenKind::Ident(word.to_string()),
        }
    }
}
