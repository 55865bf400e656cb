use std::fmt::Write;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    clause::WhereClause,
    condition::{Condition, MembershipSource, Predicate},
    error::ParseError,
    parse::parse_query,
    query::Query,
};

bitflags! {
    /// Layout toggles for [`format_query`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct FormatFlags: u8 {
        /// Start every `AND` / `OR` of a where clause on its own, indented line.
        const WHERE_OPERATORS_INDENTED = 0b01;
        /// Put the parentheses around a sub-select on their own lines.
        const SUBQUERY_PARENS_OWN_LINE = 0b10;
    }
}

/// Configuration for [`format_query`].
///
/// Every field has a default, so a partial JSON document is enough to load one:
///
/// ```rust
/// use wheremerge::format::{FormatFlags, FormatOptions};
///
/// let options: FormatOptions = serde_json::from_str(r#"{ "indent": 4 }"#).unwrap();
/// assert_eq!(options.indent, 4);
/// assert_eq!(options.flags, FormatFlags::WHERE_OPERATORS_INDENTED);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Spaces per indentation level.
    pub indent: usize,
    pub flags: FormatFlags,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            flags: FormatFlags::WHERE_OPERATORS_INDENTED,
        }
    }
}

/// Pretty-prints query text across several lines.
///
/// Purely cosmetic: the output parses back to the same [`Query`] as the input.
///
/// # Example
/// ```rust
/// use wheremerge::format::{FormatOptions, format_query};
///
/// let text = format_query(
///     "SELECT Id FROM Object WHERE (a = 1) AND (b = 2 OR c = 3)",
///     &FormatOptions::default(),
/// )
/// .unwrap();
///
/// assert_eq!(
///     text,
///     "SELECT Id\nFROM Object\nWHERE (a = 1)\n  AND (b = 2\n  OR c = 3)"
/// );
/// ```
pub fn format_query(source: &str, options: &FormatOptions) -> Result<String, ParseError> {
    let query = parse_query(source)?;
    trace!(indent = options.indent, flags = options.flags.bits(), "formatting query");
    Ok(render_query(&query, options))
}

/// Pretty-prints an already parsed query.
pub fn render_query(query: &Query, options: &FormatOptions) -> String {
    let mut printer = Printer {
        out: String::new(),
        options,
    };
    printer.query(query, 0);
    printer.out
}

struct Printer<'o> {
    out: String,
    options: &'o FormatOptions,
}

impl Printer<'_> {
    fn newline(&mut self, level: usize) {
        self.out.push('\n');
        let width = level * self.options.indent;
        self.out.extend(std::iter::repeat_n(' ', width));
    }

    fn query(&mut self, query: &Query, level: usize) {
        self.out.push_str("SELECT ");
        self.out.push_str(&query.fields.join(", "));
        self.newline(level);
        self.out.push_str("FROM ");
        self.out.push_str(&query.sobject);
        if let Some(clause) = &query.where_clause {
            self.newline(level);
            self.out.push_str("WHERE ");
            self.clause(clause, level);
        }
        if let Some(limit) = query.limit {
            self.newline(level);
            let _ = write!(self.out, "LIMIT {limit}");
        }
    }

    fn clause(&mut self, clause: &WhereClause, level: usize) {
        let indented = self
            .options
            .flags
            .contains(FormatFlags::WHERE_OPERATORS_INDENTED);
        for (_, node) in clause {
            self.condition(node.condition(), level);
            if let Some(op) = node.op() {
                if indented {
                    self.newline(level + 1);
                    let _ = write!(self.out, "{op} ");
                } else {
                    let _ = write!(self.out, " {op} ");
                }
            }
        }
    }

    fn condition(&mut self, condition: &Condition, level: usize) {
        self.out.extend(std::iter::repeat_n('(', condition.open_parens as usize));
        if condition.negated {
            self.out.push_str("NOT ");
        }
        self.out.extend(std::iter::repeat_n('(', condition.inner_parens as usize));
        match &condition.predicate {
            Predicate::Membership {
                field,
                op,
                source: MembershipSource::Subquery(query),
            } => {
                let _ = write!(self.out, "{field} {} (", op.as_str());
                if self
                    .options
                    .flags
                    .contains(FormatFlags::SUBQUERY_PARENS_OWN_LINE)
                {
                    self.newline(level + 1);
                    self.query(query, level + 1);
                    self.newline(level);
                } else {
                    self.query(query, level + 1);
                }
                self.out.push(')');
            }
            predicate => {
                let _ = write!(self.out, "{predicate}");
            }
        }
        self.out.extend(std::iter::repeat_n(')', condition.close_parens as usize));
    }
}
