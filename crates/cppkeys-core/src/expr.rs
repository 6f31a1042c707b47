//! Antecedent expressions.
//!
//! A rule's condition is a tagged tree over flag states. Documents write it as
//! text in a small preprocessor-flavoured syntax:
//!
//! ```text
//! BIOLOGY && !PISCES
//! defined RVTK_DEBUG && (BULK_FLUX || defined(ONLINE))
//! ```
//!
//! `!` binds tighter than `&&`, which binds tighter than `||`.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::flag::FlagId;

/// A boolean condition over flag states.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Expr {
    /// Literal `true` / `false`
    Const(bool),
    /// The state of one flag
    Flag(FlagId),
    /// Negation
    Not(Box<Expr>),
    /// Conjunction; empty is true
    All(Vec<Expr>),
    /// Disjunction; empty is false
    Any(Vec<Expr>),
}

impl Expr {
    /// Reference a flag.
    pub fn flag(id: FlagId) -> Self {
        Self::Flag(id)
    }

    /// Negate an expression.
    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Expr) -> Self {
        Self::Not(Box::new(inner))
    }

    /// Parse the textual form. The result is always [normalized](Expr::normalized).
    pub fn parse(text: &str) -> Result<Self> {
        Ok(Parser::new(text).parse()?.normalized())
    }

    /// Canonical shape of the tree: nested conjunctions and disjunctions are
    /// flattened, one-item lists collapse to their item and empty lists
    /// become constants. Evaluates exactly like `self`.
    pub fn normalized(&self) -> Expr {
        match self {
            Expr::Const(_) | Expr::Flag(_) => self.clone(),
            Expr::Not(inner) => Expr::not(inner.normalized()),
            Expr::All(items) => Self::flatten(items, true),
            Expr::Any(items) => Self::flatten(items, false),
        }
    }

    fn flatten(items: &[Expr], conjunction: bool) -> Expr {
        let mut flat = Vec::with_capacity(items.len());
        for item in items {
            match (item.normalized(), conjunction) {
                (Expr::All(inner), true) | (Expr::Any(inner), false) => flat.extend(inner),
                (other, _) => flat.push(other),
            }
        }
        match flat.len() {
            0 => Expr::Const(conjunction),
            1 => flat.remove(0),
            _ if conjunction => Expr::All(flat),
            _ => Expr::Any(flat),
        }
    }

    /// Evaluate against a partial assignment.
    ///
    /// Returns `None` when any referenced flag is unresolved: an antecedent
    /// only fires once everything it reads is known.
    pub fn evaluate<F>(&self, lookup: &F) -> Option<bool>
    where
        F: Fn(&FlagId) -> Option<bool>,
    {
        match self {
            Expr::Const(value) => Some(*value),
            Expr::Flag(id) => lookup(id),
            Expr::Not(inner) => inner.evaluate(lookup).map(|v| !v),
            Expr::All(items) => {
                let mut result = true;
                for item in items {
                    result &= item.evaluate(lookup)?;
                }
                Some(result)
            }
            Expr::Any(items) => {
                let mut result = false;
                for item in items {
                    result |= item.evaluate(lookup)?;
                }
                Some(result)
            }
        }
    }

    /// Every flag the expression reads.
    pub fn flags(&self) -> BTreeSet<&FlagId> {
        let mut out = BTreeSet::new();
        self.collect_flags(&mut out);
        out
    }

    fn collect_flags<'a>(&'a self, out: &mut BTreeSet<&'a FlagId>) {
        match self {
            Expr::Const(_) => {}
            Expr::Flag(id) => {
                out.insert(id);
            }
            Expr::Not(inner) => inner.collect_flags(out),
            Expr::All(items) | Expr::Any(items) => {
                for item in items {
                    item.collect_flags(out);
                }
            }
        }
    }

    fn fmt_prec(&self, f: &mut fmt::Formatter<'_>, parent: u8) -> fmt::Result {
        // 0 = or, 1 = and, 2 = unary
        match self {
            Expr::Const(value) => write!(f, "{value}"),
            Expr::Flag(id) => write!(f, "{id}"),
            Expr::Not(inner) => {
                f.write_str("!")?;
                inner.fmt_prec(f, 2)
            }
            Expr::All(items) => fmt_joined(f, items, " && ", 1, parent, "true"),
            Expr::Any(items) => fmt_joined(f, items, " || ", 0, parent, "false"),
        }
    }
}

fn fmt_joined(
    f: &mut fmt::Formatter<'_>,
    items: &[Expr],
    sep: &str,
    prec: u8,
    parent: u8,
    empty: &str,
) -> fmt::Result {
    match items {
        [] => f.write_str(empty),
        [single] => single.fmt_prec(f, parent),
        _ => {
            let wrap = parent > prec;
            if wrap {
                f.write_str("(")?;
            }
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(sep)?;
                }
                item.fmt_prec(f, prec + 1)?;
            }
            if wrap {
                f.write_str(")")?;
            }
            Ok(())
        }
    }
}

/// Renders the normalized tree, so the text parses back to `self.normalized()`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.normalized().fmt_prec(f, 0)
    }
}

impl TryFrom<String> for Expr {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Expr> for String {
    fn from(expr: Expr) -> Self {
        expr.to_string()
    }
}

impl std::str::FromStr for Expr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Not,
    And,
    Or,
    LParen,
    RParen,
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            pos: 0,
        }
    }

    fn error(&self, offset: usize, reason: impl Into<String>) -> Error {
        Error::InvalidExpression {
            source_text: self.source.to_string(),
            offset,
            reason: reason.into(),
        }
    }

    fn tokenize(&mut self) -> Result<()> {
        let bytes = self.source.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let c = bytes[i];
            match c {
                b' ' | b'\t' | b'\n' | b'\r' => i += 1,
                b'(' => {
                    self.tokens.push((i, Token::LParen));
                    i += 1;
                }
                b')' => {
                    self.tokens.push((i, Token::RParen));
                    i += 1;
                }
                b'!' => {
                    self.tokens.push((i, Token::Not));
                    i += 1;
                }
                b'&' if bytes.get(i + 1) == Some(&b'&') => {
                    self.tokens.push((i, Token::And));
                    i += 2;
                }
                b'|' if bytes.get(i + 1) == Some(&b'|') => {
                    self.tokens.push((i, Token::Or));
                    i += 2;
                }
                c if c == b'_' || c.is_ascii_alphanumeric() => {
                    let start = i;
                    while i < bytes.len() && (bytes[i] == b'_' || bytes[i].is_ascii_alphanumeric())
                    {
                        i += 1;
                    }
                    self.tokens
                        .push((start, Token::Ident(self.source[start..i].to_string())));
                }
                _ => return Err(self.error(i, format!("unexpected character '{}'", c as char))),
            }
        }
        Ok(())
    }

    fn parse(mut self) -> Result<Expr> {
        self.tokenize()?;
        if self.tokens.is_empty() {
            return Err(self.error(0, "empty expression"));
        }
        let expr = self.parse_or()?;
        if let Some((offset, token)) = self.tokens.get(self.pos) {
            return Err(self.error(*offset, format!("unexpected token {token:?}")));
        }
        Ok(expr)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(o, _)| *o)
            .unwrap_or(self.source.len())
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut items = vec![self.parse_and()?];
        while self.peek() == Some(&Token::Or) {
            self.pos += 1;
            items.push(self.parse_and()?);
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            Expr::Any(items)
        })
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut items = vec![self.parse_unary()?];
        while self.peek() == Some(&Token::And) {
            self.pos += 1;
            items.push(self.parse_unary()?);
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            Expr::All(items)
        })
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let offset = self.offset();
        match self.tokens.get(self.pos).map(|(_, t)| t.clone()) {
            Some(Token::Not) => {
                self.pos += 1;
                Ok(Expr::not(self.parse_unary()?))
            }
            Some(Token::LParen) => {
                self.pos += 1;
                let inner = self.parse_or()?;
                self.expect_rparen()?;
                Ok(inner)
            }
            Some(Token::Ident(word)) if word == "defined" => {
                self.pos += 1;
                if self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    let id = self.parse_flag()?;
                    self.expect_rparen()?;
                    Ok(id)
                } else {
                    self.parse_flag()
                }
            }
            Some(Token::Ident(word)) if word == "true" => {
                self.pos += 1;
                Ok(Expr::Const(true))
            }
            Some(Token::Ident(word)) if word == "false" => {
                self.pos += 1;
                Ok(Expr::Const(false))
            }
            Some(Token::Ident(_)) => self.parse_flag(),
            Some(token) => Err(self.error(offset, format!("unexpected token {token:?}"))),
            None => Err(self.error(offset, "unexpected end of expression")),
        }
    }

    fn parse_flag(&mut self) -> Result<Expr> {
        let offset = self.offset();
        match self.tokens.get(self.pos).map(|(_, t)| t.clone()) {
            Some(Token::Ident(word)) => {
                self.pos += 1;
                let id = FlagId::new(word.as_str())
                    .map_err(|_| self.error(offset, format!("'{word}' is not a flag identifier")))?;
                Ok(Expr::Flag(id))
            }
            _ => Err(self.error(offset, "expected a flag identifier")),
        }
    }

    fn expect_rparen(&mut self) -> Result<()> {
        if self.peek() == Some(&Token::RParen) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(self.offset(), "expected ')'"))
        }
    }
}
