//! Expression trees
//!
//! Identifiers, bit-width annotated literals and variadic applications. An
//! application exclusively owns its arguments; arity is a property of the
//! operator and is never checked here.
use std::{fmt, str::FromStr};

use num_bigint::BigInt;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIs, EnumTryAs};

use crate::ops;

/// A name token: variable reference, operator name or function name.
///
/// Always non-empty and never starting with a digit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ident(String);

impl Ident {
    /// Creates an identifier, returning `None` if `name` is not a valid name token.
    pub fn new(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) if Self::is_start_char(first) => {
                chars.all(Self::is_continue_char).then(|| Ident(name.to_string()))
            }
            _ => None,
        }
    }

    /// Builds an identifier from a token already validated by the lexer.
    pub(crate) fn from_token(token: &str) -> Self {
        debug_assert!(Self::new(token).is_some(), "invalid identifier token {token:?}");
        Ident(token.to_string())
    }

    pub fn is_start_char(c: char) -> bool {
        c.is_alphabetic() || c == '_' || c == '.'
    }

    pub fn is_continue_char(c: char) -> bool {
        c.is_alphanumeric() || c == '_' || c == '.'
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Ident {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ident::new(s).ok_or_else(|| format!("`{s}` is not a valid identifier"))
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A signed integer with an optional explicit bit width.
///
/// A missing width means the width is inferred from the surrounding context
/// when the literal is emitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Literal {
    pub value: BigInt,
    pub width: Option<u32>,
}

impl Literal {
    pub fn new(value: impl Into<BigInt>, width: Option<u32>) -> Self {
        Self {
            value: value.into(),
            width,
        }
    }

    /// A literal carrying an explicit bit width.
    pub fn sized(value: impl Into<BigInt>, width: u32) -> Self {
        Self::new(value, Some(width))
    }

    /// A literal whose width is inferred from context.
    pub fn r#unsized(value: impl Into<BigInt>) -> Self {
        Self::new(value, None)
    }

    /// Interprets the literal as a non-negative `u32`, ignoring its width.
    pub fn as_u32(&self) -> Option<u32> {
        u32::try_from(&self.value).ok()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.width {
            Some(width) => write!(f, "{}:{}", self.value, width),
            None => write!(f, "{}", self.value),
        }
    }
}

/// Application of an operator (or custom function) to its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct App {
    pub op: Ident,
    pub args: Vec<Expr>,
}

/// Borrowed view over a well-formed `(extract low high operand)` application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractView<'a> {
    pub low: &'a Literal,
    pub high: &'a Literal,
    pub operand: &'a Expr,
}

impl App {
    pub fn new(op: Ident, args: Vec<Expr>) -> Self {
        Self { op, args }
    }

    pub fn is_extract(&self) -> bool {
        self.op.as_str() == ops::EXTRACT
    }

    /// Returns the bound positions of an `extract` application.
    ///
    /// `None` when this is not an `extract`, or when it does not have exactly two
    /// literal bounds followed by one operand.
    pub fn extract_view(&self) -> Option<ExtractView<'_>> {
        if !self.is_extract() {
            return None;
        }
        match self.args.as_slice() {
            [Expr::Literal(low), Expr::Literal(high), operand] => Some(ExtractView {
                low,
                high,
                operand,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.op)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        write!(f, ")")
    }
}

/// An expression of the input language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, EnumTryAs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Expr {
    Ident(Ident),
    Literal(Literal),
    App(App),
}

impl Expr {
    /// Shorthand for an identifier reference. Returns `None` for invalid names.
    pub fn ident(name: &str) -> Option<Self> {
        Ident::new(name).map(Expr::Ident)
    }

    pub fn app(op: Ident, args: impl IntoIterator<Item = Expr>) -> Self {
        Expr::App(App::new(op, args.into_iter().collect()))
    }
}

impl From<Literal> for Expr {
    fn from(value: Literal) -> Self {
        Expr::Literal(value)
    }
}

impl From<Ident> for Expr {
    fn from(value: Ident) -> Self {
        Expr::Ident(value)
    }
}

/// Renders the expression back in the input syntax.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(ident) => write!(f, "{}", ident),
            Expr::Literal(literal) => write!(f, "{}", literal),
            Expr::App(app) => write!(f, "{}", app),
        }
    }
}
