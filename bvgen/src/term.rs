//! S-expression fragments.
//!
//! Back ends assemble their output from [`Term`]s instead of concatenating
//! strings, so every opening parenthesis is matched by construction.
use std::fmt;

use bvlang::ops::CONCAT;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Atom(String),
    List(Vec<Term>),
}

impl Term {
    pub fn atom(text: impl Into<String>) -> Self {
        Term::Atom(text.into())
    }

    pub fn list(items: impl IntoIterator<Item = Term>) -> Self {
        Term::List(items.into_iter().collect())
    }

    /// `(head args...)`
    pub fn app(head: impl Into<String>, args: impl IntoIterator<Item = Term>) -> Self {
        let mut items = vec![Term::atom(head)];
        items.extend(args);
        Term::List(items)
    }

    /// Like [`Term::app`], but a call without arguments is the bare head.
    pub fn call(head: impl Into<String>, args: impl IntoIterator<Item = Term>) -> Self {
        match Term::app(head, args) {
            Term::List(mut items) if items.len() == 1 => items.remove(0),
            term => term,
        }
    }

    /// `(_ BitVec width)`
    pub fn bv_sort(width: u32) -> Self {
        Term::app("_", [Term::atom("BitVec"), Term::atom(width.to_string())])
    }

    /// `((_ extract high low) operand)`
    pub fn extract(high: impl fmt::Display, low: impl fmt::Display, operand: Term) -> Self {
        let index = Term::app(
            "_",
            [
                Term::atom("extract"),
                Term::atom(high.to_string()),
                Term::atom(low.to_string()),
            ],
        );
        Term::list([index, operand])
    }

    /// `(concat high low)`
    pub fn concat(high: Term, low: Term) -> Self {
        Term::app(CONCAT, [high, low])
    }

    /// `((name sort) ...)` parameter list of a function signature.
    pub fn params<'a>(names: impl IntoIterator<Item = &'a str>, sort: &Term) -> Self {
        Term::list(
            names
                .into_iter()
                .map(|name| Term::list([Term::atom(name), sort.clone()])),
        )
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Atom(text) => f.write_str(text),
            Term::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_nested_lists() {
        let x = Term::atom("x");
        assert_eq!(Term::bv_sort(8).to_string(), "(_ BitVec 8)");
        assert_eq!(
            Term::extract(7, 4, x.clone()).to_string(),
            "((_ extract 7 4) x)"
        );
        assert_eq!(
            Term::concat(Term::atom("#b00"), x).to_string(),
            "(concat #b00 x)"
        );
        assert_eq!(Term::list([]).to_string(), "()");
        assert_eq!(Term::app("spec", []).to_string(), "(spec)");
        assert_eq!(Term::call("spec", []).to_string(), "spec");
        assert_eq!(
            Term::call("spec", [Term::atom("x")]).to_string(),
            "(spec x)"
        );
    }

    #[test]
    fn parameter_lists() {
        let params = Term::params(["x", "y"], &Term::bv_sort(4));
        assert_eq!(
            params.to_string(),
            "((x (_ BitVec 4)) (y (_ BitVec 4)))"
        );
        assert_eq!(Term::params([], &Term::bv_sort(4)).to_string(), "()");
    }
}
