//! Simplified notation
//!
//! Line-oriented input of the enumerative synthesizer:
//!
//! ```text
//! bitwidth 4
//! spec 1 x -> (add x x)
//! lib add, const 4, (ult, 2, x y -> (ite (ult x y) 1:4 0:4))
//! algo list
//! timing
//! synth
//! quit
//! ```
//!
//! The synthesizer has no boolean to bit-vector coercion, so relational
//! operators listed in the library are turned into small `ite` functions.
use std::{fmt, io::Write};

use bvlang::{
    Expr, Ident, LibraryEntry, Program,
    ops::{ITE, Relation},
};
use num_bigint::BigInt;

use crate::{
    error::{Error, Result},
    term::Term,
};

/// Control lines ending every document.
pub const TRAILER: [&str; 4] = ["algo list", "timing", "synth", "quit"];

/// Renders an expression in the synthesizer's syntax.
///
/// Identical to the input syntax except for `extract`, whose bounds are
/// written as bare numbers.
pub fn expr_term(expr: &Expr) -> Result<Term> {
    match expr {
        Expr::Ident(ident) => Ok(Term::atom(ident.as_str())),
        Expr::Literal(literal) => Ok(Term::atom(literal.to_string())),
        Expr::App(app) if app.is_extract() => {
            let view = app
                .extract_view()
                .ok_or_else(|| Error::MalformedExtract(app.to_string()))?;
            Ok(Term::app(
                app.op.as_str(),
                [
                    Term::atom(view.low.value.to_string()),
                    Term::atom(view.high.value.to_string()),
                    expr_term(view.operand)?,
                ],
            ))
        }
        Expr::App(app) => Ok(Term::app(
            app.op.as_str(),
            app.args.iter().map(expr_term).collect::<Result<Vec<_>>>()?,
        )),
    }
}

/// One comma-separated item of the `lib` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LibItem {
    Operator(String),
    Constant {
        width: u32,
        value: Option<BigInt>,
    },
    Function {
        name: String,
        params: Vec<String>,
        body: Term,
    },
}

impl LibItem {
    pub fn from_entry(entry: &LibraryEntry, bit_width: u32) -> Result<Self> {
        Ok(match entry {
            LibraryEntry::Operator(name) => match Relation::from_str(name.as_str()) {
                Some(relation) => Self::relation(relation, bit_width),
                None => LibItem::Operator(name.to_string()),
            },
            LibraryEntry::Constant { width, value } => LibItem::Constant {
                width: *width,
                value: value.as_ref().map(|literal| literal.value.clone()),
            },
            LibraryEntry::Function { name, params, body } => LibItem::Function {
                name: name.to_string(),
                params: params.iter().map(Ident::to_string).collect(),
                body: expr_term(body)?,
            },
        })
    }

    /// `(op, 2, x y -> (ite (op x y) 1:W 0:W))`
    fn relation(relation: Relation, bit_width: u32) -> Self {
        let name = relation.to_str();
        let test = Term::app(name, [Term::atom("x"), Term::atom("y")]);
        let body = Term::app(
            ITE,
            [
                test,
                Term::atom(format!("1:{}", bit_width)),
                Term::atom(format!("0:{}", bit_width)),
            ],
        );
        LibItem::Function {
            name: name.to_string(),
            params: vec!["x".to_string(), "y".to_string()],
            body,
        }
    }
}

impl fmt::Display for LibItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibItem::Operator(name) => write!(f, "{}", name),
            LibItem::Constant { width, value } => match value {
                Some(value) => write!(f, "const {} {}", width, value),
                None => write!(f, "const {}", width),
            },
            LibItem::Function { name, params, body } => {
                write!(f, "({}, {}, ", name, params.len())?;
                for param in params {
                    write!(f, "{} ", param)?;
                }
                write!(f, "-> {})", body)
            }
        }
    }
}

/// A complete simplified-notation document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotationDocument {
    pub bit_width: u32,
    pub inputs: Vec<String>,
    pub body: Term,
    pub library: Vec<LibItem>,
}

impl NotationDocument {
    pub fn from_program(program: &Program) -> Result<Self> {
        let bit_width = program.spec.bit_width;
        let library = program
            .lib
            .iter()
            .map(|entry| LibItem::from_entry(entry, bit_width))
            .collect::<Result<Vec<_>>>()?;

        Ok(NotationDocument {
            bit_width,
            inputs: program.spec.inputs.iter().map(Ident::to_string).collect(),
            body: expr_term(&program.spec.body)?,
            library,
        })
    }

    /// `x y -> body`, the function part of the `spec` line.
    pub fn spec_function(&self) -> String {
        let mut text = String::new();
        for input in &self.inputs {
            text.push_str(input);
            text.push(' ');
        }
        text.push_str("-> ");
        text.push_str(&self.body.to_string());
        text
    }

    /// Arguments of the shape-feasibility checker: bit width, input count,
    /// spec function, then one argument per library item.
    pub fn feasibility_arguments(&self) -> Vec<String> {
        let mut args = vec![
            self.bit_width.to_string(),
            self.inputs.len().to_string(),
            self.spec_function(),
        ];
        args.extend(self.library.iter().map(LibItem::to_string));
        args
    }
}

impl fmt::Display for NotationDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "bitwidth {}", self.bit_width)?;
        writeln!(f, "spec {} {}", self.inputs.len(), self.spec_function())?;
        write!(f, "lib ")?;
        for (i, item) in self.library.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", item)?;
        }
        writeln!(f)?;
        for line in TRAILER {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

pub fn to_notation(program: &Program) -> Result<String> {
    Ok(NotationDocument::from_program(program)?.to_string())
}

pub fn write_notation(program: &Program, out: &mut impl Write) -> Result<()> {
    let document = NotationDocument::from_program(program)?;
    write!(out, "{}", document)?;
    Ok(())
}

pub fn feasibility_arguments(program: &Program) -> Result<Vec<String>> {
    Ok(NotationDocument::from_program(program)?.feasibility_arguments())
}
