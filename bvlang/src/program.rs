//! Program model
//!
//! A program is exactly one `spec` block (the function to synthesize) and one
//! `lib` block (the multiset of building blocks a solution must use). Blocks
//! are interpreted from the generic forms produced by the reader; every shape
//! problem is rejected here so the back ends can match exhaustively.
use std::fmt;

use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIs, EnumIter, IntoEnumIterator};

use crate::{
    expr::{App, Expr, Ident, Literal},
    utils::{Error, Result, StructuralError},
};

/// Tags accepted at the top level of a program.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, EnumIter)]
pub enum BlockTag {
    Spec,
    Lib,
}

impl BlockTag {
    pub fn from_str(s: &str) -> Option<Self> {
        BlockTag::iter().find(|tag| tag.to_str() == s)
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            BlockTag::Spec => "spec",
            BlockTag::Lib => "lib",
        }
    }
}

/// Heads of the parenthesized library entries.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, EnumIter)]
pub enum LibraryTag {
    Const,
    Fun,
}

impl LibraryTag {
    pub fn from_str(s: &str) -> Option<Self> {
        LibraryTag::iter().find(|tag| tag.to_str() == s)
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            LibraryTag::Const => "const",
            LibraryTag::Fun => "fun",
        }
    }
}

/// The target function: its inputs, working bit width and reference body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpecBlock {
    pub bit_width: u32,
    pub inputs: Vec<Ident>,
    pub body: Expr,
}

impl SpecBlock {
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    fn from_args(args: Vec<Expr>) -> Result<Self> {
        if args.len() < 3 {
            let rendered: String = args.iter().map(|arg| format!(" {}", arg)).collect();
            let form = format!("({}{})", BlockTag::Spec.to_str(), rendered);
            return Err(StructuralError::MalformedSpec(form).into());
        }

        let declared = integer_arg(&args[0], "input count")? as usize;
        let bit_width = integer_arg(&args[1], "bit width")?;
        if bit_width == 0 {
            return Err(StructuralError::InvalidBitWidth.into());
        }

        let supplied = args.len() - 3;
        if supplied != declared {
            return Err(StructuralError::InputCountMismatch { declared, supplied }.into());
        }

        let mut rest = args.into_iter().skip(2);
        let inputs = rest
            .by_ref()
            .take(declared)
            .map(|e| ident_arg(e, "spec input"))
            .collect::<Result<Vec<_>>>()?;
        let body = rest
            .next()
            .ok_or(StructuralError::InputCountMismatch { declared, supplied })?;

        Ok(SpecBlock {
            bit_width,
            inputs,
            body,
        })
    }
}

impl fmt::Display for SpecBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(spec {} {}", self.input_count(), self.bit_width)?;
        for input in &self.inputs {
            write!(f, " {}", input)?;
        }
        write!(f, " {})", self.body)
    }
}

/// One unit of the library multiset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LibraryEntry {
    /// A built-in operator referenced by name, e.g. `add`.
    Operator(Ident),
    /// A constant of the given width, free when `value` is `None`.
    Constant { width: u32, value: Option<Literal> },
    /// A custom function with named parameters.
    Function {
        name: Ident,
        params: Vec<Ident>,
        body: Expr,
    },
}

impl LibraryEntry {
    pub fn from_expr(expr: Expr) -> Result<Self> {
        match expr {
            Expr::Ident(name) => Ok(LibraryEntry::Operator(name)),
            Expr::Literal(literal) => Err(Error::UnsupportedLibraryForm {
                entry: literal.to_string(),
            }),
            Expr::App(app) => match LibraryTag::from_str(app.op.as_str()) {
                Some(LibraryTag::Const) => Self::constant_from_app(app),
                Some(LibraryTag::Fun) => Self::function_from_app(app),
                None => Err(StructuralError::UnknownLibraryTag(app.op.to_string()).into()),
            },
        }
    }

    fn constant_from_app(app: App) -> Result<Self> {
        let malformed = || StructuralError::MalformedConstant(app.to_string());
        let (width, value) = match app.args.as_slice() {
            [Expr::Literal(width)] => (width, None),
            [Expr::Literal(width), Expr::Literal(value)] => (width, Some(value.clone())),
            _ => return Err(malformed().into()),
        };
        match width.as_u32() {
            Some(width) if width > 0 => Ok(LibraryEntry::Constant { width, value }),
            _ => Err(malformed().into()),
        }
    }

    fn function_from_app(app: App) -> Result<Self> {
        let text = app.to_string();
        let mut args = app.args.into_iter();
        let (Some(name), Some(body)) = (args.next(), args.next_back()) else {
            return Err(StructuralError::MalformedFunction(text).into());
        };
        let name = ident_arg(name, "function name")?;
        let params = args
            .map(|e| ident_arg(e, "function parameter"))
            .collect::<Result<Vec<_>>>()?;

        Ok(LibraryEntry::Function { name, params, body })
    }
}

impl fmt::Display for LibraryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryEntry::Operator(name) => write!(f, "{}", name),
            LibraryEntry::Constant { width, value } => match value {
                Some(value) => write!(f, "(const {} {})", width, value),
                None => write!(f, "(const {})", width),
            },
            LibraryEntry::Function { name, params, body } => {
                write!(f, "(fun {}", name)?;
                for param in params {
                    write!(f, " {}", param)?;
                }
                write!(f, " {})", body)
            }
        }
    }
}

/// Ordered library entries. Order only matters to the simplified notation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LibraryBlock {
    pub entries: Vec<LibraryEntry>,
}

impl LibraryBlock {
    fn from_args(args: Vec<Expr>) -> Result<Self> {
        if args.is_empty() {
            return Err(StructuralError::EmptyLibrary.into());
        }
        let entries = args
            .into_iter()
            .map(LibraryEntry::from_expr)
            .collect::<Result<Vec<_>>>()?;
        Ok(LibraryBlock { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = &LibraryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for LibraryBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(lib")?;
        for entry in &self.entries {
            write!(f, " {}", entry)?;
        }
        write!(f, ")")
    }
}

/// A complete input program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Program {
    pub spec: SpecBlock,
    pub lib: LibraryBlock,
}

impl Program {
    /// Interprets top-level forms, in any order, as a program.
    pub fn from_forms(forms: Vec<App>) -> Result<Self> {
        let mut spec = None;
        let mut lib = None;

        for form in forms {
            let tag = BlockTag::from_str(form.op.as_str())
                .ok_or_else(|| StructuralError::UnknownTag(form.op.to_string()))?;
            match tag {
                BlockTag::Spec if spec.is_some() => {
                    return Err(StructuralError::DuplicateBlock(tag.to_str()).into());
                }
                BlockTag::Lib if lib.is_some() => {
                    return Err(StructuralError::DuplicateBlock(tag.to_str()).into());
                }
                BlockTag::Spec => spec = Some(SpecBlock::from_args(form.args)?),
                BlockTag::Lib => lib = Some(LibraryBlock::from_args(form.args)?),
            }
        }

        let spec = spec.ok_or(StructuralError::MissingBlock(BlockTag::Spec.to_str()))?;
        let lib = lib.ok_or(StructuralError::MissingBlock(BlockTag::Lib.to_str()))?;
        debug!(
            "Program read: {} inputs at {} bits, {} library entries.",
            spec.input_count(),
            spec.bit_width,
            lib.len()
        );

        Ok(Program { spec, lib })
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.spec, self.lib)
    }
}

fn integer_arg(expr: &Expr, context: &'static str) -> Result<u32> {
    let value = match expr {
        Expr::Literal(literal) => literal.as_u32(),
        _ => None,
    };
    value.ok_or_else(|| {
        StructuralError::ExpectedInteger {
            context,
            found: expr.to_string(),
        }
        .into()
    })
}

fn ident_arg(expr: Expr, context: &'static str) -> Result<Ident> {
    match expr {
        Expr::Ident(ident) => Ok(ident),
        other => Err(StructuralError::ExpectedIdentifier {
            context,
            found: other.to_string(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Ident {
        Ident::new(name).unwrap()
    }

    fn var(name: &str) -> Expr {
        Expr::Ident(ident(name))
    }

    fn spec_form(args: Vec<Expr>) -> App {
        App::new(ident("spec"), args)
    }

    fn lib_form(args: Vec<Expr>) -> App {
        App::new(ident("lib"), args)
    }

    fn add_xx() -> Expr {
        Expr::app(ident("add"), [var("x"), var("x")])
    }

    #[test]
    fn forms_are_order_independent() {
        let spec = spec_form(vec![
            Literal::r#unsized(1).into(),
            Literal::r#unsized(4).into(),
            var("x"),
            add_xx(),
        ]);
        let lib = lib_form(vec![var("add")]);

        let a = Program::from_forms(vec![spec.clone(), lib.clone()]).unwrap();
        let b = Program::from_forms(vec![lib, spec]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.spec.bit_width, 4);
        assert_eq!(a.spec.inputs, vec![ident("x")]);
        assert_eq!(a.lib.entries, vec![LibraryEntry::Operator(ident("add"))]);
    }

    #[test]
    fn input_count_must_match_names() {
        let spec = spec_form(vec![
            Literal::r#unsized(2).into(),
            Literal::r#unsized(4).into(),
            var("x"),
            add_xx(),
        ]);
        let err = Program::from_forms(vec![spec, lib_form(vec![var("add")])]).unwrap_err();
        assert!(matches!(
            err,
            Error::Structural(StructuralError::InputCountMismatch {
                declared: 2,
                supplied: 1
            })
        ));
    }

    #[test]
    fn truncated_spec_blocks_are_malformed() {
        let empty = Program::from_forms(vec![spec_form(vec![]), lib_form(vec![var("add")])]);
        match empty.unwrap_err() {
            Error::Structural(StructuralError::MalformedSpec(form)) => assert_eq!(form, "(spec)"),
            other => panic!("expected a malformed spec, got {other:?}"),
        }

        let headless = spec_form(vec![Literal::r#unsized(2).into(), Literal::r#unsized(4).into()]);
        match Program::from_forms(vec![headless, lib_form(vec![var("add")])]).unwrap_err() {
            Error::Structural(StructuralError::MalformedSpec(form)) => {
                assert_eq!(form, "(spec 2 4)")
            }
            other => panic!("expected a malformed spec, got {other:?}"),
        }
    }

    #[test]
    fn zero_bit_width_is_rejected() {
        let spec = spec_form(vec![
            Literal::r#unsized(1).into(),
            Literal::r#unsized(0).into(),
            var("x"),
            var("x"),
        ]);
        let err = Program::from_forms(vec![spec, lib_form(vec![var("add")])]).unwrap_err();
        assert!(matches!(
            err,
            Error::Structural(StructuralError::InvalidBitWidth)
        ));
    }

    #[test]
    fn library_entry_forms() {
        let constant = LibraryEntry::from_expr(Expr::app(
            ident("const"),
            [Literal::r#unsized(8).into(), Literal::r#unsized(3).into()],
        ))
        .unwrap();
        assert_eq!(
            constant,
            LibraryEntry::Constant {
                width: 8,
                value: Some(Literal::r#unsized(3))
            }
        );

        let function = LibraryEntry::from_expr(Expr::app(
            ident("fun"),
            [var("double"), var("a"), Expr::app(ident("add"), [var("a"), var("a")])],
        ))
        .unwrap();
        match function {
            LibraryEntry::Function { name, params, body } => {
                assert_eq!(name, ident("double"));
                assert_eq!(params, vec![ident("a")]);
                assert_eq!(body.to_string(), "(add a a)");
            }
            other => panic!("expected a function, got {other:?}"),
        }
    }

    #[test]
    fn library_entry_errors() {
        let literal = LibraryEntry::from_expr(Literal::r#unsized(3).into()).unwrap_err();
        assert!(literal.is_unsupported_library_form());

        let unknown =
            LibraryEntry::from_expr(Expr::app(ident("mul"), [var("x")])).unwrap_err();
        assert!(matches!(
            unknown,
            Error::Structural(StructuralError::UnknownLibraryTag(ref tag)) if tag == "mul"
        ));

        let constant = LibraryEntry::from_expr(Expr::app(ident("const"), [var("w")])).unwrap_err();
        assert!(matches!(
            constant,
            Error::Structural(StructuralError::MalformedConstant(_))
        ));

        let function = LibraryEntry::from_expr(Expr::app(ident("fun"), [var("f")])).unwrap_err();
        assert!(matches!(
            function,
            Error::Structural(StructuralError::MalformedFunction(_))
        ));
    }

    #[test]
    fn missing_and_duplicate_blocks() {
        let err = Program::from_forms(vec![lib_form(vec![var("add")])]).unwrap_err();
        assert!(matches!(
            err,
            Error::Structural(StructuralError::MissingBlock("spec"))
        ));

        let err = Program::from_forms(vec![
            lib_form(vec![var("add")]),
            lib_form(vec![var("sub")]),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Structural(StructuralError::DuplicateBlock("lib"))
        ));

        let err = Program::from_forms(vec![App::new(ident("synth"), vec![])]).unwrap_err();
        assert!(matches!(
            err,
            Error::Structural(StructuralError::UnknownTag(ref tag)) if tag == "synth"
        ));
    }
}
