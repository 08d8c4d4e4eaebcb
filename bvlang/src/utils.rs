use std::{fmt, ops::Range};

use strum::EnumIs;
use thiserror::Error;

/// A character that cannot start or continue the construct expected at its position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LexError {
    /// Offending character, `None` when the input ended early.
    pub found: Option<char>,
    /// Byte range of the offending input.
    pub span: Range<usize>,
    /// Human-readable description produced by the reader.
    pub message: String,
}

impl LexError {
    pub fn offset(&self) -> usize {
        self.span.start
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.found {
            Some(c) => write!(
                f,
                "unexpected character `{}` at offset {}: {}",
                c.escape_debug(),
                self.span.start,
                self.message
            ),
            None => write!(
                f,
                "unexpected end of input at offset {}: {}",
                self.span.start, self.message
            ),
        }
    }
}

impl std::error::Error for LexError {}

/// The parsed forms do not describe a well-formed program.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIs, Error)]
pub enum StructuralError {
    /// A required top-level block is absent.
    #[error("The program has no `{0}` block.")]
    MissingBlock(&'static str),

    /// A top-level block appears more than once.
    #[error("The program contains more than one `{0}` block.")]
    DuplicateBlock(&'static str),

    /// A top-level form with a tag other than `spec` or `lib`.
    #[error("Unknown top-level tag `{0}`: expected `spec` or `lib`.")]
    UnknownTag(String),

    /// The spec block does not supply as many input names as it declares.
    #[error(
        "The spec block declares {declared} inputs but supplies {supplied} names before its body."
    )]
    InputCountMismatch { declared: usize, supplied: usize },

    /// The spec block bit width is zero.
    #[error("The spec block must declare a positive bit width.")]
    InvalidBitWidth,

    /// An identifier was required.
    #[error("Expected an identifier for the {context}, found `{found}`.")]
    ExpectedIdentifier {
        context: &'static str,
        found: String,
    },

    /// A non-negative integer was required.
    #[error("Expected a non-negative integer for the {context}, found `{found}`.")]
    ExpectedInteger {
        context: &'static str,
        found: String,
    },

    /// The library block has no entries.
    #[error("The library block lists no entries.")]
    EmptyLibrary,

    /// A parenthesized library entry whose head is neither `const` nor `fun`.
    #[error("Unknown library form `{0}`: expected `const` or `fun`.")]
    UnknownLibraryTag(String),

    /// A `const` entry with the wrong shape.
    #[error("Malformed constant `{0}`: expected `(const width)` or `(const width value)`.")]
    MalformedConstant(String),

    /// A `fun` entry with the wrong shape.
    #[error("Malformed function `{0}`: expected `(fun name params... body)`.")]
    MalformedFunction(String),

    /// A `spec` block missing its count, width or body.
    #[error("Malformed spec `{0}`: expected `(spec count width inputs... body)`.")]
    MalformedSpec(String),
}

#[derive(Debug, EnumIs, Error)]
pub enum Error {
    /// The input text is not a sequence of well-formed expressions.
    #[error("Parse error: {0}")]
    Lex(#[from] LexError),

    /// The expressions do not form a valid program.
    #[error("Structural error: {0}")]
    Structural(#[from] StructuralError),

    /// A library entry that is neither an operator name nor a tagged form.
    #[error(
        "Unsupported library entry `{entry}`: expected an operator name, `(const ...)` or `(fun ...)`."
    )]
    UnsupportedLibraryForm { entry: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
