use num_bigint::BigInt;
use strum::EnumIs;
use thiserror::Error;

#[derive(Debug, EnumIs, Error)]
pub enum Error {
    /// The input could not be read as a program.
    #[error(transparent)]
    Language(#[from] bvlang::Error),

    /// A literal does not fit its bit width and the configuration forbids truncation.
    #[error("Literal `{value}` does not fit in {width} bits.")]
    Encoding { value: BigInt, width: u32 },

    /// A literal whose effective width is zero.
    #[error("Literal `{0}` has a zero bit width and cannot be emitted.")]
    ZeroWidthLiteral(String),

    /// An `extract` without two literal bounds and one operand.
    #[error("Malformed extract `{0}`: expected `(extract low high operand)` with literal bounds.")]
    MalformedExtract(String),

    /// A kind is used more often than its usage counter can represent.
    #[error(
        "Library operator `{kind}` can be used {count} times in one derivation, but {tag_bits}-bit usage counters hold at most {max}."
    )]
    TagOverflow {
        kind: String,
        count: u64,
        tag_bits: u32,
        max: u32,
    },

    /// Two free constants of different widths.
    #[error(
        "The library declares free constants of different widths ({first} and {second} bits)."
    )]
    ConflictingConstantWidths { first: u32, second: u32 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
