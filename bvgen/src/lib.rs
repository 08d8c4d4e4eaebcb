//! Back ends for bit-vector synthesis problems.
//!
//! A [`bvlang::Program`] can be emitted in two forms:
//!
//! - the line-oriented notation of an enumerative synthesizer ([`notation`]),
//!   or its argument vector for the shape-feasibility checker;
//! - a SyGuS problem whose grammar enforces the library's multiplicities
//!   through a usage tag carried in the high bits ([`sygus`]).
//!
//! Both are pure functions of the program and a [`TranslateConfig`].
//!
//! ```
//! use bvgen::{Target, TranslateConfig, translate};
//!
//! let program = bvlang::parser::parse_program("(spec (1) (4) x (add x x)) (lib add)").unwrap();
//! let text = translate(&program, Target::Notation, &TranslateConfig::default()).unwrap();
//! assert!(text.starts_with("bitwidth 4\nspec 1 x -> (add x x)\nlib add\n"));
//! ```
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

pub mod bits;
pub mod config;
pub mod error;
pub mod notation;
pub mod sygus;
pub mod term;

pub use config::{LiteralPolicy, TranslateConfig};
pub use error::{Error, Result};
pub use notation::{NotationDocument, feasibility_arguments, to_notation, write_notation};
pub use sygus::{SygusProblem, compile, to_sygus, write_sygus};

/// Output form of a translation.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, EnumIter)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Target {
    Notation,
    Sygus,
    /// Shape-feasibility arguments, one per line.
    Feasibility,
}

impl Target {
    pub fn from_str(s: &str) -> Option<Self> {
        Target::iter().find(|target| target.to_str() == s)
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Target::Notation => "notation",
            Target::Sygus => "sygus",
            Target::Feasibility => "feasibility",
        }
    }

    /// File extension used when writing next to other outputs.
    pub fn extension(&self) -> &'static str {
        match self {
            Target::Notation => "txt",
            Target::Sygus => "sl",
            Target::Feasibility => "args",
        }
    }
}

pub fn translate(
    program: &bvlang::Program,
    target: Target,
    config: &TranslateConfig,
) -> Result<String> {
    match target {
        Target::Notation => to_notation(program),
        Target::Sygus => to_sygus(program, config),
        Target::Feasibility => {
            let mut text = String::new();
            for argument in feasibility_arguments(program)? {
                text.push_str(&argument);
                text.push('\n');
            }
            Ok(text)
        }
    }
}
