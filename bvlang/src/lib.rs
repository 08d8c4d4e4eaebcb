//! Front end for bit-vector synthesis problem descriptions.
//!
//! A description holds a `spec` block (the function to realize) and a `lib`
//! block (the operators, constants and custom functions a solution may use,
//! with exact multiplicities):
//!
//! ```text
//! (spec (2) (8) x y (sub x (and x y)))
//! (lib and sub (const 8) (fun twice a (add a a)))
//! ```
//!
//! [`parser`] turns text into generic forms and then into a [`program::Program`];
//! the back ends in `bvgen` only ever consume the program model.
pub mod expr;
pub mod ops;
pub mod parser;
pub mod program;
pub mod utils;

pub use expr::{App, Expr, Ident, Literal};
pub use program::{LibraryBlock, LibraryEntry, Program, SpecBlock};
pub use utils::{Error, LexError, Result, StructuralError};
