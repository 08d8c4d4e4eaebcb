//! Operator names with special meaning to the back ends.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{EnumIter, IntoEnumIterator};

pub const EXTRACT: &str = "extract";
pub const ITE: &str = "ite";
pub const CONCAT: &str = "concat";
pub const NOT: &str = "not";
pub const NEG: &str = "neg";

/// Relational operators. They produce a boolean, so every back end has to
/// widen their result to a bit-vector before it can be used as a value.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, EnumIter)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Relation {
    /// Equality
    Eq,
    /// Disequality
    Neq,
    /// Unsigned less than
    Ult,
    /// Unsigned less or equal
    Ule,
    /// Unsigned greater than
    Ugt,
    /// Unsigned greater or equal
    Uge,
    /// Signed less than
    Slt,
    /// Signed less or equal
    Sle,
    /// Signed greater than
    Sgt,
    /// Signed greater or equal
    Sge,
}

impl Relation {
    /// Creates a [`Relation`] from its operator name.
    pub fn from_str(s: &str) -> Option<Self> {
        Relation::iter().find(|op| op.to_str() == s)
    }

    /// Returns the operator name of the [`Relation`].
    pub fn to_str(&self) -> &'static str {
        match self {
            Relation::Eq => "eq",
            Relation::Neq => "neq",
            Relation::Ult => "ult",
            Relation::Ule => "ule",
            Relation::Ugt => "ugt",
            Relation::Uge => "uge",
            Relation::Slt => "slt",
            Relation::Sle => "sle",
            Relation::Sgt => "sgt",
            Relation::Sge => "sge",
        }
    }
}

/// Number of operands taken by a built-in operator.
///
/// Custom functions carry their own parameter list and never go through here.
pub fn builtin_arity(name: &str) -> usize {
    match name {
        ITE => 3,
        NOT | NEG => 1,
        _ => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_names_roundtrip() {
        for relation in Relation::iter() {
            assert_eq!(Relation::from_str(relation.to_str()), Some(relation));
        }
        assert_eq!(Relation::from_str("add"), None);
    }

    #[test]
    fn arity_table() {
        assert_eq!(builtin_arity("ite"), 3);
        assert_eq!(builtin_arity("not"), 1);
        assert_eq!(builtin_arity("neg"), 1);
        assert_eq!(builtin_arity("add"), 2);
        assert_eq!(builtin_arity("ult"), 2);
    }
}
