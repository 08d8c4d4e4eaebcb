//! Partition of a library block into kinds.
//!
//! A kind is one distinct library item together with the number of times it
//! appears. Operators are keyed by name, custom functions by their helper
//! name (`cust_<name>`) and valued constants by their `#b` literal, so two
//! spellings of the same constant share a kind.
use bvlang::{
    LibraryBlock, LibraryEntry,
    ops::{ITE, Relation, builtin_arity},
};
use log::debug;
use num_bigint::BigInt;

use super::{CUSTOM_PREFIX, ExprEncoder, define_fun, grammar, smt_operator};
use crate::{
    bits,
    config::TranslateConfig,
    error::{Error, Result},
    term::Term,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindForm {
    /// Applied through an `op_<key>` wrapper.
    Operator {
        smt_name: String,
        arity: usize,
        /// Boolean result that has to be widened with an `ite`.
        relation: bool,
    },
    /// Leaf of every nonterminal; never counted.
    FixedConstant { literal: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Kind {
    pub key: String,
    pub count: u32,
    pub form: KindForm,
}

impl Kind {
    pub fn is_operator(&self) -> bool {
        matches!(self.form, KindForm::Operator { .. })
    }

    pub fn wrapper_name(&self) -> String {
        format!("op_{}", self.key)
    }

    /// Operands taken by the wrapper; zero for constants.
    pub fn arity(&self) -> usize {
        match self.form {
            KindForm::Operator { arity, .. } => arity,
            KindForm::FixedConstant { .. } => 0,
        }
    }

    /// Number of uses a nonterminal may still hand out for this kind.
    pub fn budget(&self) -> u32 {
        if self.is_operator() { self.count } else { 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    /// Kinds in order of first appearance. Kind `i` owns tag bits
    /// `i * tag_bits .. (i + 1) * tag_bits`.
    pub kinds: Vec<Kind>,
    /// Width of the free constant, if the library declares one.
    pub free_constant_width: Option<u32>,
    /// `define-fun` of every custom function, in order of first appearance.
    pub helpers: Vec<Term>,
    pub tag_bits: u32,
    pub tag_width: u32,
}

impl Library {
    pub fn partition(
        lib: &LibraryBlock,
        encoder: &ExprEncoder,
        config: &TranslateConfig,
    ) -> Result<Self> {
        let mut library = Library {
            kinds: Vec::new(),
            free_constant_width: None,
            helpers: Vec::new(),
            tag_bits: config.tag_bits,
            tag_width: config.tag_bits,
        };
        let value_sort = Term::bv_sort(encoder.bit_width);

        for entry in lib.iter() {
            match entry {
                LibraryEntry::Operator(name) => {
                    let name = name.as_str();
                    library.count(name.to_string(), || KindForm::Operator {
                        smt_name: smt_operator(name, false),
                        arity: builtin_arity(name),
                        relation: Relation::from_str(name).is_some(),
                    });
                }
                LibraryEntry::Constant { width, value: None } => {
                    match library.free_constant_width {
                        Some(first) if first != *width => {
                            return Err(Error::ConflictingConstantWidths {
                                first,
                                second: *width,
                            });
                        }
                        _ => library.free_constant_width = Some(*width),
                    }
                }
                LibraryEntry::Constant {
                    width,
                    value: Some(literal),
                } => {
                    let key = encoder.encode_constant(&literal.value, *width)?;
                    library.count(key.clone(), || KindForm::FixedConstant { literal: key });
                }
                LibraryEntry::Function { name, params, body } => {
                    let key = format!("{}{}", CUSTOM_PREFIX, name);
                    if !library.kinds.iter().any(|kind| kind.key == key) {
                        library.helpers.push(define_fun(
                            key.clone(),
                            params.iter().map(|param| param.as_str()),
                            &value_sort,
                            value_sort.clone(),
                            encoder.encode(body)?,
                        ));
                    }
                    let arity = params.len();
                    library.count(key.clone(), || KindForm::Operator {
                        smt_name: key,
                        arity,
                        relation: false,
                    });
                }
            }
        }

        library.tag_width = config.tag_bits.max(library.kinds.len() as u32 * config.tag_bits);
        library.check_counts(config)?;

        for kind in &library.kinds {
            debug!("Kind {} required {} times", kind.key, kind.count);
        }
        Ok(library)
    }

    fn count(&mut self, key: String, form: impl FnOnce() -> KindForm) {
        match self.kinds.iter_mut().find(|kind| kind.key == key) {
            Some(kind) => kind.count += 1,
            None => self.kinds.push(Kind {
                key,
                count: 1,
                form: form(),
            }),
        }
    }

    /// Rejects libraries whose derivations can push a usage counter past its
    /// slot, counting every use a grammar tree can make, not only the
    /// declared multiplicity.
    fn check_counts(&self, config: &TranslateConfig) -> Result<()> {
        let max = config.max_count();
        let arities: Vec<usize> = self.kinds.iter().map(Kind::arity).collect();
        let worst = grammar::worst_case_uses(&self.budgets(), &arities);

        for (kind, uses) in self.kinds.iter().zip(worst) {
            let count = uses.max(u64::from(kind.budget()));
            if count > u64::from(max) {
                return Err(Error::TagOverflow {
                    kind: kind.key.clone(),
                    count,
                    tag_bits: config.tag_bits,
                    max,
                });
            }
        }
        Ok(())
    }

    pub fn budgets(&self) -> Vec<u32> {
        self.kinds.iter().map(Kind::budget).collect()
    }

    /// Tag value with one unit in the slot of kind `index`.
    pub fn one_hot(&self, index: usize) -> String {
        let value = BigInt::from(1u8) << (index as u32 * self.tag_bits);
        bits::binary(&value, self.tag_width)
    }

    /// Tag a solution must end up with: every operator kind's count in its
    /// own slot, zero for constants. Kind 0 is least significant.
    pub fn target(&self) -> String {
        let value = self
            .kinds
            .iter()
            .enumerate()
            .fold(BigInt::from(0u8), |acc, (i, kind)| {
                acc + (BigInt::from(kind.budget()) << (i as u32 * self.tag_bits))
            });
        bits::binary(&value, self.tag_width)
    }

    /// `op_<key>` wrappers of every operator kind.
    pub fn wrappers(&self, bit_width: u32) -> Vec<Term> {
        self.kinds
            .iter()
            .enumerate()
            .filter_map(|(index, kind)| match &kind.form {
                KindForm::Operator {
                    smt_name,
                    arity,
                    relation,
                } => Some(self.wrapper(index, kind, smt_name, *arity, *relation, bit_width)),
                KindForm::FixedConstant { .. } => None,
            })
            .collect()
    }

    fn wrapper(
        &self,
        index: usize,
        kind: &Kind,
        smt_name: &str,
        arity: usize,
        relation: bool,
        bit_width: u32,
    ) -> Term {
        let total = self.tag_width + bit_width;
        let params: Vec<String> = (0..arity).map(|i| format!("i{}", i)).collect();

        let tags = params
            .iter()
            .map(|param| Term::extract(total - 1, bit_width, Term::atom(param.as_str())));
        let values = params
            .iter()
            .map(|param| Term::extract(bit_width - 1, 0, Term::atom(param.as_str())));

        let one_hot = Term::atom(self.one_hot(index));
        let tag = if arity == 0 {
            one_hot
        } else {
            Term::app("bvadd", std::iter::once(one_hot).chain(tags))
        };

        let mut value = Term::call(smt_name, values);
        if relation {
            value = Term::app(
                ITE,
                [
                    value,
                    Term::atom(bits::binary(&BigInt::from(1u8), bit_width)),
                    Term::atom(bits::zeros(bit_width)),
                ],
            );
        }

        let sort = Term::bv_sort(total);
        define_fun(
            kind.wrapper_name(),
            params.iter().map(String::as_str),
            &sort,
            sort.clone(),
            Term::concat(tag, value),
        )
    }
}

#[cfg(test)]
mod tests {
    use bvlang::parser::parse_program;

    use super::*;
    use crate::config::LiteralPolicy;

    fn partition(src: &str, config: &TranslateConfig) -> Result<Library> {
        let program = parse_program(src).unwrap();
        let encoder = ExprEncoder::new(program.spec.bit_width, config.literal_policy);
        Library::partition(&program.lib, &encoder, config)
    }

    #[test]
    fn kinds_keep_first_appearance_order() {
        let library = partition(
            "(spec 1 4 x x) (lib xor add xor (const 4 1) (const 4 0x1) (const 4))",
            &TranslateConfig::default(),
        )
        .unwrap();
        let keys: Vec<(&str, u32)> = library
            .kinds
            .iter()
            .map(|kind| (kind.key.as_str(), kind.count))
            .collect();
        assert_eq!(keys, vec![("xor", 2), ("add", 1), ("#b0001", 2)]);
        assert_eq!(library.free_constant_width, Some(4));
        assert_eq!(library.tag_width, 12);
        assert_eq!(library.budgets(), vec![2, 1, 0]);
        assert_eq!(library.target(), "#b000000010010");
        assert_eq!(library.one_hot(1), "#b000000010000");
    }

    #[test]
    fn empty_tag_is_one_field() {
        let library = partition("(spec 1 4 x x) (lib (const 4))", &TranslateConfig::default())
            .unwrap();
        assert!(library.kinds.is_empty());
        assert_eq!(library.tag_width, 4);
        assert_eq!(library.target(), "#b0000");
    }

    #[test]
    fn free_constants_must_agree() {
        let error = partition(
            "(spec 1 8 x x) (lib (const 8) (const 4))",
            &TranslateConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(
            error,
            Error::ConflictingConstantWidths {
                first: 8,
                second: 4
            }
        ));
        assert!(
            partition("(spec 1 8 x x) (lib (const 8) (const 4 3))", &TranslateConfig::default())
                .is_ok()
        );
    }

    #[test]
    fn overflowing_counts_are_rejected() {
        let config = TranslateConfig::default().with_tag_bits(1);
        assert!(partition("(spec 1 4 x x) (lib add)", &config).is_ok());
        let error = partition("(spec 1 4 x x) (lib add add)", &config).unwrap_err();
        assert!(matches!(
            error,
            Error::TagOverflow {
                count: 3,
                tag_bits: 1,
                max: 1,
                ..
            }
        ));
        // a nullary function appears once per tree, but its target count is two
        let error = partition("(spec 1 4 x x) (lib (fun one 1) (fun one 1))", &config)
            .unwrap_err();
        assert!(matches!(error, Error::TagOverflow { count: 2, .. }));
    }

    #[test]
    fn valued_constants_follow_the_policy() {
        let strict = TranslateConfig::default().with_literal_policy(LiteralPolicy::Strict);
        assert!(matches!(
            partition("(spec 1 4 x x) (lib (const 4 20))", &strict),
            Err(Error::Encoding { .. })
        ));
        let library =
            partition("(spec 1 4 x x) (lib (const 4 -1))", &TranslateConfig::default()).unwrap();
        assert_eq!(library.kinds[0].key, "#b1111");
    }

    #[test]
    fn relational_wrapper() {
        let library = partition("(spec 2 4 x y x) (lib ult)", &TranslateConfig::default())
            .unwrap();
        assert_eq!(
            library.wrappers(4)[0].to_string(),
            "(define-fun op_ult ((i0 (_ BitVec 8)) (i1 (_ BitVec 8))) (_ BitVec 8) \
             (concat (bvadd #b0001 ((_ extract 7 4) i0) ((_ extract 7 4) i1)) \
             (ite (bvult ((_ extract 3 0) i0) ((_ extract 3 0) i1)) #b0001 #b0000)))"
        );
    }

    #[test]
    fn custom_functions_are_defined_once() {
        let library = partition(
            "(spec 1 4 x x) (lib (fun twice a (add a a)) (fun twice b (mul b 2)) not)",
            &TranslateConfig::default(),
        )
        .unwrap();
        assert_eq!(library.helpers.len(), 1);
        assert_eq!(
            library.helpers[0].to_string(),
            "(define-fun cust_twice ((a (_ BitVec 4))) (_ BitVec 4) (bvadd a a))"
        );
        assert_eq!(library.kinds[0].count, 2);
        let wrappers = library.wrappers(4);
        assert_eq!(
            wrappers[0].to_string(),
            "(define-fun op_cust_twice ((i0 (_ BitVec 12))) (_ BitVec 12) \
             (concat (bvadd #b00000001 ((_ extract 11 4) i0)) (cust_twice ((_ extract 3 0) i0))))"
        );
        assert_eq!(
            wrappers[1].to_string(),
            "(define-fun op_not ((i0 (_ BitVec 12))) (_ BitVec 12) \
             (concat (bvadd #b00010000 ((_ extract 11 4) i0)) (bvnot ((_ extract 3 0) i0))))"
        );
    }
}
