//! SyGuS back end
//!
//! The spec function is wrapped into a synthesis problem whose candidate
//! programs carry a usage tag in their high bits. Every library operator is
//! replaced by an `op_<key>` wrapper that computes the real operation on the
//! low bits and adds its own one-hot increment to the sum of its operands'
//! tags. The constraint then demands both the spec's value and the exact
//! tag of the library's multiplicities:
//!
//! ```text
//! (constraint (= (concat #b0001 (spec x)) (res x)))
//! ```
//!
//! The grammar only lets a kind be used while its budget lasts, so the
//! search space stays finite; see [`grammar`].
use std::{fmt, io::Write};

use bvlang::{
    Expr, Ident, Literal, Program,
    ops::{CONCAT, ITE},
};
use log::{debug, warn};
use num_bigint::BigInt;

use crate::{
    bits,
    config::{LiteralPolicy, TranslateConfig},
    error::{Error, Result},
    term::Term,
};

pub mod grammar;
pub mod library;

use grammar::Nonterminal;
use library::Library;

/// Prefix of helper functions generated for `fun` library entries.
pub const CUSTOM_PREFIX: &str = "cust_";

/// SMT-LIB name of an operator of the input language.
///
/// In boolean context (the condition of an `ite`) the logical connectives are
/// kept as they are instead of becoming bit-vector operations.
pub fn smt_operator(name: &str, bool_ctx: bool) -> String {
    match name {
        "eq" => "=".to_string(),
        "neq" => "distinct".to_string(),
        ITE | CONCAT => name.to_string(),
        "and" | "or" | "xor" if bool_ctx => name.to_string(),
        _ if name.starts_with(CUSTOM_PREFIX) => name.to_string(),
        _ => format!("bv{}", name),
    }
}

/// Translates expressions of the input language into SMT-LIB terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExprEncoder {
    /// Width given to literals that do not carry one.
    pub bit_width: u32,
    pub policy: LiteralPolicy,
}

impl ExprEncoder {
    pub fn new(bit_width: u32, policy: LiteralPolicy) -> Self {
        Self { bit_width, policy }
    }

    pub fn encode(&self, expr: &Expr) -> Result<Term> {
        self.encode_in(expr, false)
    }

    fn encode_in(&self, expr: &Expr, bool_ctx: bool) -> Result<Term> {
        let app = match expr {
            Expr::Ident(ident) => return Ok(Term::atom(ident.as_str())),
            Expr::Literal(literal) => return self.encode_literal(literal).map(Term::atom),
            Expr::App(app) => app,
        };

        if app.is_extract() {
            let view = app
                .extract_view()
                .ok_or_else(|| Error::MalformedExtract(app.to_string()))?;
            return Ok(Term::extract(
                &view.high.value,
                &view.low.value,
                self.encode(view.operand)?,
            ));
        }

        let args = if app.op.as_str() == ITE {
            app.args
                .iter()
                .enumerate()
                .map(|(i, arg)| self.encode_in(arg, i == 0))
                .collect::<Result<Vec<_>>>()?
        } else {
            app.args
                .iter()
                .map(|arg| self.encode(arg))
                .collect::<Result<Vec<_>>>()?
        };
        Ok(Term::app(smt_operator(app.op.as_str(), bool_ctx), args))
    }

    pub fn encode_literal(&self, literal: &Literal) -> Result<String> {
        self.encode_bits(&literal.value, literal.width.unwrap_or(self.bit_width))
    }

    /// `#b` constant of exactly `width` digits for `value`, applying the
    /// literal policy when it does not fit.
    pub fn encode_bits(&self, value: &BigInt, width: u32) -> Result<String> {
        self.check_fit(value, width)?;
        Ok(bits::binary(&bits::truncate(value, width), width))
    }

    /// Library constant declared `width` bits wide, placed in the spec's bit
    /// width: zero-extended when narrower, low bits kept when wider.
    pub fn encode_constant(&self, value: &BigInt, width: u32) -> Result<String> {
        self.check_fit(value, width)?;
        let pattern = bits::truncate(value, width.min(self.bit_width));
        Ok(bits::binary(&pattern, self.bit_width))
    }

    fn check_fit(&self, value: &BigInt, width: u32) -> Result<()> {
        if width == 0 {
            return Err(Error::ZeroWidthLiteral(format!("{}:{}", value, width)));
        }
        if !bits::fits(value, width) {
            match self.policy {
                LiteralPolicy::Strict => {
                    return Err(Error::Encoding {
                        value: value.clone(),
                        width,
                    });
                }
                LiteralPolicy::Truncate => {
                    warn!("Literal {} does not fit in {} bits, truncating", value, width)
                }
            }
        }
        Ok(())
    }
}

/// The `synth-fun` command with its grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthFun {
    pub params: Term,
    pub sort: Term,
    pub nonterminals: Vec<Nonterminal>,
}

impl fmt::Display for SynthFun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "(synth-fun res {} {} (", self.params, self.sort)?;
        for nonterminal in &self.nonterminals {
            writeln!(f, "  {}", nonterminal)?;
        }
        write!(f, "))")
    }
}

/// A complete synthesis problem, one command per line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SygusProblem {
    pub logic: String,
    /// Custom function helpers followed by operator wrappers.
    pub definitions: Vec<Term>,
    pub spec_definition: Term,
    pub declarations: Vec<Term>,
    pub synth_fun: SynthFun,
    pub constraint: Term,
}

impl fmt::Display for SygusProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "(set-logic {})", self.logic)?;
        for definition in &self.definitions {
            writeln!(f, "{}", definition)?;
        }
        writeln!(f, "{}", self.spec_definition)?;
        for declaration in &self.declarations {
            writeln!(f, "{}", declaration)?;
        }
        writeln!(f, "{}", self.synth_fun)?;
        writeln!(f, "{}", self.constraint)?;
        writeln!(f, "(check-synth)")
    }
}

/// `(define-fun name ((p sort)...) sort body)`
pub(crate) fn define_fun<'a>(
    name: impl Into<String>,
    params: impl IntoIterator<Item = &'a str>,
    param_sort: &Term,
    sort: Term,
    body: Term,
) -> Term {
    Term::app(
        "define-fun",
        [
            Term::atom(name),
            Term::params(params, param_sort),
            sort,
            body,
        ],
    )
}

pub fn compile(program: &Program, config: &TranslateConfig) -> Result<SygusProblem> {
    config.validate()?;

    let spec = &program.spec;
    let bit_width = spec.bit_width;
    let encoder = ExprEncoder::new(bit_width, config.literal_policy);
    let library = Library::partition(&program.lib, &encoder, config)?;
    debug!(
        "Library partitioned into {} kinds over a {}-bit tag",
        library.kinds.len(),
        library.tag_width
    );

    let value_sort = Term::bv_sort(bit_width);
    let inputs: Vec<&str> = spec.inputs.iter().map(Ident::as_str).collect();
    let input_terms = || inputs.iter().map(|name| Term::atom(*name));

    let mut definitions = library.helpers.clone();
    definitions.extend(library.wrappers(bit_width));

    let spec_definition = define_fun(
        "spec",
        inputs.iter().copied(),
        &value_sort,
        value_sort.clone(),
        encoder.encode(&spec.body)?,
    );

    let declarations = inputs
        .iter()
        .map(|name| Term::app("declare-var", [Term::atom(*name), value_sort.clone()]))
        .collect();

    let synth_fun = SynthFun {
        params: Term::params(inputs.iter().copied(), &value_sort),
        sort: Term::bv_sort(library.tag_width + bit_width),
        nonterminals: grammar::nonterminals(&library, bit_width),
    };

    let tagged_spec = Term::concat(
        Term::atom(library.target()),
        Term::call("spec", input_terms()),
    );
    let constraint = Term::app(
        "constraint",
        [Term::app("=", [tagged_spec, Term::call("res", input_terms())])],
    );

    Ok(SygusProblem {
        logic: "BV".to_string(),
        definitions,
        spec_definition,
        declarations,
        synth_fun,
        constraint,
    })
}

pub fn to_sygus(program: &Program, config: &TranslateConfig) -> Result<String> {
    Ok(compile(program, config)?.to_string())
}

pub fn write_sygus(
    program: &Program,
    config: &TranslateConfig,
    out: &mut impl Write,
) -> Result<()> {
    let problem = compile(program, config)?;
    write!(out, "{}", problem)?;
    Ok(())
}
