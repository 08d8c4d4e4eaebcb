//! Reader for the program description language.
//!
//! One chumsky parser per production of the grammar:
//!
//! ```text
//! program  := form+
//! form     := "(" ident expr* ")"
//! expr     := ident | number | "(" number ")" | "(" ident expr* ")"
//! number   := ["-"] ("0x" | "0b")? digit+ (":" digit+)?
//! ```
//!
//! Whitespace is accepted between any two tokens. The reader only builds
//! generic forms; [`Program::from_forms`] gives them meaning.
use std::io::Read;

use chumsky::{prelude::*, text::digits};
use num_bigint::BigInt;

use crate::{
    expr::{App, Expr, Ident, Literal},
    program::Program,
    utils::{Error, LexError, Result},
};

type Extra<'src> = extra::Err<Rich<'src, char>>;

pub fn ident_parser<'src>() -> impl Parser<'src, &'src str, Ident, Extra<'src>> + Clone {
    any()
        .filter(|c: &char| Ident::is_start_char(*c))
        .then(any().filter(|c: &char| Ident::is_continue_char(*c)).repeated())
        .to_slice()
        .map(Ident::from_token)
        .labelled("identifier")
}

pub fn literal_parser<'src>() -> impl Parser<'src, &'src str, Literal, Extra<'src>> + Clone {
    let hexadecimal = just('0')
        .then(one_of("xX"))
        .ignore_then(digits(16).to_slice())
        .map(|digits| (16u32, digits))
        .labelled("hexadecimal number");

    let binary = just('0')
        .then(one_of("bB"))
        .ignore_then(one_of("01").repeated().at_least(1).to_slice())
        .map(|digits| (2u32, digits))
        .labelled("binary number");

    let decimal = digits(10)
        .to_slice()
        .map(|digits| (10u32, digits))
        .labelled("decimal number");

    let magnitude = choice((hexadecimal, binary, decimal)).try_map(|(radix, digits), span| {
        let digits: &str = digits;
        BigInt::parse_bytes(digits.as_bytes(), radix).ok_or_else(|| {
            Rich::custom(span, format!("invalid base-{} number: {}", radix, digits))
        })
    });

    let width = just(':')
        .ignore_then(digits(10).to_slice().try_map(|digits: &str, span| {
            digits
                .parse::<u32>()
                .map_err(|_| Rich::custom(span, format!("bit width out of range: {}", digits)))
        }))
        .labelled("bit width");

    just('-')
        .or_not()
        .then(magnitude)
        .then(width.or_not())
        .map(|((sign, magnitude), width)| Literal {
            value: if sign.is_some() { -magnitude } else { magnitude },
            width,
        })
        .labelled("number")
}

pub fn expr_parser<'src>() -> impl Parser<'src, &'src str, Expr, Extra<'src>> + Clone {
    recursive(|expr| {
        let application = ident_parser()
            .padded()
            .then(expr.padded().repeated().collect::<Vec<_>>())
            .map(|(op, args)| Expr::App(App { op, args }));

        // `(4)` reads as the literal itself
        let parenthesized = literal_parser()
            .padded()
            .map(Expr::Literal)
            .or(application)
            .delimited_by(just('('), just(')'))
            .labelled("parenthesized expression");

        choice((
            parenthesized,
            literal_parser().map(Expr::Literal),
            ident_parser().map(Expr::Ident),
        ))
        .labelled("expression")
    })
}

pub fn form_parser<'src>() -> impl Parser<'src, &'src str, App, Extra<'src>> + Clone {
    ident_parser()
        .padded()
        .then(expr_parser().padded().repeated().collect::<Vec<_>>())
        .delimited_by(just('('), just(')'))
        .map(|(op, args)| App { op, args })
        .labelled("top-level form")
}

pub fn program_forms_parser<'src>() -> impl Parser<'src, &'src str, Vec<App>, Extra<'src>> {
    form_parser()
        .padded()
        .repeated()
        .at_least(1)
        .collect::<Vec<_>>()
        .then_ignore(end())
}

impl<'src> From<&Rich<'src, char>> for LexError {
    fn from(error: &Rich<'src, char>) -> Self {
        let span = error.span();
        LexError {
            found: error.found().copied(),
            span: span.start..span.end,
            message: error.to_string(),
        }
    }
}

fn first_error(errors: Vec<Rich<'_, char>>) -> Error {
    errors
        .first()
        .map(LexError::from)
        .unwrap_or_else(|| LexError {
            found: None,
            span: 0..0,
            message: "no input".to_string(),
        })
        .into()
}

/// Parses a single expression surrounded by optional whitespace.
pub fn parse_expr(src: &str) -> Result<Expr> {
    expr_parser()
        .padded()
        .then_ignore(end())
        .parse(src)
        .into_result()
        .map_err(first_error)
}

/// Parses the top-level forms of a program without interpreting them.
pub fn parse_forms(src: &str) -> Result<Vec<App>> {
    program_forms_parser()
        .parse(src)
        .into_result()
        .map_err(first_error)
}

/// Parses and interprets a whole program.
///
/// Example
/// ```
/// use bvlang::parser::parse_program;
/// let program = parse_program("(spec (1) (4) x (add x x)) (lib add)").unwrap();
/// assert_eq!(program.spec.bit_width, 4);
/// assert_eq!(program.lib.len(), 1);
/// ```
pub fn parse_program(src: &str) -> Result<Program> {
    Program::from_forms(parse_forms(src)?)
}

/// Reads the whole stream, then parses it as a program.
pub fn read_program(mut reader: impl Read) -> Result<Program> {
    let mut src = String::new();
    reader.read_to_string(&mut src)?;
    parse_program(&src)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(src: &str) -> Literal {
        literal_parser()
            .then_ignore(end())
            .parse(src)
            .into_result()
            .expect("literal should parse")
    }

    #[test]
    fn literal_radixes() {
        assert_eq!(literal("5:8"), Literal::sized(5, 8));
        assert_eq!(literal("-1:4"), Literal::sized(-1, 4));
        assert_eq!(literal("0x1F"), Literal::r#unsized(31));
        assert_eq!(literal("0XfF:8"), Literal::sized(255, 8));
        assert_eq!(literal("0b101:3"), Literal::sized(5, 3));
        assert_eq!(literal("0xb"), Literal::r#unsized(11));
        assert_eq!(literal("007"), Literal::r#unsized(7));
        assert_eq!(literal("0"), Literal::r#unsized(0));
    }

    #[test]
    fn literal_values_are_unbounded() {
        let lit = literal("0xffffffffffffffffffff:80");
        assert_eq!(lit.width, Some(80));
        assert_eq!(lit.value, (BigInt::from(1u8) << 80u32) - 1);
    }

    #[test]
    fn identifiers_take_digits_and_dots() {
        let expr = parse_expr("x1.lo").unwrap();
        assert_eq!(expr, Expr::ident("x1.lo").unwrap());
    }

    #[test]
    fn nested_application() {
        let expr = parse_expr(" ( add  x\n(neg 0x1:4) ) ").unwrap();
        assert_eq!(expr.to_string(), "(add x (neg 1:4))");
    }

    #[test]
    fn parenthesized_literal() {
        assert_eq!(parse_expr("(4)").unwrap(), Literal::r#unsized(4).into());
        assert_eq!(parse_expr("( 4:8 )").unwrap(), Literal::sized(4, 8).into());
    }

    #[test]
    fn unexpected_character_is_reported() {
        let err = parse_expr("(add x #)").unwrap_err();
        match err {
            Error::Lex(lex) => {
                assert_eq!(lex.found, Some('#'));
                assert_eq!(lex.offset(), 7);
            }
            other => panic!("expected a lex error, got {other:?}"),
        }
    }

    #[test]
    fn missing_close_paren_is_fatal() {
        let err = parse_forms("(spec (1) (4) x (add x x)").unwrap_err();
        match err {
            Error::Lex(lex) => assert_eq!(lex.found, None),
            other => panic!("expected a lex error, got {other:?}"),
        }
    }

    #[test]
    fn top_level_must_be_forms() {
        assert!(parse_forms("").unwrap_err().is_lex());
        assert!(parse_forms("(lib add) x").unwrap_err().is_lex());
        let forms = parse_forms("\n(lib add)\n\n(spec 1 4 x x)\n").unwrap();
        assert_eq!(forms.len(), 2);
    }
}
