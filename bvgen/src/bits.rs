//! Fixed-width binary constants.
use num_bigint::{BigInt, Sign};

/// `2^width`
pub fn modulus(width: u32) -> BigInt {
    BigInt::from(1u8) << width
}

/// Whether `value` is representable in `width` bits, either as an unsigned
/// number or as a two's-complement signed one.
pub fn fits(value: &BigInt, width: u32) -> bool {
    if width == 0 {
        return value.sign() == Sign::NoSign;
    }
    let min = -(BigInt::from(1u8) << (width - 1));
    value >= &min && value < &modulus(width)
}

/// Two's-complement truncation of `value` to its low `width` bits.
pub fn truncate(value: &BigInt, width: u32) -> BigInt {
    let modulus = modulus(width);
    let rem = value % &modulus;
    if rem.sign() == Sign::Minus {
        rem + modulus
    } else {
        rem
    }
}

/// `#b` constant with exactly `width` digits. `value` must already be truncated.
pub fn binary(value: &BigInt, width: u32) -> String {
    format!(
        "#b{:0>width$}",
        value.to_str_radix(2),
        width = width as usize
    )
}

/// `#b` constant with `width` zero digits.
pub fn zeros(width: u32) -> String {
    format!("#b{}", "0".repeat(width as usize))
}
