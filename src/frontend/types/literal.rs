//! Literal type inference
//!
//! - `true` / `false` -> `bool`
//! - quoted text (single or double quotes) -> `str`
//! - `0b...` / `0x...` -> narrowest unsigned atomic covering the digits
//! - decimal integers -> narrowest of `i32`, `i64`, `i128` that fits
//! - anything with a `.` -> `f64`
//! - a width suffix (`u8`, `i16`, `f32`, ...) overrides the default

use super::{Type, TypeError};

const UNSIGNED_WIDTHS: &[(u32, &str)] = &[(8, "u8"), (16, "u16"), (32, "u32"), (64, "u64"), (128, "u128")];
const SIGNED_DEFAULTS: &[&str] = &["i32", "i64", "i128"];

/// Largest value representable by an integer atomic
fn integer_max(name: &str) -> Option<u128> {
    Some(match name {
        "i8" => i8::MAX as u128,
        "i16" => i16::MAX as u128,
        "i32" => i32::MAX as u128,
        "i64" => i64::MAX as u128,
        "i128" => i128::MAX as u128,
        "u8" => u8::MAX as u128,
        "u16" => u16::MAX as u128,
        "u32" => u32::MAX as u128,
        "u64" => u64::MAX as u128,
        "u128" => u128::MAX,
        _ => return None,
    })
}

fn is_float_suffix(s: &str) -> bool {
    s == "f32" || s == "f64"
}

/// Split `body` into (digits, suffix) where digits satisfy `is_digit`
fn split_suffix(
    body: &str,
    is_digit: impl Fn(char) -> bool,
) -> (&str, &str) {
    let end = body
        .char_indices()
        .find(|(_, c)| !is_digit(*c))
        .map(|(i, _)| i)
        .unwrap_or(body.len());
    body.split_at(end)
}

/// Infer the type of a literal token
pub fn literal_type(text: &str) -> Result<Type, TypeError> {
    if text == "true" || text == "false" {
        return Ok(Type::atomic("bool"));
    }
    if text.starts_with('"') || text.starts_with('\'') {
        return Ok(Type::atomic("str"));
    }

    let malformed = || TypeError::Malformed {
        literal: text.to_string(),
    };
    let invalid_suffix = |suffix: &str| TypeError::InvalidSuffix {
        literal: text.to_string(),
        suffix: suffix.to_string(),
    };
    let out_of_range = |ty: &str| TypeError::OutOfRange {
        literal: text.to_string(),
        ty: ty.to_string(),
    };

    let radix = if text.starts_with("0x") || text.starts_with("0X") {
        Some(16)
    } else if text.starts_with("0b") || text.starts_with("0B") {
        Some(2)
    } else {
        None
    };

    if let Some(radix) = radix {
        let (digits, suffix) = split_suffix(&text[2..], |c| c == '_' || c.is_digit(radix));
        let digits: String = digits.chars().filter(|c| *c != '_').collect();
        if digits.is_empty() {
            return Err(malformed());
        }
        let bits = digits.len() as u32 * if radix == 16 { 4 } else { 1 };

        if suffix.is_empty() {
            let name = UNSIGNED_WIDTHS
                .iter()
                .find(|(width, _)| *width >= bits)
                .map(|(_, name)| *name)
                .ok_or_else(|| out_of_range("u128"))?;
            return Ok(Type::atomic(name));
        }

        let max = integer_max(suffix).ok_or_else(|| invalid_suffix(suffix))?;
        let value = u128::from_str_radix(&digits, radix).map_err(|_| out_of_range(suffix))?;
        if value > max {
            return Err(out_of_range(suffix));
        }
        return Ok(Type::atomic(suffix));
    }

    let (digits, suffix) = split_suffix(text, |c| c.is_ascii_digit() || c == '.' || c == '_');
    let digits: String = digits.chars().filter(|c| *c != '_').collect();
    if digits.is_empty() || digits.starts_with('.') || digits.ends_with('.') {
        return Err(malformed());
    }

    if digits.contains('.') {
        if digits.matches('.').count() > 1 {
            return Err(malformed());
        }
        return match suffix {
            "" => Ok(Type::atomic("f64")),
            s if is_float_suffix(s) => Ok(Type::atomic(s)),
            s => Err(invalid_suffix(s)),
        };
    }

    if is_float_suffix(suffix) {
        return Ok(Type::atomic(suffix));
    }

    let value: u128 = digits.parse().map_err(|_| out_of_range("i128"))?;

    if suffix.is_empty() {
        return SIGNED_DEFAULTS
            .iter()
            .find(|name| integer_max(name).is_some_and(|max| value <= max))
            .map(|name| Type::atomic(name))
            .ok_or_else(|| out_of_range("i128"));
    }

    let max = integer_max(suffix).ok_or_else(|| invalid_suffix(suffix))?;
    if value > max {
        return Err(out_of_range(suffix));
    }
    Ok(Type::atomic(suffix))
}

/// Whether a token looks like a literal at all
pub fn is_literal(text: &str) -> bool {
    text == "true"
        || text == "false"
        || text.starts_with('"')
        || text.starts_with('\'')
        || text.chars().next().is_some_and(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ty(text: &str) -> String {
        literal_type(text).unwrap().to_string()
    }

    #[test]
    fn test_strings_are_not_integers() {
        assert_eq!(ty("\"123\""), "str");
        assert_eq!(ty("'a'"), "str");
    }

    #[test]
    fn test_bools() {
        assert_eq!(ty("true"), "bool");
        assert_eq!(ty("false"), "bool");
    }

    #[test]
    fn test_decimal_defaults() {
        assert_eq!(ty("123"), "i32");
        assert_eq!(ty("2147483647"), "i32");
        assert_eq!(ty("2147483648"), "i64");
        assert_eq!(ty("4294967296"), "i64");
        assert_eq!(ty("9223372036854775808"), "i128");
    }

    #[test]
    fn test_radix_literals() {
        assert_eq!(ty("0xFF"), "u8");
        assert_eq!(ty("0xFFF"), "u16");
        assert_eq!(ty("0b1"), "u8");
        assert_eq!(ty("0b100000000"), "u16");
        assert_eq!(ty("0xFFFFFFFFF"), "u64");
    }

    #[test]
    fn test_floats() {
        assert_eq!(ty("1.5"), "f64");
        assert_eq!(ty("1.5f32"), "f32");
        assert_eq!(ty("3f32"), "f32");
    }

    #[test]
    fn test_suffix_overrides() {
        assert_eq!(ty("5u8"), "u8");
        assert_eq!(ty("5i16"), "i16");
        assert_eq!(ty("0xFFu32"), "u32");
    }

    #[test]
    fn test_invalid_suffix() {
        assert!(matches!(
            literal_type("123z"),
            Err(TypeError::InvalidSuffix { .. })
        ));
        assert!(matches!(
            literal_type("1.5i32"),
            Err(TypeError::InvalidSuffix { .. })
        ));
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            literal_type("300u8"),
            Err(TypeError::OutOfRange { .. })
        ));
        assert!(matches!(
            literal_type("128i8"),
            Err(TypeError::OutOfRange { .. })
        ));
        assert!(matches!(
            literal_type("999999999999999999999999999999999999999999"),
            Err(TypeError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_is_literal() {
        assert!(is_literal("12"));
        assert!(is_literal("\"x\""));
        assert!(is_literal("false"));
        assert!(!is_literal("x12"));
    }
}
