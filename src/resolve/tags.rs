//! Core schema scalar resolution.
//!
//! Plain scalars resolve to null, booleans, integers (decimal, `0o` octal,
//! `0x` hex), floats (including `.inf`, `-.inf` and `.nan`) or strings.

use crate::value::{Number, ScalarValue};

pub(crate) const CORE_PREFIX: &str = "tag:yaml.org,2002:";

/// Resolves the text of an untagged plain scalar.
pub(crate) fn resolve_plain_scalar(s: &str) -> ScalarValue {
    if is_null(s) {
        return ScalarValue::Null;
    }
    if let Some(b) = parse_bool(s) {
        return ScalarValue::Bool(b);
    }
    if let Some(n) = parse_int(s).or_else(|| parse_float(s)) {
        return ScalarValue::Number(n);
    }
    ScalarValue::String(s.to_string())
}

/// Resolves `s` as the core type named `kind`, or `None` if it does not
/// match that type.
pub(crate) fn resolve_typed_scalar(kind: &str, s: &str) -> Option<ScalarValue> {
    match kind {
        "str" => Some(ScalarValue::String(s.to_string())),
        "null" => is_null(s).then_some(ScalarValue::Null),
        "bool" => parse_bool(s).map(ScalarValue::Bool),
        "int" => parse_int(s).map(ScalarValue::Number),
        "float" => parse_float(s)
            .or_else(|| parse_int(s).map(|n| Number::from(n.as_f64())))
            .map(ScalarValue::Number),
        _ => None,
    }
}

fn is_null(s: &str) -> bool {
    matches!(s, "" | "~" | "null" | "Null" | "NULL")
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

fn parse_int(s: &str) -> Option<Number> {
    if let Some(oct) = s.strip_prefix("0o") {
        return parse_radix(oct, 8);
    }
    if let Some(hex) = s.strip_prefix("0x") {
        return parse_radix(hex, 16);
    }
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match s.parse::<i64>() {
        Ok(i) => Some(Number::Integer(i)),
        // out of range for i64, keep the magnitude
        Err(_) => s.parse::<f64>().ok().map(Number::from),
    }
}

fn parse_radix(digits: &str, radix: u32) -> Option<Number> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    match i64::from_str_radix(digits, radix) {
        Ok(i) => Some(Number::Integer(i)),
        Err(_) => {
            let value = digits
                .chars()
                .filter_map(|c| c.to_digit(radix))
                .fold(0.0_f64, |acc, d| acc * f64::from(radix) + f64::from(d));
            Some(Number::from(value))
        }
    }
}

fn parse_float(s: &str) -> Option<Number> {
    match s {
        ".nan" | ".NaN" | ".NAN" => return Some(Number::NaN),
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => return Some(Number::Infinity),
        "-.inf" | "-.Inf" | "-.INF" => return Some(Number::NegativeInfinity),
        _ => {}
    }
    let body = s.strip_prefix(['-', '+']).unwrap_or(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };
    let (int_part, frac_part) = match mantissa.find('.') {
        Some(i) => (&mantissa[..i], Some(&mantissa[i + 1..])),
        None => (mantissa, None),
    };
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(int_part) || !frac_part.map_or(true, all_digits) {
        return None;
    }
    // `[0-9]+.[0-9]*` or `.[0-9]+`, or a bare integer mantissa with an exponent
    let mantissa_ok = match frac_part {
        Some(frac) => !int_part.is_empty() || !frac.is_empty(),
        None => !int_part.is_empty() && exponent.is_some(),
    };
    if !mantissa_ok {
        return None;
    }
    if let Some(exp) = exponent {
        let digits = exp.strip_prefix(['-', '+']).unwrap_or(exp);
        if digits.is_empty() || !all_digits(digits) {
            return None;
        }
    }
    s.parse::<f64>().ok().map(Number::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_schema() {
        assert_eq!(resolve_plain_scalar("~"), ScalarValue::Null);
        assert_eq!(resolve_plain_scalar(""), ScalarValue::Null);
        assert_eq!(resolve_plain_scalar("True"), ScalarValue::Bool(true));
        assert_eq!(resolve_plain_scalar("-12"), ScalarValue::Number(Number::Integer(-12)));
        assert_eq!(resolve_plain_scalar("0o17"), ScalarValue::Number(Number::Integer(15)));
        assert_eq!(resolve_plain_scalar("0xff"), ScalarValue::Number(Number::Integer(255)));
        assert_eq!(resolve_plain_scalar("1.5"), ScalarValue::Number(Number::Float(1.5)));
        assert_eq!(resolve_plain_scalar(".5"), ScalarValue::Number(Number::Float(0.5)));
        assert_eq!(resolve_plain_scalar("1e3"), ScalarValue::Number(Number::Float(1000.0)));
        assert_eq!(resolve_plain_scalar("-.inf"), ScalarValue::Number(Number::NegativeInfinity));
        assert_eq!(resolve_plain_scalar(".NaN"), ScalarValue::Number(Number::NaN));
    }

    #[test]
    fn test_strings() {
        for s in ["yes", "1.2.3", "0x", ".", "-", "1e", "e3", "+", "12abc", "nan"] {
            assert_eq!(resolve_plain_scalar(s), ScalarValue::String(s.to_string()), "{s}");
        }
    }

    #[test]
    fn test_typed() {
        assert_eq!(
            resolve_typed_scalar("float", "2"),
            Some(ScalarValue::Number(Number::Float(2.0)))
        );
        assert_eq!(resolve_typed_scalar("int", "2.5"), None);
        assert_eq!(resolve_typed_scalar("null", "x"), None);
    }
}
