//! Kubernetes resource quantities reduced to whole bytes and rendered back
//! in canonical binary-SI form (`"8Gi"`, `"1536"`, `"1k"`).

use std::sync::LazyLock;

use regex::Regex;

use crate::error::StatusError;

const BINARY_SUFFIXES: [&str; 7] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];
const DECIMAL_SUFFIXES: [&str; 7] = ["", "k", "M", "G", "T", "P", "E"];

// sign, whole digits, fraction digits, suffix
static QUANTITY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?)(\d*)(?:\.(\d*))?(Ki|Mi|Gi|Ti|Pi|Ei|[numkMGTPE]|[eE][+-]?\d+)?$")
        .expect("quantity pattern is valid")
});

/// Parse a quantity string (`"5Gi"`, `"10G"`, `"1.5Ti"`, `"1e3"`, `"100m"`)
/// into a whole number of units.
///
/// Fractional results are rounded up to the next integer.
pub fn parse_bytes(input: &str) -> Result<i64, StatusError> {
    let invalid = || StatusError::InvalidQuantity(input.to_string());

    let caps = QUANTITY_REGEX.captures(input.trim()).ok_or_else(invalid)?;
    let group = |i| caps.get(i).map_or("", |m| m.as_str());
    let (negative, whole, frac, suffix) = (group(1) == "-", group(2), group(3), group(4));
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }

    let mantissa_digits = format!("{whole}{frac}");
    let mantissa_digits = mantissa_digits.trim_start_matches('0');
    if mantissa_digits.len() > 30 {
        return Err(invalid());
    }
    let mantissa: i128 = if mantissa_digits.is_empty() {
        0
    } else {
        mantissa_digits.parse().map_err(|_| invalid())?
    };

    let mut numerator = mantissa;
    let mut exp10 = -i32::try_from(frac.len()).map_err(|_| invalid())?;

    if let Some(power) = BINARY_SUFFIXES
        .iter()
        .skip(1)
        .position(|&sfx| sfx == suffix)
    {
        let factor = 1024i128
            .checked_pow(u32::try_from(power + 1).map_err(|_| invalid())?)
            .ok_or_else(invalid)?;
        numerator = numerator.checked_mul(factor).ok_or_else(invalid)?;
    } else {
        exp10 = exp10
            .checked_add(decimal_exponent(suffix).ok_or_else(invalid)?)
            .ok_or_else(invalid)?;
    }

    let mut denominator = 1i128;
    if exp10 >= 0 {
        let factor = 10i128.checked_pow(exp10.unsigned_abs()).ok_or_else(invalid)?;
        numerator = numerator.checked_mul(factor).ok_or_else(invalid)?;
    } else {
        match 10i128.checked_pow(exp10.unsigned_abs()) {
            Some(factor) => denominator = factor,
            // Denominator exceeds any numerator, so the magnitude is below one.
            None => return Ok(i64::from(numerator > 0 && !negative)),
        }
    }

    if negative {
        numerator = -numerator;
    }

    let mut value = numerator / denominator;
    if numerator % denominator != 0 && numerator > 0 {
        value += 1;
    }

    i64::try_from(value).map_err(|_| invalid())
}

/// Power-of-ten exponent for a decimal SI suffix or an `e<N>` / `E<N>` exponent.
fn decimal_exponent(suffix: &str) -> Option<i32> {
    match suffix {
        "" => Some(0),
        "n" => Some(-9),
        "u" => Some(-6),
        "m" => Some(-3),
        "k" => Some(3),
        "M" => Some(6),
        "G" => Some(9),
        "T" => Some(12),
        "P" => Some(15),
        "E" => Some(18),
        _ => suffix.get(1..)?.parse().ok(),
    }
}

/// Render a byte count the way the platform canonicalises binary-SI quantities.
///
/// Values with magnitude below 1024 fall back to decimal SI, larger values use
/// the largest power-of-1024 suffix that divides them exactly.
pub fn format_binary_si(bytes: i64) -> String {
    if bytes == 0 {
        return "0".to_string();
    }
    if bytes > -1024 && bytes < 1024 {
        return format_decimal_si(bytes);
    }
    format_with_base(bytes, 1024, &BINARY_SUFFIXES)
}

fn format_decimal_si(value: i64) -> String {
    format_with_base(value, 1000, &DECIMAL_SUFFIXES)
}

fn format_with_base(value: i64, base: i64, suffixes: &[&str; 7]) -> String {
    let mut amount = value;
    let mut exponent = 0;
    while exponent < suffixes.len() - 1 && amount != 0 && amount % base == 0 {
        amount /= base;
        exponent += 1;
    }
    format!("{}{}", amount, suffixes[exponent])
}

#[cfg(test)]
mod tests {
    use super::*;

    const GI: i64 = 1024 * 1024 * 1024;

    #[test]
    fn test_parse_binary_suffixes() {
        assert_eq!(parse_bytes("5Gi").unwrap(), 5 * GI);
        assert_eq!(parse_bytes("512Mi").unwrap(), 512 * 1024 * 1024);
        assert_eq!(parse_bytes("1Ki").unwrap(), 1024);
        assert_eq!(parse_bytes("2Ti").unwrap(), 2 * 1024 * GI);
    }

    #[test]
    fn test_parse_decimal_suffixes() {
        assert_eq!(parse_bytes("10G").unwrap(), 10_000_000_000);
        assert_eq!(parse_bytes("1k").unwrap(), 1000);
        assert_eq!(parse_bytes("1E").unwrap(), 1_000_000_000_000_000_000);
        assert_eq!(parse_bytes("500").unwrap(), 500);
    }

    #[test]
    fn test_parse_exponent_notation() {
        assert_eq!(parse_bytes("1e3").unwrap(), 1000);
        assert_eq!(parse_bytes("12E6").unwrap(), 12_000_000);
    }

    #[test]
    fn test_parse_fractional_values() {
        assert_eq!(parse_bytes("1.5Gi").unwrap(), 1_610_612_736);
        assert_eq!(parse_bytes("0.5Ki").unwrap(), 512);
        assert_eq!(parse_bytes(".5Ki").unwrap(), 512);
    }

    #[test]
    fn test_parse_rounds_fractions_up() {
        assert_eq!(parse_bytes("100m").unwrap(), 1);
        assert_eq!(parse_bytes("1.1").unwrap(), 2);
        assert_eq!(parse_bytes("-1.5").unwrap(), -1);
    }

    #[test]
    fn test_parse_tiny_values_round_to_one() {
        assert_eq!(parse_bytes("1e-40").unwrap(), 1);
        assert_eq!(parse_bytes("0e-40").unwrap(), 0);
        assert_eq!(parse_bytes("-1e-40").unwrap(), 0);
        assert_eq!(parse_bytes("5e-3").unwrap(), 1);
    }

    #[test]
    fn test_parse_signed_values() {
        assert_eq!(parse_bytes("+2Ki").unwrap(), 2048);
        assert_eq!(parse_bytes("-2Ki").unwrap(), -2048);
        assert_eq!(parse_bytes("1e+3").unwrap(), 1000);
    }

    #[test]
    fn test_parse_zero() {
        assert_eq!(parse_bytes("0").unwrap(), 0);
        assert_eq!(parse_bytes("0Gi").unwrap(), 0);
        assert_eq!(parse_bytes(" 0 ").unwrap(), 0);
    }

    #[test]
    fn test_parse_invalid() {
        for input in ["", "Gi", "abc", "5Gb", "1.2.3", "5 Gi", "1e", "--1", "1-2", "+", ".", "1Gi2"] {
            assert!(parse_bytes(input).is_err(), "expected error for {input:?}");
        }
    }

    #[test]
    fn test_parse_overflow() {
        assert!(parse_bytes("100Ei").is_err());
        assert!(parse_bytes("1e40").is_err());
    }

    #[test]
    fn test_format_zero() {
        assert_eq!(format_binary_si(0), "0");
    }

    #[test]
    fn test_format_exact_binary() {
        assert_eq!(format_binary_si(8 * GI), "8Gi");
        assert_eq!(format_binary_si(1024), "1Ki");
        assert_eq!(format_binary_si(1000 * 1024), "1000Ki");
        assert_eq!(format_binary_si(-2048), "-2Ki");
    }

    #[test]
    fn test_format_inexact_binary_is_plain() {
        assert_eq!(format_binary_si(1536), "1536");
        assert_eq!(format_binary_si(1_000_000_000), "1000000000");
    }

    #[test]
    fn test_format_small_values_use_decimal() {
        assert_eq!(format_binary_si(512), "512");
        assert_eq!(format_binary_si(1000), "1k");
        assert_eq!(format_binary_si(-1000), "-1k");
    }

    #[test]
    fn test_parse_then_format() {
        assert_eq!(format_binary_si(parse_bytes("4096Mi").unwrap()), "4Gi");
        assert_eq!(format_binary_si(parse_bytes("1.5Gi").unwrap()), "1536Mi");
    }
}
