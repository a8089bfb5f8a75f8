//! Small string helpers shared by the tokenizer and the terminal nodes.

use crate::{ErrorKind, GrammarError};

/// Count the number of identical bytes at the beginning of two strings.
pub fn common_prefix_len(s1: &str, s2: &str) -> usize {
    s1.bytes()
        .zip(s2.bytes())
        .take_while(|(a, b)| a == b)
        .count()
}

/// Whether every character of `s` is whitespace. True for an empty string.
pub fn is_space_str(s: &str) -> bool {
    s.chars().all(char::is_whitespace)
}

/// Strip a radix prefix and resolve base 0 ("auto") the way the usual
/// string-to-integer conversions do: `0x`/`0X` means hexadecimal, a leading
/// `0` means octal, anything else is decimal. An explicit base 16 also
/// accepts the `0x` prefix.
fn split_radix(digits: &str, base: u32) -> (u32, usize) {
    let bytes = digits.as_bytes();
    let has_hex_prefix =
        bytes.len() > 2 && bytes[0] == b'0' && (bytes[1] == b'x' || bytes[1] == b'X');

    match base {
        0 => {
            if has_hex_prefix {
                (16, 2)
            } else if bytes.len() > 1 && bytes[0] == b'0' {
                (8, 1)
            } else {
                (10, 0)
            }
        }
        16 if has_hex_prefix => (16, 2),
        b => (b, 0),
    }
}

fn check_base(base: u32) -> Result<(), GrammarError> {
    if base == 0 || (2..=36).contains(&base) {
        Ok(())
    } else {
        Err(GrammarError::new(
            ErrorKind::InvalidArgument,
            format!("unsupported numeric base {}", base),
        ))
    }
}

/// Parse a signed integer in the given base (0 = auto) and check it lies in
/// `min..=max`. Leading or trailing garbage, including whitespace, is
/// rejected.
pub fn parse_i64(s: &str, base: u32, min: i64, max: i64) -> Result<i64, GrammarError> {
    check_base(base)?;

    let (neg, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    if digits.is_empty() {
        return Err(GrammarError::new(
            ErrorKind::InvalidArgument,
            format!("not an integer: {:?}", s),
        ));
    }

    let (radix, skip) = split_radix(digits, base);
    let mut normalized = String::with_capacity(s.len());
    if neg {
        normalized.push('-');
    }
    normalized.push_str(&digits[skip..]);

    let val = i64::from_str_radix(&normalized, radix).map_err(|_| {
        // from_str_radix does not say whether it failed on a bad digit or on
        // overflow; an all-digit input can only have overflowed.
        let kind = if normalized
            .bytes()
            .skip(neg as usize)
            .all(|b| (b as char).is_digit(radix))
        {
            ErrorKind::Range
        } else {
            ErrorKind::InvalidArgument
        };
        GrammarError::new(kind, format!("not an integer: {:?}", s))
    })?;

    if val < min || val > max {
        return Err(GrammarError::new(
            ErrorKind::Range,
            format!("{} is out of range [{}, {}]", val, min, max),
        ));
    }

    Ok(val)
}

/// Parse an unsigned integer in the given base (0 = auto) and check it lies
/// in `min..=max`. A minus sign anywhere is rejected, unlike the silent
/// wrap-around of the C conversions.
pub fn parse_u64(s: &str, base: u32, min: u64, max: u64) -> Result<u64, GrammarError> {
    check_base(base)?;

    if s.contains('-') {
        return Err(GrammarError::new(
            ErrorKind::InvalidArgument,
            format!("not an unsigned integer: {:?}", s),
        ));
    }
    let digits = s.strip_prefix('+').unwrap_or(s);
    if digits.is_empty() {
        return Err(GrammarError::new(
            ErrorKind::InvalidArgument,
            format!("not an unsigned integer: {:?}", s),
        ));
    }

    let (radix, skip) = split_radix(digits, base);
    let digits = &digits[skip..];

    let val = u64::from_str_radix(digits, radix).map_err(|_| {
        let kind = if digits.bytes().all(|b| (b as char).is_digit(radix)) {
            ErrorKind::Range
        } else {
            ErrorKind::InvalidArgument
        };
        GrammarError::new(kind, format!("not an unsigned integer: {:?}", s))
    })?;

    if val < min || val > max {
        return Err(GrammarError::new(
            ErrorKind::Range,
            format!("{} is out of range [{}, {}]", val, min, max),
        ));
    }

    Ok(val)
}
