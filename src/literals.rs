//! Literal normalization.
//!
//! The source tree keeps scalar literals as raw lexical text (`1_000`,
//! `0xff`, `3.14r`, `42ri`, `"a\nb"`); target schemas want canonical typed
//! values. Parsers are total over conformant input and return `None` for
//! text no conformant lexer emits; callers turn that into a malformed-node
//! error with the node's span.

use crate::target::Element;

// ============================================================================
// NUMERIC LITERALS
// ============================================================================

/// Parses an integer literal: optional sign, `_` separators, and the
/// `0x`/`0o`/`0b`/`0d` base prefixes plus bare-`0` octal.
pub fn parse_integer(text: &str) -> Option<i64> {
    let text: String = text.chars().filter(|c| *c != '_').collect();
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(&text)),
    };

    let value = if let Some(hex) = strip_prefix_ci(body, "0x") {
        i64::from_str_radix(hex, 16).ok()?
    } else if let Some(bin) = strip_prefix_ci(body, "0b") {
        i64::from_str_radix(bin, 2).ok()?
    } else if let Some(oct) = strip_prefix_ci(body, "0o") {
        i64::from_str_radix(oct, 8).ok()?
    } else if let Some(dec) = strip_prefix_ci(body, "0d") {
        dec.parse::<i64>().ok()?
    } else if body.len() > 1 && body.starts_with('0') {
        i64::from_str_radix(&body[1..], 8).ok()?
    } else {
        body.parse::<i64>().ok()?
    };

    Some(if negative { -value } else { value })
}

/// Parses a float literal with `_` separators and scientific notation.
pub fn parse_float(text: &str) -> Option<f64> {
    let text: String = text.chars().filter(|c| *c != '_').collect();
    text.parse::<f64>().ok()
}

/// Parses a rational literal (`3r`, `-3r`, `3.14r`) into a reduced
/// numerator/denominator pair with a positive denominator.
pub fn parse_rational(text: &str) -> Option<(i64, i64)> {
    let body = text.strip_suffix(['r', 'R'])?;
    let body: String = body.chars().filter(|c| *c != '_').collect();

    if let Some(dot) = body.find('.') {
        let (int_part, frac_part) = body.split_at(dot);
        let frac_part = &frac_part[1..];
        let scale = 10_i64.checked_pow(frac_part.len() as u32)?;
        let negative = int_part.starts_with('-');
        let int_value: i64 = if int_part == "-" || int_part.is_empty() {
            0
        } else {
            int_part.parse().ok()?
        };
        let frac_value: i64 = frac_part.parse().ok()?;
        let magnitude = int_value.unsigned_abs() as i64 * scale + frac_value;
        let numer = if negative { -magnitude } else { magnitude };
        Some(reduce(numer, scale))
    } else {
        Some((body.parse().ok()?, 1))
    }
}

/// Parses an imaginary literal (`42i`, `3.14i`, `42ri`) into a complex
/// element whose payload carries the imaginary part.
pub fn parse_imaginary(text: &str) -> Option<Element> {
    let body = text.strip_suffix(['i', 'I'])?;

    let imag = if body.ends_with(['r', 'R']) {
        let (numer, denom) = parse_rational(body)?;
        Element::Rational { numer, denom }
    } else if body.contains('.') || body.contains(['e', 'E']) {
        Element::Float(parse_float(body)?)
    } else {
        Element::Int(parse_integer(body)?)
    };
    Some(Element::Complex(Box::new(imag)))
}

fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if text.len() >= prefix.len() && text[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

fn reduce(numer: i64, denom: i64) -> (i64, i64) {
    let divisor = gcd(numer.unsigned_abs(), denom.unsigned_abs());
    if divisor == 0 {
        return (numer, denom);
    }
    (numer / divisor as i64, denom / divisor as i64)
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

// ============================================================================
// STRING AND CHARACTER CONTENT
// ============================================================================

/// Cooks escape sequences in double-quoted string content.
///
/// Covers the simple named escapes, `\u{...}` and `\uXXXX` unicode escapes,
/// `\xHH` hex bytes, up-to-three-digit octal escapes, and escaped line
/// continuations (backslash-newline elides both characters). An unknown
/// escape keeps the escaped character, which is what the reference lexers do.
pub fn unescape_string(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escaped) = chars.next() else {
            out.push('\\');
            break;
        };
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            's' => out.push(' '),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'e' => out.push('\x1b'),
            'f' => out.push('\x0c'),
            'v' => out.push('\x0b'),
            '\n' => {}
            'u' => push_unicode_escape(&mut out, &mut chars),
            'x' => {
                let digits = take_while_max(&mut chars, 2, |c| c.is_ascii_hexdigit());
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(c) if !digits.is_empty() => out.push(c),
                    _ => {
                        out.push('x');
                        out.push_str(&digits);
                    }
                }
            }
            '0'..='7' => {
                let mut digits = String::from(escaped);
                digits.push_str(&take_while_max(&mut chars, 2, |c| ('0'..='7').contains(&c)));
                if let Some(c) = u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32) {
                    out.push(c);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Cooks escape sequences in block-delimited (heredoc) literal content.
///
/// Identical to [`unescape_string`] except that escaped line continuations
/// are kept as written: the segment engine needs to see the marker so it can
/// splice continuation lines while stripping indentation.
pub fn unescape_heredoc(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find("\\\n") {
        out.push_str(&unescape_string(&rest[..pos]));
        out.push_str("\\\n");
        rest = &rest[pos + 2..];
    }
    out.push_str(&unescape_string(rest));
    out
}

/// Cooks a character literal's raw text (leading `?` included) into the
/// one-character string payload the schemas store.
pub fn unescape_char(raw: &str) -> String {
    let body = raw.strip_prefix('?').unwrap_or(raw);
    unescape_string(body)
}

fn push_unicode_escape(out: &mut String, chars: &mut std::iter::Peekable<std::str::Chars>) {
    if chars.peek() == Some(&'{') {
        chars.next();
        let digits = take_while_max(chars, 6, |c| c.is_ascii_hexdigit());
        if chars.peek() == Some(&'}') {
            chars.next();
        }
        if let Some(c) = u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
            out.push(c);
        }
    } else {
        let digits = take_while_max(chars, 4, |c| c.is_ascii_hexdigit());
        match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
            Some(c) if digits.len() == 4 => out.push(c),
            _ => {
                out.push('u');
                out.push_str(&digits);
            }
        }
    }
}

fn take_while_max(
    chars: &mut std::iter::Peekable<std::str::Chars>,
    max: usize,
    pred: impl Fn(char) -> bool,
) -> String {
    let mut taken = String::new();
    while taken.len() < max {
        match chars.peek() {
            Some(&c) if pred(c) => {
                taken.push(c);
                chars.next();
            }
            _ => break,
        }
    }
    taken
}
