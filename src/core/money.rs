//! pt-BR money and percentage formatting.

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Format as Brazilian Real, e.g. `R$ 1.234,56`
pub fn format_brl(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let fixed = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}R$ {},{}", sign, group_thousands(int_part), frac_part)
}

/// Interpret typed currency as a count of cents: `"R$ 1.234,56"` -> `"1234.56"`.
///
/// Returns an empty string when nothing numeric was typed.
pub fn parse_typed_currency(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return String::new();
    }
    match Decimal::from_str(&digits) {
        Ok(cents) => format!("{:.2}", cents / Decimal::ONE_HUNDRED),
        Err(_) => String::new(),
    }
}

/// Format a fraction as a pt-BR percentage with 1 to 4 fraction digits: `0.149` -> `14,9`
pub fn format_percent(fraction: Decimal) -> String {
    let percent = (fraction * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = percent.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (text.clone(), "0".to_string()),
    };
    let sign = if percent.is_sign_negative() && !percent.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{},{}", sign, group_thousands(&int_part), frac_part)
}

/// Parse a typed percentage into a fraction: `"14,9%"` -> `0.149`.
///
/// Unparsable input yields zero.
pub fn parse_percent(input: &str) -> Decimal {
    let cleaned: String = input
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    let cleaned = cleaned.replacen(',', ".", 1);
    numeric_prefix(&cleaned)
        .map(|value| value / Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::ZERO)
}

/// Lenient parse of a stored amount such as `"1000.00"`; `None` if no number leads the text.
pub fn parse_amount(input: &str) -> Option<Decimal> {
    numeric_prefix(input.trim_start())
}

/// Longest leading `[+-]digits[.digits]` run, parsed as a decimal.
fn numeric_prefix(input: &str) -> Option<Decimal> {
    let mut prefix = String::new();
    let mut chars = input.chars().peekable();

    if let Some(&c) = chars.peek() {
        if c == '-' || c == '+' {
            if c == '-' {
                prefix.push('-');
            }
            chars.next();
        }
    }

    let mut int_digits = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        int_digits.push(c);
        chars.next();
    }

    let mut frac_digits = String::new();
    if chars.peek() == Some(&'.') {
        chars.next();
        while let Some(&c) = chars.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            frac_digits.push(c);
            chars.next();
        }
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }
    if int_digits.is_empty() {
        int_digits.push('0');
    }
    prefix.push_str(&int_digits);
    if !frac_digits.is_empty() {
        prefix.push('.');
        prefix.push_str(&frac_digits);
    }
    Decimal::from_str(&prefix).ok()
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}
