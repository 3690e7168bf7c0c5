//! Packed-decimal NUMBER encoding.
//!
//! A NUMBER is a base-100 floating point value:
//!
//! ```text
//! [len(1)] [exponent(1)] [mantissa(len-1)]
//!
//! exponent  positive: 192 + e/2 (high bit set)     negative: bitwise NOT of that
//! mantissa  positive: pair + 1 (1..=100)           negative: 101 - pair (1..=101)
//! sentinel  negative numbers under 20 pairs end with 102
//! zero      [0x01, 0x80]
//! ```
//!
//! where `e` is the decimal exponent rounded up to an even value, so each
//! mantissa byte holds one pair of decimal digits.

use crate::error::{constants, Result, WireError};

/// Maximum significant decimal digits a NUMBER can hold.
pub const NUMBER_MAX_DIGITS: usize = 40;

/// Maximum length of number text accepted for encoding.
pub const NUMBER_AS_TEXT_CHARS: usize = 172;

/// Exponent byte of the value zero.
pub const ZERO_MARKER: u8 = 0x80;

/// Trailing byte terminating short negative mantissas.
pub const NEGATIVE_SENTINEL: u8 = 102;

const MAX_DECIMAL_POINT: i32 = 126;
const MIN_DECIMAL_POINT: i32 = -129;

fn invalid(msg: &str) -> WireError {
    WireError::InvalidEncoding(msg.to_string())
}

fn digit_at(text: &[u8], pos: usize) -> Result<u8> {
    match text[pos] {
        c @ b'0'..=b'9' => Ok(c - b'0'),
        _ => Err(invalid(constants::ERR_NUMBER_INVALID)),
    }
}

/// Encode decimal text into the packed format, length byte included.
pub fn encode_number(text: &[u8]) -> Result<Vec<u8>> {
    if text.is_empty() {
        return Err(invalid(constants::ERR_NUMBER_EMPTY));
    }
    if text.len() > NUMBER_AS_TEXT_CHARS {
        return Err(invalid(constants::ERR_NUMBER_TOO_LONG));
    }

    let len = text.len();
    let negative = text[0] == b'-';
    let mut pos = usize::from(negative);
    let mut digits: Vec<u8> = Vec::with_capacity(len + 2);

    // integer part; leading zeros carry no information
    while pos < len && !matches!(text[pos], b'.' | b'e' | b'E') {
        let digit = digit_at(text, pos)?;
        pos += 1;
        if digit == 0 && digits.is_empty() {
            continue;
        }
        digits.push(digit);
    }
    let mut point = digits.len() as i32;

    if pos < len && text[pos] == b'.' {
        pos += 1;
        while pos < len && !matches!(text[pos], b'e' | b'E') {
            let digit = digit_at(text, pos)?;
            pos += 1;
            if digit == 0 && digits.is_empty() {
                point -= 1;
                continue;
            }
            digits.push(digit);
        }
    }

    if pos < len {
        // only an exponent marker can stop the scans above
        pos += 1;
        let exponent_negative = match text.get(pos) {
            Some(b'-') => {
                pos += 1;
                true
            }
            Some(b'+') => {
                pos += 1;
                false
            }
            _ => false,
        };
        if pos == len {
            return Err(invalid(constants::ERR_NUMBER_EMPTY_EXPONENT));
        }
        let mut exponent: i32 = 0;
        for p in pos..len {
            let digit = digit_at(text, p)?;
            exponent = exponent.saturating_mul(10).saturating_add(i32::from(digit));
        }
        point = if exponent_negative {
            point.saturating_sub(exponent)
        } else {
            point.saturating_add(exponent)
        };
    }

    while digits.last() == Some(&0) {
        digits.pop();
    }

    if digits.len() > NUMBER_MAX_DIGITS || !(MIN_DECIMAL_POINT..=MAX_DECIMAL_POINT).contains(&point)
    {
        return Err(WireError::ValueTooLarge(format!(
            "{}: {}",
            constants::ERR_NUMBER_NO_REPR,
            String::from_utf8_lossy(text)
        )));
    }

    // an odd decimal point puts a lone digit in the first base-100 pair
    let prepend_zero = point.rem_euclid(2) == 1;
    if prepend_zero && !digits.is_empty() {
        digits.push(0);
        point += 1;
    }
    if digits.len() % 2 == 1 {
        digits.push(0);
    }
    let num_pairs = digits.len() / 2;
    let sentinel = negative && !digits.is_empty() && num_pairs < NUMBER_MAX_DIGITS / 2;

    let mut out = Vec::with_capacity(num_pairs + 3);
    out.push((num_pairs + 1 + usize::from(sentinel)) as u8);
    if digits.is_empty() {
        out.push(ZERO_MARKER);
        return Ok(out);
    }

    // point is even and within range, so this lands in 128..=255
    let exponent = (point.div_euclid(2) + 192) as u8;
    out.push(if negative { !exponent } else { exponent });

    let mut idx = 0;
    for pair_num in 0..num_pairs {
        let pair = if pair_num == 0 && prepend_zero {
            idx += 1;
            digits[0]
        } else {
            idx += 2;
            digits[idx - 2] * 10 + digits[idx - 1]
        };
        out.push(if negative { 101 - pair } else { pair + 1 });
    }
    if sentinel {
        out.push(NEGATIVE_SENTINEL);
    }

    Ok(out)
}

/// Decode packed bytes (length byte excluded) into canonical decimal text.
pub fn decode_number(bytes: &[u8]) -> Result<String> {
    let (&first, mut mantissa) = bytes
        .split_first()
        .ok_or_else(|| invalid(constants::ERR_NUMBER_BYTES))?;

    let positive = first & 0x80 != 0;
    if mantissa.is_empty() {
        return Ok(if positive { "0" } else { "-1e126" }.to_string());
    }
    if !positive && mantissa.last() == Some(&NEGATIVE_SENTINEL) {
        mantissa = &mantissa[..mantissa.len() - 1];
    }

    let exponent = i32::from(if positive { first } else { !first }) - 193;
    let mut digits = Vec::with_capacity(mantissa.len() * 2);
    for &byte in mantissa {
        let pair = if positive {
            byte.checked_sub(1)
        } else {
            101u8.checked_sub(byte)
        }
        .filter(|pair| *pair < 100)
        .ok_or_else(|| invalid(constants::ERR_NUMBER_BYTES))?;
        digits.push(pair / 10);
        digits.push(pair % 10);
    }

    let mut point = 2 * (exponent + 1);
    let leading = digits.iter().take_while(|d| **d == 0).count();
    digits.drain(..leading);
    point -= leading as i32;
    while digits.last() == Some(&0) {
        digits.pop();
    }
    if digits.is_empty() {
        return Ok("0".to_string());
    }

    let mut out = String::with_capacity(digits.len() + 4);
    if !positive {
        out.push('-');
    }
    let push_digits = |out: &mut String, ds: &[u8]| {
        out.extend(ds.iter().map(|d| char::from(b'0' + d)));
    };
    if point <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat('0').take((-point) as usize));
        push_digits(&mut out, &digits);
    } else if point as usize >= digits.len() {
        push_digits(&mut out, &digits);
        out.extend(std::iter::repeat('0').take(point as usize - digits.len()));
    } else {
        let (int_part, frac_part) = digits.split_at(point as usize);
        push_digits(&mut out, int_part);
        out.push('.');
        push_digits(&mut out, frac_part);
    }
    Ok(out)
}
