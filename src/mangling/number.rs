//! The MSVC "mangled number" codec.
//!
//! Decorated names embed signed integers (this-adjustor displacements, PMD fields,
//! attribute words) in a compact scheme:
//!
//! | magnitude `m = |n|` | encoding |
//! |---|---|
//! | `m == 0` | `A@` |
//! | `1 <= m <= 10` | the decimal digit of `m - 1` |
//! | `m > 10` | big-endian base-16 digits of `m`, nibbles mapped `0..15 -> 'A'..'P'`, terminated by `@` |
//!
//! Negative numbers prefix the encoding of their magnitude with `?`.

use crate::Result;

/// Encode a signed integer into the MSVC mangled-number alphabet.
///
/// Pure and total over the full `i32` range; the magnitude is taken in 64-bit
/// arithmetic so `i32::MIN` does not overflow on negation.
///
/// # Examples
///
/// ```rust
/// use rttiscope::mangling::encode_number;
///
/// assert_eq!(encode_number(0), "A@");
/// assert_eq!(encode_number(1), "0");
/// assert_eq!(encode_number(-1), "?0");
/// assert_eq!(encode_number(11), "B@");
/// ```
#[must_use]
pub fn encode_number(n: i32) -> String {
    let magnitude = i64::from(n).unsigned_abs();

    let mut out = String::new();
    if n < 0 {
        out.push('?');
    }

    match magnitude {
        0 => out.push_str("A@"),
        1..=10 => out.push_str(&(magnitude - 1).to_string()),
        _ => {
            // Big-endian nibbles: collect low-to-high, emit in reverse.
            let mut digits = [0u8; 16];
            let mut count = 0;
            let mut rest = magnitude;
            while rest > 0 {
                digits[count] = (rest & 0xF) as u8;
                count += 1;
                rest >>= 4;
            }

            for digit in digits[..count].iter().rev() {
                out.push(char::from(b'A' + digit));
            }
            out.push('@');
        }
    }

    out
}

/// Decode a mangled number back into the signed integer it encodes.
///
/// Inverts [`encode_number`] over the full grammar, including non-canonical spellings
/// with leading `A` nibbles.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for text outside the grammar or for magnitudes
/// that do not fit the signed 32-bit range.
///
/// # Examples
///
/// ```rust
/// use rttiscope::mangling::decode_number;
///
/// assert_eq!(decode_number("A@")?, 0);
/// assert_eq!(decode_number("?0")?, -1);
/// assert_eq!(decode_number("BA@")?, 16);
/// assert!(decode_number("Z").is_err());
/// # Ok::<(), rttiscope::Error>(())
/// ```
pub fn decode_number(text: &str) -> Result<i32> {
    let (negative, body) = match text.strip_prefix('?') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let magnitude: u64 = if let Some(digits) = body.strip_suffix('@') {
        if digits.is_empty() {
            return Err(malformed_error!("empty mangled number: {:?}", text));
        }

        let mut value: u64 = 0;
        for c in digits.chars() {
            if !('A'..='P').contains(&c) {
                return Err(malformed_error!(
                    "invalid mangled digit {:?} in {:?}",
                    c,
                    text
                ));
            }

            value = (value << 4) | u64::from(c as u8 - b'A');
            if value > u64::from(u32::MAX) {
                return Err(malformed_error!("mangled number out of range: {:?}", text));
            }
        }
        value
    } else if body.len() == 1 && body.as_bytes()[0].is_ascii_digit() {
        u64::from(body.as_bytes()[0] - b'0') + 1
    } else {
        return Err(malformed_error!("unrecognized mangled number: {:?}", text));
    };

    if negative {
        if magnitude > 1 << 31 {
            return Err(malformed_error!("mangled number out of range: {:?}", text));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        Ok((-(magnitude as i64)) as i32)
    } else {
        i32::try_from(magnitude)
            .map_err(|_| malformed_error!("mangled number out of range: {:?}", text))
    }
}
