//! Byte-sequence matching with wildcards.

use crate::{
    image::{Address, AddressSpace},
    Result,
};

/// Check whether the bytes at `address` match a hex pattern.
///
/// `pattern` is a sequence of hex-digit pairs, one per byte; the literal pair `??`
/// matches any byte value. A malformed pattern (odd length, non-hex pair) is a caller
/// bug and reported as an error rather than a mismatch. The byte at every position is
/// read - wildcards included - so a pattern running past the image fails with
/// [`crate::Error::OutOfBounds`] instead of silently matching.
///
/// # Examples
///
/// ```rust
/// use rttiscope::{Address, Image, analysis::match_bytes};
///
/// let image = Image::from_mem(vec![0x90, 0x12, 0x34]);
/// assert!(match_bytes(&image, Address::new(0), "90??34")?);
/// assert!(!match_bytes(&image, Address::new(0), "90AB34")?);
/// # Ok::<(), rttiscope::Error>(())
/// ```
///
/// # Errors
/// [`crate::Error::Malformed`] for a bad pattern; read errors propagate.
pub fn match_bytes(space: &dyn AddressSpace, address: Address, pattern: &str) -> Result<bool> {
    if pattern.len() % 2 != 0 {
        return Err(malformed_error!(
            "byte pattern has odd length ({}): {:?}",
            pattern.len(),
            pattern
        ));
    }

    for (index, pair) in pattern.as_bytes().chunks_exact(2).enumerate() {
        let actual = space.read_byte(address + index as u64)?;
        if pair == b"??" {
            continue;
        }

        let expected = parse_hex_pair(pair)
            .ok_or_else(|| malformed_error!("invalid hex pair in byte pattern {:?}", pattern))?;
        if actual != expected {
            return Ok(false);
        }
    }

    Ok(true)
}

fn parse_hex_pair(pair: &[u8]) -> Option<u8> {
    let high = char::from(pair[0]).to_digit(16)?;
    let low = char::from(pair[1]).to_digit(16)?;

    #[allow(clippy::cast_possible_truncation)]
    Some(((high << 4) | low) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{image::Image, Error};

    fn image() -> Image {
        Image::from_mem(vec![0x90, 0x12, 0x34])
    }

    #[test]
    fn exact_match() {
        assert!(match_bytes(&image(), Address::new(0), "901234").unwrap());
        assert!(match_bytes(&image(), Address::new(1), "1234").unwrap());
    }

    #[test]
    fn wildcards_match_any_byte() {
        assert!(match_bytes(&image(), Address::new(0), "90??34").unwrap());
        assert!(match_bytes(&image(), Address::new(0), "??????").unwrap());
    }

    #[test]
    fn mismatch_is_not_an_error() {
        assert!(!match_bytes(&image(), Address::new(0), "90AB34").unwrap());
        assert!(!match_bytes(&image(), Address::new(0), "91??34").unwrap());
    }

    #[test]
    fn case_is_insensitive_in_hex_pairs() {
        assert!(match_bytes(&image(), Address::new(1), "12").unwrap());
        let image = Image::from_mem(vec![0xAB]);
        assert!(match_bytes(&image, Address::new(0), "ab").unwrap());
        assert!(match_bytes(&image, Address::new(0), "AB").unwrap());
    }

    #[test]
    fn odd_length_pattern_is_a_caller_bug() {
        assert!(matches!(
            match_bytes(&image(), Address::new(0), "90123"),
            Err(Error::Malformed { .. })
        ));
        // The data underneath is irrelevant
        assert!(matches!(
            match_bytes(&image(), Address::new(100), "90123"),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn non_hex_pair_is_a_caller_bug() {
        assert!(matches!(
            match_bytes(&image(), Address::new(0), "90ZZ34"),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn pattern_past_the_image_end_is_out_of_bounds() {
        assert!(matches!(
            match_bytes(&image(), Address::new(0), "90123456"),
            Err(Error::OutOfBounds)
        ));
        // Wildcards still read their byte
        assert!(matches!(
            match_bytes(&image(), Address::new(2), "34??"),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn empty_pattern_matches_trivially() {
        assert!(match_bytes(&image(), Address::new(0), "").unwrap());
    }
}
