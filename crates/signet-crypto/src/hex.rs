//! Hex helpers shared by the material types.

pub(crate) fn encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub(crate) fn prefix(bytes: &[u8]) -> String {
    encode(&bytes[..bytes.len().min(4)])
}

pub(crate) fn decode(hex: &str) -> Result<Vec<u8>, String> {
    let digits = hex.as_bytes();
    if digits.len() % 2 != 0 {
        return Err("hex string must have even length".to_string());
    }
    digits
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| Ok(nibble(pair[0], i * 2)? << 4 | nibble(pair[1], i * 2 + 1)?))
        .collect()
}

/// Only `[0-9a-fA-F]`; signs and whitespace are rejected.
fn nibble(digit: u8, position: usize) -> Result<u8, String> {
    char::from(digit)
        .to_digit(16)
        .map(|d| d as u8)
        .ok_or_else(|| format!("invalid hex digit at position {position}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode() {
        assert_eq!(encode(&[0x00, 0xff, 0x1a]), "00ff1a");
        assert_eq!(decode("00ff1a").unwrap(), vec![0x00, 0xff, 0x1a]);
        assert_eq!(decode("00FF1A").unwrap(), vec![0x00, 0xff, 0x1a]);
    }

    #[test]
    fn decode_rejects_odd_and_garbage() {
        assert!(decode("abc").is_err());
        assert!(decode("zz").is_err());
        assert!(decode("é1").is_err());
    }

    #[test]
    fn decode_rejects_signs_and_spaces() {
        assert!(decode("+a").is_err());
        assert!(decode("-a").is_err());
        assert!(decode("+f+f").is_err());
        assert!(decode(" a").is_err());
    }

    #[test]
    fn prefix_is_at_most_four_bytes() {
        assert_eq!(prefix(&[1, 2, 3, 4, 5, 6]), "01020304");
        assert_eq!(prefix(&[9]), "09");
    }
}
