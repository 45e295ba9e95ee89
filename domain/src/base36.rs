//! Base36 encoding used for generated slugs.
//!
//! Lowercase only, so every generated code already satisfies the slug charset.

const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Returns the base36 alphabet as bytes.
pub fn alphabet() -> &'static [u8] {
    &ALPHABET[..]
}

/// Encode an unsigned 64-bit integer using 0-9, a-z. Zero encodes to "0".
pub fn encode_u64(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    // u64::MAX needs 13 base36 digits
    let mut buf = [0u8; 13];
    let mut i = buf.len();
    while n > 0 {
        let rem = (n % 36) as usize;
        i -= 1;
        buf[i] = ALPHABET[rem];
        n /= 36;
    }
    buf[i..].iter().map(|&b| char::from(b)).collect()
}

/// Encode and left-pad with '0' to at least `min_width` characters.
pub fn encode_padded(n: u64, min_width: usize) -> String {
    let s = encode_u64(n);
    if s.len() >= min_width {
        return s;
    }
    let mut buf = "0".repeat(min_width - s.len());
    buf.push_str(&s);
    buf
}
