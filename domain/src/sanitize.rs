//! Stripping of invisible and control code points from untrusted text.

use unicode_normalization::UnicodeNormalization;

/// True for code points that are removed before any other check runs.
fn is_stripped(c: char) -> bool {
    matches!(
        c,
        '\u{0000}'..='\u{001F}'
            | '\u{007F}'
            // zero-width space, non-joiner, joiner, LRM, RLM
            | '\u{200B}'..='\u{200F}'
            // LRE, RLE, PDF, LRO, RLO
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'
            // LRI, RLI, FSI, PDI
            | '\u{2066}'..='\u{2069}'
            | '\u{FEFF}'
    )
}

/// Remove control, zero-width, BOM and bidi-override characters.
///
/// No other transformation is applied, so the result is stable under
/// repeated application.
pub fn sanitize(input: &str) -> String {
    input.chars().filter(|c| !is_stripped(*c)).collect()
}

/// Sanitize, trim, then NFKC-normalize.
///
/// Normalization can change both length and case, so it must come last.
pub fn clean(input: &str) -> String {
    sanitize(input).trim().nfkc().collect()
}
