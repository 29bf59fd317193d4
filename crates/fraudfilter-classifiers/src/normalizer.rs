//! Text cleanup applied to every review before feature extraction

/// Normalize review text: lowercase, strip control and invisible format
/// characters, collapse whitespace runs to one space, trim.
///
/// The result may be empty; callers treat that as a blank review.
pub fn normalize(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| !c.is_control() && !is_invisible(*c))
        .collect();

    cleaned
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Zero-width and byte-order-mark characters that survive `is_control`
fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{2060}' | '\u{FEFF}' | '\u{00AD}'
    )
}
