//! Sentence-boundary splitting

const TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Split text into non-empty trimmed claims
///
/// A run of `.`, `!` or `?` ends a claim when followed by whitespace or the
/// end of the text, so decimals and dotted names stay whole. Line breaks
/// always end a claim. Trailing terminators are not part of the claim.
///
/// # Examples
///
/// ```
/// use tribunal_premise::split_claims;
///
/// assert_eq!(split_claims("One. Two!\nThree?"), vec!["One", "Two", "Three"]);
/// assert_eq!(split_claims("Pi is 3.14. Done"), vec!["Pi is 3.14", "Done"]);
/// assert!(split_claims("  ...  ").is_empty());
/// ```
pub fn split_claims(text: &str) -> Vec<String> {
    let mut claims = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let boundary = match c {
            '\n' | '\r' => true,
            c if TERMINATORS.contains(&c) => chars
                .peek()
                .is_none_or(|&(_, next)| next.is_whitespace()),
            _ => false,
        };
        if boundary {
            push_claim(&mut claims, &text[start..i]);
            start = i + c.len_utf8();
        }
    }
    push_claim(&mut claims, &text[start..]);

    claims
}

fn push_claim(claims: &mut Vec<String>, raw: &str) {
    let claim = raw.trim().trim_end_matches(TERMINATORS).trim_end();
    if !claim.is_empty() {
        claims.push(claim.to_string());
    }
}
