use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Canonical comparable form of a piece of text.
///
/// Compatibility-decomposes (NFKD), drops combining marks, lowercases and
/// collapses every run of Unicode white space (non-breaking, figure, thin and
/// hair spaces included) into a single ASCII space. The result is trimmed.
///
/// The decomposition runs a second time after lowercasing because a few
/// lowercase mappings introduce combining marks of their own (`İ` → `i̇`).
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
