use regex::Regex;
use std::sync::LazyLock;

/// Everything outside the Letter and Number general categories
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s]").expect("pattern is valid"));

/// Canonical form used for every word comparison.
///
/// Lower-cases, drops anything that is not a Unicode letter (L*), number
/// (N*) or whitespace, then collapses whitespace runs into single spaces
/// with no leading or trailing space. Two words are the same iff their
/// normalized forms are equal.
pub fn normalize(word: &str) -> String {
    let lowered = word.to_lowercase();
    let kept = NON_WORD.replace_all(&lowered, "");

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Key identifying a pair regardless of casing or punctuation
pub fn pair_signature(civilian: &str, undercover: &str) -> String {
    format!("{}|{}", normalize(civilian), normalize(undercover))
}
