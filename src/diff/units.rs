//! Splitting tokens into diff units.

use once_cell::sync::Lazy;
use regex::Regex;

static UNIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+|[^\w\s]").unwrap());

/// Break tokens into the units the diff compares and annotations track.
///
/// With `split_punctuation`, each token becomes its runs of word characters
/// and its individual punctuation characters, so `mat.` yields `mat` and
/// `.`. Without it the tokens are used as they are.
pub fn units<S: AsRef<str>>(tokens: &[S], split_punctuation: bool) -> Vec<String> {
    if !split_punctuation {
        return tokens.iter().map(|t| t.as_ref().to_string()).collect();
    }

    tokens
        .iter()
        .flat_map(|token| UNIT.find_iter(token.as_ref()))
        .map(|m| m.as_str().to_string())
        .collect()
}
