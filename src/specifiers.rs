//! Market specifiers.
use std::collections::HashMap;

use crate::error::FormatError;

/// Specifiers of one market occurrence, e.g. `score=2:0` or `variant=sr:correct_score:bestof:12`.
///
/// Specifiers are immutable once built and are usually shared behind an `Arc`.
pub type Specifiers = HashMap<String, String>;

/// Name of the specifier that selects the outcome set of variant markets.
pub const VARIANT_SPECIFIER: &str = "variant";

/// Name of the specifier holding the base score of flex score markets.
pub const SCORE_SPECIFIER: &str = "score";

/// Parse specifiers from the `name=value|name=value` form used by feed messages.
///
/// Values may contain `=` (only the first one separates name from value). An empty string yields
/// an empty specifier set.
pub fn parse_specifiers(input: &str) -> Result<Specifiers, FormatError> {
    let mut specifiers = Specifiers::new();
    if input.trim().is_empty() {
        return Ok(specifiers);
    }

    for pair in input.split('|') {
        let Some((name, value)) = pair.split_once('=') else {
            return Err(FormatError::InvalidSpecifier(pair.to_owned()));
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(FormatError::InvalidSpecifier(pair.to_owned()));
        }
        specifiers.insert(name.to_owned(), value.trim().to_owned());
    }

    Ok(specifiers)
}
