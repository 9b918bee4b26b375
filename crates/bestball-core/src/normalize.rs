// Player name canonicalization.
//
// Rankings come from sources that disagree on punctuation, suffixes and
// spacing ("D.J. Moore", "DJ Moore", "Kenneth Walker III"). Every loader
// reduces raw names to lowercase underscore-joined tokens so two lists can be
// compared cell by cell.

use std::collections::HashMap;

/// Names a known source renders incorrectly, keyed by the normalized
/// misrendering.
pub const DEFAULT_ALIASES: &[(&str, &str)] = &[("gabe_davis", "gabriel_davis")];

/// Canonicalize `raw` into a comparable token.
///
/// Whitespace runs become a single underscore, non-word characters are
/// stripped, the result is lowercased, and only the first `parts`
/// underscore-separated segments are kept. Empty input yields an empty token.
pub fn normalize(raw: &str, parts: usize) -> String {
    let mut token = String::with_capacity(raw.len());
    let mut in_space = false;
    for c in raw.trim().chars() {
        if c.is_whitespace() {
            if !in_space {
                token.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        // Lowercasing can emit combining marks, so filter after it.
        token.extend(
            c.to_lowercase()
                .filter(|lc| lc.is_alphanumeric() || *lc == '_'),
        );
    }

    token.split('_').take(parts).collect::<Vec<_>>().join("_")
}

/// Normalizer with an injectable alias table applied after normalization.
#[derive(Debug, Clone, Default)]
pub struct NameNormalizer {
    aliases: HashMap<String, String>,
}

impl NameNormalizer {
    pub fn new(aliases: HashMap<String, String>) -> Self {
        Self { aliases }
    }

    /// Normalizer preloaded with [`DEFAULT_ALIASES`].
    pub fn with_default_aliases() -> Self {
        Self::new(
            DEFAULT_ALIASES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        )
    }

    pub fn add_alias(&mut self, misrendered: impl Into<String>, canonical: impl Into<String>) {
        self.aliases.insert(misrendered.into(), canonical.into());
    }

    pub fn aliases(&self) -> &HashMap<String, String> {
        &self.aliases
    }

    /// Normalize and then apply the alias table.
    pub fn normalize(&self, raw: &str, parts: usize) -> String {
        self.resolve(normalize(raw, parts))
    }

    /// Apply the alias table to an already-normalized token.
    pub fn resolve(&self, token: String) -> String {
        match self.aliases.get(&token) {
            Some(canonical) => canonical.clone(),
            None => token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_punctuation_and_lowercases() {
        assert_eq!(normalize("D.J. Moore", 2), "dj_moore");
        assert_eq!(normalize("Ja'Marr Chase", 2), "jamarr_chase");
        assert_eq!(normalize("Amon-Ra St. Brown", 2), "amonra_st");
    }

    #[test]
    fn keeps_requested_number_of_parts() {
        assert_eq!(normalize("Kenneth Walker III", 1), "kenneth");
        assert_eq!(normalize("Kenneth Walker III", 2), "kenneth_walker");
        assert_eq!(normalize("Kenneth Walker III", 5), "kenneth_walker_iii");
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(normalize("Josh \t  Allen", 2), "josh_allen");
        assert_eq!(normalize("  Josh Allen  ", 2), "josh_allen");
    }

    #[test]
    fn empty_input_yields_empty_token() {
        assert_eq!(normalize("", 1), "");
        assert_eq!(normalize("   ", 2), "");
        assert_eq!(normalize("...", 2), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs = [
            "Patrick Mahomes II",
            "D'Andre Swift",
            "  odd   spacing here ",
            "_leading underscore",
            "Travis Etienne Jr.",
            "",
            "Žan Ćurić",
        ];
        for raw in inputs {
            for parts in 1..=3 {
                let once = normalize(raw, parts);
                assert_eq!(normalize(&once, parts), once, "input {raw:?} parts {parts}");
            }
        }
    }

    #[test]
    fn alias_applied_after_normalization() {
        let normalizer = NameNormalizer::with_default_aliases();
        assert_eq!(normalizer.normalize("Gabe Davis", 2), "gabriel_davis");
        assert_eq!(normalizer.normalize("Gabriel Davis", 2), "gabriel_davis");
        assert_eq!(normalizer.normalize("Mike Davis", 2), "mike_davis");
    }

    #[test]
    fn injected_alias_table_is_used() {
        let mut normalizer = NameNormalizer::default();
        assert_eq!(normalizer.normalize("Hollywood Brown", 2), "hollywood_brown");
        normalizer.add_alias("hollywood_brown", "marquise_brown");
        assert_eq!(normalizer.normalize("Hollywood Brown", 2), "marquise_brown");
    }
}
