//! Sanctions screening: normalized substring matching against a flat
//! watchlist. Exact/substring matching only, not the fuzzy scoring a
//! full screening engine would use.

use gateway_types::{Party, SanctionsCheck, SanctionsMatch};
use unicode_normalization::UnicodeNormalization;

/// A loaded sanctions watchlist. Entries are stored pre-normalized so
/// lookups never re-normalize the same string twice.
#[derive(Debug, Clone, Default)]
pub struct SanctionsList {
    entries: Vec<String>,
}

impl SanctionsList {
    /// Build a list from raw entity names, normalizing each on the way in.
    pub fn new(entries: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { entries: entries.into_iter().map(|e| normalize(&e.into())).collect() }
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the list holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn matches(&self, name: &str) -> Vec<String> {
        let normalized = normalize(name);
        if normalized.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|entry| normalized.contains(entry.as_str()) || entry.contains(normalized.as_str()))
            .cloned()
            .collect()
    }
}

/// Casefold, strip diacritics, and collapse internal whitespace so that
/// "JOSÉ  DE LA CRUZ" and "jose de la cruz" compare equal.
fn normalize(raw: &str) -> String {
    let folded: String = raw.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F)
}

/// Screen both parties of a payment against `list`, collecting all hits
/// rather than stopping at the first.
pub fn check_sanctions(debtor_name: &str, creditor_name: &str, list: &SanctionsList) -> SanctionsCheck {
    let mut hits = Vec::new();

    for matched_entry in list.matches(debtor_name) {
        hits.push(SanctionsMatch { party: Party::Debtor, matched_entry });
    }
    for matched_entry in list.matches(creditor_name) {
        hits.push(SanctionsMatch { party: Party::Creditor, matched_entry });
    }

    SanctionsCheck { cleared: hits.is_empty(), hits }
}
