//! Species input validation.
//!
//! Users can name a species by index, by label, or by a common short name.
//! Resolution: index → exact label → synonym → error with suggestion.
//! Labels compare case-insensitively with hyphens treated as spaces.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::error::Error;
use crate::model::{SpeciesType, LABELS};

/// Normalized label → species, built once from the fixed table.
pub static LABEL_INDEX: LazyLock<HashMap<String, SpeciesType>> = LazyLock::new(|| {
    SpeciesType::all()
        .map(|species| (normalize_label(species.label()), species))
        .collect()
});

/// Short names in common use, mapped to table indices.
pub static SPECIES_SYNONYMS: LazyLock<HashMap<&str, usize>> = LazyLock::new(|| {
    [
        ("unidentified", 0),
        ("unknown bird", 0),
        ("kookaburra", 24),
        ("kestrel", 27),
        ("nankeen kestrel", 27),
        ("hobby", 28),
        ("magpie", 35),
        ("butcherbird", 37),
        ("crow", 40),
        ("pipit", 56),
        ("bowerbird", 60),
        ("wagtail", 61),
        ("darter", 62),
        ("pelican", 63),
        ("grebe", 67),
        ("corella", 70),
        ("ringneck", 71),
        ("budgie", 72),
        ("buttonquail", 73),
    ]
    .into_iter()
    .collect()
});

fn normalize_label(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .replace('-', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve user input to a species.
///
/// # Errors
///
/// Returns `UnknownSpecies` with the closest label as a suggestion when
/// nothing matches. An out-of-range index carries no suggestion.
pub fn normalize_species(input: &str) -> Result<SpeciesType, Error> {
    let trimmed = input.trim();

    // Tier 1: index
    if let Ok(n) = trimmed.parse::<usize>() {
        return SpeciesType::new(n).ok_or_else(|| Error::UnknownSpecies {
            input: input.to_string(),
            suggestion: None,
        });
    }

    let key = normalize_label(trimmed);

    // Tier 2: label
    if let Some(&species) = LABEL_INDEX.get(&key) {
        return Ok(species);
    }

    // Tier 3: synonym
    if let Some(species) = SPECIES_SYNONYMS
        .get(key.as_str())
        .and_then(|&index| SpeciesType::new(index))
    {
        return Ok(species);
    }

    Err(Error::UnknownSpecies {
        input: input.to_string(),
        suggestion: find_closest_label(&key),
    })
}

/// Find the closest label within a small edit distance.
fn find_closest_label(input: &str) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;

    for &label in &LABELS {
        let dist = levenshtein_distance(input, &normalize_label(label));
        if dist <= 3 && best.is_none_or(|(_, d)| dist < d) {
            best = Some((label, dist));
        }
    }

    best.map(|(label, _)| label.to_string())
}

// ── Levenshtein distance ─────────────────────────────────────

/// Compute the Levenshtein edit distance between two strings.
#[must_use]
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let a_len = a.len();
    let b_len = b.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // Single-row optimization
    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}
