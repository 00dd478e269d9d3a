use thiserror::Error;

use super::model::{Observation, ObservationTable, Slot};

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// How hydrogen-bond terms are compared against a slot's observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Structured comparison: the slot's atom-pair text must equal the term
    /// or its swapped form.
    #[default]
    Exact,
    /// Historical behavior: the term (or its swapped form) is searched as a
    /// substring of the combined `"<atoms>_<distance>"` string. Can match
    /// inside longer atom names or across the distance text; kept for
    /// reconciling against results exported by the legacy tool.
    Substring,
}

/// Validation failures for user-supplied query input. Everything else the
/// matcher can encounter resolves to an empty result, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("hydrogen-bond term '{0}' has no '-' separator")]
    MalformedTerm(String),
    #[error("at least one hydrogen-bond term is required")]
    NoTerms,
}

/// A validated hydrogen-bond query term with its swapped form precomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HbondTerm {
    raw: String,
    swapped: String,
}

impl HbondTerm {
    /// Validate a raw term. Terms without a `'-'` separator are rejected up
    /// front so a typo surfaces as an error instead of an empty result.
    pub fn parse(raw: &str) -> Result<Self, QueryError> {
        if !raw.contains('-') {
            return Err(QueryError::MalformedTerm(raw.to_string()));
        }
        Ok(HbondTerm {
            raw: raw.to_string(),
            swapped: swap_sides(raw),
        })
    }

    fn matches_atoms(&self, atoms: &str) -> bool {
        atoms == self.raw || atoms == self.swapped
    }

    fn found_within(&self, combined: &str) -> bool {
        combined.contains(&self.raw) || combined.contains(&self.swapped)
    }
}

/// Reverse the `'-'`-separated components: `"O6-N3"` → `"N3-O6"`.
fn swap_sides(label: &str) -> String {
    let mut parts: Vec<&str> = label.split('-').collect();
    parts.reverse();
    parts.join("-")
}

// ---------------------------------------------------------------------------
// Base-pair identity
// ---------------------------------------------------------------------------

/// The set of stored labels a base-pair query accepts.
///
/// * No `'-'` in the query → malformed → empty set (zero matches, no error)
/// * `"X-Y"` with X ≠ Y → `{"X-Y", "Y-X"}`
/// * `"X-X"` → `{"X-X"}`
pub fn acceptable_labels(query: &str) -> Vec<String> {
    if !query.contains('-') {
        return Vec::new();
    }
    let swapped = swap_sides(query);
    if swapped == query {
        vec![query.to_string()]
    } else {
        vec![query.to_string(), swapped]
    }
}

/// Whether a stored label denotes the queried pair. Exact, case-sensitive
/// string equality after the swap, with no trimming or case folding.
pub fn matches_base_pair(stored: &str, query: &str) -> bool {
    acceptable_labels(query).iter().any(|label| label == stored)
}

// ---------------------------------------------------------------------------
// Hydrogen-bond matching
// ---------------------------------------------------------------------------

/// Whether one slot of a row satisfies the term. A slot only has a
/// descriptor when both its atom and distance cells are present; a
/// partially-null slot never matches.
fn slot_matches(
    obs: &Observation,
    slot: &Slot,
    term: &HbondTerm,
    policy: MatchPolicy,
) -> bool {
    let Some(atoms) = obs.present_cell(&slot.atom_column) else {
        return false;
    };
    let Some(distance) = obs.present_cell(&slot.distance_column) else {
        return false;
    };
    match policy {
        MatchPolicy::Exact => term.matches_atoms(&atoms.to_string()),
        MatchPolicy::Substring => {
            let combined = format!("{atoms}_{distance}");
            term.found_within(&combined)
        }
    }
}

/// Pure per-row predicate: does ANY slot of this row satisfy the term?
pub fn row_matches_term(
    obs: &Observation,
    slots: &[Slot],
    term: &HbondTerm,
    policy: MatchPolicy,
) -> bool {
    slots.iter().any(|slot| slot_matches(obs, slot, term, policy))
}

/// Vectorized form of [`row_matches_term`]: one boolean per row, in row
/// order.
pub fn has_hydrogen_bond(
    table: &ObservationTable,
    term: &HbondTerm,
    policy: MatchPolicy,
) -> Vec<bool> {
    table
        .observations
        .iter()
        .map(|obs| row_matches_term(obs, &table.slots, term, policy))
        .collect()
}

// ---------------------------------------------------------------------------
// Search entry point
// ---------------------------------------------------------------------------

/// Return the observations recorded under `base_pair` (order-insensitive)
/// that satisfy every hydrogen-bond term.
///
/// * Terms are validated before any row is touched; the first malformed
///   term aborts the search with [`QueryError::MalformedTerm`].
/// * An empty term list is caller misuse (the shell rejects it first) and
///   fails with [`QueryError::NoTerms`].
/// * Term order is irrelevant and duplicates are harmless: each term only
///   narrows the mask.
/// * The result preserves source row order, keeps every original column,
///   and introduces none; the input table is never mutated.
pub fn find_interest(
    table: &ObservationTable,
    base_pair: &str,
    terms: &[String],
    policy: MatchPolicy,
) -> Result<ObservationTable, QueryError> {
    if terms.is_empty() {
        return Err(QueryError::NoTerms);
    }
    let terms: Vec<HbondTerm> = terms
        .iter()
        .map(|t| HbondTerm::parse(t))
        .collect::<Result<_, _>>()?;

    // Base-pair mask ANDed with one mask per term.
    let mut mask: Vec<bool> = table
        .observations
        .iter()
        .map(|obs| matches_base_pair(&obs.base_pair, base_pair))
        .collect();

    for term in &terms {
        let term_mask = has_hydrogen_bond(table, term, policy);
        for (keep, hit) in mask.iter_mut().zip(term_mask) {
            *keep = *keep && hit;
        }
    }

    let indices: Vec<usize> = mask
        .iter()
        .enumerate()
        .filter_map(|(i, &keep)| keep.then_some(i))
        .collect();
    Ok(table.subset(&indices))
}
