use std::collections::HashSet;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum SelectionError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("Too many pairs requested: {requested} exceeds the limit of {max}")]
    TooManyPairs { requested: usize, max: usize },
}

/// Trims ids, drops blanks and repeats, and keeps first-seen order.
pub(crate) fn dedup_ids(ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty() && seen.insert(id.to_string()))
        .map(str::to_string)
        .collect()
}

/// Collapses repeated keys: the last value wins, at the position where the key
/// first appeared.
pub(crate) fn last_per_key<'a, T>(
    entries: impl IntoIterator<Item = (&'a str, T)>,
) -> Vec<(&'a str, T)> {
    let mut merged: Vec<(&'a str, T)> = Vec::new();
    for (key, value) in entries {
        match merged.iter_mut().find(|(seen, _)| *seen == key) {
            Some(slot) => slot.1 = value,
            None => merged.push((key, value)),
        }
    }
    merged
}

/// Rejects empty selections and cross products above `max`.
pub(crate) fn check_pair_budget(
    entities: (&'static str, usize),
    companies: (&'static str, usize),
    max: usize,
) -> Result<usize, SelectionError> {
    if entities.1 == 0 {
        return Err(SelectionError::Empty(entities.0));
    }
    if companies.1 == 0 {
        return Err(SelectionError::Empty(companies.0));
    }
    let requested = entities.1.saturating_mul(companies.1);
    if requested > max {
        return Err(SelectionError::TooManyPairs { requested, max });
    }
    Ok(requested)
}

/// Outer entity, inner company.
pub(crate) fn cross_product<'a>(
    entity_ids: &'a [String],
    company_ids: &'a [String],
) -> Vec<(&'a str, &'a str)> {
    entity_ids
        .iter()
        .flat_map(|entity| {
            company_ids.iter().map(move |company| (entity.as_str(), company.as_str()))
        })
        .collect()
}
