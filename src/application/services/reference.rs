//! Resolving user-typed item references to stored ids

use crate::domain::DomainError;

/// Resolve `reference` against `ids`: an exact id, a dotted WBS number
/// (via `by_number`), or a unique id prefix, in that order.
pub fn resolve_reference<'a, I, F>(
    ids: I,
    reference: &str,
    by_number: F,
) -> Result<String, DomainError>
where
    I: IntoIterator<Item = &'a str>,
    F: FnOnce(&str) -> Option<String>,
{
    let reference = reference.trim();
    let ids: Vec<&str> = ids.into_iter().collect();

    if ids.contains(&reference) {
        return Ok(reference.to_string());
    }
    if let Some(id) = by_number(reference) {
        return Ok(id);
    }
    if reference.is_empty() {
        return Err(DomainError::ItemNotFound(reference.to_string()));
    }

    let matches: Vec<&str> = ids
        .into_iter()
        .filter(|id| id.starts_with(reference))
        .collect();
    match matches.as_slice() {
        [id] => Ok(id.to_string()),
        [] => Err(DomainError::ItemNotFound(reference.to_string())),
        many => Err(DomainError::AmbiguousReference {
            reference: reference.to_string(),
            count: many.len(),
        }),
    }
}
