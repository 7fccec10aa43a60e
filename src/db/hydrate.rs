//! Reassembly of nested entities out of flat join result sets.
//!
//! List queries that join a root table against its relations return one row
//! per leaf match, with the root columns repeated on every row. The helpers
//! here collapse such a result set back into distinct root entities, each
//! carrying a deduplicated collection of related entities, without any
//! per-entity-pair duplication of the grouping logic.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Collapse a denormalized join result into distinct root entities.
///
/// - `root_id` extracts the root's identifier from a row.
/// - `build_root` constructs the root entity from the first row it appears
///   in; it is called exactly once per distinct root id and is also the place
///   to attach a zero-or-one relation (skip it when its id column is null).
/// - `related_id` extracts the identifier of the zero-or-many relation, or
///   `None` when the outer join produced no match on this row.
/// - `attach_related` constructs the related entity from the row and appends
///   it to the root; it is called at most once per distinct (root, related)
///   id pair, no matter how many rows repeat the combination.
///
/// Roots are returned in first-seen order. An empty row set yields an empty
/// vec; absence is a normal outcome, not an error.
pub fn collapse_rows<Row, Root, K, M>(
    rows: &[Row],
    root_id: impl Fn(&Row) -> K,
    build_root: impl Fn(&Row) -> Root,
    related_id: impl Fn(&Row) -> Option<M>,
    mut attach_related: impl FnMut(&mut Root, &Row),
) -> Vec<Root>
where
    K: Eq + Hash + Copy,
    M: Eq + Hash + Copy,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut entries: Vec<(Root, HashSet<M>)> = Vec::new();

    for row in rows {
        let key = root_id(row);
        let slot = match index.get(&key) {
            Some(&i) => i,
            None => {
                entries.push((build_root(row), HashSet::new()));
                index.insert(key, entries.len() - 1);
                entries.len() - 1
            }
        };

        if let Some(rel) = related_id(row) {
            let (root, seen) = &mut entries[slot];
            if seen.insert(rel) {
                attach_related(root, row);
            }
        }
    }

    entries.into_iter().map(|(root, _)| root).collect()
}

/// Single-entity variant of [`collapse_rows`] for find-by-id queries: the row
/// set is already restricted to one root, so the first (and only) distinct
/// root is the result. `None` means not found.
pub fn collapse_one<Row, Root, K, M>(
    rows: &[Row],
    root_id: impl Fn(&Row) -> K,
    build_root: impl Fn(&Row) -> Root,
    related_id: impl Fn(&Row) -> Option<M>,
    attach_related: impl FnMut(&mut Root, &Row),
) -> Option<Root>
where
    K: Eq + Hash + Copy,
    M: Eq + Hash + Copy,
{
    collapse_rows(rows, root_id, build_root, related_id, attach_related)
        .into_iter()
        .next()
}
