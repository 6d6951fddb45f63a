//! Queue builder - turns the register into a flat build order
//!
//! Ordering:
//! 1. `top` bucket, then everything placed after those names
//! 2. Every other placement key, in the order it was first registered
//! 3. `bottom` bucket (expanded before step 2, emitted last)
//!
//! Each bucket is expanded depth-first: a name is followed directly by the
//! names registered "after" it. A placement key is expanded at most once per
//! resolve, which terminates cycles and self references.

use crate::register::RegistrationStore;
use crate::types::{BOTTOM_KEY, TOP_KEY};
use std::collections::HashSet;

/// Resolve a register into an ordered, duplicate-free queue of names
///
/// When a name is registered under several placement keys, only its first
/// occurrence is kept.
pub fn resolve(store: &RegistrationStore) -> Vec<String> {
    let mut visited: HashSet<&str> = HashSet::new();

    let mut ordered = dequeue_rules(store, TOP_KEY, &mut visited);
    let bottom = dequeue_rules(store, BOTTOM_KEY, &mut visited);

    for placement in store.placement_keys() {
        ordered.extend(dequeue_rules(store, placement, &mut visited));
    }
    ordered.extend(bottom);

    let mut seen: HashSet<&str> = HashSet::with_capacity(ordered.len());
    ordered
        .into_iter()
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Expand one placement key: each name, then whatever is placed after it
fn dequeue_rules<'a>(
    store: &'a RegistrationStore,
    placement: &'a str,
    visited: &mut HashSet<&'a str>,
) -> Vec<&'a str> {
    if !visited.insert(placement) {
        return Vec::new();
    }
    let Some(bucket) = store.bucket(placement) else {
        return Vec::new();
    };

    let mut result = Vec::with_capacity(bucket.len());
    for name in bucket.keys() {
        result.push(name.as_str());
        result.extend(dequeue_rules(store, name, visited));
    }
    result
}
