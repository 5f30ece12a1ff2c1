//! [`Database`] implementations.

mod business;
mod event;
mod user;

#[cfg(doc)]
use crate::infra::Database;

/// Replaces the item matching the `same` predicate with the provided one.
///
/// Returns whether such an item existed. Missing items are never appended.
fn replace<T>(items: &mut [T], item: T, same: impl Fn(&T) -> bool) -> bool {
    if let Some(existing) = items.iter_mut().find(|i| same(i)) {
        *existing = item;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod spec {
    use super::replace;

    #[test]
    fn replaces_in_place() {
        let mut items = vec![(1, "a"), (2, "b"), (3, "c")];

        assert!(replace(&mut items, (2, "B"), |i| i.0 == 2));
        assert_eq!(items, [(1, "a"), (2, "B"), (3, "c")]);
    }

    #[test]
    fn never_appends_missing() {
        let mut items = vec![(1, "a")];

        assert!(!replace(&mut items, (2, "b"), |i| i.0 == 2));
        assert_eq!(items, [(1, "a")]);
    }
}
