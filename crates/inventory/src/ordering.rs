//! Display ordering for item names.

/// Case-folded sort key for an item name.
pub fn fold_key(name: &str) -> String {
    name.to_uppercase()
}

/// Stable, case-insensitive sort by item name.
///
/// Elements whose folded names compare equal keep their relative order.
pub fn sort_by_item_name<T>(values: &mut [T], name: impl Fn(&T) -> &str) {
    values.sort_by_cached_key(|v| fold_key(name(v)));
}
