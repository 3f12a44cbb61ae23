use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::item::InventoryItem;
use crate::ordering::sort_by_item_name;

/// Per-item-name roll-up of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSummaryEntry {
    pub item: String,
    /// Distinct EPCs of this name currently scanned.
    pub present_count: usize,
    pub last_scanned: Option<DateTime<Utc>>,
}

impl ItemSummaryEntry {
    fn empty(item: &str) -> Self {
        Self {
            item: item.to_string(),
            present_count: 0,
            last_scanned: None,
        }
    }

    /// One or zero tags present; flagged for display, never filtered.
    pub fn is_low_count(&self) -> bool {
        self.present_count <= 1
    }
}

/// Build the summary over every item name in `items`, sorted for display.
///
/// Names are collected in first-appearance order before the stable sort, so
/// names that fold to the same key keep that order.
pub(crate) fn summarize<'a>(items: impl IntoIterator<Item = &'a InventoryItem>) -> Vec<ItemSummaryEntry> {
    let mut entries: Vec<ItemSummaryEntry> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();

    for item in items {
        let slot = *index.entry(item.item()).or_insert_with(|| {
            entries.push(ItemSummaryEntry::empty(item.item()));
            entries.len() - 1
        });

        if !item.is_present() {
            continue;
        }

        let entry = &mut entries[slot];
        entry.present_count += 1;
        // `None < Some(_)`, so an absent timestamp never wins.
        entry.last_scanned = entry.last_scanned.max(item.last_scan());
    }

    sort_by_item_name(&mut entries, |e| e.item.as_str());
    entries
}
