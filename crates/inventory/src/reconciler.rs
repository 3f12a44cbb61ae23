//! The inventory snapshot and its reconciliation against scan batches.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use rfidtrack_core::{CatalogRowId, DomainError, Epc};

use crate::expiration::{self, DEFAULT_EXPIRING_SOON_DAYS, ExpirationNotice};
use crate::item::{CatalogEntry, InventoryItem, ScanUpdate};
use crate::ordering::sort_by_item_name;
use crate::summary::{self, ItemSummaryEntry};

/// How an update batch is merged into the snapshot.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReconciliationMode {
    /// Every item is zeroed before the batch is applied; the batch is the
    /// complete set of tags currently seen.
    FullReplace,
    /// Only items named in the batch change; the rest keep their last state.
    #[default]
    IncrementalMerge,
}

impl core::fmt::Display for ReconciliationMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            ReconciliationMode::FullReplace => "full-replace",
            ReconciliationMode::IncrementalMerge => "incremental-merge",
        })
    }
}

impl core::str::FromStr for ReconciliationMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "full-replace" | "full" => Ok(Self::FullReplace),
            "incremental-merge" | "incremental" | "merge" => Ok(Self::IncrementalMerge),
            other => Err(DomainError::validation(format!(
                "unknown reconciliation mode: {other}"
            ))),
        }
    }
}

/// Result of loading a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitializeOutcome {
    pub loaded: usize,
    /// Rows skipped because their EPC or id was already loaded.
    pub duplicates: Vec<CatalogEntry>,
    /// Rows skipped because their EPC is blank.
    pub rejected: Vec<CatalogEntry>,
}

/// Result of applying one update batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub mode: ReconciliationMode,
    pub applied: usize,
    /// EPCs named by the batch but absent from the snapshot (ignored).
    pub unknown: Vec<Epc>,
}

/// Owns the inventory snapshot for one connection session.
///
/// All operations are synchronous and take `&mut self` for the whole batch, so
/// derived views never observe a partially applied batch.
#[derive(Debug, Clone)]
pub struct Reconciler {
    mode: ReconciliationMode,
    expiring_window: Duration,
    items: Vec<InventoryItem>,
    by_epc: HashMap<Epc, usize>,
    /// Set once a batch lands after `initialize`/`clear_scans`; until then the
    /// summary is empty.
    summary_tracked: bool,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(ReconciliationMode::default())
    }
}

impl Reconciler {
    pub fn new(mode: ReconciliationMode) -> Self {
        Self {
            mode,
            expiring_window: Duration::days(DEFAULT_EXPIRING_SOON_DAYS),
            items: Vec::new(),
            by_epc: HashMap::new(),
            summary_tracked: false,
        }
    }

    pub fn with_expiring_window(mut self, window: Duration) -> Self {
        self.expiring_window = window;
        self
    }

    pub fn mode(&self) -> ReconciliationMode {
        self.mode
    }

    pub fn expiring_window(&self) -> Duration {
        self.expiring_window
    }

    /// Snapshot items in catalog order.
    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn get(&self, epc: &Epc) -> Option<&InventoryItem> {
        self.by_epc.get(epc).map(|&i| &self.items[i])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the snapshot with the given catalog, every row unscanned.
    ///
    /// Rows with a blank EPC, or repeating an EPC or id already loaded (first
    /// row wins), are skipped one at a time and reported in the outcome.
    pub fn initialize(&mut self, catalog: impl IntoIterator<Item = CatalogEntry>) -> InitializeOutcome {
        let catalog = catalog.into_iter();
        let mut items = Vec::with_capacity(catalog.size_hint().0);
        let mut by_epc = HashMap::with_capacity(catalog.size_hint().0);
        let mut ids: HashSet<CatalogRowId> = HashSet::new();
        let mut duplicates = Vec::new();
        let mut rejected = Vec::new();

        for entry in catalog {
            if entry.epc.is_blank() {
                rejected.push(entry);
                continue;
            }
            if by_epc.contains_key(&entry.epc) || ids.contains(&entry.id) {
                duplicates.push(entry);
                continue;
            }
            by_epc.insert(entry.epc.clone(), items.len());
            ids.insert(entry.id.clone());
            items.push(InventoryItem::from_catalog(entry));
        }

        self.items = items;
        self.by_epc = by_epc;
        self.summary_tracked = false;

        InitializeOutcome {
            loaded: self.items.len(),
            duplicates,
            rejected,
        }
    }

    /// Apply a batch using the configured mode.
    pub fn apply(&mut self, updates: &[ScanUpdate]) -> BatchOutcome {
        self.apply_update_batch(updates, self.mode)
    }

    /// Apply a batch with an explicit mode.
    ///
    /// Updates for EPCs not in the snapshot are ignored. When an EPC appears
    /// more than once, the last update wins.
    pub fn apply_update_batch(&mut self, updates: &[ScanUpdate], mode: ReconciliationMode) -> BatchOutcome {
        if mode == ReconciliationMode::FullReplace {
            self.items.iter_mut().for_each(InventoryItem::reset_scan);
        }

        let mut outcome = BatchOutcome {
            mode,
            ..BatchOutcome::default()
        };

        for update in updates {
            match self.by_epc.get(&update.epc) {
                Some(&i) => {
                    self.items[i].record_scan(update.count, update.timestamp);
                    outcome.applied += 1;
                }
                None => outcome.unknown.push(update.epc.clone()),
            }
        }

        self.summary_tracked = true;
        outcome
    }

    /// Mark every item unscanned and empty the summary, keeping the catalog.
    pub fn clear_scans(&mut self) {
        self.items.iter_mut().for_each(InventoryItem::reset_scan);
        self.summary_tracked = false;
    }

    /// Per-name summary, sorted case-insensitively.
    ///
    /// Empty until a batch has been applied since the last `initialize` or
    /// `clear_scans`; afterwards every name in the snapshot has an entry.
    pub fn item_summary(&self) -> Vec<ItemSummaryEntry> {
        if !self.summary_tracked {
            return Vec::new();
        }
        summary::summarize(&self.items)
    }

    /// Expiration notices for present items, in snapshot order.
    pub fn expiration_notices(&self, now: DateTime<Utc>) -> Vec<ExpirationNotice> {
        self.items
            .iter()
            .filter_map(|item| expiration::classify(item, now, self.expiring_window))
            .collect()
    }

    /// All snapshot items sorted by name (display only).
    pub fn sorted_epc_view(&self) -> Vec<InventoryItem> {
        let mut view = self.items.clone();
        sort_by_item_name(&mut view, InventoryItem::item);
        view
    }
}
