//! Inventory reconciliation (RFID tag scans against a catalog snapshot).
//!
//! This crate contains the reconciliation rules, implemented purely as
//! deterministic logic (no IO, no async, no logging). Callers decide what to
//! report from the returned outcomes.

pub mod expiration;
pub mod item;
pub mod ordering;
pub mod reconciler;
pub mod summary;

pub use expiration::{DEFAULT_EXPIRING_SOON_DAYS, ExpirationNotice, ExpirationStatus};
pub use item::{CatalogEntry, InventoryItem, ScanUpdate};
pub use reconciler::{BatchOutcome, InitializeOutcome, ReconciliationMode, Reconciler};
pub use summary::ItemSummaryEntry;
