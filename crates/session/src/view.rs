//! Read-only views published to renderers.

use serde::Serialize;

use rfidtrack_core::{Epc, SessionId};
use rfidtrack_inventory::{ExpirationNotice, InventoryItem, ItemSummaryEntry};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScanStatus {
    #[default]
    Idle,
    Scanning,
}

impl core::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            ScanStatus::Idle => "Idle",
            ScanStatus::Scanning => "Scanning",
        })
    }
}

/// The "last read tag" panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "epc", rename_all = "kebab-case")]
pub enum ReadTagPanel {
    #[default]
    Hidden,
    /// Read requested, no tag seen yet.
    Waiting,
    Showing(Epc),
}

/// Everything a renderer needs, computed after a message was fully handled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryView {
    pub session_id: SessionId,
    /// Sequence number of the last inbound message reflected here (0 = none).
    pub sequence_number: u64,
    pub scan_status: ScanStatus,
    pub summary: Vec<ItemSummaryEntry>,
    pub epcs: Vec<InventoryItem>,
    pub expirations: Vec<ExpirationNotice>,
    pub read_tag: ReadTagPanel,
}
