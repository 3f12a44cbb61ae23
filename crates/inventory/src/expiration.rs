use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use rfidtrack_core::time::parse_expiration_date;
use rfidtrack_core::{CatalogRowId, Epc};

use crate::item::InventoryItem;

/// Items expiring within this many days of "now" are flagged as expiring soon.
pub const DEFAULT_EXPIRING_SOON_DAYS: i64 = 7;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpirationStatus {
    Expired,
    ExpiringSoon,
}

impl core::fmt::Display for ExpirationStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            ExpirationStatus::Expired => "expired",
            ExpirationStatus::ExpiringSoon => "expiring-soon",
        })
    }
}

/// Expiration warning for a tag that is currently present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpirationNotice {
    pub id: CatalogRowId,
    pub epc: Epc,
    pub item: String,
    /// Date as it appears in the catalog.
    pub expiration_date: String,
    pub status: ExpirationStatus,
}

impl core::fmt::Display for ExpirationNotice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.status {
            ExpirationStatus::Expired => write!(
                f,
                "{} (EPC: {}) has expired on {}.",
                self.item, self.epc, self.expiration_date
            ),
            ExpirationStatus::ExpiringSoon => write!(
                f,
                "{} (EPC: {}) is expiring soon on {}.",
                self.item, self.epc, self.expiration_date
            ),
        }
    }
}

/// Classify one item. Absent items, items without a date and items whose date
/// cannot be parsed yield `None`.
pub(crate) fn classify(
    item: &InventoryItem,
    now: DateTime<Utc>,
    window: Duration,
) -> Option<ExpirationNotice> {
    if !item.is_present() {
        return None;
    }
    let raw = item.expiration_date()?;
    let expires_at = parse_expiration_date(raw).ok()?;

    let status = if expires_at < now {
        ExpirationStatus::Expired
    } else if expires_at <= now + window {
        ExpirationStatus::ExpiringSoon
    } else {
        return None;
    };

    Some(ExpirationNotice {
        id: item.id().clone(),
        epc: item.epc().clone(),
        item: item.item().to_string(),
        expiration_date: raw.to_string(),
        status,
    })
}
