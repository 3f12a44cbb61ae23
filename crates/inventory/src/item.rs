use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rfidtrack_core::time::deserialize_scan_timestamp;
use rfidtrack_core::{CatalogRowId, Epc};

/// One catalog row as delivered by the backend's initial inventory list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: CatalogRowId,
    pub epc: Epc,
    pub item: String,
    #[serde(
        rename = "expiration_date",
        alias = "expirationDate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration_date: Option<String>,
}

/// One scan observation inside an update batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanUpdate {
    pub epc: Epc,
    pub count: u32,
    #[serde(deserialize_with = "deserialize_scan_timestamp")]
    pub timestamp: DateTime<Utc>,
}

/// Snapshot entry: a catalog row plus its most recent scan state.
///
/// `last_scan` is `Some` exactly when `count > 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryItem {
    id: CatalogRowId,
    epc: Epc,
    item: String,
    expiration_date: Option<String>,
    count: u32,
    last_scan: Option<DateTime<Utc>>,
}

impl InventoryItem {
    /// Fresh, unscanned snapshot entry for a catalog row.
    pub fn from_catalog(entry: CatalogEntry) -> Self {
        Self {
            id: entry.id,
            epc: entry.epc,
            item: entry.item,
            expiration_date: entry.expiration_date,
            count: 0,
            last_scan: None,
        }
    }

    pub fn id(&self) -> &CatalogRowId {
        &self.id
    }

    pub fn epc(&self) -> &Epc {
        &self.epc
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn expiration_date(&self) -> Option<&str> {
        self.expiration_date.as_deref()
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn last_scan(&self) -> Option<DateTime<Utc>> {
        self.last_scan
    }

    pub fn is_present(&self) -> bool {
        self.count > 0
    }

    pub(crate) fn record_scan(&mut self, count: u32, at: DateTime<Utc>) {
        self.count = count;
        self.last_scan = (count > 0).then_some(at);
    }

    pub(crate) fn reset_scan(&mut self) {
        self.count = 0;
        self.last_scan = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_entry_reads_snake_and_camel_expiration() {
        let snake: CatalogEntry = serde_json::from_str(
            r#"{"id": 1, "epc": "E1", "item": "Milk", "expiration_date": "2025-01-02"}"#,
        )
        .unwrap();
        let camel: CatalogEntry = serde_json::from_str(
            r#"{"id": "1", "epc": "E1", "item": "Milk", "expirationDate": "2025-01-02"}"#,
        )
        .unwrap();
        assert_eq!(snake, camel);

        let none: CatalogEntry =
            serde_json::from_str(r#"{"id": 2, "epc": "E2", "item": "Bread"}"#).unwrap();
        assert_eq!(none.expiration_date, None);
    }

    #[test]
    fn zero_count_scan_clears_timestamp() {
        let mut item = InventoryItem::from_catalog(CatalogEntry {
            id: CatalogRowId::from(1),
            epc: Epc::new("E1").unwrap(),
            item: "Milk".to_string(),
            expiration_date: None,
        });

        item.record_scan(3, Utc::now());
        assert!(item.is_present());
        assert!(item.last_scan().is_some());

        item.record_scan(0, Utc::now());
        assert!(!item.is_present());
        assert_eq!(item.last_scan(), None);
    }
}
