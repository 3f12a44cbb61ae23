//! Plain-text rendering of inventory views.

use std::fmt::Write;

use chrono::{DateTime, Utc};

use rfidtrack_inventory::ExpirationStatus;
use rfidtrack_session::{ConnectionStatus, InventoryView, ReadTagPanel};

const NOT_AVAILABLE: &str = "N/A";

fn clock_time(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Render the whole screen: status line, item summary, EPC table,
/// expiration notices and the read-tag panel.
pub fn render_view(view: &InventoryView, status: ConnectionStatus) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "Connection: {status} | Scanner: {}", view.scan_status);

    let _ = writeln!(out, "\nItem summary");
    let _ = writeln!(out, "{:>6}  {:<24}  {}", "Count", "Item", "Last scanned");
    for entry in &view.summary {
        let flag = if entry.is_low_count() { "!" } else { " " };
        let _ = writeln!(
            out,
            "{:>5}{flag}  {:<24}  {}",
            entry.present_count,
            entry.item,
            clock_time(entry.last_scanned)
        );
    }

    let _ = writeln!(out, "\nTags");
    let _ = writeln!(
        out,
        "{:<8}  {:<26}  {:<24}  {:>5}  {}",
        "ID", "EPC", "Item", "Count", "Last scanned"
    );
    for item in &view.epcs {
        let _ = writeln!(
            out,
            "{:<8}  {:<26}  {:<24}  {:>5}  {}",
            item.id().as_str(),
            item.epc().as_str(),
            item.item(),
            item.count(),
            clock_time(item.last_scan())
        );
    }

    if !view.expirations.is_empty() {
        let _ = writeln!(out, "\nExpiration status");
        for notice in &view.expirations {
            let marker = match notice.status {
                ExpirationStatus::Expired => "EXPIRED",
                ExpirationStatus::ExpiringSoon => "SOON",
            };
            let _ = writeln!(out, "[{marker:<7}] {notice}");
        }
    }

    match &view.read_tag {
        ReadTagPanel::Hidden => {}
        ReadTagPanel::Waiting => {
            let _ = writeln!(out, "\nLast read tag: Scanning...");
        }
        ReadTagPanel::Showing(epc) => {
            let _ = writeln!(out, "\nLast read tag: {epc}");
        }
    }

    out
}
