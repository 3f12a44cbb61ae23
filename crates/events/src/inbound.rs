//! Decoding of inbound JSON frames.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use rfidtrack_core::Epc;
use rfidtrack_inventory::{CatalogEntry, ScanUpdate};

use crate::message::Message;

/// A message pushed by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// Full catalog, sent on every (re)connect.
    InitialInventory(Vec<CatalogEntry>),
    /// Periodic batch of scan observations.
    Updates(Vec<ScanUpdate>),
    /// A single ad-hoc tag read.
    TagRead(Epc),
}

impl Message for InboundMessage {
    fn kind(&self) -> &'static str {
        match self {
            InboundMessage::InitialInventory(_) => "inventory.initial",
            InboundMessage::Updates(_) => "inventory.updates",
            InboundMessage::TagRead(_) => "inventory.tag_read",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("frame is not valid JSON: {0}")]
    Json(String),

    #[error("frame is not a JSON object")]
    NotAnObject,

    #[error("unrecognized message (expected initialInventory, updates or epc)")]
    Unrecognized,

    #[error("invalid `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

const INITIAL_INVENTORY: &str = "initialInventory";
const UPDATES: &str = "updates";
const EPC: &str = "epc";

/// Decode one text frame.
///
/// When several known keys are present, `initialInventory` wins over
/// `updates`, which wins over `epc`. Keys holding `null` count as absent, as
/// does a blank `epc`. Blank EPCs inside a catalog or batch are kept and
/// filtered row by row by the reconciler.
pub fn decode(frame: &str) -> Result<InboundMessage, DecodeError> {
    let value: Value = serde_json::from_str(frame).map_err(|e| DecodeError::Json(e.to_string()))?;
    let Value::Object(mut object) = value else {
        return Err(DecodeError::NotAnObject);
    };

    if let Some(raw) = take_present(&mut object, INITIAL_INVENTORY) {
        return field(INITIAL_INVENTORY, raw).map(InboundMessage::InitialInventory);
    }
    if let Some(raw) = take_present(&mut object, UPDATES) {
        return field(UPDATES, raw).map(InboundMessage::Updates);
    }
    if let Some(raw) = take_present(&mut object, EPC).filter(|v| !is_blank_string(v)) {
        return field(EPC, raw).map(InboundMessage::TagRead);
    }

    Err(DecodeError::Unrecognized)
}

fn take_present(object: &mut Map<String, Value>, key: &str) -> Option<Value> {
    object.remove(key).filter(|v| !v.is_null())
}

fn is_blank_string(value: &Value) -> bool {
    value.as_str().is_some_and(|s| s.trim().is_empty())
}

fn field<T: DeserializeOwned>(name: &'static str, raw: Value) -> Result<T, DecodeError> {
    serde_json::from_value(raw).map_err(|e| DecodeError::InvalidField {
        field: name,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_initial_inventory() {
        let msg = decode(
            r#"{"initialInventory": [
                {"id": 1, "epc": "E1", "item": "Milk", "expiration_date": "2025-01-01"},
                {"id": 2, "epc": "E2", "item": "Bread"}
            ]}"#,
        )
        .unwrap();

        let InboundMessage::InitialInventory(rows) = msg else {
            panic!("expected initial inventory");
        };
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].expiration_date.as_deref(), Some("2025-01-01"));
        assert_eq!(rows[1].expiration_date, None);
    }

    #[test]
    fn decodes_updates_with_mixed_timestamps() {
        let msg = decode(
            r#"{"updates": [
                {"epc": "E1", "count": 2, "timestamp": "2025-01-01T10:00:00Z"},
                {"epc": "E2", "count": 1, "timestamp": 1735725600000}
            ]}"#,
        )
        .unwrap();
        assert_eq!(msg.kind(), "inventory.updates");

        let InboundMessage::Updates(updates) = msg else {
            panic!("expected updates");
        };
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].timestamp, updates[1].timestamp);
    }

    #[test]
    fn decodes_tag_read() {
        let msg = decode(r#"{"epc": "E9"}"#).unwrap();
        assert_eq!(msg, InboundMessage::TagRead(Epc::new("E9").unwrap()));
    }

    #[test]
    fn initial_inventory_takes_precedence() {
        let msg = decode(r#"{"epc": "E9", "updates": [], "initialInventory": []}"#).unwrap();
        assert_eq!(msg, InboundMessage::InitialInventory(Vec::new()));

        let msg = decode(r#"{"epc": "E9", "updates": [], "initialInventory": null}"#).unwrap();
        assert_eq!(msg, InboundMessage::Updates(Vec::new()));
    }

    #[test]
    fn malformed_frames_are_rejected() {
        assert!(matches!(decode("{not json"), Err(DecodeError::Json(_))));
        assert_eq!(decode("[1, 2]"), Err(DecodeError::NotAnObject));
        assert_eq!(decode(r#"{"hello": 1}"#), Err(DecodeError::Unrecognized));
        assert!(matches!(
            decode(r#"{"updates": [{"epc": "E1", "count": -1, "timestamp": 0}]}"#),
            Err(DecodeError::InvalidField { field: "updates", .. })
        ));
        assert!(matches!(
            decode(r#"{"epc": 42}"#),
            Err(DecodeError::InvalidField { field: "epc", .. })
        ));
    }

    #[test]
    fn blank_tag_read_is_not_a_message() {
        assert_eq!(decode(r#"{"epc": ""}"#), Err(DecodeError::Unrecognized));
        assert_eq!(decode(r#"{"epc": "  "}"#), Err(DecodeError::Unrecognized));
    }

    #[test]
    fn blank_epcs_inside_batches_do_not_reject_the_frame() {
        let msg = decode(
            r#"{"updates": [
                {"epc": "E1", "count": 2, "timestamp": 0},
                {"epc": "", "count": 1, "timestamp": 0}
            ]}"#,
        )
        .unwrap();
        let InboundMessage::Updates(updates) = msg else {
            panic!("expected updates");
        };
        assert_eq!(updates.len(), 2);
        assert!(updates[1].epc.is_blank());

        let msg = decode(r#"{"initialInventory": [{"id": 1, "epc": "", "item": "Ghost"}]}"#).unwrap();
        assert!(matches!(msg, InboundMessage::InitialInventory(rows) if rows.len() == 1));
    }
}
