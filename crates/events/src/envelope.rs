use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rfidtrack_core::SessionId;

/// Envelope for a message received on one connection session.
///
/// `sequence_number` starts at 1 and increases by one per decoded message, so
/// handlers can assert arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope<M> {
    session_id: SessionId,
    sequence_number: u64,
    received_at: DateTime<Utc>,
    payload: M,
}

impl<M> MessageEnvelope<M> {
    pub fn new(session_id: SessionId, sequence_number: u64, received_at: DateTime<Utc>, payload: M) -> Self {
        Self {
            session_id,
            sequence_number,
            received_at,
            payload,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn payload(&self) -> &M {
        &self.payload
    }

    pub fn into_payload(self) -> M {
        self.payload
    }
}
