//! `rfidtrack-core` — shared building blocks for the RFID inventory client.
//!
//! This crate contains **pure** primitives (no I/O, no async runtime).

pub mod clock;
pub mod error;
pub mod id;
pub mod time;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{DomainError, DomainResult};
pub use id::{CatalogRowId, Epc, SessionId};
