//! Connection session for the RFID inventory client.
//!
//! - [`session::InventorySession`] owns one reconciler and the scan-control
//!   state and handles one inbound message or user action at a time.
//! - [`supervisor::SessionSupervisor`] keeps a backend connection alive,
//!   reconnecting after a fixed delay, and publishes views.
//! - [`transport`] abstracts the real-time connection.

pub mod config;
pub mod session;
pub mod supervisor;
pub mod transport;
pub mod view;

pub use config::{ConfigError, SessionConfig};
pub use session::{InventorySession, SessionUpdate, UserAction};
pub use supervisor::{ConnectionStatus, SessionSupervisor, SupervisorHandle};
pub use transport::{Connection, Transport, TransportError, WsTransport};
pub use view::{InventoryView, ReadTagPanel, ScanStatus};
