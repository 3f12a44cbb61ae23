//! Wire messages exchanged with the inventory backend.

pub mod envelope;
pub mod inbound;
pub mod message;
pub mod outbound;

pub use envelope::MessageEnvelope;
pub use inbound::{DecodeError, InboundMessage, decode};
pub use message::Message;
pub use outbound::ReaderCommand;
