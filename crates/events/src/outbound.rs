//! Plain-text commands sent to the backend.

use core::str::FromStr;

use rfidtrack_core::DomainError;

use crate::message::Message;

const UPLOAD_PREFIX: &str = "upload_inventory:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderCommand {
    /// Begin continuous inventory scanning.
    Start,
    /// Stop scanning.
    Stop,
    /// Read a single tag.
    ReadTag,
    /// Replace the backend catalog with the given serialized catalog.
    UploadInventory(String),
}

impl Message for ReaderCommand {
    fn kind(&self) -> &'static str {
        match self {
            ReaderCommand::Start => "reader.start",
            ReaderCommand::Stop => "reader.stop",
            ReaderCommand::ReadTag => "reader.read_tag",
            ReaderCommand::UploadInventory(_) => "reader.upload_inventory",
        }
    }
}

impl core::fmt::Display for ReaderCommand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ReaderCommand::Start => f.write_str("start"),
            ReaderCommand::Stop => f.write_str("stop"),
            ReaderCommand::ReadTag => f.write_str("read-tag"),
            ReaderCommand::UploadInventory(content) => write!(f, "{UPLOAD_PREFIX}{content}"),
        }
    }
}

impl FromStr for ReaderCommand {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(content) = s.strip_prefix(UPLOAD_PREFIX) {
            return Ok(Self::UploadInventory(content.to_string()));
        }
        match s.trim() {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "read-tag" => Ok(Self::ReadTag),
            other => Err(DomainError::validation(format!("unknown reader command: {other}"))),
        }
    }
}
