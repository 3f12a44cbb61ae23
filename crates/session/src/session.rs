//! Single-threaded message dispatch over one inventory snapshot.

use rfidtrack_core::{Clock, Epc, SessionId, SystemClock};
use rfidtrack_events::{DecodeError, InboundMessage, Message, MessageEnvelope, ReaderCommand, decode};
use rfidtrack_inventory::{BatchOutcome, Reconciler};

use crate::view::{InventoryView, ReadTagPanel, ScanStatus};

/// Something the operator asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Start,
    Stop,
    ReadTag,
    /// Serialized catalog to upload as a replacement.
    UploadInventory(String),
}

/// What changed after handling one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    InventoryLoaded {
        loaded: usize,
        duplicates: usize,
        /// Rows dropped for a blank EPC.
        rejected: usize,
    },
    BatchApplied(BatchOutcome),
    TagRead(Epc),
    /// A tag read arrived while read-tag mode was off.
    TagReadIgnored(Epc),
}

/// Session state: the reconciler plus the operator-facing scan controls.
///
/// Every handler runs to completion before the next one starts, so views are
/// never computed from a partially applied message.
#[derive(Debug)]
pub struct InventorySession<C = SystemClock>
where
    C: Clock,
{
    id: SessionId,
    reconciler: Reconciler,
    clock: C,
    last_sequence: u64,
    scan_status: ScanStatus,
    /// Clear scan state on the next `start` (set initially and by `stop`).
    clear_on_start: bool,
    read_tag_active: bool,
    read_tag: ReadTagPanel,
}

impl InventorySession<SystemClock> {
    pub fn new(reconciler: Reconciler) -> Self {
        Self::with_clock(reconciler, SystemClock)
    }
}

impl<C> InventorySession<C>
where
    C: Clock,
{
    pub fn with_clock(reconciler: Reconciler, clock: C) -> Self {
        Self {
            id: SessionId::new(),
            reconciler,
            clock,
            last_sequence: 0,
            scan_status: ScanStatus::Idle,
            clear_on_start: true,
            read_tag_active: false,
            read_tag: ReadTagPanel::Hidden,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn scan_status(&self) -> ScanStatus {
        self.scan_status
    }

    pub fn read_tag_active(&self) -> bool {
        self.read_tag_active
    }

    /// Decode a raw frame and stamp it with the next sequence number.
    ///
    /// Malformed frames are rejected here and never reach the snapshot; they
    /// do not consume a sequence number.
    pub fn accept_frame(&mut self, frame: &str) -> Result<MessageEnvelope<InboundMessage>, DecodeError> {
        let message = decode(frame)?;
        self.last_sequence += 1;
        Ok(MessageEnvelope::new(self.id, self.last_sequence, self.clock.now(), message))
    }

    /// Decode and handle one frame.
    pub fn handle_frame(&mut self, frame: &str) -> Result<SessionUpdate, DecodeError> {
        let envelope = self.accept_frame(frame)?;
        Ok(self.handle(envelope))
    }

    /// Handle one decoded message.
    pub fn handle(&mut self, envelope: MessageEnvelope<InboundMessage>) -> SessionUpdate {
        let sequence = envelope.sequence_number();
        let kind = envelope.payload().kind();
        tracing::debug!(session_id = %self.id, sequence, kind, "handling inbound message");

        match envelope.into_payload() {
            InboundMessage::InitialInventory(catalog) => self.on_initial_inventory(catalog),
            InboundMessage::Updates(updates) => self.on_updates(&updates),
            InboundMessage::TagRead(epc) => self.on_tag_read(epc),
        }
    }

    fn on_initial_inventory(&mut self, catalog: Vec<rfidtrack_inventory::CatalogEntry>) -> SessionUpdate {
        let outcome = self.reconciler.initialize(catalog);
        for dup in &outcome.duplicates {
            tracing::warn!(
                session_id = %self.id,
                id = %dup.id,
                epc = %dup.epc,
                "skipping catalog row with duplicate id or EPC"
            );
        }
        for row in &outcome.rejected {
            tracing::warn!(session_id = %self.id, id = %row.id, item = %row.item, "skipping catalog row with blank EPC");
        }
        tracing::info!(session_id = %self.id, items = outcome.loaded, "received initial inventory");

        SessionUpdate::InventoryLoaded {
            loaded: outcome.loaded,
            duplicates: outcome.duplicates.len(),
            rejected: outcome.rejected.len(),
        }
    }

    fn on_updates(&mut self, updates: &[rfidtrack_inventory::ScanUpdate]) -> SessionUpdate {
        self.read_tag = ReadTagPanel::Hidden;

        let outcome = self.reconciler.apply(updates);
        if !outcome.unknown.is_empty() {
            tracing::debug!(
                session_id = %self.id,
                unknown = outcome.unknown.len(),
                "ignoring updates for EPCs not in the catalog"
            );
        }
        tracing::debug!(
            session_id = %self.id,
            mode = %outcome.mode,
            applied = outcome.applied,
            "applied update batch"
        );

        SessionUpdate::BatchApplied(outcome)
    }

    fn on_tag_read(&mut self, epc: Epc) -> SessionUpdate {
        if !self.read_tag_active {
            tracing::debug!(session_id = %self.id, %epc, "tag read ignored; read-tag mode is off");
            return SessionUpdate::TagReadIgnored(epc);
        }
        tracing::info!(session_id = %self.id, %epc, "tag read");
        self.read_tag = ReadTagPanel::Showing(epc.clone());
        SessionUpdate::TagRead(epc)
    }

    /// Apply an operator action locally and return the command to send.
    pub fn perform(&mut self, action: UserAction) -> ReaderCommand {
        match action {
            UserAction::Start => self.start(),
            UserAction::Stop => self.stop(),
            UserAction::ReadTag => self.read_tag(),
            UserAction::UploadInventory(content) => self.upload_inventory(&content),
        }
    }

    /// Start scanning; the first start after `stop` clears previous scans.
    pub fn start(&mut self) -> ReaderCommand {
        if self.clear_on_start {
            self.reconciler.clear_scans();
            self.clear_on_start = false;
        }
        self.read_tag = ReadTagPanel::Hidden;
        self.scan_status = ScanStatus::Scanning;
        ReaderCommand::Start
    }

    pub fn stop(&mut self) -> ReaderCommand {
        self.clear_on_start = true;
        self.read_tag_active = false;
        self.scan_status = ScanStatus::Idle;
        ReaderCommand::Stop
    }

    /// Ask the reader for a single tag; the next tag read is displayed.
    pub fn read_tag(&mut self) -> ReaderCommand {
        self.read_tag_active = true;
        self.read_tag = ReadTagPanel::Waiting;
        self.scan_status = ScanStatus::Scanning;
        ReaderCommand::ReadTag
    }

    /// Build the upload command for a replacement catalog.
    ///
    /// The content is forwarded byte for byte; the backend parses it.
    pub fn upload_inventory(&mut self, content: &str) -> ReaderCommand {
        ReaderCommand::UploadInventory(content.to_string())
    }

    /// Compute the current views.
    pub fn view(&self) -> InventoryView {
        InventoryView {
            session_id: self.id,
            sequence_number: self.last_sequence,
            scan_status: self.scan_status,
            summary: self.reconciler.item_summary(),
            epcs: self.reconciler.sorted_epc_view(),
            expirations: self.reconciler.expiration_notices(self.clock.now()),
            read_tag: self.read_tag.clone(),
        }
    }
}
