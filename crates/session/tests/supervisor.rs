//! Black-box tests for the session supervisor over a scripted in-memory transport.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite;

use rfidtrack_core::FixedClock;
use rfidtrack_inventory::{ReconciliationMode, Reconciler};
use rfidtrack_session::{
    Connection, ConnectionStatus, InventorySession, ScanStatus, SessionSupervisor, SupervisorHandle,
    Transport, TransportError, UserAction,
};

const WAIT: Duration = Duration::from_secs(5);
const RECONNECT: Duration = Duration::from_millis(20);

const CATALOG: &str = r#"{"initialInventory": [
    {"id": 1, "epc": "E1", "item": "Milk", "expiration_date": "2025-06-14"},
    {"id": 2, "epc": "E2", "item": "Bread"}
]}"#;

const UPDATES: &str = r#"{"updates": [{"epc": "E1", "count": 2, "timestamp": "2025-06-15T11:00:00Z"}]}"#;

struct MemoryConnection {
    inbound: mpsc::UnboundedReceiver<String>,
    outbound: mpsc::UnboundedSender<String>,
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        Ok(self.inbound.recv().await)
    }

    async fn send(&mut self, text: &str) -> Result<(), TransportError> {
        self.outbound
            .send(text.to_string())
            .map_err(|_| TransportError::WebSocket(tungstenite::Error::AlreadyClosed))
    }
}

/// Backend side of one scripted connection.
struct Backend {
    frames: mpsc::UnboundedSender<String>,
    commands: mpsc::UnboundedReceiver<String>,
}

fn connection() -> (MemoryConnection, Backend) {
    let (frames_tx, frames_rx) = mpsc::unbounded_channel();
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    (
        MemoryConnection {
            inbound: frames_rx,
            outbound: commands_tx,
        },
        Backend {
            frames: frames_tx,
            commands: commands_rx,
        },
    )
}

/// Hands out queued connections; `None` entries (and an empty queue) refuse.
struct ScriptedTransport {
    script: Mutex<VecDeque<Option<MemoryConnection>>>,
    attempts: std::sync::Arc<AtomicUsize>,
}

impl ScriptedTransport {
    fn new(script: Vec<Option<MemoryConnection>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            attempts: Default::default(),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn connect(&self) -> Result<Box<dyn Connection>, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front().flatten();
        match next {
            Some(conn) => Ok(Box::new(conn)),
            None => Err(TransportError::WebSocket(tungstenite::Error::Io(
                std::io::ErrorKind::ConnectionRefused.into(),
            ))),
        }
    }
}

fn test_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-06-15T12:00:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

fn start(transport: ScriptedTransport) -> (SupervisorHandle, tokio::task::JoinHandle<()>) {
    let session = InventorySession::with_clock(
        Reconciler::new(ReconciliationMode::IncrementalMerge),
        FixedClock(test_time()),
    );
    let (supervisor, handle) = SessionSupervisor::new(transport, RECONNECT, session);
    (handle, supervisor.spawn())
}

async fn wait_status(handle: &SupervisorHandle, status: ConnectionStatus) {
    let mut rx = handle.status();
    tokio::time::timeout(WAIT, rx.wait_for(|s| *s == status))
        .await
        .expect("timed out waiting for status")
        .unwrap();
}

#[tokio::test]
async fn applies_frames_in_order_and_reinitializes_after_reconnect() {
    let (conn1, backend1) = connection();
    let (conn2, backend2) = connection();
    backend1.frames.send(CATALOG.to_string()).unwrap();
    backend1.frames.send(UPDATES.to_string()).unwrap();
    // Dropping the backend ends the first connection once its frames are read.
    drop(backend1);
    backend2.frames.send(CATALOG.to_string()).unwrap();

    let transport = ScriptedTransport::new(vec![Some(conn1), Some(conn2)]);
    let attempts = transport.attempts.clone();
    let (handle, task) = start(transport);

    let mut views = handle.views();
    let view = tokio::time::timeout(WAIT, views.wait_for(|v| v.sequence_number == 3))
        .await
        .expect("timed out waiting for third message")
        .unwrap()
        .clone();

    assert!(view.summary.is_empty());
    assert!(view.epcs.iter().all(|i| i.count() == 0));
    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    wait_status(&handle, ConnectionStatus::Connected).await;

    handle.shutdown();
    tokio::time::timeout(WAIT, task).await.unwrap().unwrap();
    drop(backend2);
}

#[tokio::test]
async fn update_views_reflect_whole_batches() {
    let (conn, backend) = connection();
    backend.frames.send(CATALOG.to_string()).unwrap();
    backend.frames.send("not json".to_string()).unwrap();
    backend.frames.send(UPDATES.to_string()).unwrap();

    let (handle, task) = start(ScriptedTransport::new(vec![Some(conn)]));

    let mut views = handle.views();
    let view = tokio::time::timeout(WAIT, views.wait_for(|v| v.sequence_number == 2))
        .await
        .unwrap()
        .unwrap()
        .clone();

    assert_eq!(view.summary.len(), 2);
    let milk = view.summary.iter().find(|e| e.item == "Milk").unwrap();
    assert_eq!(milk.present_count, 1);
    assert!(milk.is_low_count());
    assert_eq!(view.expirations.len(), 1);

    handle.shutdown();
    tokio::time::timeout(WAIT, task).await.unwrap().unwrap();
}

#[tokio::test]
async fn forwards_operator_commands() {
    let (conn, mut backend) = connection();
    let (handle, task) = start(ScriptedTransport::new(vec![Some(conn)]));
    wait_status(&handle, ConnectionStatus::Connected).await;

    assert!(handle.perform(UserAction::Start).await);
    assert!(handle.perform(UserAction::ReadTag).await);
    assert!(handle.perform(UserAction::UploadInventory("[ {\"id\": 1} ]".to_string())).await);
    assert!(handle.perform(UserAction::Stop).await);

    let mut sent = Vec::new();
    for _ in 0..4 {
        let cmd = tokio::time::timeout(WAIT, backend.commands.recv()).await.unwrap().unwrap();
        sent.push(cmd);
    }
    assert_eq!(sent, vec!["start", "read-tag", "upload_inventory:[ {\"id\": 1} ]", "stop"]);

    let mut views = handle.views();
    let view = views.borrow_and_update().clone();
    assert_eq!(view.scan_status, ScanStatus::Idle);

    handle.shutdown();
    tokio::time::timeout(WAIT, task).await.unwrap().unwrap();
}

#[tokio::test]
async fn uploads_multi_line_catalog_files_intact() {
    let (conn, mut backend) = connection();
    let (handle, task) = start(ScriptedTransport::new(vec![Some(conn)]));
    wait_status(&handle, ConnectionStatus::Connected).await;

    let csv = "id,epc,item,expiration_date\n1,E1,Milk,2025-06-20\n2,E2,Bread,\n";
    assert!(handle.perform(UserAction::UploadInventory(csv.to_string())).await);

    let sent = tokio::time::timeout(WAIT, backend.commands.recv()).await.unwrap().unwrap();
    assert_eq!(sent, format!("upload_inventory:{csv}"));
    assert_eq!(*handle.status().borrow(), ConnectionStatus::Connected);

    handle.shutdown();
    tokio::time::timeout(WAIT, task).await.unwrap().unwrap();
}

#[tokio::test]
async fn keeps_retrying_refused_connections() {
    let (conn, _backend) = connection();
    let transport = ScriptedTransport::new(vec![None, None, Some(conn)]);
    let attempts = transport.attempts.clone();
    let (handle, task) = start(transport);

    wait_status(&handle, ConnectionStatus::Connected).await;
    assert_eq!(attempts.load(Ordering::SeqCst), 3);

    handle.shutdown();
    tokio::time::timeout(WAIT, task).await.unwrap().unwrap();
    assert_eq!(*handle.status().borrow(), ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn actions_apply_locally_while_disconnected() {
    let (handle, task) = start(ScriptedTransport::new(Vec::new()));
    wait_status(&handle, ConnectionStatus::Disconnected).await;

    assert!(handle.perform(UserAction::Start).await);

    let mut views = handle.views();
    tokio::time::timeout(WAIT, views.wait_for(|v| v.scan_status == ScanStatus::Scanning))
        .await
        .unwrap()
        .unwrap();

    handle.shutdown();
    tokio::time::timeout(WAIT, task).await.unwrap().unwrap();
}
