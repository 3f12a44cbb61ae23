//! Connection supervision: connect, dispatch, reconnect after a fixed delay.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Notify, mpsc, watch};

use rfidtrack_core::Clock;
use rfidtrack_events::{Message, ReaderCommand};

use crate::session::{InventorySession, UserAction};
use crate::transport::{Connection, Transport};
use crate::view::InventoryView;

const ACTION_QUEUE_DEPTH: usize = 64;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

impl core::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            ConnectionStatus::Connecting => "Connecting",
            ConnectionStatus::Connected => "Connected",
            ConnectionStatus::Disconnected => "Disconnected",
        })
    }
}

/// How a served connection ended.
enum ServeEnd {
    Closed,
    Shutdown,
}

/// Client side of a running supervisor.
#[derive(Debug, Clone)]
pub struct SupervisorHandle {
    actions: mpsc::Sender<UserAction>,
    views: watch::Receiver<InventoryView>,
    status: watch::Receiver<ConnectionStatus>,
    shutdown: Arc<Notify>,
}

impl SupervisorHandle {
    /// Queue an operator action. Returns `false` once the supervisor stopped.
    pub async fn perform(&self, action: UserAction) -> bool {
        self.actions.send(action).await.is_ok()
    }

    pub fn views(&self) -> watch::Receiver<InventoryView> {
        self.views.clone()
    }

    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    /// Ask the supervisor to stop after the message in flight.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}

/// Owns the session and keeps a backend connection alive.
///
/// A single task handles inbound frames and operator actions one at a time, so
/// the snapshot is never shared. Views are published after each handled
/// message through a watch channel.
pub struct SessionSupervisor<T, C>
where
    T: Transport,
    C: Clock,
{
    transport: T,
    reconnect_delay: Duration,
    session: InventorySession<C>,
    actions: mpsc::Receiver<UserAction>,
    views: watch::Sender<InventoryView>,
    status: watch::Sender<ConnectionStatus>,
    shutdown: Arc<Notify>,
}

impl<T, C> SessionSupervisor<T, C>
where
    T: Transport + 'static,
    C: Clock + 'static,
{
    pub fn new(transport: T, reconnect_delay: Duration, session: InventorySession<C>) -> (Self, SupervisorHandle) {
        let (actions_tx, actions_rx) = mpsc::channel(ACTION_QUEUE_DEPTH);
        let (views_tx, views_rx) = watch::channel(session.view());
        let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connecting);
        let shutdown = Arc::new(Notify::new());

        let supervisor = Self {
            transport,
            reconnect_delay,
            session,
            actions: actions_rx,
            views: views_tx,
            status: status_tx,
            shutdown: shutdown.clone(),
        };
        let handle = SupervisorHandle {
            actions: actions_tx,
            views: views_rx,
            status: status_rx,
            shutdown,
        };
        (supervisor, handle)
    }

    /// Run on a background task.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Connect, serve and reconnect until shutdown.
    pub async fn run(mut self) {
        let session_id = self.session.id();
        tracing::info!(%session_id, "session supervisor started");

        loop {
            self.set_status(ConnectionStatus::Connecting);

            let connected = tokio::select! {
                _ = self.shutdown.notified() => break,
                result = self.transport.connect() => result,
            };

            match connected {
                Ok(conn) => {
                    tracing::info!(%session_id, "connected to backend");
                    self.set_status(ConnectionStatus::Connected);
                    if let ServeEnd::Shutdown = self.serve(conn).await {
                        break;
                    }
                    tracing::warn!(
                        %session_id,
                        delay = ?self.reconnect_delay,
                        "connection lost; reconnecting"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        %session_id,
                        error = %e,
                        delay = ?self.reconnect_delay,
                        "connect failed; retrying"
                    );
                }
            }

            self.set_status(ConnectionStatus::Disconnected);
            if let ServeEnd::Shutdown = self.wait_offline().await {
                break;
            }
        }

        self.set_status(ConnectionStatus::Disconnected);
        tracing::info!(%session_id, "session supervisor stopped");
    }

    async fn serve(&mut self, mut conn: Box<dyn Connection>) -> ServeEnd {
        loop {
            tokio::select! {
                _ = self.shutdown.notified() => return ServeEnd::Shutdown,
                frame = conn.recv() => match frame {
                    Ok(Some(text)) => self.dispatch_frame(&text),
                    Ok(None) => return ServeEnd::Closed,
                    Err(e) => {
                        tracing::warn!(session_id = %self.session.id(), error = %e, "receive failed");
                        return ServeEnd::Closed;
                    }
                },
                Some(action) = self.actions.recv() => {
                    let command = self.perform(action);
                    if let Err(e) = conn.send(&command.to_string()).await {
                        tracing::warn!(
                            session_id = %self.session.id(),
                            kind = command.kind(),
                            error = %e,
                            "send failed"
                        );
                        return ServeEnd::Closed;
                    }
                }
            }
        }
    }

    /// Wait out the reconnect delay; actions still apply locally meanwhile.
    async fn wait_offline(&mut self) -> ServeEnd {
        let sleep = tokio::time::sleep(self.reconnect_delay);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = self.shutdown.notified() => return ServeEnd::Shutdown,
                _ = &mut sleep => return ServeEnd::Closed,
                Some(action) = self.actions.recv() => {
                    let command = self.perform(action);
                    tracing::warn!(
                        session_id = %self.session.id(),
                        kind = command.kind(),
                        "not connected; command not sent"
                    );
                }
            }
        }
    }

    fn dispatch_frame(&mut self, text: &str) {
        match self.session.handle_frame(text) {
            Ok(_) => self.publish(),
            Err(e) => {
                tracing::warn!(session_id = %self.session.id(), error = %e, "dropping malformed message");
            }
        }
    }

    fn perform(&mut self, action: UserAction) -> ReaderCommand {
        let command = self.session.perform(action);
        tracing::debug!(session_id = %self.session.id(), kind = command.kind(), "operator action");
        self.publish();
        command
    }

    fn publish(&self) {
        // Stored even with no receivers; the session keeps running headless.
        self.views.send_replace(self.session.view());
    }

    fn set_status(&self, status: ConnectionStatus) {
        self.status.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status;
            true
        });
    }
}
