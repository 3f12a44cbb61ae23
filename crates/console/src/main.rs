use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use rfidtrack_console::{ConsoleConfig, ConsoleInput, parse_input, render_view};
use rfidtrack_session::{
    ConnectionStatus, InventorySession, InventoryView, SessionSupervisor, UserAction, WsTransport,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConsoleConfig::from_env().context("loading configuration")?;
    rfidtrack_observability::init_with(config.log_format);

    tracing::info!(
        backend = %config.session.backend_url,
        mode = %config.session.mode,
        reconnect_delay = ?config.session.reconnect_delay,
        "starting RFID inventory console"
    );

    let transport = WsTransport::new(config.session.backend_url.clone());
    let session = InventorySession::new(config.session.reconciler());
    let (supervisor, handle) = SessionSupervisor::new(transport, config.session.reconnect_delay, session);
    let supervisor_task = supervisor.spawn();
    let render_task = tokio::spawn(render_loop(handle.views(), handle.status()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let action = match parse_input(&line) {
            Ok(ConsoleInput::Empty) => continue,
            Ok(ConsoleInput::Quit) => break,
            Ok(ConsoleInput::Action(action)) => action,
            Ok(ConsoleInput::UploadFile(path)) => match tokio::fs::read_to_string(&path).await {
                Ok(content) => UserAction::UploadInventory(content),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "cannot read catalog file");
                    continue;
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "unrecognized input (try start, stop, read-tag, upload <path>, quit)");
                continue;
            }
        };

        if !handle.perform(action).await {
            break;
        }
    }

    handle.shutdown();
    supervisor_task.await.context("supervisor task failed")?;
    render_task.abort();
    Ok(())
}

/// Redraw whenever the view or the connection status changes.
async fn render_loop(
    mut views: watch::Receiver<InventoryView>,
    mut status: watch::Receiver<ConnectionStatus>,
) {
    loop {
        let screen = {
            let view = views.borrow_and_update();
            let current = *status.borrow_and_update();
            render_view(&view, current)
        };
        println!("{screen}");

        tokio::select! {
            changed = views.changed() => if changed.is_err() { break },
            changed = status.changed() => if changed.is_err() { break },
        }
    }
}
