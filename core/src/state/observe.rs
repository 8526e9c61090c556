use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::types::StateEvent;

/// Logs session state changes until every sender is gone.
pub fn spawn_state_logger(mut event_rx: broadcast::Receiver<StateEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let event = match event_rx.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::debug!(target: "aic.state", skipped = n, "state logger lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            match event {
                StateEvent::SessionCreated {
                    session_id,
                    app_name,
                    ..
                } => {
                    tracing::debug!(target: "aic.state", "Session created: {} ({})", session_id, app_name);
                }
                StateEvent::SessionPhaseChanged {
                    session_id,
                    new_phase,
                    ..
                } => {
                    tracing::debug!(target: "aic.state", "Session {} -> {:?}", session_id, new_phase);
                }
                StateEvent::StateWritten { session_id, key, .. } => {
                    tracing::debug!(target: "aic.state", "Session {} wrote {}", session_id, key);
                }
                StateEvent::SessionCompleted {
                    session_id,
                    event_count,
                    duration_ms,
                    ..
                } => {
                    tracing::info!(
                        target: "aic.state",
                        "Session {} completed ({} events, {}ms)",
                        session_id,
                        event_count,
                        duration_ms
                    );
                }
                StateEvent::SessionFailed {
                    session_id, error, ..
                } => {
                    tracing::error!(target: "aic.state", "Session {} failed: {}", session_id, error);
                }
            }
        }
    })
}
