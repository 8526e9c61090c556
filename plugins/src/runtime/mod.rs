mod playbook;
mod replay;

pub use playbook::{IncidentScope, PlaybookAgentRuntime, COMMANDER};
pub use replay::ReplayAgentRuntime;

use aic_core::api::{RunPhase, RunSession, StateManager};

async fn open_session(
    store: &StateManager,
    app_name: &str,
    user_id: &str,
) -> anyhow::Result<RunSession> {
    let session = store.create_session(app_name, user_id).await?;
    store
        .transition_session_phase(&session.session_id, RunPhase::SessionOpen)
        .await?;
    Ok(RunSession {
        id: session.session_id,
        app_name: session.app_name,
        user_id: session.user_id,
    })
}

/// Bookkeeping once the stream is exhausted or failed. Store errors here are
/// not worth failing the run over.
async fn close_stream(store: &StateManager, session_id: &str, events: u64, error: Option<String>) {
    let res = match error {
        Some(e) => match store.record_events(session_id, events).await {
            Ok(()) => store.fail_session(session_id, e).await,
            Err(err) => Err(err),
        },
        None => store.complete_session(session_id, events).await,
    };
    if let Err(e) = res {
        tracing::debug!(target: "aic.runtime", session_id, error = %e, "session bookkeeping failed");
    }
}
