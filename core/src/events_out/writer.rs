use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::Context;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::EventsOutConfig;
use crate::util::truncate;

const STDOUT_PATH: &str = "stdout:";
const AUDIT_PREVIEW_MAX: usize = 120;

#[derive(Clone)]
pub struct EventsOutTx {
    tx: mpsc::Sender<String>,
    dropped: Arc<AtomicU64>,
    drop_when_full: bool,
}

impl EventsOutTx {
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub async fn send_line(&self, line: String) {
        if self.drop_when_full {
            if self.tx.try_send(line).is_err() {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        } else if self.tx.send(line).await.is_err() {
            // writer closed
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Background JSONL writer. Lines are flushed when [`EventsOut::finish`] runs.
pub struct EventsOut {
    tx: EventsOutTx,
    task: JoinHandle<()>,
}

impl EventsOut {
    pub fn sender(&self) -> EventsOutTx {
        self.tx.clone()
    }

    /// Closes the channel and waits until every queued line is written.
    /// Returns the number of lines that never reached the output.
    pub async fn finish(self) -> u64 {
        let EventsOut { tx, task } = self;
        let dropped = Arc::clone(&tx.dropped);
        drop(tx);
        if let Err(e) = task.await {
            tracing::warn!(target: "aic.events_out", error = %e, "events_out writer task failed");
        }
        dropped.load(Ordering::Relaxed)
    }
}

pub async fn start_events_out(cfg: &EventsOutConfig) -> anyhow::Result<Option<EventsOut>> {
    if !cfg.enabled || cfg.path.trim().is_empty() {
        return Ok(None);
    }

    let path = cfg.path.clone();
    let writer: Box<dyn tokio::io::AsyncWrite + Unpin + Send> = if path == STDOUT_PATH {
        Box::new(tokio::io::stdout())
    } else {
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("open events_out file {path}"))?;
        Box::new(file)
    };

    let (tx, rx) = mpsc::channel::<String>(cfg.channel_capacity.max(1));
    let dropped = Arc::new(AtomicU64::new(0));

    let task = tokio::spawn(pump_lines(writer, rx, Arc::clone(&dropped), path));

    Ok(Some(EventsOut {
        tx: EventsOutTx {
            tx,
            dropped,
            drop_when_full: cfg.drop_when_full,
        },
        task,
    }))
}

/// Writes queued lines until the channel closes. After a write error the rest
/// of the queue is drained and counted as dropped.
async fn pump_lines<W>(
    mut writer: W,
    mut rx: mpsc::Receiver<String>,
    dropped: Arc<AtomicU64>,
    path: String,
) where
    W: tokio::io::AsyncWrite + Unpin,
{
    let mut failed = false;
    while let Some(mut line) = rx.recv().await {
        if failed {
            dropped.fetch_add(1, Ordering::Relaxed);
            continue;
        }
        if !line.ends_with('\n') {
            line.push('\n');
        }
        if path == STDOUT_PATH {
            tracing::debug!(
                target: "aic.stdout_audit",
                kind = "events_out",
                bytes = line.len(),
                preview = %truncate(line.trim_end(), AUDIT_PREVIEW_MAX)
            );
        }
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            tracing::warn!(target: "aic.events_out", path = %path, error = %e, "events_out write failed; dropping remaining lines");
            dropped.fetch_add(1, Ordering::Relaxed);
            failed = true;
        }
    }

    if !failed {
        if let Err(e) = writer.flush().await {
            tracing::warn!(target: "aic.events_out", path = %path, error = %e, "events_out flush failed");
        }
    }
}
