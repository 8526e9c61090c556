use async_trait::async_trait;

use crate::runner::RunResult;

/// Delivers a finished investigation through an external channel.
#[async_trait]
pub trait ReportDispatcher: Send + Sync {
    fn name(&self) -> &str;
    async fn dispatch(&self, result: &RunResult) -> anyhow::Result<()>;
}
