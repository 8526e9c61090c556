use aic_core::api::{ReportDispatcher, RunResult};
use async_trait::async_trait;

pub struct NoopReportDispatcher;

#[async_trait]
impl ReportDispatcher for NoopReportDispatcher {
    fn name(&self) -> &str {
        "none"
    }

    async fn dispatch(&self, _result: &RunResult) -> anyhow::Result<()> {
        Ok(())
    }
}
