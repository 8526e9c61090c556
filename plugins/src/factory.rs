use std::sync::Arc;

use aic_core::api::{AgentRuntime, AppConfig, ReportConfig, ReportDispatcher, RuntimeConfig, TraceEmitter};
use anyhow::Result;

use crate::report::{LogReportDispatcher, NoopReportDispatcher, WebhookReportDispatcher};
use crate::runtime::{PlaybookAgentRuntime, ReplayAgentRuntime};

pub fn build_runtime(cfg: &AppConfig) -> Result<Arc<dyn AgentRuntime>> {
    match &cfg.runtime {
        RuntimeConfig::Playbook(p_cfg) => Ok(Arc::new(PlaybookAgentRuntime::new(p_cfg)?)),
        RuntimeConfig::Replay(r_cfg) => {
            if r_cfg.events_file.trim().is_empty() {
                anyhow::bail!("runtime.events_file is required for the replay runtime");
            }
            Ok(Arc::new(ReplayAgentRuntime::new(r_cfg.events_file.clone())))
        }
    }
}

pub fn build_dispatcher(cfg: &AppConfig, emitter: &TraceEmitter) -> Result<Arc<dyn ReportDispatcher>> {
    match &cfg.report {
        ReportConfig::Log => Ok(Arc::new(LogReportDispatcher::new(emitter.clone()))),
        ReportConfig::Webhook(w_cfg) => Ok(Arc::new(WebhookReportDispatcher::new(w_cfg)?)),
        ReportConfig::None => Ok(Arc::new(NoopReportDispatcher)),
    }
}
