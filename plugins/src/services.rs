//! ServicesFactory implementation: builds the agent runtime and report
//! dispatcher from config for the CLI.
use async_trait::async_trait;
use aic_core::api::{AppConfig, InvestigationError, Services, ServicesFactory, TraceEmitter};

use crate::factory;

pub struct PluginServicesFactory;

impl Default for PluginServicesFactory {
    fn default() -> Self {
        Self
    }
}

#[async_trait]
impl ServicesFactory for PluginServicesFactory {
    async fn build_services(
        &self,
        cfg: &AppConfig,
        emitter: &TraceEmitter,
    ) -> Result<Services, InvestigationError> {
        let runtime = factory::build_runtime(cfg)
            .map_err(|e| InvestigationError::Config(format!("{e:#}")))?;
        let dispatcher = factory::build_dispatcher(cfg, emitter)
            .map_err(|e| InvestigationError::Config(format!("{e:#}")))?;
        Ok(Services {
            runtime,
            dispatcher,
        })
    }
}
