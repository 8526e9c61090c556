use crate::config::AppConfig;
use crate::error::InvestigationError;
use crate::report::ReportDispatcher;
use crate::runner::AgentRuntime;
use crate::trace::TraceEmitter;
use std::sync::Arc;

/// External collaborators of one investigation.
#[derive(Clone)]
pub struct Services {
    pub runtime: Arc<dyn AgentRuntime>,
    pub dispatcher: Arc<dyn ReportDispatcher>,
}

#[async_trait::async_trait]
pub trait ServicesFactory: Send + Sync {
    async fn build_services(
        &self,
        cfg: &AppConfig,
        emitter: &TraceEmitter,
    ) -> Result<Services, InvestigationError>;
}

#[derive(Clone)]
pub struct AppContext {
    cfg: AppConfig,
    emitter: TraceEmitter,
    services_factory: Option<Arc<dyn ServicesFactory>>,
}

impl AppContext {
    pub fn new(
        cfg: AppConfig,
        emitter: TraceEmitter,
        services_factory: Option<Arc<dyn ServicesFactory>>,
    ) -> Self {
        Self {
            cfg,
            emitter,
            services_factory,
        }
    }

    pub fn cfg(&self) -> &AppConfig {
        &self.cfg
    }

    pub fn emitter(&self) -> &TraceEmitter {
        &self.emitter
    }

    pub fn with_config(&self, cfg: AppConfig) -> Self {
        Self {
            cfg,
            emitter: self.emitter.clone(),
            services_factory: self.services_factory.clone(),
        }
    }

    pub async fn build_services(&self) -> Result<Services, InvestigationError> {
        let Some(factory) = self.services_factory.as_ref() else {
            return Err(InvestigationError::Config(
                "services_factory missing (cannot build runtime/dispatcher)".into(),
            ));
        };
        factory.build_services(&self.cfg, &self.emitter).await
    }
}
