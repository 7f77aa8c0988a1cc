use std::sync::Arc;

use crate::autoagents::{AgentApi, AutoAgentsClient};
use crate::config::Settings;

/// Shared application state, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<dyn AgentApi>,
}

impl AppState {
    /// Wires the real AutoAgents client from the startup settings.
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let agent: Arc<dyn AgentApi> = Arc::new(AutoAgentsClient::new(Arc::new(settings))?);
        Ok(Self { agent })
    }

    /// Builds the state around an arbitrary agent implementation.
    pub fn with_agent(agent: Arc<dyn AgentApi>) -> Self {
        Self { agent }
    }
}
