use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::TicketService;
use crate::workflow::Coordinator;

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub tickets: Arc<dyn TicketService>,
}

impl AppContext {
    pub fn new(config: AppConfig, tickets: Arc<dyn TicketService>) -> Self {
        Self { config, tickets }
    }

    /// Fresh session against the configured backend.
    pub fn coordinator(&self) -> Coordinator {
        Coordinator::new(Arc::clone(&self.tickets), self.config.workflow.clone())
    }
}
