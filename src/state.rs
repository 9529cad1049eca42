use crate::config::Config;
use crate::dispatcher::Dispatcher;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub config: Arc<Config>,
}
