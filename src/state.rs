//! Shared application state

use std::sync::Arc;

use crate::config::DotConfig;
use crate::dot::DotSyncer;
use crate::entities::ControlValues;

#[derive(Clone)]
pub struct AppState {
    pub syncer: Arc<DotSyncer>,
    pub controls: Arc<ControlValues>,
    pub dot_config: DotConfig,
}

impl AppState {
    pub fn new(syncer: Arc<DotSyncer>, dot_config: DotConfig) -> Self {
        Self {
            syncer,
            controls: Arc::new(ControlValues::new()),
            dot_config,
        }
    }
}
