/// Shared application state
use crate::config::{ServerConfig, StationSettings};
use loopcast_stream::StreamEngine;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// `None` when the audio directory had no playable files
    pub engine: Option<StreamEngine>,
    pub station: Arc<StationSettings>,
    pub public_url: Option<String>,
}

impl AppState {
    pub fn new(engine: Option<StreamEngine>, config: &ServerConfig) -> Self {
        Self {
            engine,
            station: Arc::new(config.station.clone()),
            public_url: config.server.public_url.clone(),
        }
    }
}
