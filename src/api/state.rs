//! Application state for API handlers

use crate::core::service::ResourceService;
use chrono::{DateTime, Utc};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Resource ledger and membership façade
    pub service: ResourceService,

    /// Server version
    pub version: String,

    /// Server start time
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(service: ResourceService) -> Self {
        Self {
            service,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
        }
    }
}
