pub mod api;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use api::Server;
pub use config::TomlConfig;
pub use crate::core::{AllocationLedger, HardwareCatalog, MembershipRegistry, ResourceService};
pub use utils::error::{HaasError, Result};
