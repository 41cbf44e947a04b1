pub mod catalog;
pub mod ledger;
pub mod membership;
pub mod service;

pub use crate::domain::model::{HardwareSet, Quantity, ResourceView};
pub use crate::domain::ports::ConfigProvider;
pub use crate::utils::error::Result;
pub use catalog::HardwareCatalog;
pub use ledger::AllocationLedger;
pub use membership::MembershipRegistry;
pub use service::ResourceService;
