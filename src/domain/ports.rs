use crate::domain::model::{HardwareSet, ProjectSeed};

pub trait ConfigProvider: Send + Sync {
    fn bind_addr(&self) -> &str;
    fn allowed_origins(&self) -> &[String];
    fn hardware_sets(&self) -> &[HardwareSet];
    fn seed_projects(&self) -> &[ProjectSeed];
}
