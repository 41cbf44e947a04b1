use crate::domain::model::HardwareSet;
use crate::utils::error::{HaasError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_unique_ids};

/// Hardware-set definitions, fixed for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct HardwareCatalog {
    sets: Vec<HardwareSet>,
}

impl HardwareCatalog {
    pub fn new(sets: Vec<HardwareSet>) -> Result<Self> {
        for set in &sets {
            validate_non_empty_string("hardware_sets.id", &set.id)?;
            if set.total_capacity < 0 {
                return Err(HaasError::InvalidConfigValueError {
                    field: format!("hardware_sets.{}.total_capacity", set.id),
                    value: set.total_capacity.to_string(),
                    reason: "Capacity cannot be negative".to_string(),
                });
            }
        }
        validate_unique_ids("hardware_sets.id", sets.iter().map(|s| s.id.as_str()))?;

        Ok(Self { sets })
    }

    pub fn get(&self, id: &str) -> Option<&HardwareSet> {
        self.sets.iter().find(|s| s.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Hardware sets in seed order.
    pub fn iter(&self) -> impl Iterator<Item = &HardwareSet> {
        self.sets.iter()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl Default for HardwareCatalog {
    fn default() -> Self {
        Self {
            sets: default_hardware_sets(),
        }
    }
}

pub fn default_hardware_sets() -> Vec<HardwareSet> {
    vec![
        HardwareSet::new("HWSet1", "HWSet1", 10),
        HardwareSet::new("HWSet2", "HWSet2", 20),
    ]
}
