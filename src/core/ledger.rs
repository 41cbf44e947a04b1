//! Per-hardware-set allocation counters.
//!
//! Every pool is guarded by its own lock, so checkouts against different
//! hardware sets never contend. The set of pools is fixed when the ledger is
//! built, which keeps the outer map lock-free.
//!
//! Each pool also keeps the checkout records behind its counters. Records are
//! written in the same critical section as the counters, so the open records
//! of a project always add up to its allocation.

use crate::core::catalog::HardwareCatalog;
use crate::domain::model::{
    CheckoutRecord, HardwareSetId, PoolSummary, ProjectId, ResourceView,
};
use crate::utils::error::{HaasError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug)]
struct Pool {
    name: String,
    total: i64,
    available: i64,
    // Entries are created on first checkout and kept at zero after a full checkin.
    allocations: HashMap<ProjectId, i64>,
    // Ordered by checkout time.
    records: Vec<CheckoutRecord>,
    next_record_id: u64,
}

impl Pool {
    fn allocated_to(&self, project_id: &str) -> i64 {
        self.allocations.get(project_id).copied().unwrap_or(0)
    }

    fn allocated(&self) -> i64 {
        self.allocations.values().sum()
    }

    fn view(&self, hwset_id: &str, project_id: &str) -> ResourceView {
        ResourceView {
            hwset_id: hwset_id.to_string(),
            name: self.name.clone(),
            total: self.total,
            allocated_to_project: self.allocated_to(project_id),
            available: self.available,
        }
    }

    fn open_units(&self, project_id: &str) -> i64 {
        self.records
            .iter()
            .filter(|r| r.is_open() && r.project_id == project_id)
            .map(|r| r.quantity)
            .sum()
    }

    fn is_conserved(&self) -> bool {
        self.available >= 0
            && self.allocations.values().all(|q| *q >= 0)
            && self.total == self.available + self.allocated()
            && self
                .allocations
                .iter()
                .all(|(project, held)| self.open_units(project) == *held)
    }

    fn open_record(
        &mut self,
        hwset_id: &str,
        project_id: &str,
        user_id: &str,
        quantity: i64,
        now: DateTime<Utc>,
    ) {
        self.next_record_id += 1;
        self.records.push(CheckoutRecord {
            id: self.next_record_id,
            hwset_id: hwset_id.to_string(),
            project_id: project_id.to_string(),
            user_id: user_id.to_string(),
            quantity,
            checked_out_at: now,
            checked_in_at: None,
            checked_in_by: None,
        });
    }

    /// Closes the project's open records oldest first. A record larger than
    /// what is left to return is split, and its remainder stays open right
    /// after it.
    fn close_records(&mut self, project_id: &str, user_id: &str, quantity: i64, now: DateTime<Utc>) {
        let mut remaining = quantity;
        let mut i = 0;

        while remaining > 0 && i < self.records.len() {
            let record = &mut self.records[i];
            if !record.is_open() || record.project_id != project_id {
                i += 1;
                continue;
            }

            let split = if record.quantity > remaining {
                let mut rest = record.clone();
                rest.quantity -= remaining;
                record.quantity = remaining;
                Some(rest)
            } else {
                None
            };
            remaining -= record.quantity;
            record.checked_in_at = Some(now);
            record.checked_in_by = Some(user_id.to_string());

            if let Some(mut rest) = split {
                self.next_record_id += 1;
                rest.id = self.next_record_id;
                self.records.insert(i + 1, rest);
            }
            i += 1;
        }
    }
}

#[derive(Debug)]
pub struct AllocationLedger {
    pools: HashMap<HardwareSetId, RwLock<Pool>>,
}

impl AllocationLedger {
    pub fn new(catalog: &HardwareCatalog) -> Self {
        let pools = catalog
            .iter()
            .map(|set| {
                let pool = Pool {
                    name: set.name.clone(),
                    total: set.total_capacity,
                    available: set.total_capacity,
                    allocations: HashMap::new(),
                    records: Vec::new(),
                    next_record_id: 0,
                };
                (set.id.clone(), RwLock::new(pool))
            })
            .collect();

        Self { pools }
    }

    /// Moves `quantity` units from the shared pool to `project_id` on behalf
    /// of `user_id`.
    ///
    /// The availability check, both counter updates and the new record happen
    /// under the pool's write lock; a rejected request leaves the pool untouched.
    pub fn checkout(
        &self,
        hwset_id: &str,
        project_id: &str,
        quantity: i64,
        user_id: &str,
    ) -> Result<ResourceView> {
        ensure_positive(quantity)?;
        let mut guard = write(self.pool(hwset_id)?);
        let pool = &mut *guard;

        if quantity > pool.available {
            return Err(HaasError::InsufficientCapacity {
                hwset: hwset_id.to_string(),
                requested: quantity,
                available: pool.available,
            });
        }

        pool.available -= quantity;
        *pool.allocations.entry(project_id.to_string()).or_insert(0) += quantity;
        pool.open_record(hwset_id, project_id, user_id, quantity, Utc::now());

        Ok(pool.view(hwset_id, project_id))
    }

    /// Returns `quantity` units held by `project_id` to the shared pool.
    pub fn checkin(
        &self,
        hwset_id: &str,
        project_id: &str,
        quantity: i64,
        user_id: &str,
    ) -> Result<ResourceView> {
        ensure_positive(quantity)?;
        let mut guard = write(self.pool(hwset_id)?);
        let pool = &mut *guard;

        let allocated = pool.allocated_to(project_id);
        if quantity > allocated {
            return Err(HaasError::OverCheckin {
                hwset: hwset_id.to_string(),
                project: project_id.to_string(),
                requested: quantity,
                allocated,
            });
        }

        if let Some(held) = pool.allocations.get_mut(project_id) {
            *held -= quantity;
        }
        pool.available += quantity;
        pool.close_records(project_id, user_id, quantity, Utc::now());

        Ok(pool.view(hwset_id, project_id))
    }

    pub fn view(&self, hwset_id: &str, project_id: &str) -> Result<ResourceView> {
        let pool = read(self.pool(hwset_id)?);
        Ok(pool.view(hwset_id, project_id))
    }

    pub fn summary(&self, hwset_id: &str) -> Result<PoolSummary> {
        let pool = read(self.pool(hwset_id)?);
        Ok(PoolSummary {
            hwset_id: hwset_id.to_string(),
            name: pool.name.clone(),
            total: pool.total,
            available: pool.available,
            allocated: pool.allocated(),
        })
    }

    /// Checkout records of `project_id` against one hardware set, oldest first.
    pub fn history(&self, hwset_id: &str, project_id: &str) -> Result<Vec<CheckoutRecord>> {
        let pool = read(self.pool(hwset_id)?);
        Ok(pool
            .records
            .iter()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect())
    }

    /// `total == available + Σ allocations` for every pool, checked one pool
    /// at a time.
    pub fn is_conserved(&self) -> bool {
        self.pools.values().all(|lock| read(lock).is_conserved())
    }

    fn pool(&self, hwset_id: &str) -> Result<&RwLock<Pool>> {
        self.pools.get(hwset_id).ok_or_else(|| HaasError::NotFound {
            resource: "Hardware set",
            id: hwset_id.to_string(),
        })
    }
}

fn ensure_positive(quantity: i64) -> Result<()> {
    if quantity <= 0 {
        return Err(HaasError::InvalidQuantity {
            quantity: quantity.to_string(),
        });
    }
    Ok(())
}

// Critical sections validate before they mutate, so a pool behind a
// poisoned lock is still consistent.
fn read(lock: &RwLock<Pool>) -> RwLockReadGuard<'_, Pool> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(lock: &RwLock<Pool>) -> RwLockWriteGuard<'_, Pool> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
