use crate::core::catalog::HardwareCatalog;
use crate::core::ledger::AllocationLedger;
use crate::core::membership::MembershipRegistry;
use crate::domain::model::{
    CheckoutRecord, InviteOutcome, NewProject, PoolSummary, Project, Quantity, ResourceReceipt, ResourceView,
    UserId,
};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{HaasError, Result};
use std::sync::Arc;

/// Request-level façade over the catalog, ledger and membership registry.
///
/// Holds no state of its own; clones share the same ledger and registry.
#[derive(Debug, Clone)]
pub struct ResourceService {
    catalog: Arc<HardwareCatalog>,
    ledger: Arc<AllocationLedger>,
    registry: Arc<MembershipRegistry>,
}

impl ResourceService {
    pub fn new(
        catalog: Arc<HardwareCatalog>,
        ledger: Arc<AllocationLedger>,
        registry: Arc<MembershipRegistry>,
    ) -> Self {
        Self {
            catalog,
            ledger,
            registry,
        }
    }

    /// Builds a fresh catalog, ledger and registry from configuration.
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let catalog = HardwareCatalog::new(config.hardware_sets().to_vec())?;
        let ledger = AllocationLedger::new(&catalog);
        let registry = MembershipRegistry::from_seeds(config.seed_projects())?;

        tracing::info!(
            hardware_sets = catalog.len(),
            projects = config.seed_projects().len(),
            "Resource service initialised"
        );

        Ok(Self::new(
            Arc::new(catalog),
            Arc::new(ledger),
            Arc::new(registry),
        ))
    }

    pub fn ledger(&self) -> &AllocationLedger {
        &self.ledger
    }

    pub fn registry(&self) -> &MembershipRegistry {
        &self.registry
    }

    pub fn checkout_resource(
        &self,
        project_id: &str,
        hwset_id: &str,
        quantity: impl Into<Quantity>,
        user_id: &str,
    ) -> Result<ResourceReceipt> {
        let quantity = quantity.into();
        let outcome = self
            .admit(project_id, hwset_id, user_id)
            .and_then(|_| whole_units(&quantity))
            .and_then(|units| self.ledger.checkout(hwset_id, project_id, units, user_id));

        match outcome {
            Ok(view) => {
                tracing::info!(
                    project = %project_id,
                    hwset = %hwset_id,
                    user = %user_id,
                    quantity = %quantity,
                    available = view.available,
                    "Checked out hardware"
                );
                Ok(ResourceReceipt {
                    message: format!("Checked out {} units of {}", quantity, view.name),
                    view,
                })
            }
            Err(e) => {
                log_rejection("checkout", project_id, hwset_id, user_id, &quantity, &e);
                Err(e)
            }
        }
    }

    pub fn checkin_resource(
        &self,
        project_id: &str,
        hwset_id: &str,
        quantity: impl Into<Quantity>,
        user_id: &str,
    ) -> Result<ResourceReceipt> {
        let quantity = quantity.into();
        let outcome = self
            .admit(project_id, hwset_id, user_id)
            .and_then(|_| whole_units(&quantity))
            .and_then(|units| self.ledger.checkin(hwset_id, project_id, units, user_id));

        match outcome {
            Ok(view) => {
                tracing::info!(
                    project = %project_id,
                    hwset = %hwset_id,
                    user = %user_id,
                    quantity = %quantity,
                    available = view.available,
                    "Checked in hardware"
                );
                Ok(ResourceReceipt {
                    message: format!("Checked in {} units of {}", quantity, view.name),
                    view,
                })
            }
            Err(e) => {
                log_rejection("checkin", project_id, hwset_id, user_id, &quantity, &e);
                Err(e)
            }
        }
    }

    /// Every hardware set in catalog order, as seen by `project_id`.
    pub fn list_resources(&self, project_id: &str, user_id: &str) -> Result<Vec<ResourceView>> {
        self.registry.authorize(project_id, user_id)?;

        self.catalog
            .iter()
            .map(|set| self.ledger.view(&set.id, project_id))
            .collect()
    }

    /// Checkout records of one project against one hardware set.
    pub fn resource_history(
        &self,
        project_id: &str,
        hwset_id: &str,
        user_id: &str,
    ) -> Result<Vec<CheckoutRecord>> {
        self.admit(project_id, hwset_id, user_id)?;
        self.ledger.history(hwset_id, project_id)
    }

    /// The existence and membership checks of checkout and checkin, without
    /// touching the ledger.
    pub fn authorize_resource(&self, project_id: &str, hwset_id: &str, user_id: &str) -> Result<()> {
        self.admit(project_id, hwset_id, user_id)
    }

    pub fn invite_member(
        &self,
        project_id: &str,
        requesting_user: &str,
        invite_user: &str,
    ) -> Result<InviteOutcome> {
        let members = self
            .registry
            .invite(requesting_user, invite_user, project_id)
            .inspect_err(|e| {
                tracing::warn!(
                    project = %project_id,
                    user = %requesting_user,
                    kind = %e.kind(),
                    "Invite rejected"
                );
            })?;

        Ok(InviteOutcome {
            message: format!("{} is a member of {}", invite_user.trim(), project_id),
            members,
        })
    }

    pub fn list_members(&self, project_id: &str, user_id: &str) -> Result<Vec<UserId>> {
        self.registry.members(project_id, user_id)
    }

    pub fn create_project(&self, request: &NewProject, owner: &str) -> Result<Project> {
        self.registry.create_project(
            request.project_id.trim(),
            request.name.trim(),
            &request.description,
            owner.trim(),
        )
    }

    pub fn get_project(&self, project_id: &str, user_id: &str) -> Result<Project> {
        self.registry.project(project_id, user_id)
    }

    pub fn list_projects(&self, user_id: &str) -> Vec<Project> {
        self.registry.projects_for(user_id)
    }

    /// Pool-wide totals for the whole catalog.
    pub fn hardware_sets(&self) -> Result<Vec<PoolSummary>> {
        self.catalog
            .iter()
            .map(|set| self.ledger.summary(&set.id))
            .collect()
    }

    // Existence first, then membership; the ledger is not touched until both pass.
    fn admit(&self, project_id: &str, hwset_id: &str, user_id: &str) -> Result<()> {
        if !self.registry.contains(project_id) {
            return Err(HaasError::NotFound {
                resource: "Project",
                id: project_id.to_string(),
            });
        }
        if !self.catalog.contains(hwset_id) {
            return Err(HaasError::NotFound {
                resource: "Hardware set",
                id: hwset_id.to_string(),
            });
        }
        self.registry.authorize(project_id, user_id)
    }
}

fn whole_units(quantity: &Quantity) -> Result<i64> {
    match quantity {
        Quantity::Units(units) => Ok(*units),
        Quantity::Malformed(raw) => Err(HaasError::InvalidQuantity {
            quantity: raw.clone(),
        }),
    }
}

fn log_rejection(
    operation: &str,
    project_id: &str,
    hwset_id: &str,
    user_id: &str,
    quantity: &Quantity,
    error: &HaasError,
) {
    match error {
        HaasError::Forbidden { .. } => tracing::warn!(
            project = %project_id,
            hwset = %hwset_id,
            user = %user_id,
            "{} rejected: not a member",
            operation
        ),
        _ => tracing::debug!(
            project = %project_id,
            hwset = %hwset_id,
            user = %user_id,
            quantity = %quantity,
            kind = %error.kind(),
            "{} rejected",
            operation
        ),
    }
}
