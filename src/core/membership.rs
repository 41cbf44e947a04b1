use crate::domain::model::{MemberSet, Project, ProjectId, ProjectSeed, UserId};
use crate::utils::error::{HaasError, Result};
use crate::utils::validation::{require_non_blank, validate_required_field};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Clone)]
struct ProjectRecord {
    name: String,
    description: String,
    members: MemberSet,
    created_at: DateTime<Utc>,
}

impl ProjectRecord {
    fn to_project(&self, id: &str) -> Project {
        Project {
            id: id.to_string(),
            name: self.name.clone(),
            description: self.description.clone(),
            owner: self.members.owner().to_string(),
            members: self.members.to_vec(),
            created_at: self.created_at,
        }
    }
}

/// Projects and their members. The source of truth for authorization.
#[derive(Debug, Default)]
pub struct MembershipRegistry {
    projects: RwLock<HashMap<ProjectId, ProjectRecord>>,
}

impl MembershipRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers projects declared in configuration.
    pub fn from_seeds(seeds: &[ProjectSeed]) -> Result<Self> {
        let registry = Self::new();
        for seed in seeds {
            let field = format!("projects.{}.owner", seed.id);
            let owner = validate_required_field(&field, &seed.owner)?;
            registry.create_project(&seed.id, &seed.name, &seed.description, owner)?;

            for member in &seed.members {
                require_non_blank(&format!("projects.{}.members", seed.id), member)?;
            }

            let mut projects = registry.projects.write().unwrap_or_else(PoisonError::into_inner);
            if let Some(record) = projects.get_mut(&seed.id) {
                for member in &seed.members {
                    record.members.insert(member.trim());
                }
            }
        }
        Ok(registry)
    }

    pub fn create_project(
        &self,
        id: &str,
        name: &str,
        description: &str,
        owner: &str,
    ) -> Result<Project> {
        require_non_blank("projectId", id)?;
        require_non_blank("name", name)?;
        require_non_blank("userId", owner)?;
        let owner = owner.trim();

        let mut projects = self.projects.write().unwrap_or_else(PoisonError::into_inner);
        if projects.contains_key(id) {
            return Err(HaasError::Conflict {
                resource: "Project",
                id: id.to_string(),
            });
        }

        let record = ProjectRecord {
            name: name.to_string(),
            description: description.to_string(),
            members: MemberSet::new(owner),
            created_at: Utc::now(),
        };
        let project = record.to_project(id);
        projects.insert(id.to_string(), record);

        tracing::info!(project = %id, owner = %owner, "Project created");
        Ok(project)
    }

    pub fn contains(&self, project_id: &str) -> bool {
        self.projects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(project_id)
    }

    pub fn is_member(&self, project_id: &str, user_id: &str) -> bool {
        self.projects
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(project_id)
            .map(|record| record.members.contains(user_id))
            .unwrap_or(false)
    }

    /// `NotFound` for an unknown project, `Forbidden` for a non-member.
    pub fn authorize(&self, project_id: &str, user_id: &str) -> Result<()> {
        self.with_authorized(project_id, user_id, |_| ())
    }

    /// Adds `invite_user` to the project on behalf of an existing member.
    /// Inviting someone who is already a member succeeds without change.
    pub fn invite(
        &self,
        requesting_user: &str,
        invite_user: &str,
        project_id: &str,
    ) -> Result<Vec<UserId>> {
        require_non_blank("inviteUser", invite_user)?;
        let invite_user = invite_user.trim();

        let mut projects = self.projects.write().unwrap_or_else(PoisonError::into_inner);
        let record = projects
            .get_mut(project_id)
            .ok_or_else(|| not_found(project_id))?;

        if !record.members.contains(requesting_user) {
            return Err(HaasError::Forbidden {
                user: requesting_user.to_string(),
                project: project_id.to_string(),
            });
        }

        if record.members.insert(invite_user) {
            tracing::info!(
                project = %project_id,
                invited_by = %requesting_user,
                user = %invite_user,
                "Member added"
            );
        }
        Ok(record.members.to_vec())
    }

    pub fn members(&self, project_id: &str, user_id: &str) -> Result<Vec<UserId>> {
        self.with_authorized(project_id, user_id, |record| record.members.to_vec())
    }

    pub fn project(&self, project_id: &str, user_id: &str) -> Result<Project> {
        self.with_authorized(project_id, user_id, |record| record.to_project(project_id))
    }

    /// Every project `user_id` belongs to, ordered by id.
    pub fn projects_for(&self, user_id: &str) -> Vec<Project> {
        let projects = self.projects.read().unwrap_or_else(PoisonError::into_inner);
        let mut visible: Vec<Project> = projects
            .iter()
            .filter(|(_, record)| record.members.contains(user_id))
            .map(|(id, record)| record.to_project(id))
            .collect();
        visible.sort_by(|a, b| a.id.cmp(&b.id));
        visible
    }

    fn with_authorized<T>(
        &self,
        project_id: &str,
        user_id: &str,
        f: impl FnOnce(&ProjectRecord) -> T,
    ) -> Result<T> {
        let projects = self.projects.read().unwrap_or_else(PoisonError::into_inner);
        let record = projects
            .get(project_id)
            .ok_or_else(|| not_found(project_id))?;

        if !record.members.contains(user_id) {
            return Err(HaasError::Forbidden {
                user: user_id.to_string(),
                project: project_id.to_string(),
            });
        }
        Ok(f(record))
    }
}

fn not_found(project_id: &str) -> HaasError {
    HaasError::NotFound {
        resource: "Project",
        id: project_id.to_string(),
    }
}
