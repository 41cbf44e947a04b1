use crate::core::catalog::default_hardware_sets;
use crate::domain::model::{HardwareSet, ProjectSeed};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{HaasError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";
pub const MAX_CAPACITY: i64 = 1_000_000;
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "default_hardware_sets")]
    pub hardware_sets: Vec<HardwareSet>,
    #[serde(default)]
    pub projects: Vec<ProjectSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            logging: LoggingConfig::default(),
            hardware_sets: default_hardware_sets(),
            projects: Vec::new(),
        }
    }
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(HaasError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| HaasError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| HaasError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_socket_addr("server.bind_addr", &self.server.bind_addr)?;

        for origin in &self.server.allowed_origins {
            validation::validate_origin("server.allowed_origins", origin)?;
        }

        if let Some(level) = &self.logging.level {
            if !LOG_LEVELS.contains(&level.as_str()) {
                return Err(HaasError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.clone(),
                    reason: format!("Valid levels: {}", LOG_LEVELS.join(", ")),
                });
            }
        }

        for set in &self.hardware_sets {
            validation::validate_non_empty_string("hardware_sets.id", &set.id)?;
            validation::validate_non_empty_string("hardware_sets.name", &set.name)?;
            validation::validate_range(
                &format!("hardware_sets.{}.total_capacity", set.id),
                set.total_capacity,
                0,
                MAX_CAPACITY,
            )?;
        }
        validation::validate_unique_ids(
            "hardware_sets.id",
            self.hardware_sets.iter().map(|s| s.id.as_str()),
        )?;

        for project in &self.projects {
            validation::validate_non_empty_string("projects.id", &project.id)?;
            validation::validate_non_empty_string("projects.name", &project.name)?;
            validation::validate_required_field(
                &format!("projects.{}.owner", project.id),
                &project.owner,
            )?;
            if let Some(owner) = &project.owner {
                validation::validate_non_empty_string(
                    &format!("projects.{}.owner", project.id),
                    owner,
                )?;
            }
            for member in &project.members {
                validation::validate_non_empty_string(
                    &format!("projects.{}.members", project.id),
                    member,
                )?;
            }
        }
        validation::validate_unique_ids(
            "projects.id",
            self.projects.iter().map(|p| p.id.as_str()),
        )?;

        Ok(())
    }

    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or("info")
    }

    pub fn json_logs(&self) -> bool {
        self.logging.json.unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn bind_addr(&self) -> &str {
        &self.server.bind_addr
    }

    fn allowed_origins(&self) -> &[String] {
        &self.server.allowed_origins
    }

    fn hardware_sets(&self) -> &[HardwareSet] {
        &self.hardware_sets
    }

    fn seed_projects(&self) -> &[ProjectSeed] {
        &self.projects
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
