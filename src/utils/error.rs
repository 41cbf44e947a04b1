use thiserror::Error;

#[derive(Error, Debug)]
pub enum HaasError {
    #[error("Invalid quantity: {quantity} (must be a positive whole number)")]
    InvalidQuantity { quantity: String },

    #[error("Not enough {hwset} available: requested {requested}, available {available}")]
    InsufficientCapacity {
        hwset: String,
        requested: i64,
        available: i64,
    },

    #[error(
        "Cannot check in {requested} units of {hwset}: project {project} only holds {allocated}"
    )]
    OverCheckin {
        hwset: String,
        project: String,
        requested: i64,
        allocated: i64,
    },

    #[error("User {user} is not a member of project {project}")]
    Forbidden { user: String, project: String },

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    #[error("Invalid request field {field}: {reason}")]
    InvalidRequest { field: String, reason: String },

    #[error("{resource} already exists: {id}")]
    Conflict { resource: &'static str, id: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid configuration value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Stable, machine-readable error code carried in every error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidQuantity,
    InsufficientCapacity,
    OverCheckin,
    Forbidden,
    NotFound,
    InvalidRequest,
    Conflict,
    Configuration,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidQuantity => "invalid_quantity",
            ErrorKind::InsufficientCapacity => "insufficient_capacity",
            ErrorKind::OverCheckin => "over_checkin",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl HaasError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            HaasError::InvalidQuantity { .. } => ErrorKind::InvalidQuantity,
            HaasError::InsufficientCapacity { .. } => ErrorKind::InsufficientCapacity,
            HaasError::OverCheckin { .. } => ErrorKind::OverCheckin,
            HaasError::Forbidden { .. } => ErrorKind::Forbidden,
            HaasError::NotFound { .. } => ErrorKind::NotFound,
            HaasError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            HaasError::Conflict { .. } => ErrorKind::Conflict,
            HaasError::ConfigValidationError { .. }
            | HaasError::InvalidConfigValueError { .. }
            | HaasError::MissingConfigError { .. } => ErrorKind::Configuration,
            HaasError::IoError(_) | HaasError::SerializationError(_) => ErrorKind::Internal,
        }
    }

    /// Whether the error was caused by the request rather than by the system.
    pub fn is_client_error(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Configuration | ErrorKind::Internal)
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            HaasError::ConfigValidationError { .. } => {
                "Check the TOML syntax of the configuration file"
            }
            HaasError::InvalidConfigValueError { .. } => {
                "Fix the highlighted value in the configuration file or CLI flags"
            }
            HaasError::MissingConfigError { .. } => "Add the missing field to the configuration",
            HaasError::IoError(_) => "Check that the file exists and is readable",
            HaasError::InsufficientCapacity { .. } => {
                "Request fewer units or check in units held by another project"
            }
            HaasError::OverCheckin { .. } => "Check in at most the quantity the project holds",
            HaasError::Forbidden { .. } => "Ask a project member to invite you",
            _ => "Correct the request and try again",
        }
    }
}

pub type Result<T> = std::result::Result<T, HaasError>;
