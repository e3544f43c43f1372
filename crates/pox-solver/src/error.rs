use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolverError {
    // Usage errors
    #[error("Invalid rule type: {0}")]
    InvalidRuleType(String),

    #[error("Rule invariant violated: {0}")]
    InvariantViolation(String),

    // Config errors
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    // Version constraint errors
    #[error("Invalid version constraint: {0}")]
    InvalidConstraint(String),

    // Scenario errors
    #[error("Package not found in pool: {name}@{version}")]
    UnknownPackage { name: String, version: String },

    // JSON/parsing errors
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SolverError>;
