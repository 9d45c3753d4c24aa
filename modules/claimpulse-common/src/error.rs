use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClaimPulseError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Classification error: {0}")]
    Classification(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Job lock conflict: another batch run is in progress")]
    JobLockConflict,

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
