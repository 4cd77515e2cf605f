use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoachError {
    #[error("unknown subscription tier '{0}': expected free, pro or guru")]
    UnknownTier(String),

    #[error("unknown time of day '{0}': expected morning, midday or evening")]
    UnknownTimeOfDay(String),

    #[error("monthly goal must be a positive deal count, got {0}")]
    InvalidGoal(i64),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("DATABASE_URL must be set for this command")]
    MissingDatabaseUrl,
}
