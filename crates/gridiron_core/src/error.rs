use thiserror::Error;

/// Errors surfaced by the dynasty core.
///
/// Negotiation non-convergence is not an error; see
/// [`crate::trade::NegotiationOutcome::Stalemate`].
#[derive(Error, Debug)]
pub enum DynastyError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Salary cap violation for team {team_id}: requires {required}, available {available}")]
    CapViolation { team_id: u32, required: i64, available: i64 },

    #[error("Team {team_id} already used its franchise tag for season {season}")]
    DuplicateFranchiseTag { team_id: u32, season: u32 },

    #[error("Draft pick {pick_id} has already been used")]
    DraftPickReused { pick_id: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DynastyError {
    /// Whether the caller may retry the whole operation (e.g. the day advance).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DynastyError::Database(_)
                | DynastyError::NotFound(_)
                | DynastyError::CapViolation { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, DynastyError>;
