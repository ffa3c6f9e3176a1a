/// Errors raised while building, transforming or searching schedules.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScheduleError {
    /// A mutation referenced rounds/teams out of range or would break a structural invariant.
    #[error("invalid mutation: {0}")]
    InvalidMutation(String),

    /// Every resample attempt for a neighbor produced an invalid mutation.
    #[error("no valid mutation found after {attempts} attempts")]
    MutationExhausted { attempts: usize },

    /// Invalid tournament size, budget, search parameters or malformed schedule input.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ScheduleError {
    pub fn is_invalid_mutation(&self) -> bool {
        matches!(self, Self::InvalidMutation(_))
    }
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
