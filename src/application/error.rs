use crate::domain::{SolutionStatus, SolverError};

/// Why an assignment run produced no placement
#[derive(Debug, thiserror::Error)]
pub enum AssignmentError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Group '{group}' (size {size}) cannot be seated: no seat has enough neighbors")]
    InfeasibleFootprint { group: String, size: u32 },

    #[error("Not enough capacity ({capacity}) for all people ({demand})")]
    CapacityExceeded { demand: u64, capacity: u64 },

    #[error("No solution found (status {status}): {reason}")]
    NoSolution {
        status: SolutionStatus,
        reason: String,
    },

    #[error(transparent)]
    Solver(#[from] SolverError),
}

impl AssignmentError {
    /// Machine status for diagnostics; pre-solve failures report `None`.
    pub fn status(&self) -> Option<SolutionStatus> {
        match self {
            AssignmentError::NoSolution { status, .. } => Some(*status),
            AssignmentError::Solver(_) => Some(SolutionStatus::Error),
            _ => None,
        }
    }

    /// Whether the failure was detected before any solver time was spent.
    pub fn is_pre_solve(&self) -> bool {
        matches!(
            self,
            AssignmentError::Configuration(_)
                | AssignmentError::InfeasibleFootprint { .. }
                | AssignmentError::CapacityExceeded { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AssignmentError>;
