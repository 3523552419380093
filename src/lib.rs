// Domain layer: assignment inputs, the MILP model and the solver contract
pub mod domain;

// Application layer: footprints, model building, diversity scoring, extraction
pub mod application;

// Solver adapters: Concrete implementations of SolverService
pub mod solver;

// Re-export commonly used types
pub use domain::{
    ConstraintConfig, Group, OptimizationProblem, Placement, ResourceId, ResourceMode, Seat,
    Solution, SolutionStatus, SolverBackend, SolverConfig, SolverError, SolverService, Table,
    PAST_NEIGHBOR_KEY,
};

pub use application::{AssignmentError, AssignmentReport, Planner, PlannerConfig};

pub use solver::SolverFactory;

#[cfg(feature = "coin_cbc")]
pub use solver::CoinCbcSolver;
#[cfg(feature = "highs")]
pub use solver::HighsSolver;
