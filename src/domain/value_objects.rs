// Domain value objects shared by the assignment model and the solver adapters

use std::fmt;

/// Type of decision variable in the assignment model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableType {
    /// Continuous real number (x ∈ ℝ)
    Continuous,
    /// Integer number (x ∈ ℤ)
    Integer,
    /// Binary variable (x ∈ {0, 1})
    Binary,
}

/// Type of constraint comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintType {
    /// Less than or equal (≤)
    LessThanOrEqual,
    /// Equal (=)
    Equal,
    /// Greater than or equal (≥)
    GreaterThanOrEqual,
}

/// Direction of optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationType {
    /// Minimize the objective function
    Minimize,
    /// Maximize the objective function
    Maximize,
}

/// Outcome reported by a solver backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// Proven optimal solution
    Optimal,
    /// Feasible solution found before the time limit, optimality not proven
    Feasible,
    /// Problem has no feasible solution
    Infeasible,
    /// Objective can be improved infinitely
    Unbounded,
    /// Solver stopped without a usable solution (typically the time limit)
    Unknown,
    /// Solver error occurred
    Error,
}

impl SolutionStatus {
    /// Whether a solution with this status carries a usable assignment.
    pub fn is_usable(self) -> bool {
        matches!(self, SolutionStatus::Optimal | SolutionStatus::Feasible)
    }
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionStatus::Optimal => write!(f, "OPTIMAL"),
            SolutionStatus::Feasible => write!(f, "FEASIBLE"),
            SolutionStatus::Infeasible => write!(f, "INFEASIBLE"),
            SolutionStatus::Unbounded => write!(f, "UNBOUNDED"),
            SolutionStatus::Unknown => write!(f, "UNKNOWN"),
            SolutionStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Solver backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverBackend {
    /// Automatically select the best compiled-in solver
    Auto,
    /// HiGHS solver
    Highs,
    /// COIN-OR CBC solver
    CoinCbc,
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverBackend::Auto => write!(f, "Auto"),
            SolverBackend::Highs => write!(f, "HiGHS"),
            SolverBackend::CoinCbc => write!(f, "COIN-OR CBC"),
        }
    }
}

/// Kind of physical resource groups are placed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceMode {
    /// Individual seats connected by an adjacency graph
    Seats,
    /// Tables with a fixed capacity
    Tables,
}

impl fmt::Display for ResourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceMode::Seats => write!(f, "seats"),
            ResourceMode::Tables => write!(f, "tables"),
        }
    }
}
