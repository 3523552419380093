// Domain service interface for solving assignment models
// Any MILP backend plugs in behind this trait

use super::models::{OptimizationProblem, Solution};

/// Error types for the solver service
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    #[error("Solver not available: {0}")]
    SolverNotAvailable(String),

    #[error("Solver execution failed: {0}")]
    ExecutionFailed(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Domain service interface for MILP solvers
///
/// `solve` is a single blocking call that must return at or before
/// `problem.solver_config.time_limit`. Infeasibility and timeouts are
/// reported through [`Solution::status`], not as errors; `Err` is reserved
/// for malformed problems and backend failures.
pub trait SolverService: Send + Sync {
    /// Solve an optimization problem
    fn solve(&self, problem: &OptimizationProblem) -> Result<Solution>;

    /// Validate a problem without solving it
    fn validate(&self, problem: &OptimizationProblem) -> Result<()> {
        let mut errors = Vec::new();
        let num_vars = problem.num_variables();

        if num_vars == 0 {
            errors.push("Problem must have at least one variable".to_string());
        }

        if let Some(objective) = &problem.objective {
            if let Some(&(var, _)) = objective.terms.iter().find(|(var, _)| *var >= num_vars) {
                errors.push(format!(
                    "Objective references variable {} but problem has {} variables",
                    var, num_vars
                ));
            }
        }

        for (i, constraint) in problem.constraints.iter().enumerate() {
            if let Some(&(var, _)) = constraint.terms.iter().find(|(var, _)| *var >= num_vars) {
                errors.push(format!(
                    "Constraint {} '{}' references variable {} but problem has {} variables",
                    i, constraint.name, var, num_vars
                ));
            }
        }

        for (i, var) in problem.variables.iter().enumerate() {
            if let Some(upper) = var.upper_bound {
                if var.lower_bound > upper {
                    errors.push(format!(
                        "Variable {} '{}' has lower bound ({}) > upper bound ({})",
                        i, var.name, var.lower_bound, upper
                    ));
                }
            }
        }

        if let Some(limit) = problem.solver_config.time_limit {
            if !(limit.is_finite() && limit > 0.0) {
                errors.push(format!("Time limit must be positive, got {}", limit));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SolverError::InvalidProblem(errors.join("; ")))
        }
    }

    /// Get the name of this solver backend
    fn name(&self) -> &str;
}
