// HiGHS Solver Adapter
// Translates the sparse assignment model to a HiGHS row problem

use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution, SolverStatistics},
    solver_service::{Result, SolverService},
    value_objects::{ConstraintType, OptimizationType, SolutionStatus},
};
use highs::{Col, HighsModelStatus, RowProblem, Sense};
use std::time::Instant;

/// Tolerance used to accept a time-limited incumbent as feasible
const FEASIBILITY_TOLERANCE: f64 = 1e-5;

pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for HighsSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<DomainSolution> {
        self.validate(problem)?;

        let start_time = Instant::now();
        let config = &problem.solver_config;

        let mut objective_coeffs = vec![0.0; problem.num_variables()];
        if let Some(objective) = &problem.objective {
            for &(var, coeff) in &objective.terms {
                objective_coeffs[var] += coeff;
            }
        }

        // Add variables first, then rows
        let mut pb = RowProblem::default();
        let mut cols: Vec<Col> = Vec::with_capacity(problem.num_variables());
        for (var_def, &obj_coeff) in problem.variables.iter().zip(&objective_coeffs) {
            let lower = var_def.lower_bound;
            let upper = var_def.upper_bound.unwrap_or(f64::INFINITY);

            let col = if var_def.is_integer() {
                pb.add_integer_column(obj_coeff, lower..=upper)
            } else {
                pb.add_column(obj_coeff, lower..=upper)
            };
            cols.push(col);
        }

        for constraint in &problem.constraints {
            let terms: Vec<(Col, f64)> = constraint
                .terms
                .iter()
                .filter(|(_, coeff)| *coeff != 0.0)
                .map(|&(var, coeff)| (cols[var], coeff))
                .collect();

            match constraint.constraint_type {
                ConstraintType::LessThanOrEqual => {
                    pb.add_row(..=constraint.bound, &terms);
                }
                ConstraintType::Equal => {
                    pb.add_row(constraint.bound..=constraint.bound, &terms);
                }
                ConstraintType::GreaterThanOrEqual => {
                    pb.add_row(constraint.bound.., &terms);
                }
            }
        }

        let sense = match problem.objective.as_ref().map(|o| o.optimization_type) {
            Some(OptimizationType::Minimize) => Sense::Minimise,
            _ => Sense::Maximise,
        };

        let mut model = pb.optimise(sense);
        if !config.verbose {
            model.make_quiet();
        }
        if let Some(limit) = config.time_limit {
            model.set_option("time_limit", limit);
        }
        if let Some(gap) = config.gap_tolerance {
            model.set_option("mip_rel_gap", gap);
        }

        let solved = model.solve();
        let solve_time = start_time.elapsed().as_secs_f64() * 1000.0;
        let statistics = SolverStatistics::for_problem(problem, solve_time);

        let solution = match solved.status() {
            HighsModelStatus::Optimal => {
                let values = solved.get_solution().columns().to_vec();
                let value = problem.objective_value(&values);
                DomainSolution::found(SolutionStatus::Optimal, value, values)
                    .with_message(format!("Optimal solution found for '{}'", problem.name))
            }
            HighsModelStatus::ReachedTimeLimit => {
                // HiGHS reports the time limit whether or not an incumbent exists.
                let values = solved.get_solution().columns().to_vec();
                if problem.is_feasible(&values, FEASIBILITY_TOLERANCE) {
                    let value = problem.objective_value(&values);
                    DomainSolution::found(SolutionStatus::Feasible, value, values).with_message(
                        "Time limit reached; returning best feasible solution found",
                    )
                } else {
                    DomainSolution::new(
                        SolutionStatus::Unknown,
                        "Time limit reached before any feasible solution was found",
                    )
                }
            }
            HighsModelStatus::Infeasible | HighsModelStatus::UnboundedOrInfeasible => {
                DomainSolution::new(
                    SolutionStatus::Infeasible,
                    "Problem is infeasible: no assignment satisfies all constraints",
                )
            }
            HighsModelStatus::Unbounded => DomainSolution::new(
                SolutionStatus::Unbounded,
                "Problem is unbounded: objective can be improved infinitely",
            ),
            status => DomainSolution::new(
                SolutionStatus::Unknown,
                format!("HiGHS solver returned status: {:?}", status),
            ),
        };

        Ok(solution.with_statistics(statistics))
    }

    fn name(&self) -> &str {
        "HiGHS"
    }
}
