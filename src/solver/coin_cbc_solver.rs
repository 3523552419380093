// COIN-OR CBC Solver Adapter (through good_lp)

use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution, SolverStatistics},
    solver_service::{Result, SolverError, SolverService},
    value_objects::{ConstraintType, OptimizationType, SolutionStatus, VariableType},
};
use good_lp::{
    solvers::{coin_cbc, SolutionStatus as LpStatus, WithTimeLimit},
    variable, variables, Expression, ResolutionError, Solution as GoodLpSolutionTrait,
    SolverModel, Variable as GoodLpVariable,
};
use std::time::Instant;

const FEASIBILITY_TOLERANCE: f64 = 1e-5;

pub struct CoinCbcSolver;

impl CoinCbcSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CoinCbcSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for CoinCbcSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<DomainSolution> {
        self.validate(problem)?;

        let start_time = Instant::now();
        let config = &problem.solver_config;

        let mut vars = variables!();
        let lp_variables: Vec<GoodLpVariable> = problem
            .variables
            .iter()
            .map(|var_def| {
                let upper = var_def.upper_bound.unwrap_or(f64::INFINITY);
                let definition = match var_def.variable_type {
                    VariableType::Binary => variable().binary(),
                    VariableType::Integer => variable().integer().min(var_def.lower_bound).max(upper),
                    VariableType::Continuous => variable().min(var_def.lower_bound).max(upper),
                };
                vars.add(definition)
            })
            .collect();

        // good_lp minimises, so negate for maximisation
        let mut obj_expr: Expression = 0.into();
        if let Some(objective) = &problem.objective {
            let sign = match objective.optimization_type {
                OptimizationType::Maximize => -1.0,
                OptimizationType::Minimize => 1.0,
            };
            for &(var, coeff) in &objective.terms {
                obj_expr += sign * coeff * lp_variables[var];
            }
        }

        let mut lp_model = vars.minimise(obj_expr).using(coin_cbc::coin_cbc);
        if !config.verbose {
            lp_model.set_parameter("log", "0");
        }
        if let Some(gap) = config.gap_tolerance {
            lp_model.set_parameter("ratioGap", &gap.to_string());
        }
        if let Some(limit) = config.time_limit {
            lp_model = lp_model.with_time_limit(limit);
        }

        for constraint in &problem.constraints {
            let mut lhs: Expression = 0.into();
            for &(var, coeff) in &constraint.terms {
                if coeff != 0.0 {
                    lhs += coeff * lp_variables[var];
                }
            }

            lp_model = match constraint.constraint_type {
                ConstraintType::LessThanOrEqual => lp_model.with(lhs.leq(constraint.bound)),
                ConstraintType::Equal => lp_model.with(lhs.eq(constraint.bound)),
                ConstraintType::GreaterThanOrEqual => lp_model.with(lhs.geq(constraint.bound)),
            };
        }

        let solution_result = lp_model.solve();
        let solve_time = start_time.elapsed().as_secs_f64() * 1000.0;
        let statistics = SolverStatistics::for_problem(problem, solve_time);

        let solution = match solution_result {
            Ok(sol) => {
                let values: Vec<f64> = lp_variables.iter().map(|&var| sol.value(var)).collect();
                let value = problem.objective_value(&values);
                match sol.status() {
                    LpStatus::Optimal => DomainSolution::found(SolutionStatus::Optimal, value, values)
                        .with_message(format!("Optimal solution found for '{}'", problem.name)),
                    _ if problem.is_feasible(&values, FEASIBILITY_TOLERANCE) => {
                        DomainSolution::found(SolutionStatus::Feasible, value, values).with_message(
                            "Limit reached; returning best feasible solution found",
                        )
                    }
                    _ => DomainSolution::new(
                        SolutionStatus::Unknown,
                        "Limit reached before any feasible solution was found",
                    ),
                }
            }
            Err(ResolutionError::Infeasible) => DomainSolution::new(
                SolutionStatus::Infeasible,
                "Problem is infeasible: no assignment satisfies all constraints",
            ),
            Err(ResolutionError::Unbounded) => DomainSolution::new(
                SolutionStatus::Unbounded,
                "Problem is unbounded: objective can be improved infinitely",
            ),
            Err(e) => return Err(SolverError::ExecutionFailed(format!("{:?}", e))),
        };

        Ok(solution.with_statistics(statistics))
    }

    fn name(&self) -> &str {
        "COIN-OR CBC"
    }
}
