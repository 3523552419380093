use super::value_objects::{
    ConstraintType, OptimizationType, SolutionStatus, SolverBackend, VariableType,
};

/// Index of a variable inside its [`OptimizationProblem`]
pub type VarId = usize;

/// Sparse linear term: coefficient applied to a variable
pub type Term = (VarId, f64);

/// Decision variable in an optimization problem
#[derive(Debug, Clone)]
pub struct Variable {
    pub variable_type: VariableType,
    pub lower_bound: f64,
    pub upper_bound: Option<f64>,
    pub name: String,
}

impl Variable {
    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            variable_type: VariableType::Binary,
            lower_bound: 0.0,
            upper_bound: Some(1.0),
            name: name.into(),
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self.variable_type,
            VariableType::Integer | VariableType::Binary
        )
    }
}

/// Linear objective to minimize or maximize, stored sparsely
#[derive(Debug, Clone)]
pub struct ObjectiveFunction {
    pub optimization_type: OptimizationType,
    pub terms: Vec<Term>,
}

impl ObjectiveFunction {
    pub fn new(optimization_type: OptimizationType, terms: Vec<Term>) -> Self {
        Self {
            optimization_type,
            terms,
        }
    }

    pub fn maximize(terms: Vec<Term>) -> Self {
        Self::new(OptimizationType::Maximize, terms)
    }

    /// Evaluate the objective for a full vector of variable values.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(var, coeff)| coeff * values.get(var).copied().unwrap_or(0.0))
            .sum()
    }
}

/// Linear constraint `Σ coeff·var (≤ | = | ≥) bound`
#[derive(Debug, Clone)]
pub struct Constraint {
    pub constraint_type: ConstraintType,
    pub terms: Vec<Term>,
    pub bound: f64,
    pub name: String,
}

impl Constraint {
    pub fn new(constraint_type: ConstraintType, terms: Vec<Term>, bound: f64) -> Self {
        Self {
            constraint_type,
            terms,
            bound,
            name: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Check the constraint against a vector of variable values.
    pub fn is_satisfied(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs: f64 = self
            .terms
            .iter()
            .map(|&(var, coeff)| coeff * values.get(var).copied().unwrap_or(0.0))
            .sum();
        match self.constraint_type {
            ConstraintType::LessThanOrEqual => lhs <= self.bound + tolerance,
            ConstraintType::Equal => (lhs - self.bound).abs() <= tolerance,
            ConstraintType::GreaterThanOrEqual => lhs >= self.bound - tolerance,
        }
    }
}

/// Configuration for the solver
#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    /// Wall-clock ceiling in seconds
    pub time_limit: Option<f64>,
    pub gap_tolerance: Option<f64>,
    pub verbose: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: SolverBackend::Auto,
            time_limit: None,
            gap_tolerance: None,
            verbose: false,
        }
    }
}

impl SolverConfig {
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    pub fn with_backend(mut self, backend: SolverBackend) -> Self {
        self.backend = backend;
        self
    }
}

/// Mixed-integer linear problem, built once per run and dropped afterwards.
///
/// Variables live in an index arena: every [`VarId`] handed out by
/// [`add_variable`](Self::add_variable) stays valid for the lifetime of the
/// problem. Besides raw linear rows, a few boolean modeling helpers
/// (exactly-one, at-most-one, implication, max-equality) are provided and
/// expanded into linear rows immediately.
#[derive(Debug, Clone, Default)]
pub struct OptimizationProblem {
    pub name: String,
    pub variables: Vec<Variable>,
    pub constraints: Vec<Constraint>,
    /// `None` means pure feasibility
    pub objective: Option<ObjectiveFunction>,
    pub solver_config: SolverConfig,
}

impl OptimizationProblem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.solver_config = config;
        self
    }

    pub fn add_variable(&mut self, variable: Variable) -> VarId {
        self.variables.push(variable);
        self.variables.len() - 1
    }

    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        self.add_variable(Variable::binary(name))
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// `Σ vars = 1`
    pub fn add_exactly_one(&mut self, vars: &[VarId], name: impl Into<String>) {
        self.add_constraint(
            Constraint::new(ConstraintType::Equal, unit_terms(vars), 1.0).with_name(name),
        );
    }

    /// `Σ vars ≤ 1`
    pub fn add_at_most_one(&mut self, vars: &[VarId], name: impl Into<String>) {
        self.add_constraint(
            Constraint::new(ConstraintType::LessThanOrEqual, unit_terms(vars), 1.0)
                .with_name(name),
        );
    }

    /// `premise ⇒ conclusion` for binaries, i.e. `premise ≤ conclusion`
    pub fn add_implication(&mut self, premise: VarId, conclusion: VarId) {
        self.add_constraint(Constraint::new(
            ConstraintType::LessThanOrEqual,
            vec![(premise, 1.0), (conclusion, -1.0)],
            0.0,
        ));
    }

    /// `target = Σ sources`; an empty source list pins `target` to zero.
    pub fn add_sum_equality(&mut self, target: VarId, sources: &[VarId]) {
        let mut terms = vec![(target, 1.0)];
        terms.extend(sources.iter().map(|&v| (v, -1.0)));
        self.add_constraint(Constraint::new(ConstraintType::Equal, terms, 0.0));
    }

    /// `target = max(sources)` for binaries; an empty source list pins `target` to zero.
    pub fn add_max_equality(&mut self, target: VarId, sources: &[VarId]) {
        for &source in sources {
            self.add_implication(source, target);
        }
        let mut terms = vec![(target, 1.0)];
        terms.extend(sources.iter().map(|&v| (v, -1.0)));
        self.add_constraint(Constraint::new(ConstraintType::LessThanOrEqual, terms, 0.0));
    }

    pub fn set_objective(&mut self, objective: ObjectiveFunction) {
        self.objective = Some(objective);
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn num_integer_variables(&self) -> usize {
        self.variables.iter().filter(|v| v.is_integer()).count()
    }

    pub fn num_binary_variables(&self) -> usize {
        self.variables
            .iter()
            .filter(|v| v.variable_type == VariableType::Binary)
            .count()
    }

    /// Objective value for a full vector of variable values, zero without objective.
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective
            .as_ref()
            .map(|objective| objective.evaluate(values))
            .unwrap_or(0.0)
    }

    /// Whether `values` satisfies every bound, integrality and row of the model.
    pub fn is_feasible(&self, values: &[f64], tolerance: f64) -> bool {
        if values.len() != self.variables.len() {
            return false;
        }
        let bounds_ok = self.variables.iter().zip(values).all(|(var, &value)| {
            value >= var.lower_bound - tolerance
                && var.upper_bound.map_or(true, |upper| value <= upper + tolerance)
                && (!var.is_integer() || (value - value.round()).abs() <= tolerance)
        });
        bounds_ok
            && self
                .constraints
                .iter()
                .all(|constraint| constraint.is_satisfied(values, tolerance))
    }
}

fn unit_terms(vars: &[VarId]) -> Vec<Term> {
    vars.iter().map(|&v| (v, 1.0)).collect()
}

/// Statistics about the solve process
#[derive(Debug, Clone, Default)]
pub struct SolverStatistics {
    pub solve_time_ms: f64,
    pub num_variables: u32,
    pub num_constraints: u32,
    pub num_integer_vars: u32,
    pub num_binary_vars: u32,
}

impl SolverStatistics {
    pub fn for_problem(problem: &OptimizationProblem, solve_time_ms: f64) -> Self {
        Self {
            solve_time_ms,
            num_variables: problem.num_variables() as u32,
            num_constraints: problem.num_constraints() as u32,
            num_integer_vars: problem.num_integer_variables() as u32,
            num_binary_vars: problem.num_binary_variables() as u32,
        }
    }
}

/// Raw solver outcome for an [`OptimizationProblem`]
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: SolutionStatus,
    pub objective_value: Option<f64>,
    pub variable_values: Vec<f64>,
    pub message: String,
    pub statistics: SolverStatistics,
}

impl Solution {
    pub fn new(status: SolutionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            objective_value: None,
            variable_values: Vec::new(),
            message: message.into(),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn found(status: SolutionStatus, value: f64, variable_values: Vec<f64>) -> Self {
        Self {
            status,
            objective_value: Some(value),
            variable_values,
            message: format!("{} solution found", status),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn with_statistics(mut self, statistics: SolverStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }

    pub fn is_feasible(&self) -> bool {
        self.status.is_usable()
    }

    /// Value of a variable, zero when absent.
    pub fn value(&self, var: VarId) -> f64 {
        self.variable_values.get(var).copied().unwrap_or(0.0)
    }

    /// Whether a binary variable is set.
    pub fn is_set(&self, var: VarId) -> bool {
        self.value(var) > 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_equality_rows() {
        let mut problem = OptimizationProblem::new("max");
        let a = problem.add_binary("a");
        let b = problem.add_binary("b");
        let m = problem.add_binary("m");
        problem.add_max_equality(m, &[a, b]);

        assert_eq!(problem.num_constraints(), 3);
        assert!(problem.is_feasible(&[0.0, 1.0, 1.0], 1e-6));
        assert!(problem.is_feasible(&[0.0, 0.0, 0.0], 1e-6));
        assert!(!problem.is_feasible(&[1.0, 0.0, 0.0], 1e-6));
        assert!(!problem.is_feasible(&[0.0, 0.0, 1.0], 1e-6));
    }

    #[test]
    fn test_empty_sum_equality_pins_target() {
        let mut problem = OptimizationProblem::new("pin");
        let t = problem.add_binary("t");
        problem.add_sum_equality(t, &[]);

        assert!(problem.is_feasible(&[0.0], 1e-6));
        assert!(!problem.is_feasible(&[1.0], 1e-6));
    }

    #[test]
    fn test_exactly_one_and_integrality() {
        let mut problem = OptimizationProblem::new("one");
        let vars: Vec<_> = (0..3).map(|i| problem.add_binary(format!("x{i}"))).collect();
        problem.add_exactly_one(&vars, "pick");

        assert!(problem.is_feasible(&[0.0, 1.0, 0.0], 1e-6));
        assert!(!problem.is_feasible(&[1.0, 1.0, 0.0], 1e-6));
        assert!(!problem.is_feasible(&[0.5, 0.5, 0.0], 1e-6));
    }

    #[test]
    fn test_objective_value_without_objective_is_zero() {
        let mut problem = OptimizationProblem::new("feasibility");
        problem.add_binary("x");
        assert_eq!(problem.objective_value(&[1.0]), 0.0);

        problem.set_objective(ObjectiveFunction::maximize(vec![(0, 5.0)]));
        assert_eq!(problem.objective_value(&[1.0]), 5.0);
    }
}
