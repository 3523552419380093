// Decision variables and hard constraints of an assignment run

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::error::{AssignmentError, Result};
use super::footprint::{FootprintCatalog, SeatGraph};
use crate::domain::{
    Constraint, ConstraintType, Group, ObjectiveFunction, OptimizationProblem, ResourceId,
    ResourceMode, SolverConfig, Table, Term, VarId,
};

/// One way a group can be placed: a footprint or a table
#[derive(Debug, Clone)]
pub struct PlacementOption {
    pub var: VarId,
    /// Footprint seats (sorted) in seat mode, the single table id in table mode
    pub resources: Vec<ResourceId>,
}

/// Per-run model state: the MILP plus the handles needed to read it back.
#[derive(Debug)]
pub struct AssignmentModel {
    pub mode: ResourceMode,
    pub problem: OptimizationProblem,
    /// Options per group, in group input order
    pub options: Vec<Vec<PlacementOption>>,
    /// Capacity per resource (1 for every seat)
    pub capacities: BTreeMap<ResourceId, u32>,
    resource_index: BTreeMap<ResourceId, usize>,
    /// `[group][resource index]`, `None` where the group can never sit
    occupancy: Vec<Vec<Option<VarId>>>,
    objective_terms: Vec<Term>,
}

impl AssignmentModel {
    fn new(mode: ResourceMode, problem: OptimizationProblem, num_groups: usize) -> Self {
        Self {
            mode,
            problem,
            options: Vec::with_capacity(num_groups),
            capacities: BTreeMap::new(),
            resource_index: BTreeMap::new(),
            occupancy: Vec::new(),
            objective_terms: Vec::new(),
        }
    }

    pub fn num_groups(&self) -> usize {
        self.options.len()
    }

    /// Helper variable "group occupies resource", if that can ever happen.
    pub fn occupancy(&self, group: usize, resource: ResourceId) -> Option<VarId> {
        let index = *self.resource_index.get(&resource)?;
        self.occupancy.get(group)?.get(index).copied().flatten()
    }

    /// Add `coeff · var` to the objective; zero coefficients are dropped.
    pub fn add_objective_term(&mut self, var: VarId, coeff: f64) {
        if coeff != 0.0 {
            self.objective_terms.push((var, coeff));
        }
    }

    pub fn num_objective_terms(&self) -> usize {
        self.objective_terms.len()
    }

    /// Install the accumulated objective (maximized); without terms the
    /// model stays a pure feasibility problem.
    pub fn finalize(&mut self) {
        if self.objective_terms.is_empty() {
            self.problem.objective = None;
        } else {
            let terms = std::mem::take(&mut self.objective_terms);
            self.problem.set_objective(ObjectiveFunction::maximize(terms));
        }
    }
}

/// Seat mode: one binary per (group, footprint).
///
/// Rows: exactly one footprint per group, at most one group per seat, and
/// `occ[g][s] = Σ x[g][p] for p ∋ s`.
pub fn build_seat_model(
    groups: &[Group],
    graph: &SeatGraph,
    catalog: &FootprintCatalog,
    config: &SolverConfig,
) -> AssignmentModel {
    let problem = OptimizationProblem::new("seat_assignment").with_config(config.clone());
    let mut model = AssignmentModel::new(ResourceMode::Seats, problem, groups.len());

    for (index, seat) in graph.seat_ids().enumerate() {
        model.resource_index.insert(seat, index);
        model.capacities.insert(seat, 1);
    }
    let num_seats = model.resource_index.len();

    // Footprint variables touching each seat, per group.
    let mut touching: Vec<Vec<Vec<VarId>>> = Vec::with_capacity(groups.len());

    for (g, group) in groups.iter().enumerate() {
        let footprints = catalog.for_size(group.effective_size());
        let mut options = Vec::with_capacity(footprints.len());
        let mut by_seat = vec![Vec::new(); num_seats];

        for (p, footprint) in footprints.iter().enumerate() {
            let var = model.problem.add_binary(format!("assign_g{}_p{}", g, p));
            for seat in &footprint.seats {
                by_seat[model.resource_index[seat]].push(var);
            }
            options.push(PlacementOption {
                var,
                resources: footprint.seats.clone(),
            });
        }

        let vars: Vec<VarId> = options.iter().map(|option| option.var).collect();
        model
            .problem
            .add_exactly_one(&vars, format!("group_{}_one_footprint", g));
        model.options.push(options);
        touching.push(by_seat);
    }

    for (seat, &s) in &model.resource_index {
        let occupying: Vec<VarId> = touching
            .iter()
            .flat_map(|by_seat| by_seat[s].iter().copied())
            .collect();
        if occupying.len() > 1 {
            model
                .problem
                .add_at_most_one(&occupying, format!("seat_{}_at_most_one", seat));
        }
    }

    for (g, by_seat) in touching.iter().enumerate() {
        let mut row = vec![None; num_seats];
        for (s, seat) in graph.seat_ids().enumerate() {
            if by_seat[s].is_empty() {
                continue;
            }
            let occ = model.problem.add_binary(format!("group{}_in_seat{}", g, seat));
            model.problem.add_sum_equality(occ, &by_seat[s]);
            row[s] = Some(occ);
        }
        model.occupancy.push(row);
    }

    debug!(
        groups = groups.len(),
        seats = num_seats,
        variables = model.problem.num_variables(),
        constraints = model.problem.num_constraints(),
        "seat model built"
    );
    model
}

/// Reject duplicate table ids and demand above total capacity.
pub fn check_table_capacity(groups: &[Group], tables: &[Table]) -> Result<()> {
    let ids: BTreeSet<ResourceId> = tables.iter().map(|table| table.id).collect();
    if ids.len() != tables.len() {
        return Err(AssignmentError::Configuration(
            "duplicate table id in layout".to_string(),
        ));
    }

    let demand: u64 = groups.iter().map(|g| u64::from(g.effective_size())).sum();
    let capacity: u64 = tables.iter().map(|t| u64::from(t.capacity)).sum();
    if demand > capacity {
        return Err(AssignmentError::CapacityExceeded { demand, capacity });
    }
    Ok(())
}

/// Table mode: one binary per (group, table).
///
/// Rows: exactly one table per group and `Σ size·x[g][t] ≤ capacity(t)`.
/// The assignment variable doubles as the occupancy helper.
pub fn build_table_model(
    groups: &[Group],
    tables: &[Table],
    config: &SolverConfig,
) -> AssignmentModel {
    let problem = OptimizationProblem::new("table_assignment").with_config(config.clone());
    let mut model = AssignmentModel::new(ResourceMode::Tables, problem, groups.len());

    for (index, table) in tables.iter().enumerate() {
        model.resource_index.insert(table.id, index);
        model.capacities.insert(table.id, table.capacity);
    }

    for (g, _) in groups.iter().enumerate() {
        let options: Vec<PlacementOption> = tables
            .iter()
            .enumerate()
            .map(|(t, table)| PlacementOption {
                var: model.problem.add_binary(format!("assign_g{}_t{}", g, t)),
                resources: vec![table.id],
            })
            .collect();
        let vars: Vec<VarId> = options.iter().map(|option| option.var).collect();
        model
            .problem
            .add_exactly_one(&vars, format!("group_{}_one_table", g));
        model.occupancy.push(vars.into_iter().map(Some).collect());
        model.options.push(options);
    }

    for (t, table) in tables.iter().enumerate() {
        let terms: Vec<Term> = groups
            .iter()
            .zip(&model.options)
            .map(|(group, options)| (options[t].var, f64::from(group.effective_size())))
            .collect();
        model.problem.add_constraint(
            Constraint::new(
                ConstraintType::LessThanOrEqual,
                terms,
                f64::from(table.capacity),
            )
            .with_name(format!("table_{}_capacity", table.id)),
        );
    }

    debug!(
        groups = groups.len(),
        tables = tables.len(),
        variables = model.problem.num_variables(),
        constraints = model.problem.num_constraints(),
        "table model built"
    );
    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Seat;

    fn pair_layout() -> SeatGraph {
        SeatGraph::new(&[Seat::new(1, [2]), Seat::new(2, [1])]).unwrap()
    }

    #[test]
    fn test_seat_model_variables_and_rows() {
        let groups = vec![Group::new("a", 1), Group::new("b", 1)];
        let graph = pair_layout();
        let catalog = FootprintCatalog::generate(&groups, &graph).unwrap();
        let model = build_seat_model(&groups, &graph, &catalog, &SolverConfig::default());

        // 2 groups x 2 footprints + 2 groups x 2 occupancy helpers
        assert_eq!(model.problem.num_variables(), 8);
        // 2 exactly-one + 2 seat rows + 4 occupancy links
        assert_eq!(model.problem.num_constraints(), 8);
        assert!(model.occupancy(0, 1).is_some());
        assert!(model.occupancy(1, 3).is_none());
    }

    #[test]
    fn test_seat_model_rejects_shared_seat() {
        let groups = vec![Group::new("a", 1), Group::new("b", 1)];
        let graph = pair_layout();
        let catalog = FootprintCatalog::generate(&groups, &graph).unwrap();
        let model = build_seat_model(&groups, &graph, &catalog, &SolverConfig::default());

        let mut values = vec![0.0; model.problem.num_variables()];
        // Both groups pick seat 1.
        values[model.options[0][0].var] = 1.0;
        values[model.options[1][0].var] = 1.0;
        values[model.occupancy(0, 1).unwrap()] = 1.0;
        values[model.occupancy(1, 1).unwrap()] = 1.0;
        assert!(!model.problem.is_feasible(&values, 1e-6));

        values[model.options[1][0].var] = 0.0;
        values[model.occupancy(1, 1).unwrap()] = 0.0;
        values[model.options[1][1].var] = 1.0;
        values[model.occupancy(1, 2).unwrap()] = 1.0;
        assert!(model.problem.is_feasible(&values, 1e-6));
    }

    #[test]
    fn test_table_model_capacity_row() {
        let groups = vec![Group::new("a", 2), Group::new("b", 3)];
        let tables = vec![Table::new(7, 4), Table::new(9, 5)];
        let model = build_table_model(&groups, &tables, &SolverConfig::default());

        assert_eq!(model.problem.num_variables(), 4);
        assert_eq!(model.problem.num_constraints(), 4);

        let mut values = vec![0.0; 4];
        values[model.options[0][0].var] = 1.0;
        values[model.options[1][0].var] = 1.0;
        assert!(!model.problem.is_feasible(&values, 1e-6));

        values[model.options[1][0].var] = 0.0;
        values[model.options[1][1].var] = 1.0;
        assert!(model.problem.is_feasible(&values, 1e-6));
    }

    #[test]
    fn test_capacity_precheck() {
        let groups = vec![Group::new("a", 1), Group::new("b", 1), Group::new("c", 1)];
        let tables = vec![Table::new(1, 2)];
        match check_table_capacity(&groups, &tables) {
            Err(AssignmentError::CapacityExceeded { demand, capacity }) => {
                assert_eq!((demand, capacity), (3, 2));
            }
            other => panic!("expected CapacityExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_finalize_without_terms_is_feasibility_only() {
        let groups = vec![Group::new("a", 1)];
        let tables = vec![Table::new(1, 1)];
        let mut model = build_table_model(&groups, &tables, &SolverConfig::default());
        model.add_objective_term(0, 0.0);
        model.finalize();
        assert!(model.problem.objective.is_none());
    }
}
