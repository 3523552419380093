// Use case: place every group for one event, then record it in the histories

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use super::diversity::{score_seats, score_tables};
use super::error::{AssignmentError, Result};
use super::extractor::{apply, extract, Assignment};
use super::footprint::{FootprintCatalog, SeatGraph};
use super::model_builder::{
    build_seat_model, build_table_model, check_table_capacity, AssignmentModel,
};
use crate::domain::{
    ConstraintConfig, Group, Placement, ResourceMode, Seat, SolutionStatus, SolverConfig,
    SolverService, Table,
};

/// Default wall-clock budget for one run, in seconds
pub const DEFAULT_TIME_LIMIT_SECS: f64 = 60.0;

/// Run-level configuration
#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub solver: SolverConfig,
    /// Objective cost of opening a table (table mode only, 0 disables)
    pub table_usage_penalty: i64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default().with_time_limit(DEFAULT_TIME_LIMIT_SECS),
            table_usage_penalty: 1,
        }
    }
}

impl PlannerConfig {
    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.solver.time_limit = Some(seconds);
        self
    }

    pub fn with_table_usage_penalty(mut self, penalty: i64) -> Self {
        self.table_usage_penalty = penalty;
        self
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct AssignmentReport {
    pub mode: ResourceMode,
    pub status: SolutionStatus,
    /// `None` when the run had no objective terms
    pub objective_value: Option<f64>,
    pub solve_time_ms: f64,
    pub num_variables: usize,
    pub num_constraints: usize,
    /// The placement appended to each group's history, in input order
    pub placements: Vec<Placement>,
}

impl AssignmentReport {
    fn empty(mode: ResourceMode) -> Self {
        Self {
            mode,
            status: SolutionStatus::Optimal,
            objective_value: None,
            solve_time_ms: 0.0,
            num_variables: 0,
            num_constraints: 0,
            placements: Vec::new(),
        }
    }
}

/// Builds one model per run and hands it to a [`SolverService`].
pub struct Planner {
    solver: Arc<dyn SolverService>,
    config: PlannerConfig,
}

impl Planner {
    pub fn new(solver: Arc<dyn SolverService>, config: PlannerConfig) -> Self {
        Self { solver, config }
    }

    /// Planner backed by the solver selected in `config.solver.backend`.
    pub fn with_backend(config: PlannerConfig) -> Result<Self> {
        let solver = crate::solver::SolverFactory::create_from_backend(config.solver.backend)?;
        Ok(Self::new(solver, config))
    }

    /// Seat every group on a connected footprint and append the sorted seat
    /// ids to its history.
    pub fn assign_seats(
        &self,
        groups: &mut [Group],
        seats: &[Seat],
        constraints: &ConstraintConfig,
    ) -> Result<AssignmentReport> {
        if groups.is_empty() {
            warn!("group list is empty, nothing to assign");
            return Ok(AssignmentReport::empty(ResourceMode::Seats));
        }
        self.check_inputs(groups)?;

        let graph = SeatGraph::new(seats)?;
        info!(
            event = "assign_start",
            mode = %ResourceMode::Seats,
            groups = groups.len(),
            seats = graph.num_seats(),
        );
        let catalog = FootprintCatalog::generate(groups, &graph)?;
        let mut model = build_seat_model(groups, &graph, &catalog, &self.config.solver);
        score_seats(&mut model, groups, &graph.edges(), constraints);
        self.solve_and_apply(groups, model)
    }

    /// Seat every group at a table and append the table id, repeated once
    /// per member, to its history.
    pub fn assign_tables(
        &self,
        groups: &mut [Group],
        tables: &[Table],
        constraints: &ConstraintConfig,
    ) -> Result<AssignmentReport> {
        if groups.is_empty() {
            warn!("group list is empty, nothing to assign");
            return Ok(AssignmentReport::empty(ResourceMode::Tables));
        }
        self.check_inputs(groups)?;
        check_table_capacity(groups, tables)?;

        info!(
            event = "assign_start",
            mode = %ResourceMode::Tables,
            groups = groups.len(),
            tables = tables.len(),
        );
        let mut model = build_table_model(groups, tables, &self.config.solver);
        score_tables(
            &mut model,
            groups,
            tables,
            constraints,
            self.config.table_usage_penalty,
        );
        self.solve_and_apply(groups, model)
    }

    fn check_inputs(&self, groups: &[Group]) -> Result<()> {
        match self.config.solver.time_limit {
            Some(limit) if limit.is_finite() && limit > 0.0 => {}
            other => {
                return Err(AssignmentError::Configuration(format!(
                    "time limit must be a positive number of seconds, got {:?}",
                    other
                )))
            }
        }

        let mut seen = HashSet::new();
        for group in groups {
            if !seen.insert(group.id.as_str()) {
                return Err(AssignmentError::Configuration(format!(
                    "duplicate group id '{}'",
                    group.id
                )));
            }
            if group.size == 0 {
                warn!(group = %group.id, "group size 0 treated as 1");
            }
        }
        Ok(())
    }

    fn solve_and_apply(
        &self,
        groups: &mut [Group],
        mut model: AssignmentModel,
    ) -> Result<AssignmentReport> {
        model.finalize();
        if model.problem.objective.is_none() {
            warn!("no objective terms were created, solving for feasibility only");
        }

        info!(
            event = "solve_start",
            solver = self.solver.name(),
            variables = model.problem.num_variables(),
            constraints = model.problem.num_constraints(),
            time_limit = ?model.problem.solver_config.time_limit,
        );
        let solution = self.solver.solve(&model.problem)?;
        info!(
            event = "solve_end",
            status = %solution.status,
            objective = ?solution.objective_value,
            solve_time_ms = solution.statistics.solve_time_ms,
        );

        if !solution.is_feasible() {
            return Err(AssignmentError::NoSolution {
                status: solution.status,
                reason: solution.message.clone(),
            });
        }

        let assignment: Assignment = extract(&model, &solution, groups)?;
        let placements = assignment.placements.clone();
        apply(groups, assignment);

        Ok(AssignmentReport {
            mode: model.mode,
            status: solution.status,
            objective_value: model.problem.objective.as_ref().and(solution.objective_value),
            solve_time_ms: solution.statistics.solve_time_ms,
            num_variables: model.problem.num_variables(),
            num_constraints: model.problem.num_constraints(),
            placements,
        })
    }
}
