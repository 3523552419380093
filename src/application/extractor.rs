// Maps a solved model back to resource ids and appends them to group histories

use std::collections::BTreeMap;

use super::error::{AssignmentError, Result};
use super::model_builder::AssignmentModel;
use crate::domain::{Group, Placement, ResourceId, ResourceMode, Solution};

/// One new placement per group, parallel to the input groups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    pub placements: Vec<Placement>,
}

impl Assignment {
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Number of people placed on each resource.
    pub fn load(&self) -> BTreeMap<ResourceId, u32> {
        let mut load = BTreeMap::new();
        for &resource in self.placements.iter().flatten() {
            *load.entry(resource).or_insert(0) += 1;
        }
        load
    }
}

/// Decode the chosen option of every group.
///
/// Fails without side effects when a group has no or several chosen options,
/// or when the decoded placements overfill a resource.
pub fn extract(model: &AssignmentModel, solution: &Solution, groups: &[Group]) -> Result<Assignment> {
    let no_solution = |reason: String| AssignmentError::NoSolution {
        status: solution.status,
        reason,
    };

    let mut placements = Vec::with_capacity(groups.len());
    for (group, options) in groups.iter().zip(&model.options) {
        let mut chosen = options.iter().filter(|option| solution.is_set(option.var));
        let option = chosen
            .next()
            .ok_or_else(|| no_solution(format!("group '{}' has no placement", group.id)))?;
        if chosen.next().is_some() {
            return Err(no_solution(format!(
                "group '{}' has more than one placement",
                group.id
            )));
        }

        let placement = match model.mode {
            ResourceMode::Seats => option.resources.clone(),
            ResourceMode::Tables => {
                vec![option.resources[0]; group.effective_size() as usize]
            }
        };
        placements.push(placement);
    }

    let assignment = Assignment { placements };
    for (resource, load) in assignment.load() {
        let capacity = model.capacities.get(&resource).copied().unwrap_or(0);
        if load > capacity {
            return Err(no_solution(format!(
                "resource {} holds {} people but has capacity {}",
                resource, load, capacity
            )));
        }
    }
    Ok(assignment)
}

/// Append each placement to its group's history.
pub fn apply(groups: &mut [Group], assignment: Assignment) {
    for (group, placement) in groups.iter_mut().zip(assignment.placements) {
        group.history.push(placement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::model_builder::build_table_model;
    use crate::domain::{SolutionStatus, SolverConfig, Table};

    fn solved(values: Vec<f64>) -> Solution {
        Solution::found(SolutionStatus::Feasible, 0.0, values)
    }

    #[test]
    fn test_table_placement_repeats_id_per_member() {
        let groups = vec![Group::new("a", 3), Group::new("b", 1)];
        let tables = vec![Table::new(4, 4), Table::new(8, 2)];
        let model = build_table_model(&groups, &tables, &SolverConfig::default());

        let mut values = vec![0.0; model.problem.num_variables()];
        values[model.options[0][0].var] = 1.0;
        values[model.options[1][1].var] = 0.9999;

        let assignment = extract(&model, &solved(values), &groups).unwrap();
        assert_eq!(assignment.placements, vec![vec![4, 4, 4], vec![8]]);
    }

    #[test]
    fn test_missing_choice_is_no_solution() {
        let groups = vec![Group::new("a", 1)];
        let tables = vec![Table::new(1, 1)];
        let model = build_table_model(&groups, &tables, &SolverConfig::default());

        let err = extract(&model, &solved(vec![0.0]), &groups).unwrap_err();
        assert!(matches!(
            err,
            AssignmentError::NoSolution {
                status: SolutionStatus::Feasible,
                ..
            }
        ));
    }

    #[test]
    fn test_overfilled_table_is_rejected() {
        let groups = vec![Group::new("a", 2), Group::new("b", 2)];
        let tables = vec![Table::new(1, 3), Table::new(2, 3)];
        let model = build_table_model(&groups, &tables, &SolverConfig::default());

        let mut values = vec![0.0; model.problem.num_variables()];
        values[model.options[0][0].var] = 1.0;
        values[model.options[1][0].var] = 1.0;
        assert!(extract(&model, &solved(values), &groups).is_err());
    }

    #[test]
    fn test_apply_appends_to_history() {
        let mut groups = vec![Group::new("a", 1)];
        groups[0].history.push(vec![7]);
        apply(
            &mut groups,
            Assignment {
                placements: vec![vec![3]],
            },
        );
        assert_eq!(groups[0].history, vec![vec![7], vec![3]]);
    }
}
