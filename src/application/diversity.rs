// Diversity objective
//
// Seat mode rewards dissimilar groups on adjacent seats. For every edge and
// every unordered group pair with a non-zero score, two half indicators
// ("A on the low seat, B on the high seat" and the mirror) gate an
// are-neighbors indicator that carries the score into the objective. Halves
// are only linked one way to the occupancy helpers: a reward only needs
// "indicator => occupancy", a penalty also needs the converse.
//
// Table mode rewards distinct attribute values per table and penalizes
// repeated pairings and opened tables.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::model_builder::AssignmentModel;
use crate::domain::{
    Constraint, ConstraintConfig, ConstraintType, Group, ResourceId, Table, VarId,
};

/// Weighted attribute values interned per group, resolved once per run.
#[derive(Debug, Clone, Default)]
pub struct AttributeColumns {
    columns: Vec<Column>,
}

#[derive(Debug, Clone)]
struct Column {
    name: String,
    weight: i64,
    /// Interned value per group; `None` when the group lacks the attribute
    codes: Vec<Option<u32>>,
    distinct: u32,
}

impl AttributeColumns {
    /// Extract every weighted attribute. Attributes no group carries are
    /// skipped with a warning.
    pub fn extract(groups: &[Group], config: &ConstraintConfig) -> Self {
        let mut columns = Vec::new();
        for (name, weight) in config.attribute_weights() {
            let mut interned: HashMap<&str, u32> = HashMap::new();
            let codes: Vec<Option<u32>> = groups
                .iter()
                .map(|group| {
                    group.attribute(name).map(|value| {
                        let next = interned.len() as u32;
                        *interned.entry(value).or_insert(next)
                    })
                })
                .collect();

            if interned.is_empty() {
                warn!(attribute = name, "diversity attribute not found on any group, skipping");
                continue;
            }
            columns.push(Column {
                name: name.to_string(),
                weight,
                codes,
                distinct: interned.len() as u32,
            });
        }
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Sum of weights of attributes on which `a` and `b` differ.
    ///
    /// A missing attribute never equals anything, not even another missing one.
    pub fn difference_score(&self, a: usize, b: usize) -> i64 {
        self.columns
            .iter()
            .filter(|column| match (column.codes[a], column.codes[b]) {
                (Some(left), Some(right)) => left != right,
                _ => true,
            })
            .map(|column| column.weight)
            .sum()
    }
}

/// Score of seating `groups[a]` next to `groups[b]`.
///
/// The past-neighbor penalty only looks at `a`'s own prior-neighbor list.
/// Self-pairs score zero.
pub fn pair_score(
    groups: &[Group],
    columns: &AttributeColumns,
    config: &ConstraintConfig,
    a: usize,
    b: usize,
) -> i64 {
    if a == b {
        return 0;
    }
    let mut score = columns.difference_score(a, b);
    let penalty = config.past_neighbor_penalty();
    if penalty != 0 && groups[a].has_prior_neighbor(&groups[b].id) {
        score -= penalty;
    }
    score
}

/// Add the seat-mode neighbor terms to `model`. Returns the number of
/// objective terms added.
pub fn score_seats(
    model: &mut AssignmentModel,
    groups: &[Group],
    edges: &[(ResourceId, ResourceId)],
    config: &ConstraintConfig,
) -> usize {
    let columns = AttributeColumns::extract(groups, config);
    let n = groups.len();

    // Pair scores do not depend on the edge; compute them once.
    let mut pairs = Vec::new();
    for a in 0..n {
        for b in a + 1..n {
            let score = pair_score(groups, &columns, config, a, b);
            if score != 0 {
                pairs.push((a, b, score));
            }
        }
    }

    let before = model.num_objective_terms();
    for &(s1, s2) in edges {
        for &(a, b, score) in &pairs {
            let halves = [
                (model.occupancy(a, s1), model.occupancy(b, s2)),
                (model.occupancy(a, s2), model.occupancy(b, s1)),
            ];
            let mut indicators = Vec::with_capacity(2);
            for (k, half) in halves.into_iter().enumerate() {
                if let (Some(first), Some(second)) = half {
                    let name = format!("half{}_g{}_g{}_s{}_s{}", k, a, b, s1, s2);
                    indicators.push(link_half(model, name, first, second, score < 0));
                }
            }
            if indicators.is_empty() {
                continue;
            }

            let neighbors = model
                .problem
                .add_binary(format!("neighbors_g{}_g{}_s{}_s{}", a, b, s1, s2));
            // neighbors ⇒ (half0 ∨ half1)
            let mut terms = vec![(neighbors, 1.0)];
            terms.extend(indicators.iter().map(|&h| (h, -1.0)));
            model
                .problem
                .add_constraint(Constraint::new(ConstraintType::LessThanOrEqual, terms, 0.0));
            if score < 0 {
                for &h in &indicators {
                    model.problem.add_implication(h, neighbors);
                }
            }
            model.add_objective_term(neighbors, score as f64);
        }
    }

    let added = model.num_objective_terms() - before;
    debug!(
        edges = edges.len(),
        scored_pairs = pairs.len(),
        attributes = columns.len(),
        terms = added,
        "seat diversity terms built"
    );
    added
}

/// Half indicator `h` for "both occupancy facts hold".
///
/// Always `h ⇒ first` and `h ⇒ second`; when `force` is set also
/// `first ∧ second ⇒ h`.
fn link_half(
    model: &mut AssignmentModel,
    name: String,
    first: VarId,
    second: VarId,
    force: bool,
) -> VarId {
    let half = model.problem.add_binary(name);
    model.problem.add_implication(half, first);
    model.problem.add_implication(half, second);
    if force {
        model.problem.add_constraint(Constraint::new(
            ConstraintType::GreaterThanOrEqual,
            vec![(half, 1.0), (first, -1.0), (second, -1.0)],
            -1.0,
        ));
    }
    half
}

/// Add the table-mode terms to `model`. Returns the number of objective
/// terms added.
///
/// * each opened table costs `usage_penalty`;
/// * each distinct value of a weighted attribute present at a table earns
///   its weight;
/// * each pair where either group lists the other as a prior neighbor costs
///   the past-neighbor penalty per shared table.
pub fn score_tables(
    model: &mut AssignmentModel,
    groups: &[Group],
    tables: &[Table],
    config: &ConstraintConfig,
    usage_penalty: i64,
) -> usize {
    let before = model.num_objective_terms();
    let columns = AttributeColumns::extract(groups, config);

    if usage_penalty != 0 {
        for (t, table) in tables.iter().enumerate() {
            let at_table: Vec<VarId> = (0..groups.len()).map(|g| model.options[g][t].var).collect();
            let used = model.problem.add_binary(format!("table_used_{}", table.id));
            model.problem.add_max_equality(used, &at_table);
            model.add_objective_term(used, -(usage_penalty as f64));
        }
    }

    for column in &columns.columns {
        for value in 0..column.distinct {
            let holders: Vec<usize> = (0..groups.len())
                .filter(|&g| column.codes[g] == Some(value))
                .collect();
            for (t, table) in tables.iter().enumerate() {
                let at_table: Vec<VarId> = holders.iter().map(|&g| model.options[g][t].var).collect();
                let present = model.problem.add_binary(format!(
                    "attr_{}_val{}_table_{}",
                    column.name, value, table.id
                ));
                model.problem.add_max_equality(present, &at_table);
                model.add_objective_term(present, column.weight as f64);
            }
        }
    }

    let penalty = config.past_neighbor_penalty();
    if penalty != 0 {
        let index: HashMap<&str, usize> = groups
            .iter()
            .enumerate()
            .map(|(g, group)| (group.id.as_str(), g))
            .collect();
        let mut pairs: Vec<(usize, usize)> = groups
            .iter()
            .enumerate()
            .flat_map(|(g, group)| {
                group
                    .prior_neighbors
                    .iter()
                    .filter_map(|id| index.get(id.as_str()).copied())
                    .filter(move |&other| other != g)
                    .map(move |other| (g.min(other), g.max(other)))
            })
            .collect();
        pairs.sort_unstable();
        pairs.dedup();

        for &(a, b) in &pairs {
            for (t, table) in tables.iter().enumerate() {
                let (xa, xb) = (model.options[a][t].var, model.options[b][t].var);
                let together = link_half(
                    model,
                    format!("seated_together_g{}_g{}_t{}", a, b, table.id),
                    xa,
                    xb,
                    true,
                );
                model.add_objective_term(together, -(penalty as f64));
            }
        }
    }

    let added = model.num_objective_terms() - before;
    debug!(
        tables = tables.len(),
        attributes = columns.len(),
        terms = added,
        "table diversity terms built"
    );
    added
}
