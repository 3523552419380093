// Seating domain: the read-only inputs of an assignment run

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifier of a seat or a table
pub type ResourceId = u32;

/// Resources occupied by a group during one event.
///
/// Seat mode stores the sorted seat ids, table mode the table id repeated
/// once per group member.
pub type Placement = Vec<ResourceId>;

/// Reserved [`ConstraintConfig`] key holding the past-neighbor penalty weight
pub const PAST_NEIGHBOR_KEY: &str = "last neighborhood";

/// A party of people that must sit together
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Group {
    pub id: String,
    pub size: u32,
    /// Categorical diversity attributes, e.g. `"location" -> "Hannover"`
    #[cfg_attr(feature = "serde", serde(default))]
    pub attributes: BTreeMap<String, String>,
    /// Ids of groups this group sat next to previously
    #[cfg_attr(feature = "serde", serde(default))]
    pub prior_neighbors: Vec<String>,
    /// Append-only list of past placements, oldest first
    #[cfg_attr(feature = "serde", serde(default))]
    pub history: Vec<Placement>,
}

impl Group {
    pub fn new(id: impl Into<String>, size: u32) -> Self {
        Self {
            id: id.into(),
            size,
            attributes: BTreeMap::new(),
            prior_neighbors: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_prior_neighbor(mut self, group_id: impl Into<String>) -> Self {
        self.prior_neighbors.push(group_id.into());
        self
    }

    /// Number of seats the group needs; a size of zero counts as one.
    pub fn effective_size(&self) -> u32 {
        self.size.max(1)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Whether this group's own prior-neighbor list names `other`.
    pub fn has_prior_neighbor(&self, other: &str) -> bool {
        self.prior_neighbors.iter().any(|id| id == other)
    }
}

/// A single seat and the seats adjacent to it
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Seat {
    pub id: ResourceId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub neighbors: Vec<ResourceId>,
}

impl Seat {
    pub fn new(id: ResourceId, neighbors: impl IntoIterator<Item = ResourceId>) -> Self {
        Self {
            id,
            neighbors: neighbors.into_iter().collect(),
        }
    }
}

/// A table seating up to `capacity` people
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Table {
    pub id: ResourceId,
    pub capacity: u32,
}

impl Table {
    pub fn new(id: ResourceId, capacity: u32) -> Self {
        Self { id, capacity }
    }
}

/// Soft-constraint weights keyed by attribute name.
///
/// A weight of zero disables the attribute. The [`PAST_NEIGHBOR_KEY`] entry
/// is always applied as a penalty, whatever its sign in the map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct ConstraintConfig {
    pub weights: BTreeMap<String, i64>,
}

impl ConstraintConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weight(mut self, attribute: impl Into<String>, weight: i64) -> Self {
        self.weights.insert(attribute.into(), weight);
        self
    }

    pub fn with_past_neighbor_penalty(self, weight: i64) -> Self {
        self.with_weight(PAST_NEIGHBOR_KEY, weight)
    }

    /// Non-reserved attributes with a non-zero weight, in name order.
    pub fn attribute_weights(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.weights
            .iter()
            .filter(|&(name, &weight)| weight != 0 && name.as_str() != PAST_NEIGHBOR_KEY)
            .map(|(name, &weight)| (name.as_str(), weight))
    }

    /// Magnitude subtracted for a repeated neighbor pairing, zero when unset.
    pub fn past_neighbor_penalty(&self) -> i64 {
        self.weights
            .get(PAST_NEIGHBOR_KEY)
            .map(|weight| weight.abs())
            .unwrap_or(0)
    }

    /// Whether no weight contributes anything to the objective.
    pub fn is_inert(&self) -> bool {
        self.attribute_weights().next().is_none() && self.past_neighbor_penalty() == 0
    }
}
