// Feasible seat clusters ("footprints") per group size
// A footprint is a lead seat plus `size - 1` of its own neighbors; sets
// reachable from several leads are kept once

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::debug;

use super::error::{AssignmentError, Result};
use crate::domain::{Group, ResourceId, Seat};

/// A candidate seat set for one group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footprint {
    /// Seat whose neighbor list covers every other member
    pub lead: ResourceId,
    /// Member seats in ascending order, lead included
    pub seats: Vec<ResourceId>,
}

impl Footprint {
    pub fn contains(&self, seat: ResourceId) -> bool {
        self.seats.binary_search(&seat).is_ok()
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
}

/// Seat adjacency restricted to known seats
#[derive(Debug, Clone)]
pub struct SeatGraph {
    neighbors: BTreeMap<ResourceId, Vec<ResourceId>>,
}

impl SeatGraph {
    /// Index the seats, dropping self-loops, duplicates and unknown neighbor ids.
    pub fn new(seats: &[Seat]) -> Result<Self> {
        let known: BTreeSet<ResourceId> = seats.iter().map(|seat| seat.id).collect();
        if known.len() != seats.len() {
            return Err(AssignmentError::Configuration(
                "duplicate seat id in layout".to_string(),
            ));
        }

        let neighbors = seats
            .iter()
            .map(|seat| {
                let mut seen = HashSet::new();
                let valid = seat
                    .neighbors
                    .iter()
                    .copied()
                    .filter(|n| *n != seat.id && known.contains(n) && seen.insert(*n))
                    .collect();
                (seat.id, valid)
            })
            .collect();

        Ok(Self { neighbors })
    }

    /// Seat ids in ascending order.
    pub fn seat_ids(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.neighbors.keys().copied()
    }

    pub fn num_seats(&self) -> usize {
        self.neighbors.len()
    }

    pub fn neighbors(&self, seat: ResourceId) -> &[ResourceId] {
        self.neighbors.get(&seat).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn max_degree(&self) -> usize {
        self.neighbors.values().map(Vec::len).max().unwrap_or(0)
    }

    /// Undirected edges `(low, high)`, each listed once.
    ///
    /// An edge named by only one endpoint still counts.
    pub fn edges(&self) -> Vec<(ResourceId, ResourceId)> {
        let edges: BTreeSet<_> = self
            .neighbors
            .iter()
            .flat_map(|(&seat, neighbors)| {
                neighbors
                    .iter()
                    .map(move |&n| if seat < n { (seat, n) } else { (n, seat) })
            })
            .collect();
        edges.into_iter().collect()
    }

    /// Every distinct footprint for a group of `size` seats.
    pub fn footprints(&self, size: u32) -> Vec<Footprint> {
        if size <= 1 {
            return self
                .seat_ids()
                .map(|seat| Footprint {
                    lead: seat,
                    seats: vec![seat],
                })
                .collect();
        }

        let others = (size - 1) as usize;
        let mut seen = HashSet::new();
        let mut footprints = Vec::new();
        for (&lead, neighbors) in &self.neighbors {
            if neighbors.len() < others {
                continue;
            }
            for_each_combination(neighbors, others, |combo| {
                let mut seats = Vec::with_capacity(others + 1);
                seats.push(lead);
                seats.extend_from_slice(combo);
                seats.sort_unstable();
                if seen.insert(seats.clone()) {
                    footprints.push(Footprint { lead, seats });
                }
            });
        }
        footprints
    }
}

/// Footprints shared by all groups of the same size
#[derive(Debug, Clone, Default)]
pub struct FootprintCatalog {
    by_size: BTreeMap<u32, Vec<Footprint>>,
}

impl FootprintCatalog {
    /// Enumerate footprints for every group size present.
    ///
    /// Fails on the first group (in input order) that has no footprint.
    pub fn generate(groups: &[Group], graph: &SeatGraph) -> Result<Self> {
        let mut by_size: BTreeMap<u32, Vec<Footprint>> = BTreeMap::new();
        for group in groups {
            let size = group.effective_size();
            let footprints = by_size
                .entry(size)
                .or_insert_with(|| graph.footprints(size));
            if footprints.is_empty() {
                return Err(AssignmentError::InfeasibleFootprint {
                    group: group.id.clone(),
                    size,
                });
            }
        }

        for (size, footprints) in &by_size {
            debug!(size, footprints = footprints.len(), "footprints generated");
        }
        Ok(Self { by_size })
    }

    pub fn for_size(&self, size: u32) -> &[Footprint] {
        self.by_size.get(&size).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total(&self) -> usize {
        self.by_size.values().map(Vec::len).sum()
    }
}

/// Call `visit` with every `k`-combination of `items`, in lexicographic index order.
fn for_each_combination<T: Copy>(items: &[T], k: usize, mut visit: impl FnMut(&[T])) {
    let n = items.len();
    if k > n {
        return;
    }
    let mut indices: Vec<usize> = (0..k).collect();
    let mut combo: Vec<T> = Vec::with_capacity(k);
    loop {
        combo.clear();
        combo.extend(indices.iter().map(|&i| items[i]));
        visit(&combo);

        // Advance the rightmost index that still has room.
        let Some(pos) = (0..k).rev().find(|&i| indices[i] != i + n - k) else {
            return;
        };
        indices[pos] += 1;
        for j in pos + 1..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}
