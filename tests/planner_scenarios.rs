#![cfg(feature = "highs")]

use std::collections::{BTreeMap, BTreeSet};

use seatopt::{
    AssignmentError, ConstraintConfig, Group, Planner, PlannerConfig, Seat, SolutionStatus, Table,
};

fn planner(time_limit: f64) -> Planner {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    Planner::with_backend(PlannerConfig::default().with_time_limit(time_limit)).unwrap()
}

/// Seats in a straight row, each adjacent to the next.
fn row(ids: &[u32]) -> Vec<Seat> {
    ids.iter()
        .enumerate()
        .map(|(i, &id)| {
            let mut neighbors = Vec::new();
            if i > 0 {
                neighbors.push(ids[i - 1]);
            }
            if i + 1 < ids.len() {
                neighbors.push(ids[i + 1]);
            }
            Seat::new(id, neighbors)
        })
        .collect()
}

/// `rows x cols` grid with 4-neighborhood, ids `r * cols + c + 1`.
fn grid(rows: u32, cols: u32) -> Vec<Seat> {
    let id = |r: u32, c: u32| r * cols + c + 1;
    let mut seats = Vec::new();
    for r in 0..rows {
        for c in 0..cols {
            let mut neighbors = Vec::new();
            if r > 0 {
                neighbors.push(id(r - 1, c));
            }
            if r + 1 < rows {
                neighbors.push(id(r + 1, c));
            }
            if c > 0 {
                neighbors.push(id(r, c - 1));
            }
            if c + 1 < cols {
                neighbors.push(id(r, c + 1));
            }
            seats.push(Seat::new(id(r, c), neighbors));
        }
    }
    seats
}

fn adjacency(seats: &[Seat]) -> BTreeMap<u32, BTreeSet<u32>> {
    seats
        .iter()
        .map(|seat| (seat.id, seat.neighbors.iter().copied().collect()))
        .collect()
}

#[test]
fn two_different_groups_fill_a_seat_pair() {
    let mut groups = vec![
        Group::new("a", 1).with_attribute("location", "Hannover"),
        Group::new("b", 1).with_attribute("location", "Berlin"),
    ];
    let seats = row(&[1, 2]);
    let config = ConstraintConfig::new().with_weight("location", 5);

    let report = planner(30.0).assign_seats(&mut groups, &seats, &config).unwrap();

    assert_eq!(report.status, SolutionStatus::Optimal);
    assert!((report.objective_value.unwrap() - 5.0).abs() < 1e-6);
    let filled: BTreeSet<u32> = groups.iter().flat_map(|g| g.history[0].clone()).collect();
    assert_eq!(filled, BTreeSet::from([1, 2]));
}

#[test]
fn table_demand_above_capacity_fails_before_solving() {
    let mut groups = vec![Group::new("a", 1), Group::new("b", 1), Group::new("c", 1)];
    let err = planner(30.0)
        .assign_tables(&mut groups, &[Table::new(1, 2)], &ConstraintConfig::new())
        .unwrap_err();

    assert!(matches!(
        err,
        AssignmentError::CapacityExceeded {
            demand: 3,
            capacity: 2
        }
    ));
    assert!(groups.iter().all(|g| g.history.is_empty()));
}

#[test]
fn group_larger_than_any_cluster_is_named() {
    let mut groups = vec![Group::new("family", 3)];
    let seats = vec![Seat::new(1, [2]), Seat::new(2, [1])];
    let err = planner(30.0)
        .assign_seats(&mut groups, &seats, &ConstraintConfig::new())
        .unwrap_err();

    match err {
        AssignmentError::InfeasibleFootprint { group, size } => {
            assert_eq!(group, "family");
            assert_eq!(size, 3);
        }
        other => panic!("expected InfeasibleFootprint, got {other:?}"),
    }
}

#[test]
fn past_neighbors_are_kept_apart() {
    let mut groups = vec![
        Group::new("a", 1)
            .with_attribute("project", "X")
            .with_prior_neighbor("b"),
        Group::new("b", 1).with_attribute("project", "X"),
        Group::new("c", 1).with_attribute("project", "Y"),
    ];
    let seats = row(&[1, 2, 3]);
    let config = ConstraintConfig::new()
        .with_weight("project", 5)
        .with_past_neighbor_penalty(10);

    let report = planner(30.0).assign_seats(&mut groups, &seats, &config).unwrap();

    assert!((report.objective_value.unwrap() - 10.0).abs() < 1e-6);
    assert_eq!(groups[2].history[0], vec![2]);
}

#[test]
fn past_neighbor_penalty_moves_pair_to_isolated_seat() {
    let mut groups = vec![Group::new("a", 1).with_prior_neighbor("b"), Group::new("b", 1)];
    let seats = vec![Seat::new(1, [2]), Seat::new(2, [1]), Seat::new(3, [])];
    let config = ConstraintConfig::new().with_past_neighbor_penalty(10);

    let report = planner(30.0).assign_seats(&mut groups, &seats, &config).unwrap();

    assert!(report.objective_value.unwrap().abs() < 1e-6);
    let placed: BTreeSet<u32> = groups.iter().flat_map(|g| g.history[0].clone()).collect();
    assert!(placed.contains(&3));
}

#[test]
fn mixed_sizes_on_grid_respect_hard_constraints() {
    let locations = ["Hannover", "Berlin", "Hamburg"];
    let sizes = [1, 2, 3, 2, 1, 1];
    let mut groups: Vec<Group> = sizes
        .iter()
        .enumerate()
        .map(|(i, &size)| {
            Group::new(format!("g{i}"), size).with_attribute("location", locations[i % 3])
        })
        .collect();
    let seats = grid(3, 4);
    let adjacency = adjacency(&seats);
    let config = ConstraintConfig::new().with_weight("location", 1);

    let report = planner(60.0).assign_seats(&mut groups, &seats, &config).unwrap();
    assert!(report.status.is_usable());

    let mut used = BTreeSet::new();
    for group in &groups {
        let placement = &group.history[0];
        assert_eq!(placement.len(), group.size as usize);
        let mut sorted = placement.clone();
        sorted.sort_unstable();
        assert_eq!(&sorted, placement);
        // some member must be adjacent to every other member
        assert!(placement.iter().any(|lead| placement
            .iter()
            .all(|other| other == lead || adjacency[lead].contains(other))));
        for seat in placement {
            assert!(used.insert(*seat), "seat {seat} used twice");
        }
    }
}

#[test]
fn tables_mix_locations_and_keep_capacity() {
    let mut groups = vec![
        Group::new("a", 2).with_attribute("location", "Hannover"),
        Group::new("b", 2).with_attribute("location", "Berlin"),
        Group::new("c", 1).with_attribute("location", "Hannover"),
        Group::new("d", 1).with_attribute("location", "Berlin"),
    ];
    groups[0].history.push(vec![9, 9]);
    let tables = vec![Table::new(1, 3), Table::new(2, 3)];
    let config = ConstraintConfig::new().with_weight("location", 5);

    let report = planner(30.0).assign_tables(&mut groups, &tables, &config).unwrap();

    // both locations at both tables, two tables opened
    assert!((report.objective_value.unwrap() - 18.0).abs() < 1e-6);
    assert_eq!(groups[0].history.len(), 2);
    assert_eq!(groups[0].history[0], vec![9, 9]);

    let mut load: BTreeMap<u32, u32> = BTreeMap::new();
    for group in &groups {
        let placement = group.history.last().unwrap();
        assert_eq!(placement.len(), group.size as usize);
        assert!(placement.iter().all(|&t| t == placement[0]));
        *load.entry(placement[0]).or_default() += group.size;
    }
    assert!(load.values().all(|&people| people <= 3));
}

#[test]
fn tables_without_objective_are_feasibility_only() {
    let mut groups = vec![Group::new("a", 2), Group::new("b", 2)];
    let tables = vec![Table::new(1, 2), Table::new(2, 2)];
    let planner = Planner::with_backend(
        PlannerConfig::default()
            .with_time_limit(30.0)
            .with_table_usage_penalty(0),
    )
    .unwrap();

    let report = planner
        .assign_tables(&mut groups, &tables, &ConstraintConfig::new())
        .unwrap();

    assert!(report.objective_value.is_none());
    assert_ne!(groups[0].history[0][0], groups[1].history[0][0]);
}

#[test]
fn longer_time_limit_never_scores_lower() {
    let build = || -> Vec<Group> {
        (0..6)
            .map(|i| {
                Group::new(format!("g{i}"), 1)
                    .with_attribute("team", if i % 2 == 0 { "red" } else { "blue" })
                    .with_attribute("site", if i < 3 { "north" } else { "south" })
            })
            .collect()
    };
    let seats = grid(2, 3);
    let config = ConstraintConfig::new()
        .with_weight("team", 2)
        .with_weight("site", 1);

    let short = planner(2.0)
        .assign_seats(&mut build(), &seats, &config)
        .unwrap();
    let long = planner(20.0)
        .assign_seats(&mut build(), &seats, &config)
        .unwrap();

    assert!(long.objective_value.unwrap() + 1e-6 >= short.objective_value.unwrap());
}
