use std::sync::Arc;

use starmap_nav::{
    ConnectionRecord, GraphError, LocationGraph, LocationId, LocationRecord, PathSearch,
    SearchScratch,
};

fn record(id: u32, name: &str, to: &[u32]) -> LocationRecord {
    LocationRecord {
        id,
        native_id: 30_000_000 + id,
        name: name.to_string(),
        position: [id as f32, 0.0, 0.0],
        connections: to
            .iter()
            .map(|&to| ConnectionRecord {
                to,
                to_native_id: 30_000_000 + to,
                regional: false,
            })
            .collect(),
    }
}

/// `0-1-2-3` chained plus a spur `0-4`, all links two-way.
fn chain_graph() -> Arc<LocationGraph> {
    let graph = LocationGraph::from_records(vec![
        record(0, "Alpha", &[1, 4]),
        record(1, "Bravo", &[0, 2]),
        record(2, "Charlie", &[1, 3]),
        record(3, "Delta", &[2]),
        record(4, "Echo", &[0]),
    ])
    .expect("graph loads");
    Arc::new(graph)
}

fn ids(raw: &[u32]) -> Vec<LocationId> {
    raw.iter().copied().map(LocationId).collect()
}

#[test]
fn chain_route_runs_origin_to_destination() {
    let search = PathSearch::new(chain_graph());
    let path = search.find_path(LocationId(0), LocationId(3));

    assert_eq!(path.total_jumps, 3);
    assert_eq!(path.systems, ids(&[0, 1, 2, 3]));
    assert_eq!(path.origin(), Some(LocationId(0)));
    assert_eq!(path.destination(), Some(LocationId(3)));
    assert!(!path.is_unreachable());

    let back = search.find_path(LocationId(3), LocationId(4));
    assert_eq!(back.total_jumps, 4);
    assert_eq!(back.systems, ids(&[3, 2, 1, 0, 4]));
}

#[test]
fn blocked_location_cuts_the_only_route() {
    let graph = chain_graph();
    let search = PathSearch::new(Arc::clone(&graph));

    graph.set_blocked(LocationId(1), true);
    assert!(graph.is_blocked(LocationId(1)));

    let path = search.find_path(LocationId(0), LocationId(3));
    assert!(path.is_unreachable());
    assert_eq!(path.total_jumps, 0);
    assert_eq!(path.systems, ids(&[0]));

    // The spur is unaffected.
    assert_eq!(search.find_path(LocationId(0), LocationId(4)).total_jumps, 1);

    graph.set_blocked(LocationId(1), false);
    assert_eq!(search.find_path(LocationId(0), LocationId(3)).total_jumps, 3);
}

#[test]
fn blocked_location_is_routed_around_when_possible() {
    // Square 0-1-2-3-0 with a diagonal-free layout: two equal routes from 0 to 2.
    let graph = Arc::new(
        LocationGraph::from_records(vec![
            record(0, "A", &[1, 3]),
            record(1, "B", &[0, 2]),
            record(2, "C", &[1, 3]),
            record(3, "D", &[2, 0]),
        ])
        .expect("graph loads"),
    );
    let search = PathSearch::new(Arc::clone(&graph));

    graph.set_blocked(LocationId(1), true);
    let path = search.find_path(LocationId(0), LocationId(2));
    assert_eq!(path.total_jumps, 2);
    assert_eq!(path.systems, ids(&[0, 3, 2]));
}

#[test]
fn search_is_deterministic_for_same_input() {
    let graph = Arc::new(
        LocationGraph::from_records(vec![
            record(0, "A", &[1, 2]),
            record(1, "B", &[0, 3]),
            record(2, "C", &[0, 3]),
            record(3, "D", &[1, 2]),
        ])
        .expect("graph loads"),
    );
    let search = PathSearch::new(graph);
    let mut scratch = SearchScratch::default();

    let a = search.find_path(LocationId(0), LocationId(3));
    let b = search.find_path_with(LocationId(0), LocationId(3), &mut scratch);
    let c = search.find_path_with(LocationId(0), LocationId(3), &mut scratch);

    assert_eq!(a, b);
    assert_eq!(b, c);
    assert_eq!(a.total_jumps, 2);
}

#[test]
fn one_way_connections_are_respected() {
    // 0 -> 1 -> 2, no way back.
    let graph = Arc::new(
        LocationGraph::from_records(vec![
            record(0, "A", &[1]),
            record(1, "B", &[2]),
            record(2, "C", &[]),
        ])
        .expect("graph loads"),
    );
    let search = PathSearch::new(graph);

    assert_eq!(search.find_path(LocationId(0), LocationId(2)).systems, ids(&[0, 1, 2]));

    let back = search.find_path(LocationId(2), LocationId(0));
    assert!(back.is_unreachable());
    assert_eq!(back.systems, ids(&[2]));
}

#[test]
fn isolated_and_unknown_locations_yield_the_sentinel() {
    let graph = Arc::new(
        LocationGraph::from_records(vec![
            record(0, "A", &[1]),
            record(1, "B", &[0]),
            record(2, "Island", &[]),
        ])
        .expect("graph loads"),
    );
    let search = PathSearch::new(graph);

    assert!(search.find_path(LocationId(2), LocationId(0)).is_unreachable());
    assert!(search.find_path(LocationId(0), LocationId(2)).is_unreachable());
    assert!(search.find_path(LocationId(0), LocationId(99)).is_unreachable());

    let same = search.find_path(LocationId(1), LocationId(1));
    assert_eq!(same.total_jumps, 0);
    assert_eq!(same.systems, ids(&[1]));
}

#[test]
fn graph_load_rejects_bad_input() {
    assert_eq!(LocationGraph::from_records(Vec::new()).unwrap_err(), GraphError::Empty);

    let sparse = LocationGraph::from_records(vec![record(0, "A", &[]), record(5, "B", &[])]);
    assert_eq!(sparse.unwrap_err(), GraphError::SparseId { index: 1, id: 5 });

    let dup = LocationGraph::from_records(vec![record(0, "A", &[]), record(1, "A", &[])]);
    assert_eq!(dup.unwrap_err(), GraphError::DuplicateName("A".to_string()));
}

#[test]
fn graph_drops_dangling_connections_and_indexes_names() {
    let graph =
        LocationGraph::from_records(vec![record(0, "Alpha", &[1, 7]), record(1, "Bravo", &[0])])
            .expect("graph loads");

    assert_eq!(graph.len(), 2);
    assert_eq!(graph.connections(LocationId(0)).len(), 1);
    assert_eq!(graph.incoming(LocationId(0)), &[LocationId(1)]);
    assert_eq!(graph.find_by_name("Bravo"), Some(LocationId(1)));
    assert_eq!(graph.find_by_name("Zulu"), None);
    assert_eq!(graph.get(LocationId(1)).map(|l| l.native_id), Some(30_000_001));
    assert!(graph.is_blocked(LocationId(42)));
}
