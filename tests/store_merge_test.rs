//! Merge-order properties of the graph store: any permutation of the same
//! batches, with or without repeats, yields the same graph.

mod common;

use common::fixtures::{edge_triples, unit};
use depscope::domain::edge::EdgeKind;
use depscope::domain::extractor::{EdgeBatch, ExtractorConfig, extract};
use depscope::domain::store::GraphStore;

fn sample_batches() -> Vec<EdgeBatch> {
    let config = ExtractorConfig::default();
    let units = [
        unit(
            "ui.Screen",
            &[
                ("data.Repo", EdgeKind::FieldType),
                ("ui.Base", EdgeKind::Extends),
            ],
        ),
        unit("data.Repo", &[("data.Entity", EdgeKind::ReturnType)]),
        unit(
            "data.Entity",
            &[
                ("ui.Screen", EdgeKind::Uses),
                ("data.Repo", EdgeKind::Uses),
            ],
        ),
        unit("ui.Base", &[]),
    ];
    units.iter().map(|u| extract(u, &config).unwrap()).collect()
}

fn merged_in_order(batches: &[EdgeBatch], order: &[usize]) -> (usize, usize, Vec<(String, String, EdgeKind)>) {
    let store = GraphStore::new();
    for &i in order {
        store.add_edges(&batches[i]);
    }
    let snapshot = store.snapshot();
    (
        snapshot.node_count(),
        snapshot.edge_count(),
        edge_triples(&snapshot),
    )
}

#[test]
fn test_every_permutation_yields_the_same_graph() {
    let batches = sample_batches();
    let orders: [[usize; 4]; 8] = [
        [0, 1, 2, 3],
        [3, 2, 1, 0],
        [1, 0, 3, 2],
        [2, 3, 0, 1],
        [0, 2, 1, 3],
        [3, 1, 2, 0],
        [1, 3, 0, 2],
        [2, 0, 3, 1],
    ];

    let reference = merged_in_order(&batches, &orders[0]);
    for order in &orders[1..] {
        assert_eq!(merged_in_order(&batches, order), reference, "order {order:?}");
    }
}

#[test]
fn test_reingesting_every_batch_changes_nothing() {
    let batches = sample_batches();
    let once = merged_in_order(&batches, &[0, 1, 2, 3]);
    let twice = merged_in_order(&batches, &[0, 1, 2, 3, 3, 2, 1, 0]);
    assert_eq!(once, twice);
}

#[test]
fn test_no_edge_is_lost_once_accepted() {
    let batches = sample_batches();
    let store = GraphStore::new();
    let mut accepted = 0;
    for batch in &batches {
        accepted += store.add_edges(batch);
        assert_eq!(store.edge_count(), accepted);
    }
    assert_eq!(store.edge_count(), 5);
}
