use pretty_assertions::assert_eq;
use std::thread;
use topo_engine::api::*;
use topo_engine::error::Rejection;
use topo_engine::script::{replay, Operation};
use topo_engine::shared::SharedTopology;
use topo_engine::types::*;
use topo_test_utils::*;

#[test]
fn test_replay_json_session() {
    let ops: Vec<Operation> = serde_json::from_str(
        r#"[
            {"op":"addNode","node":{"id":"A","x":0,"y":0,"type":"router"}},
            {"op":"addNode","node":{"id":"B","x":10,"y":0,"type":"switch","isCritical":true}},
            {"op":"addLink","link":{"src":"A","dst":"B","metricBind":"A: Bits sent"}},
            {"op":"removeNode","id":"B"},
            {"op":"updateNode","id":"A","changes":{"icon":"fa-cloud"}},
            {"op":"undo"},
            {"op":"redo"}
        ]"#,
    )
    .unwrap();

    let mut handle = setup_handle(&[], &[]);
    let summary = replay(&mut handle, ops);

    assert_eq!(summary.committed, 6);
    assert_eq!(summary.rejected.len(), 1);
    assert_eq!(summary.rejected[0].index, 3);
    assert_eq!(summary.rejected[0].reason, Rejection::CriticalNode { id: "B".into() });

    assert_eq!(handle.node("A").unwrap().icon.as_deref(), Some("fa-cloud"));
    assert_eq!(
        handle.link("A", "B").unwrap().metric_bind.as_deref(),
        Some("A: Bits sent")
    );
}

#[test]
fn test_state_round_trips_through_json() {
    let mut handle = setup_chain();
    handle.add_link(link("A", "C")).unwrap();
    let state = handle.state();

    let json = serde_json::to_string(&state).unwrap();
    let parsed: TopologyState = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, state);
}

#[test]
fn test_shared_topology_serializes_concurrent_writers() {
    let shared = SharedTopology::new(setup_handle(&["root"], &[]));

    let workers: Vec<_> = (0..4)
        .map(|w| {
            let shared = shared.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    let id = format!("w{w}-{i}");
                    shared
                        .apply(Operation::AddNode { node: node(&id) })
                        .unwrap();
                    shared.with(|h| h.add_link(link("root", &id))).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let graph = shared.graph();
    assert_eq!(graph.nodes.len(), 101);
    assert_eq!(graph.links.len(), 100);
    assert_eq!(shared.state().audit_logs.len(), 100);
    assert_eq!(shared.lock().undo_depth(), 200);
    assert!(!has_cycle(&graph.links));
}
