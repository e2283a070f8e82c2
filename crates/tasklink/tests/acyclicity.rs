//! Property tests: no sequence of graph operations can leave a cycle or a
//! dangling dependency behind, and rejected operations change nothing.

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::DiGraph;
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap, HashSet};
use tasklink::domain::{NewTask, Task, TaskId};
use tasklink::graph::DependencyGraph;
use tasklink::store::{InMemoryTaskStore, TaskStore};

mod common;
use common::memory_graph;

#[derive(Debug, Clone)]
enum Op {
    Create(Vec<usize>),
    Add(usize, usize),
    Remove(usize, usize),
    Replace(usize, Vec<usize>),
    Delete(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let idx = 0..16usize;
    let ids = proptest::collection::vec(0..16usize, 0..4);
    prop_oneof![
        2 => ids.clone().prop_map(Op::Create),
        4 => (idx.clone(), idx.clone()).prop_map(|(a, b)| Op::Add(a, b)),
        1 => (idx.clone(), idx.clone()).prop_map(|(a, b)| Op::Remove(a, b)),
        2 => (idx.clone(), ids).prop_map(|(a, deps)| Op::Replace(a, deps)),
        1 => idx.prop_map(Op::Delete),
    ]
}

fn pick(ids: &[TaskId], i: usize) -> TaskId {
    if ids.is_empty() {
        TaskId::from("tl-none")
    } else {
        ids[i % ids.len()].clone()
    }
}

fn snapshot(tasks: &[Task]) -> BTreeMap<TaskId, Vec<TaskId>> {
    tasks
        .iter()
        .map(|t| (t.id.clone(), t.dependencies.clone()))
        .collect()
}

fn assert_invariants(tasks: &[Task]) {
    let mut graph = DiGraph::<(), ()>::new();
    let nodes: HashMap<&TaskId, _> = tasks.iter().map(|t| (&t.id, graph.add_node(()))).collect();

    for task in tasks {
        let unique: HashSet<_> = task.dependencies.iter().collect();
        assert_eq!(unique.len(), task.dependencies.len(), "{} has repeats", task.id);

        for dep in &task.dependencies {
            let to = nodes
                .get(dep)
                .unwrap_or_else(|| panic!("{} depends on missing {}", task.id, dep));
            graph.add_edge(nodes[&task.id], *to, ());
        }
    }

    assert!(!is_cyclic_directed(&graph), "dependency graph contains a cycle");
}

async fn apply(graph: &DependencyGraph, ids: &[TaskId], op: &Op) -> tasklink::error::Result<()> {
    match op {
        Op::Create(deps) => {
            let deps: Vec<TaskId> = deps.iter().map(|&i| pick(ids, i)).collect();
            graph
                .create_task(NewTask::titled("generated"), &deps)
                .await
                .map(|_| ())
        }
        Op::Add(a, b) => graph
            .add_dependency(&pick(ids, *a), &pick(ids, *b))
            .await
            .map(|_| ()),
        Op::Remove(a, b) => graph
            .remove_dependency(&pick(ids, *a), &pick(ids, *b))
            .await
            .map(|_| ()),
        Op::Replace(a, deps) => {
            let deps: Vec<TaskId> = deps.iter().map(|&i| pick(ids, i)).collect();
            graph
                .update_dependencies(&pick(ids, *a), &deps)
                .await
                .map(|_| ())
        }
        Op::Delete(a) => graph.delete_task(&pick(ids, *a)).await.map(|_| ()),
    }
}

async fn run(ops: Vec<Op>) {
    let (graph, store): (DependencyGraph, InMemoryTaskStore) = memory_graph();

    for op in &ops {
        let before = store.list().await.unwrap();
        let mut ids: Vec<TaskId> = before.iter().map(|t| t.id.clone()).collect();
        ids.sort();

        let result = apply(&graph, &ids, op).await;
        let after = store.list().await.unwrap();

        assert_invariants(&after);
        if let Err(err) = result {
            assert!(err.is_rejection(), "unexpected failure for {op:?}: {err}");
            assert_eq!(snapshot(&before), snapshot(&after), "rejected {op:?} changed the graph");
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn random_operations_keep_graph_acyclic(ops in proptest::collection::vec(op_strategy(), 1..40)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("Failed to build runtime");
        runtime.block_on(run(ops));
    }
}
