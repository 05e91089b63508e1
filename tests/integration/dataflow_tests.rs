//! End-to-end dataflow scenarios over hand-partitioned basic-block graphs.

use fortran_flow::semantics::{block_var_defs, block_var_uses};
use fortran_flow::{
    back_edges, def_map, dominators, du_map, flows_to, live_variables, loop_nodes,
    reaching_definitions, ud_map,
};
use rustc_hash::FxHashSet;

use crate::support::*;

#[test]
fn live_variables_on_linear_graph() {
    // 0: a := 1 / 1: b := a / 2: print b
    let gr = graph(
        vec![
            (0, vec![assign(var("a"), int("1"))]),
            (1, vec![assign(var("b"), var("a"))]),
            (2, vec![print_of("b")]),
        ],
        &[(0, 1), (1, 2)],
    );

    let lva = live_variables(&gr);
    assert_eq!(lva.in_at(0), name_set(&[]));
    assert_eq!(lva.in_at(1), name_set(&["a"]));
    assert_eq!(lva.in_at(2), name_set(&["b"]));
    assert_eq!(lva.out_at(0), name_set(&["a"]));
    assert_eq!(lva.out_at(1), name_set(&["b"]));
    assert_eq!(lva.out_at(2), name_set(&[]));
}

#[test]
fn liveness_satisfies_in_monotonicity() {
    // IN(n) ⊇ GEN(n) and IN(n) ⊇ OUT(n) - KILL(n), on a branchy graph.
    let gr = graph(
        vec![
            (0, vec![assign(var("x"), int("1"))]),
            (1, vec![assign(var("y"), var("x"))]),
            (2, vec![assign(var("y"), int("2"))]),
            (3, vec![print_of("y"), print_of("x")]),
        ],
        &[(0, 1), (0, 2), (1, 3), (2, 3)],
    );
    let lva = live_variables(&gr);

    for n in gr.node_ids() {
        // Re-fold GEN/KILL from the public block queries.
        let mut gen = FxHashSet::default();
        let mut kill: FxHashSet<String> = FxHashSet::default();
        for b in &gr.blocks[&n] {
            for u in block_var_uses(b) {
                if !kill.contains(&u) {
                    gen.insert(u);
                }
            }
            kill.extend(block_var_defs(b));
        }
        let live_in = lva.in_at(n);
        assert!(gen.is_subset(&live_in), "node {n}: IN must contain GEN");
        let out_minus_kill: FxHashSet<String> =
            lva.out_at(n).difference(&kill).cloned().collect();
        assert!(
            out_minus_kill.is_subset(&live_in),
            "node {n}: IN must contain OUT - KILL"
        );
    }
}

#[test]
fn reaching_definitions_on_diamond() {
    // 0 defines x (label 10), 1 redefines x (11), 2 does nothing,
    // 3 uses x (13).
    let gr = graph(
        vec![
            (0, vec![labeled(assign(var("x"), int("1")), 10)]),
            (1, vec![labeled(assign(var("x"), int("2")), 11)]),
            (2, vec![labeled(print_of("z"), 12)]),
            (3, vec![labeled(print_of("x"), 13)]),
        ],
        &[(0, 1), (0, 2), (1, 3), (2, 3)],
    );
    let bm = gr.block_map().unwrap();
    let dm = def_map(&bm);
    let rd = reaching_definitions(&gr, &dm);

    assert_eq!(rd.in_at(3), label_set(&[10, 11]));

    let du = du_map(&gr, &bm, &dm, &rd);
    let ud = ud_map(&du);
    assert_eq!(ud[&13], label_set(&[10, 11]));

    // Soundness spot-check: the definition killed on the left path still
    // arrives via the right path, and only via it.
    assert_eq!(rd.out_at(1), label_set(&[11]));
    assert_eq!(rd.out_at(2), label_set(&[10]));
}

#[test]
fn du_and_ud_are_edge_reverses() {
    let gr = graph(
        vec![
            (0, vec![labeled(assign(var("a"), int("1")), 20)]),
            (1, vec![labeled(assign(var("b"), var("a")), 21)]),
            (2, vec![labeled(print_of("b"), 22), labeled(print_of("a"), 23)]),
        ],
        &[(0, 1), (1, 2)],
    );
    let bm = gr.block_map().unwrap();
    let dm = def_map(&bm);
    let rd = reaching_definitions(&gr, &dm);
    let du = du_map(&gr, &bm, &dm, &rd);
    let ud = ud_map(&du);

    assert_eq!(du[&20], label_set(&[21, 23]));
    assert_eq!(du[&21], label_set(&[22]));
    assert_eq!(ud_map(&ud), du, "reversing twice is the identity");
}

#[test]
fn natural_loop_recovery() {
    // 0 -> 1 -> 2 -> 1: back edge (2, 1), loop {1, 2}.
    let gr = graph(
        vec![(0, vec![]), (1, vec![]), (2, vec![])],
        &[(0, 1), (1, 2), (2, 1)],
    );

    let doms = dominators(&gr);
    assert_eq!(doms[&0], label_set(&[0]));
    assert_eq!(doms[&1], label_set(&[0, 1]));
    assert_eq!(doms[&2], label_set(&[0, 1, 2]));

    let be = back_edges(&gr);
    assert_eq!(be.len(), 1);
    assert_eq!(be[&2], 1);

    assert_eq!(loop_nodes(&gr), vec![label_set(&[1, 2])]);
}

#[test]
fn back_edges_match_dominator_characterization() {
    let gr = graph(
        vec![(0, vec![]), (1, vec![]), (2, vec![]), (3, vec![]), (4, vec![])],
        &[(0, 1), (1, 2), (2, 3), (3, 1), (2, 4), (4, 4)],
    );
    let doms = dominators(&gr);
    let be = back_edges(&gr);
    for &(s, t) in &gr.edges {
        let is_back = doms.get(&s).is_some_and(|d| d.contains(&t));
        assert_eq!(
            be.get(&s) == Some(&t),
            is_back,
            "edge ({s}, {t}) back-edge status must follow dominance"
        );
    }
}

#[test]
fn loop_bodies_lie_on_header_to_source_paths() {
    // Every loop node reaches the back-edge source without leaving the loop.
    let gr = graph(
        vec![(0, vec![]), (1, vec![]), (2, vec![]), (3, vec![]), (4, vec![])],
        &[(0, 1), (1, 2), (2, 3), (3, 1), (1, 4)],
    );
    let be = back_edges(&gr);
    assert_eq!(be[&3], 1);
    let loops = loop_nodes(&gr);
    assert_eq!(loops, vec![label_set(&[1, 2, 3])]);
}

#[test]
fn flows_to_closure_on_a_chain() {
    // a := 1 (30); b := a (31); c := b (32); print c (33)
    let gr = graph(
        vec![
            (0, vec![labeled(assign(var("a"), int("1")), 30)]),
            (1, vec![labeled(assign(var("b"), var("a")), 31)]),
            (2, vec![labeled(assign(var("c"), var("b")), 32)]),
            (3, vec![labeled(print_of("c"), 33)]),
        ],
        &[(0, 1), (1, 2), (2, 3)],
    );
    let bm = gr.block_map().unwrap();
    let dm = def_map(&bm);
    let rd = reaching_definitions(&gr, &dm);
    let du = du_map(&gr, &bm, &dm, &rd);
    let fg = flows_to(&bm, &du);

    // Exactly DU-reachability plus reflexivity, nothing more.
    assert_eq!(fg.edges[&30], label_set(&[30, 31, 32, 33]));
    assert_eq!(fg.edges[&31], label_set(&[31, 32, 33]));
    assert_eq!(fg.edges[&32], label_set(&[32, 33]));
    assert_eq!(fg.edges[&33], label_set(&[33]));
}
