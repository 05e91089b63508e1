//! Graph primitives over basic-block graphs.
//!
//! Thin adapters from [`BBGr`] onto the petgraph algorithms the analyses
//! need: dominators, DFS orderings, strongly connected components, and a
//! reverse DFS used by natural-loop recovery. Everything is keyed by the
//! graph's own node ids, petgraph indices never escape this module.

use fixedbitset::FixedBitSet;
use petgraph::algo::dominators::simple_fast;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, DfsPostOrder};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::cfg::types::BBGr;

/// Node -> set of its dominators (every node dominates itself).
pub type DomMap = FxHashMap<usize, FxHashSet<usize>>;

/// Node -> its immediate dominator. The entry node has none.
pub type IDomMap = FxHashMap<usize, usize>;

fn to_petgraph<A>(gr: &BBGr<A>) -> (DiGraph<usize, ()>, FxHashMap<usize, NodeIndex>) {
    let mut g = DiGraph::new();
    let mut index: FxHashMap<usize, NodeIndex> = FxHashMap::default();
    // Nodes in ascending id order, edges in declaration order: traversal
    // results depend only on the graph, not on hash iteration.
    for id in gr.node_ids() {
        index.insert(id, g.add_node(id));
    }
    for &(from, to) in &gr.edges {
        if let (Some(&f), Some(&t)) = (index.get(&from), index.get(&to)) {
            g.add_edge(f, t, ());
        }
    }
    (g, index)
}

/// Dominator sets rooted at the entry node. Nodes unreachable from the entry
/// are absent from the map.
pub fn dominators<A>(gr: &BBGr<A>) -> DomMap {
    let (g, index) = to_petgraph(gr);
    let doms = simple_fast(&g, index[&gr.entry()]);
    let mut out: DomMap = FxHashMap::default();
    for id in gr.node_ids() {
        if let Some(ds) = doms.dominators(index[&id]) {
            out.insert(id, ds.map(|ix| g[ix]).collect());
        }
    }
    out
}

/// Immediate dominators rooted at the entry node.
pub fn idominators<A>(gr: &BBGr<A>) -> IDomMap {
    let (g, index) = to_petgraph(gr);
    let doms = simple_fast(&g, index[&gr.entry()]);
    let mut out: IDomMap = FxHashMap::default();
    for id in gr.node_ids() {
        if id == gr.entry() {
            continue;
        }
        if let Some(idom) = doms.immediate_dominator(index[&id]) {
            out.insert(id, g[idom]);
        }
    }
    out
}

/// DFS postorder from the entry node.
pub fn post_order<A>(gr: &BBGr<A>) -> Vec<usize> {
    let (g, index) = to_petgraph(gr);
    let mut dfs = DfsPostOrder::new(&g, index[&gr.entry()]);
    let mut order = Vec::with_capacity(gr.blocks.len());
    while let Some(ix) = dfs.next(&g) {
        order.push(g[ix]);
    }
    order
}

/// Reverse DFS postorder: the canonical iteration order for forward
/// dataflow analyses.
pub fn rev_post_order<A>(gr: &BBGr<A>) -> Vec<usize> {
    let mut order = post_order(gr);
    order.reverse();
    order
}

/// DFS preorder from the entry node.
pub fn pre_order<A>(gr: &BBGr<A>) -> Vec<usize> {
    let (g, index) = to_petgraph(gr);
    let mut dfs = Dfs::new(&g, index[&gr.entry()]);
    let mut order = Vec::with_capacity(gr.blocks.len());
    while let Some(ix) = dfs.next(&g) {
        order.push(g[ix]);
    }
    order
}

/// Reverse DFS preorder: the canonical iteration order for backward
/// dataflow analyses.
pub fn rev_pre_order<A>(gr: &BBGr<A>) -> Vec<usize> {
    let mut order = pre_order(gr);
    order.reverse();
    order
}

/// Topological-ish ordering: reverse postorder, which ignores back edges and
/// is exact on acyclic graphs.
pub fn topsort<A>(gr: &BBGr<A>) -> Vec<usize> {
    rev_post_order(gr)
}

/// Strongly connected components. Component members are sorted; component
/// order is Tarjan's (reverse topological).
pub fn scc<A>(gr: &BBGr<A>) -> Vec<Vec<usize>> {
    let (g, _) = to_petgraph(gr);
    tarjan_scc(&g)
        .into_iter()
        .map(|comp| {
            let mut ids: Vec<usize> = comp.into_iter().map(|ix| g[ix]).collect();
            ids.sort_unstable();
            ids
        })
        .collect()
}

/// Nodes reaching `start` along reversed edges, with `removed` (if any)
/// deleted from the graph first. `start` itself is included unless removed.
pub fn rdfs_from<A>(gr: &BBGr<A>, start: usize, removed: Option<usize>) -> FxHashSet<usize> {
    let mut out: FxHashSet<usize> = FxHashSet::default();
    if Some(start) == removed || !gr.blocks.contains_key(&start) {
        return out;
    }
    let cap = gr.blocks.keys().max().map_or(0, |m| m + 1);
    let mut visited = FixedBitSet::with_capacity(cap);
    let mut stack = vec![start];
    visited.insert(start);
    while let Some(n) = stack.pop() {
        out.insert(n);
        for &p in gr.predecessors(n) {
            if Some(p) == removed || visited.contains(p) {
                continue;
            }
            visited.insert(p);
            stack.push(p);
        }
    }
    out
}
