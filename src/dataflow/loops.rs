//! Back-edge detection and natural-loop recovery.
//!
//! An edge `(s, t)` is a back edge exactly when `t` dominates `s`. For each
//! back edge the natural loop body is the header plus every node that can
//! reach the edge's source without passing through the header, restricted to
//! the source's strongly connected component - the restriction keeps the
//! result sane on irreducible graphs.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::cfg::graph::{dominators, rdfs_from, scc};
use crate::cfg::types::BBGr;

/// Back-edge source -> back-edge target (the loop header).
pub type BackEdgeMap = FxHashMap<usize, usize>;

/// Every edge whose target dominates its source.
pub fn back_edges<A>(gr: &BBGr<A>) -> BackEdgeMap {
    let doms = dominators(gr);
    let mut out: BackEdgeMap = FxHashMap::default();
    for &(s, t) in &gr.edges {
        if doms.get(&s).is_some_and(|d| d.contains(&t)) {
            out.insert(s, t);
        }
    }
    out
}

/// Natural-loop node sets, one per back edge, in ascending order of the
/// back-edge source.
pub fn loop_nodes<A>(gr: &BBGr<A>) -> Vec<FxHashSet<usize>> {
    let be = back_edges(gr);
    let comps = scc(gr);

    let mut sources: Vec<usize> = be.keys().copied().collect();
    sources.sort_unstable();

    let mut out = Vec::with_capacity(sources.len());
    for m in sources {
        let header = be[&m];
        let comp: FxHashSet<usize> = comps
            .iter()
            .find(|c| c.contains(&m))
            .map(|c| c.iter().copied().collect())
            .unwrap_or_default();
        let mut body: FxHashSet<usize> = rdfs_from(gr, m, Some(header))
            .intersection(&comp)
            .copied()
            .collect();
        body.insert(header);
        out.push(body);
    }
    out
}
