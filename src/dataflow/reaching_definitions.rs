//! Reaching-definitions analysis - forward dataflow - and the def-use
//! machinery derived from it.
//!
//! For each node, which labeled definitions may reach it without an
//! intervening redefinition of the same variable.
//!
//! # Data flow equations
//!
//! - `IN[n]`  = union of `OUT[p]` over all predecessors `p`
//! - `OUT[n]` = `GEN[n] UNION (IN[n] - KILL[n])`
//!
//! Per AST-block `b`: `gen(b)` is the block's own label when it defines
//! anything, `kill(b)` is every label defining a variable `b` defines.
//! Block-level GEN/KILL use the standard folding law
//! `(GEN, KILL) := ((GEN - kill_b) ∪ gen_b, (KILL - gen_b) ∪ kill_b)`.
//!
//! On top of the fixpoint: [`du_map`] (definition label -> labels using it),
//! [`ud_map`] (its edge reverse), and [`flows_to`] (the reflexive-transitive
//! closure of the def-use relation).

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::ast::annotation::Analysis;
use crate::ast::types::{Annotated, Block, Name};
use crate::cfg::graph::rev_post_order;
use crate::cfg::types::BBGr;
use crate::dataflow::solver::dataflow_solver;
use crate::semantics::{block_var_defs, block_var_uses};

/// Set of AST-block labels.
pub type LabelSet = FxHashSet<usize>;

/// Variable name -> labels of the AST-blocks defining it.
pub type DefMap = FxHashMap<Name, LabelSet>;

/// Label -> the AST-block carrying it, borrowed from the graph.
pub type BlockMap<'a, A> = FxHashMap<usize, &'a Block<Analysis<A>>>;

/// Definition label -> labels of blocks using that definition.
pub type DUMap = FxHashMap<usize, LabelSet>;

/// Use label -> labels of definitions reaching that use.
pub type UDMap = FxHashMap<usize, LabelSet>;

/// Result of reaching-definitions analysis for one program unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReachingDefinitions {
    /// Definitions reaching each node's entry.
    pub reach_in: FxHashMap<usize, LabelSet>,
    /// Definitions reaching each node's exit.
    pub reach_out: FxHashMap<usize, LabelSet>,
}

impl ReachingDefinitions {
    pub fn in_at(&self, node: usize) -> LabelSet {
        self.reach_in.get(&node).cloned().unwrap_or_default()
    }

    pub fn out_at(&self, node: usize) -> LabelSet {
        self.reach_out.get(&node).cloned().unwrap_or_default()
    }
}

/// Group the block map by defined variable, taking unions.
pub fn def_map<A>(bm: &BlockMap<'_, A>) -> DefMap {
    let mut dm: DefMap = FxHashMap::default();
    for (&label, block) in bm {
        for v in block_var_defs(block) {
            dm.entry(v).or_default().insert(label);
        }
    }
    dm
}

/// Labels killed by defining the given variables.
fn kill_labels(defs: &FxHashSet<Name>, dm: &DefMap) -> LabelSet {
    let mut kill = LabelSet::default();
    for v in defs {
        if let Some(labels) = dm.get(v) {
            kill.extend(labels.iter().copied());
        }
    }
    kill
}

/// Fold GEN/KILL across the AST-blocks of one basic block.
fn node_gen_kill<A>(blocks: &[Block<Analysis<A>>], dm: &DefMap) -> (LabelSet, LabelSet) {
    let mut gen = LabelSet::default();
    let mut kill = LabelSet::default();
    for b in blocks {
        let defs = block_var_defs(b);
        if defs.is_empty() {
            continue;
        }
        let gen_b: LabelSet = b.anno().ins_label.into_iter().collect();
        let kill_b = kill_labels(&defs, dm);
        gen.retain(|l| !kill_b.contains(l));
        gen.extend(gen_b.iter().copied());
        kill.retain(|l| !gen_b.contains(l));
        kill.extend(kill_b);
    }
    (gen, kill)
}

/// Run reaching-definitions analysis over a unit's basic-block graph.
pub fn reaching_definitions<A>(gr: &BBGr<A>, dm: &DefMap) -> ReachingDefinitions {
    let order = rev_post_order(gr);

    let mut gen: FxHashMap<usize, LabelSet> = FxHashMap::default();
    let mut kill: FxHashMap<usize, LabelSet> = FxHashMap::default();
    for &n in &order {
        let (g, k) = node_gen_kill(&gr.blocks[&n], dm);
        gen.insert(n, g);
        kill.insert(n, k);
    }

    let sol = dataflow_solver(
        gr,
        |_| (LabelSet::default(), LabelSet::default()),
        &order,
        |m, n| {
            // IN = ∪ OUT(pred)
            let mut reach = LabelSet::default();
            for &p in gr.predecessors(n) {
                if let Some((_, out_p)) = m.get(&p) {
                    reach.extend(out_p.iter().copied());
                }
            }
            reach
        },
        |m, n| {
            // OUT = GEN ∪ (IN - KILL)
            let reach_in = &m[&n].0;
            let mut reach: LabelSet = reach_in.difference(&kill[&n]).copied().collect();
            reach.extend(gen[&n].iter().copied());
            reach
        },
    );

    let mut reach_in = FxHashMap::default();
    let mut reach_out = FxHashMap::default();
    for (n, (i, o)) in sol {
        reach_in.insert(n, i);
        reach_out.insert(n, o);
    }
    ReachingDefinitions {
        reach_in,
        reach_out,
    }
}

/// Build the def-use map: for each node, replay its AST-blocks against the
/// set of definitions reaching the node, recording a `def -> use` edge
/// whenever a reaching definition's variables overlap a block's uses.
pub fn du_map<A>(
    gr: &BBGr<A>,
    bm: &BlockMap<'_, A>,
    dm: &DefMap,
    rd: &ReachingDefinitions,
) -> DUMap {
    let mut du: DUMap = FxHashMap::default();
    for n in gr.node_ids() {
        let mut reaching = rd.in_at(n);
        for b in &gr.blocks[&n] {
            let uses = block_var_uses(b);
            if let Some(use_label) = b.anno().ins_label {
                if !uses.is_empty() {
                    for &d in &reaching {
                        let Some(def_block) = bm.get(&d) else { continue };
                        if block_var_defs(def_block).iter().any(|v| uses.contains(v)) {
                            du.entry(d).or_default().insert(use_label);
                        }
                    }
                }
            }
            let defs = block_var_defs(b);
            if !defs.is_empty() {
                let kill_b = kill_labels(&defs, dm);
                reaching.retain(|l| !kill_b.contains(l));
                if let Some(l) = b.anno().ins_label {
                    reaching.insert(l);
                }
            }
        }
    }
    du
}

/// Invert a def-use map into a use-def map (or back: the operation is an
/// involution over edge sets).
pub fn ud_map(du: &DUMap) -> UDMap {
    let mut ud: UDMap = FxHashMap::default();
    for (&d, uses) in du {
        for &u in uses {
            ud.entry(u).or_default().insert(d);
        }
    }
    ud
}

/// The flows-to graph: reflexive-transitive closure of the def-use relation,
/// over every labeled AST-block of the unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowsGraph {
    /// Label -> every label its value may flow to (including itself).
    pub edges: FxHashMap<usize, LabelSet>,
}

impl FlowsGraph {
    /// Labels of the graph, ascending.
    pub fn nodes(&self) -> Vec<usize> {
        let mut ns: Vec<usize> = self.edges.keys().copied().collect();
        ns.sort_unstable();
        ns
    }

    /// Whether the value at `from` may flow to `to`.
    pub fn flows(&self, from: usize, to: usize) -> bool {
        self.edges.get(&from).is_some_and(|s| s.contains(&to))
    }
}

/// Compute the flows-to graph from a def-use map.
pub fn flows_to<A>(bm: &BlockMap<'_, A>, du: &DUMap) -> FlowsGraph {
    let mut edges: FxHashMap<usize, LabelSet> = FxHashMap::default();
    for &label in bm.keys() {
        let mut reach = LabelSet::default();
        reach.insert(label);
        let mut stack = vec![label];
        while let Some(l) = stack.pop() {
            if let Some(succs) = du.get(&l) {
                for &m in succs {
                    if reach.insert(m) {
                        stack.push(m);
                    }
                }
            }
        }
        edges.insert(label, reach);
    }
    FlowsGraph { edges }
}
