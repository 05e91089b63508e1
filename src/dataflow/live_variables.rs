//! Live-variable analysis - backward dataflow.
//!
//! A variable is live at a program point if its current value may be read
//! before being redefined. The analysis flows backward from uses toward
//! definitions.
//!
//! # Data flow equations
//!
//! - `OUT[n]` = union of `IN[s]` over all successors `s`
//! - `IN[n]`  = `GEN[n] UNION (OUT[n] - KILL[n])`
//!
//! where `GEN`/`KILL` are folded left-to-right across the AST-blocks of the
//! basic block: a use only enters `GEN` if nothing earlier in the same block
//! already killed it.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::ast::annotation::Analysis;
use crate::ast::types::{Block, Name};
use crate::cfg::graph::rev_pre_order;
use crate::cfg::types::BBGr;
use crate::dataflow::solver::dataflow_solver;
use crate::semantics::{block_var_defs, block_var_uses};

/// Set of (unique) variable names.
pub type VarSet = FxHashSet<Name>;

/// Result of live-variable analysis for one program unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveVariables {
    /// Variables live at block entry, per node.
    pub live_in: FxHashMap<usize, VarSet>,
    /// Variables live at block exit, per node.
    pub live_out: FxHashMap<usize, VarSet>,
}

impl LiveVariables {
    /// Live-in set of a node; empty for unknown nodes.
    pub fn in_at(&self, node: usize) -> VarSet {
        self.live_in.get(&node).cloned().unwrap_or_default()
    }

    /// Live-out set of a node; empty for unknown nodes.
    pub fn out_at(&self, node: usize) -> VarSet {
        self.live_out.get(&node).cloned().unwrap_or_default()
    }
}

/// Fold GEN/KILL across the AST-blocks of one basic block.
pub(crate) fn basic_block_gen_kill<A>(blocks: &[Block<Analysis<A>>]) -> (VarSet, VarSet) {
    let mut gen = VarSet::default();
    let mut kill = VarSet::default();
    for b in blocks {
        for u in block_var_uses(b) {
            if !kill.contains(&u) {
                gen.insert(u);
            }
        }
        kill.extend(block_var_defs(b));
    }
    (gen, kill)
}

/// Run live-variable analysis over a unit's basic-block graph.
pub fn live_variables<A>(gr: &BBGr<A>) -> LiveVariables {
    let order = rev_pre_order(gr);

    let mut gen: FxHashMap<usize, VarSet> = FxHashMap::default();
    let mut kill: FxHashMap<usize, VarSet> = FxHashMap::default();
    for &n in &order {
        let (g, k) = basic_block_gen_kill(&gr.blocks[&n]);
        gen.insert(n, g);
        kill.insert(n, k);
    }

    let sol = dataflow_solver(
        gr,
        |_| (VarSet::default(), VarSet::default()),
        &order,
        |m, n| {
            // IN = GEN ∪ (OUT - KILL)
            let out = &m[&n].1;
            let mut live: VarSet = out.difference(&kill[&n]).cloned().collect();
            live.extend(gen[&n].iter().cloned());
            live
        },
        |m, n| {
            // OUT = ∪ IN(succ)
            let mut live = VarSet::default();
            for &s in gr.successors(n) {
                if let Some((in_s, _)) = m.get(&s) {
                    live.extend(in_s.iter().cloned());
                }
            }
            live
        },
    );

    let mut live_in = FxHashMap::default();
    let mut live_out = FxHashMap::default();
    for (n, (i, o)) in sol {
        live_in.insert(n, i);
        live_out.insert(n, o);
    }
    LiveVariables { live_in, live_out }
}
