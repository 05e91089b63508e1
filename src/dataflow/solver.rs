//! Generic iterate-to-fixpoint dataflow solver.
//!
//! The solver repeatedly sweeps the nodes in the caller-supplied order,
//! recomputing `in` then `out` for each node from the current map, and stops
//! when a whole sweep changes nothing. Within a sweep, updates are visible
//! immediately (chaotic iteration), which is what makes a well-chosen order
//! converge in few sweeps: reverse postorder for forward analyses, reverse
//! preorder for backward ones.
//!
//! The solver checks nothing about the lattice. Termination is the caller's
//! contract: monotone transfer functions over a finite-height lattice. Every
//! analysis in this crate uses finite subset lattices, which satisfy that
//! trivially.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::cfg::types::BBGr;

/// Per-node `(in, out)` lattice values.
pub type InOutMap<T> = FxHashMap<usize, (T, T)>;

/// Run the solver to a fixpoint.
///
/// * `init` - initial `(in, out)` values per node
/// * `order` - node visiting order for each sweep
/// * `in_f` / `out_f` - transfer functions, reading the current map
///
/// The convergence predicate is plain equality on the whole map, so `T` only
/// needs `Clone + PartialEq`. Nodes outside `order` are not solved.
pub fn dataflow_solver<A, T, FI, FO>(
    _gr: &BBGr<A>,
    init: impl Fn(usize) -> (T, T),
    order: &[usize],
    in_f: FI,
    out_f: FO,
) -> InOutMap<T>
where
    T: Clone + PartialEq,
    FI: Fn(&InOutMap<T>, usize) -> T,
    FO: Fn(&InOutMap<T>, usize) -> T,
{
    let mut cur: InOutMap<T> = order.iter().map(|&n| (n, init(n))).collect();
    let mut sweeps = 0usize;
    loop {
        sweeps += 1;
        let mut next = cur.clone();
        for &n in order {
            let new_in = in_f(&next, n);
            if let Some(slot) = next.get_mut(&n) {
                slot.0 = new_in;
            }
            let new_out = out_f(&next, n);
            if let Some(slot) = next.get_mut(&n) {
                slot.1 = new_out;
            }
        }
        if next == cur {
            debug!(sweeps, nodes = order.len(), "dataflow solver converged");
            return next;
        }
        cur = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::types::{BBGr, BasicBlock};
    use rustc_hash::FxHashSet;

    fn linear() -> BBGr<()> {
        let blocks: FxHashMap<usize, BasicBlock<()>> =
            [(0, vec![]), (1, vec![]), (2, vec![])].into_iter().collect();
        BBGr::new(blocks, vec![(0, 1), (1, 2)])
    }

    #[test]
    fn constant_transfer_converges_immediately() {
        let gr = linear();
        let sol = dataflow_solver(
            &gr,
            |_| (0u32, 0u32),
            &[0, 1, 2],
            |_, _| 1,
            |_, _| 2,
        );
        assert_eq!(sol[&1], (1, 2));
    }

    #[test]
    fn forward_propagation_reaches_fixpoint() {
        // out(n) = in(n) ∪ {n}; in(n) = ∪ out(pred): node 2 sees {0, 1, 2}.
        let gr = linear();
        let order = [0usize, 1, 2];
        let sol = dataflow_solver(
            &gr,
            |_| (FxHashSet::default(), FxHashSet::<usize>::default()),
            &order,
            |m, n| {
                let mut s = FxHashSet::default();
                for &p in gr.predecessors(n) {
                    if let Some((_, out)) = m.get(&p) {
                        s.extend(out.iter().copied());
                    }
                }
                s
            },
            |m, n| {
                let mut s = m[&n].0.clone();
                s.insert(n);
                s
            },
        );
        let expected: FxHashSet<usize> = [0, 1, 2].into_iter().collect();
        assert_eq!(sol[&2].1, expected);
    }
}
