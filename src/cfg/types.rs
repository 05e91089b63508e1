//! Basic-block graph type definitions.
//!
//! A [`BBGr`] is produced per program unit by the basic-block partitioning
//! collaborator and stored inside the unit's analysis annotation. Nodes are
//! plain integers, node 0 is the entry, and each node carries the ordered
//! sequence of AST-blocks that form the basic block. The graph is opaque to
//! generic AST traversal: walking an annotated tree never descends into it.

use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;

use crate::ast::annotation::Analysis;
use crate::ast::types::{Annotated, Block};
use crate::error::{AnalysisError, Result};

/// Entry node of every basic-block graph.
pub const ENTRY: usize = 0;

/// A basic block: a maximal straight-line sequence of AST-blocks.
pub type BasicBlock<A> = Vec<Block<Analysis<A>>>;

/// Cached adjacency lists for O(1) successor/predecessor lookups.
///
/// Built lazily on first access. Rebuilt from scratch whenever the graph is
/// cloned, so the cache never outlives the edges it was derived from.
#[derive(Debug)]
pub struct AdjacencyCache {
    successors: FxHashMap<usize, Vec<usize>>,
    predecessors: FxHashMap<usize, Vec<usize>>,
}

/// Basic-block graph for one program unit.
#[derive(Debug)]
pub struct BBGr<A> {
    /// Node id -> basic block payload.
    pub blocks: FxHashMap<usize, BasicBlock<A>>,
    /// Directed control-transfer edges.
    pub edges: Vec<(usize, usize)>,
    adjacency_cache: OnceCell<AdjacencyCache>,
}

impl<A: Clone> Clone for BBGr<A> {
    fn clone(&self) -> Self {
        Self {
            blocks: self.blocks.clone(),
            edges: self.edges.clone(),
            // Cache is derived state, rebuilt lazily on the clone.
            adjacency_cache: OnceCell::new(),
        }
    }
}

impl<A: PartialEq> PartialEq for BBGr<A> {
    fn eq(&self, other: &Self) -> bool {
        self.blocks == other.blocks && self.edges == other.edges
    }
}

impl<A> BBGr<A> {
    /// Create a graph from node payloads and edges.
    #[must_use]
    pub fn new(blocks: FxHashMap<usize, BasicBlock<A>>, edges: Vec<(usize, usize)>) -> Self {
        Self {
            blocks,
            edges,
            adjacency_cache: OnceCell::new(),
        }
    }

    /// The entry node. Always 0 by construction of the partitioning pass.
    #[inline]
    pub fn entry(&self) -> usize {
        ENTRY
    }

    /// Node ids in ascending order, for deterministic iteration.
    pub fn node_ids(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = self.blocks.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn build_adjacency(&self) -> AdjacencyCache {
        let mut successors: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
        let mut predecessors: FxHashMap<usize, Vec<usize>> = FxHashMap::default();
        for &(from, to) in &self.edges {
            successors.entry(from).or_default().push(to);
            predecessors.entry(to).or_default().push(from);
        }
        // Sorted neighbor lists keep every derived traversal deterministic.
        for v in successors.values_mut().chain(predecessors.values_mut()) {
            v.sort_unstable();
            v.dedup();
        }
        AdjacencyCache {
            successors,
            predecessors,
        }
    }

    #[inline]
    fn adjacency(&self) -> &AdjacencyCache {
        self.adjacency_cache.get_or_init(|| self.build_adjacency())
    }

    /// Successors of a node. First call builds the adjacency cache.
    pub fn successors(&self, node: usize) -> &[usize] {
        self.adjacency()
            .successors
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Predecessors of a node. First call builds the adjacency cache.
    pub fn predecessors(&self, node: usize) -> &[usize] {
        self.adjacency()
            .predecessors
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Injection from instruction label to the AST-block carrying it.
    ///
    /// Blocks without a label (comments the partitioner kept) are skipped.
    ///
    /// # Errors
    ///
    /// [`AnalysisError::DuplicateLabel`] when two blocks share a label; the
    /// partitioning collaborator guarantees labels are unique per file, so a
    /// duplicate means the input is malformed.
    pub fn block_map(&self) -> Result<FxHashMap<usize, &Block<Analysis<A>>>> {
        let mut map: FxHashMap<usize, &Block<Analysis<A>>> = FxHashMap::default();
        for node in self.node_ids() {
            for block in &self.blocks[&node] {
                if let Some(label) = block.anno().ins_label {
                    if map.insert(label, block).is_some() {
                        return Err(AnalysisError::DuplicateLabel { label });
                    }
                }
            }
        }
        Ok(map)
    }

    /// Validate structural invariants: entry node present, every edge
    /// endpoint present in the node map.
    pub fn validate(&self) -> Result<()> {
        if !self.blocks.contains_key(&ENTRY) {
            return Err(AnalysisError::MissingEntry);
        }
        for &(from, to) in &self.edges {
            if !self.blocks.contains_key(&from) || !self.blocks.contains_key(&to) {
                return Err(AnalysisError::InvalidEdge { from, to });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_graph() -> BBGr<()> {
        let mut blocks: FxHashMap<usize, BasicBlock<()>> = FxHashMap::default();
        blocks.insert(0, vec![]);
        blocks.insert(1, vec![]);
        blocks.insert(2, vec![]);
        BBGr::new(blocks, vec![(0, 1), (1, 2)])
    }

    #[test]
    fn adjacency_lookup() {
        let gr = linear_graph();
        assert_eq!(gr.successors(0), &[1]);
        assert_eq!(gr.successors(1), &[2]);
        assert_eq!(gr.successors(2), &[] as &[usize]);
        assert_eq!(gr.predecessors(2), &[1]);
        assert_eq!(gr.predecessors(0), &[] as &[usize]);
    }

    #[test]
    fn validate_rejects_dangling_edge() {
        let mut gr = linear_graph();
        gr.edges.push((2, 9));
        assert!(matches!(
            gr.validate(),
            Err(AnalysisError::InvalidEdge { from: 2, to: 9 })
        ));
    }

    #[test]
    fn validate_requires_entry() {
        let mut blocks: FxHashMap<usize, BasicBlock<()>> = FxHashMap::default();
        blocks.insert(1, vec![]);
        let gr = BBGr::new(blocks, vec![]);
        assert!(matches!(gr.validate(), Err(AnalysisError::MissingEntry)));
    }

    #[test]
    fn node_ids_sorted() {
        let mut blocks: FxHashMap<usize, BasicBlock<()>> = FxHashMap::default();
        blocks.insert(2, vec![]);
        blocks.insert(0, vec![]);
        blocks.insert(1, vec![]);
        let gr = BBGr::new(blocks, vec![]);
        assert_eq!(gr.node_ids(), vec![0, 1, 2]);
    }
}
