//! Dataflow framework: generic fixed-point solver plus the concrete
//! intraprocedural analyses built on it.
//!
//! - [`solver`] - iterate-to-fixpoint engine, parameterized by lattice,
//!   visiting order, and transfer functions
//! - [`live_variables`] - backward/union liveness
//! - [`reaching_definitions`] - forward/union reaching definitions, def-use
//!   and use-def chains, flows-to closure
//! - [`loops`] - back-edge detection and natural-loop recovery

pub mod live_variables;
pub mod loops;
pub mod reaching_definitions;
pub mod solver;

pub use live_variables::{live_variables, LiveVariables};
pub use loops::{back_edges, loop_nodes, BackEdgeMap};
pub use reaching_definitions::{
    def_map, du_map, flows_to, reaching_definitions, ud_map, BlockMap, DUMap, DefMap,
    FlowsGraph, ReachingDefinitions, UDMap,
};
pub use solver::{dataflow_solver, InOutMap};
