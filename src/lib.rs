//! fortran-flow - static-analysis core for parsed Fortran.
//!
//! This library consumes a parsed Fortran program (an AST supplied by a
//! parser collaborator) and derives the relations downstream tools build on:
//! per-scope unique names for every program entity, and a family of
//! intraprocedural dataflow analyses over a basic-block control-flow graph.
//!
//! # Architecture
//!
//! The crate is organized in layers, leaves first:
//!
//! - **AST layer** ([`ast`]): the node hierarchy, the [`ast::Analysis`]
//!   annotation wrapper every pass extends in place, and generic structural
//!   traversal.
//! - **Renamer** ([`rename`]): lexical scope analysis assigning a
//!   file-unique name to every program unit and variable binding.
//! - **Semantic helpers** ([`semantics`]): the syntactic use/def queries the
//!   analyses are built on.
//! - **CFG layer** ([`cfg`]): the per-unit basic-block graph plus dominator,
//!   ordering, and SCC primitives.
//! - **Dataflow layer** ([`dataflow`]): a generic fixed-point solver and the
//!   concrete analyses - live variables, reaching definitions, def-use and
//!   use-def chains, flows-to closure, back edges, natural loops.
//! - **Call graph** ([`callgraph`]): the interprocedural call map.
//! - **Reporting** ([`report`]): deterministic textual and JSON rendering of
//!   all derived relations.
//!
//! # Pipeline
//!
//! ```text
//! parser -> init_analysis -> (basic-block pass) -> rename -> analyses -> report
//! ```
//!
//! The basic-block partitioning pass is an external collaborator: it fills
//! the `ins_label` slot of every AST-block and the `b_blocks` slot of every
//! program unit. Everything downstream is a pure function of the annotated
//! tree.
//!
//! # Quick start
//!
//! ```
//! use fortran_flow::ast::ProgramFile;
//! use fortran_flow::{init_analysis, rename, show_data_flow};
//!
//! // An empty program file straight from the parser (annotation type ()).
//! let pf: ProgramFile<()> = ProgramFile::new((), vec![]);
//!
//! // Wrap annotations and rename; scope state comes back balanced.
//! let (pf, state) = rename(init_analysis(pf));
//! assert_eq!(state.scope_stack, vec!["_".to_string()]);
//!
//! // No unit carries a basic-block graph yet, so the report is empty.
//! assert!(show_data_flow(&pf).is_empty());
//! ```

pub mod ast;
pub mod callgraph;
pub mod cfg;
pub mod dataflow;
pub mod error;
pub mod rename;
pub mod report;
pub mod semantics;

// Error types - most important for users
pub use error::{AnalysisError, Result};

// Annotation layer
pub use ast::annotation::{
    gen_var, init_analysis, pu_name, strip_analysis, try_var_name, var_name, Analysis,
    ConstructType, IdType,
};

// Renamer
pub use rename::{rename, RenameState};

// Semantic helpers
pub use semantics::{
    all_lhs_vars, all_vars, block_var_defs, block_var_uses, is_l_expr, lhs_exprs,
};

// Graph layer
pub use cfg::{
    dominators, idominators, post_order, pre_order, rev_post_order, rev_pre_order, scc, topsort,
    BBGr, BasicBlock, DomMap, IDomMap, ENTRY,
};

// Dataflow solver and analyses
pub use dataflow::{
    back_edges, dataflow_solver, def_map, du_map, flows_to, live_variables, loop_nodes,
    reaching_definitions, ud_map, BackEdgeMap, BlockMap, DUMap, DefMap, FlowsGraph, InOutMap,
    LiveVariables, ReachingDefinitions, UDMap,
};

// Call map
pub use callgraph::{gen_call_map, CallMap};

// Reporting facade
pub use report::{data_flow_json, show_data_flow, unit_report};
