//! AST data model, analysis annotations, and structural traversal.
//!
//! - [`types`] - the node hierarchy supplied by the parser collaborator
//! - [`annotation`] - the [`annotation::Analysis`] wrapper the analyses
//!   extend in place, plus `init_analysis`/`strip_analysis`
//! - [`visit`] - pre-order collection and bottom-up rewriting of subterms

pub mod annotation;
pub mod types;
pub mod visit;

pub use annotation::{
    gen_var, init_analysis, pu_name, strip_analysis, try_var_name, var_name, Analysis,
    ConstructType, IdType,
};
pub use types::{
    Annotated, BaseType, BinaryOp, Block, Declarator, DoSpec, Expression, Name, ProgramFile,
    ProgramUnit, ProgramUnitName, SrcSpan, Statement, TypeSpec, UnaryOp, Value,
};
