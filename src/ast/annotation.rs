//! Analysis annotation layer.
//!
//! Every AST node carries a caller-supplied annotation. [`init_analysis`]
//! wraps each of those in an [`Analysis`] record that the renamer, the
//! basic-block collaborator, and the dataflow analyses extend in place;
//! [`strip_analysis`] is the exact inverse. Round-trip law:
//! `strip_analysis(init_analysis(pf)) == pf` for every tree.

use rustc_hash::FxHashMap;

use crate::ast::types::{
    Annotated, BaseType, Expression, Name, ProgramFile, ProgramUnit, SrcSpan, Value,
};
use crate::cfg::types::BBGr;

/// Identifier classification recorded by later semantic passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructType {
    Function,
    Subroutine,
    Variable,
    Array,
    Parameter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IdType {
    pub base_type: Option<BaseType>,
    pub construct_type: ConstructType,
}

/// Analysis metadata layered over the caller's original annotation.
///
/// `b_blocks` holds the basic-block graph for program-unit nodes once the
/// partitioning pass has run. It lives inside the annotation precisely so
/// that structural traversal of the tree treats it as an opaque leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis<A> {
    /// The original annotation, preserved verbatim.
    pub prev: A,
    /// Unique name, populated by renaming for variable references and
    /// program-unit headers.
    pub unique_name: Option<Name>,
    /// Basic-block graph, populated on program units by the partitioner.
    pub b_blocks: Option<Box<BBGr<A>>>,
    /// Instruction label, unique per program file, populated on AST-blocks
    /// by the partitioner.
    pub ins_label: Option<usize>,
    /// Module-local name -> unique name, populated on module units.
    pub module_env: Option<FxHashMap<Name, Name>>,
    /// Identifier classification.
    pub id_type: Option<IdType>,
}

impl<A> Analysis<A> {
    /// Wrap an original annotation; every analysis slot starts empty.
    pub fn new(prev: A) -> Self {
        Self {
            prev,
            unique_name: None,
            b_blocks: None,
            ins_label: None,
            module_env: None,
            id_type: None,
        }
    }
}

impl<A: Default> Default for Analysis<A> {
    fn default() -> Self {
        Self::new(A::default())
    }
}

/// Wrap every annotation in the file with an empty [`Analysis`] record.
pub fn init_analysis<A>(pf: ProgramFile<A>) -> ProgramFile<Analysis<A>> {
    pf.map_anno(&mut Analysis::new)
}

/// Drop all analysis metadata, restoring the original annotations.
pub fn strip_analysis<A>(pf: ProgramFile<Analysis<A>>) -> ProgramFile<A> {
    pf.map_anno(&mut |a| a.prev)
}

/// The name of a variable reference: its unique name when renaming has run,
/// otherwise its source spelling.
///
/// # Panics
///
/// Panics when `e` is not a variable reference. That is a caller invariant
/// violation, not a recoverable condition; use [`try_var_name`] to probe.
pub fn var_name<A>(e: &Expression<Analysis<A>>) -> &Name {
    match try_var_name(e) {
        Some(n) => n,
        None => panic!("var_name: expression at {} is not a variable", e.span()),
    }
}

/// As [`var_name`], returning `None` on non-variable expressions.
pub fn try_var_name<A>(e: &Expression<Analysis<A>>) -> Option<&Name> {
    match e {
        Expression::Value {
            anno,
            value: Value::Variable(n),
            ..
        } => Some(anno.unique_name.as_ref().unwrap_or(n)),
        _ => None,
    }
}

/// Synthesize a variable expression whose source and unique name are both
/// `name`. Used when later passes generate intermediate code.
pub fn gen_var<A>(prev: A, span: SrcSpan, name: &str) -> Expression<Analysis<A>> {
    let mut anno = Analysis::new(prev);
    anno.unique_name = Some(name.to_string());
    Expression::Value {
        anno,
        span,
        value: Value::Variable(name.to_string()),
    }
}

/// The program unit's unique name when renaming has run, else its source
/// name in canonical rendering.
pub fn pu_name<A>(pu: &ProgramUnit<Analysis<A>>) -> Name {
    pu.anno()
        .unique_name
        .clone()
        .unwrap_or_else(|| pu.unit_name().render())
}
