//! Syntactic queries the dataflow analyses are built on.
//!
//! All name-returning helpers go through [`var_name`], so after renaming they
//! yield unique names and the analyses key their sets by binding rather than
//! by spelling.
//!
//! The one aliasing rule in the whole crate lives here: a subscripted
//! left-hand side defines the array's base name, and actual arguments of
//! calls that are l-expressions count as definitions (call-by-reference
//! actuals may be written by the callee).

use rustc_hash::FxHashSet;

use crate::ast::annotation::{try_var_name, var_name, Analysis};
use crate::ast::types::{Block, Expression, Name, Statement, Value};
use crate::ast::visit::{exprs_in_block, exprs_in_blocks, exprs_in_expr};

/// True when `e` can syntactically denote a storage location: a variable
/// reference or a subscript access.
pub fn is_l_expr<A>(e: &Expression<A>) -> bool {
    matches!(
        e,
        Expression::Value {
            value: Value::Variable(_),
            ..
        } | Expression::Subscript { .. }
    )
}

/// Every expression in assignment position within the given blocks: LHS of
/// assignments, plus call and function-call actuals that are l-expressions.
pub fn lhs_exprs<'a, A>(blocks: &'a [Block<Analysis<A>>]) -> Vec<&'a Expression<Analysis<A>>> {
    let mut all = Vec::new();
    exprs_in_blocks(blocks, &mut all);

    let mut out = Vec::new();
    for b in blocks {
        collect_stmt_lhs(b, &mut out);
    }
    // Function calls can sit anywhere inside an expression, so they come
    // from the full pre-order sweep rather than the per-statement walk.
    for e in all {
        if let Expression::FunctionCall {
            args: Some(args), ..
        } = e
        {
            out.extend(args.iter().filter(|a| is_l_expr(a)));
        }
    }
    out
}

fn collect_stmt_lhs<'a, A>(
    b: &'a Block<Analysis<A>>,
    out: &mut Vec<&'a Expression<Analysis<A>>>,
) {
    match b {
        Block::Statement { statement, .. } => match statement {
            Statement::Assign { lhs, .. } => out.push(lhs),
            Statement::Call {
                args: Some(args), ..
            } => out.extend(args.iter().filter(|a| is_l_expr(a))),
            _ => {}
        },
        Block::If {
            clauses,
            else_blocks,
            ..
        } => {
            for (_, body) in clauses {
                for b in body {
                    collect_stmt_lhs(b, out);
                }
            }
            if let Some(body) = else_blocks {
                for b in body {
                    collect_stmt_lhs(b, out);
                }
            }
        }
        Block::Do { body, .. } | Block::DoWhile { body, .. } => {
            for b in body {
                collect_stmt_lhs(b, out);
            }
        }
        Block::Comment { .. } => {}
    }
}

/// Every variable or array name appearing anywhere within the expression.
pub fn expr_vars<A>(e: &Expression<Analysis<A>>) -> FxHashSet<Name> {
    let mut exprs = Vec::new();
    exprs_in_expr(e, &mut exprs);
    exprs
        .into_iter()
        .filter_map(|e| try_var_name(e).cloned())
        .collect()
}

/// Every variable or array name appearing anywhere within the blocks.
pub fn all_vars<A>(blocks: &[Block<Analysis<A>>]) -> FxHashSet<Name> {
    let mut exprs = Vec::new();
    exprs_in_blocks(blocks, &mut exprs);
    exprs
        .into_iter()
        .filter_map(|e| try_var_name(e).cloned())
        .collect()
}

/// The names written by the given blocks: the base name of every l-expression
/// in assignment position.
pub fn all_lhs_vars<A>(blocks: &[Block<Analysis<A>>]) -> FxHashSet<Name> {
    lhs_exprs(blocks)
        .into_iter()
        .filter_map(lhs_base_name)
        .collect()
}

/// The base name of an l-expression: the variable itself, or the array name
/// under a subscript.
fn lhs_base_name<A>(e: &Expression<Analysis<A>>) -> Option<Name> {
    match e {
        Expression::Value {
            value: Value::Variable(_),
            ..
        } => Some(var_name(e).clone()),
        Expression::Subscript { array, .. } => try_var_name(array).cloned(),
        _ => None,
    }
}

/// Names *read* by a single AST-block.
///
/// Declarations read nothing; control headers read only their guards; a
/// subscripted assignment target reads its index expressions but not the
/// array itself. Anything without special structure falls back to every
/// name it mentions.
pub fn block_var_uses<A>(b: &Block<Analysis<A>>) -> FxHashSet<Name> {
    match b {
        Block::Statement { statement, .. } => match statement {
            Statement::Declaration { .. } => FxHashSet::default(),
            Statement::Assign { lhs, rhs, .. } => {
                let mut uses = expr_vars(rhs);
                if let Expression::Subscript { indices, .. } = lhs {
                    for ix in indices {
                        uses.extend(expr_vars(ix));
                    }
                }
                uses
            }
            _ => single_block_vars(b),
        },
        Block::Do {
            spec: Some(spec), ..
        } => {
            let mut uses = expr_vars(&spec.initial);
            uses.extend(expr_vars(&spec.limit));
            if let Some(stride) = &spec.stride {
                uses.extend(expr_vars(stride));
            }
            if let Expression::Subscript { indices, .. } = &spec.counter {
                for ix in indices {
                    uses.extend(expr_vars(ix));
                }
            }
            uses
        }
        Block::Do { spec: None, .. } => FxHashSet::default(),
        Block::DoWhile { cond, .. } => expr_vars(cond),
        Block::If { clauses, .. } => {
            let mut uses = FxHashSet::default();
            for (cond, _) in clauses {
                uses.extend(expr_vars(cond));
            }
            uses
        }
        Block::Comment { .. } => FxHashSet::default(),
    }
}

/// Names *written* by a single AST-block: assignment targets and written
/// call actuals for statements, the loop counter for a counted do.
pub fn block_var_defs<A>(b: &Block<Analysis<A>>) -> FxHashSet<Name> {
    match b {
        Block::Statement { statement, .. } => match statement {
            Statement::Assign { lhs, .. } => lhs_base_name(lhs).into_iter().collect(),
            Statement::Call {
                args: Some(args), ..
            } => args
                .iter()
                .filter(|a| is_l_expr(a))
                .filter_map(lhs_base_name)
                .collect(),
            _ => FxHashSet::default(),
        },
        Block::Do {
            spec: Some(spec), ..
        } => lhs_base_name(&spec.counter).into_iter().collect(),
        _ => FxHashSet::default(),
    }
}

/// `all_vars` of a single block: the fallback for statements with no
/// special use structure.
fn single_block_vars<A>(b: &Block<Analysis<A>>) -> FxHashSet<Name> {
    let mut exprs = Vec::new();
    exprs_in_block(b, &mut exprs);
    exprs
        .into_iter()
        .filter_map(|e| try_var_name(e).cloned())
        .collect()
}
