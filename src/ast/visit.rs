//! Generic structural traversal.
//!
//! Manual structural recursion over the tree, specialized to the two node
//! kinds the analyses query and rewrite: expressions and block lists.
//!
//! Three shapes are provided, mirroring the needs of the renamer and the
//! semantic queries:
//!
//! - `exprs_in_*`: collect every `Expression` subterm, pre-order (parent
//!   before child, left before right);
//! - `rewrite_exprs_in_*`: apply a mutation to every `Expression` subterm,
//!   bottom-up (children before parents, each node visited once);
//! - [`rewrite_block_lists`]: apply a mutation to every nested `Vec<Block>`,
//!   innermost lists first.
//!
//! Annotations are opaque to all of these: a basic-block graph stored inside
//! an annotation is never descended into.

use crate::ast::types::{Block, Declarator, DoSpec, Expression, Statement};

// =============================================================================
// Collection (pre-order)
// =============================================================================

/// Collect `e` and every expression nested within it, pre-order.
pub fn exprs_in_expr<'a, A>(e: &'a Expression<A>, out: &mut Vec<&'a Expression<A>>) {
    out.push(e);
    match e {
        Expression::Value { .. } => {}
        Expression::Unary { expr, .. } => exprs_in_expr(expr, out),
        Expression::Binary { lhs, rhs, .. } => {
            exprs_in_expr(lhs, out);
            exprs_in_expr(rhs, out);
        }
        Expression::Subscript { array, indices, .. } => {
            exprs_in_expr(array, out);
            for ix in indices {
                exprs_in_expr(ix, out);
            }
        }
        Expression::FunctionCall { callee, args, .. } => {
            exprs_in_expr(callee, out);
            if let Some(args) = args {
                for a in args {
                    exprs_in_expr(a, out);
                }
            }
        }
    }
}

/// Collect every expression within a statement, pre-order.
pub fn exprs_in_statement<'a, A>(st: &'a Statement<A>, out: &mut Vec<&'a Expression<A>>) {
    match st {
        Statement::Declaration { declarators, .. } => {
            for d in declarators {
                match d {
                    Declarator::Var { name, .. } => exprs_in_expr(name, out),
                    Declarator::Array { name, dims, .. } => {
                        exprs_in_expr(name, out);
                        for dim in dims {
                            exprs_in_expr(dim, out);
                        }
                    }
                }
            }
        }
        Statement::Assign { lhs, rhs, .. } => {
            exprs_in_expr(lhs, out);
            exprs_in_expr(rhs, out);
        }
        Statement::Call { callee, args, .. } => {
            exprs_in_expr(callee, out);
            if let Some(args) = args {
                for a in args {
                    exprs_in_expr(a, out);
                }
            }
        }
        Statement::Print { args, .. } => {
            for a in args {
                exprs_in_expr(a, out);
            }
        }
        Statement::Return { .. } => {}
    }
}

fn exprs_in_do_spec<'a, A>(spec: &'a DoSpec<A>, out: &mut Vec<&'a Expression<A>>) {
    exprs_in_expr(&spec.counter, out);
    exprs_in_expr(&spec.initial, out);
    exprs_in_expr(&spec.limit, out);
    if let Some(stride) = &spec.stride {
        exprs_in_expr(stride, out);
    }
}

/// Collect every expression within an AST-block and its nested blocks.
pub fn exprs_in_block<'a, A>(b: &'a Block<A>, out: &mut Vec<&'a Expression<A>>) {
    match b {
        Block::Statement { statement, .. } => exprs_in_statement(statement, out),
        Block::If {
            clauses,
            else_blocks,
            ..
        } => {
            for (cond, body) in clauses {
                exprs_in_expr(cond, out);
                exprs_in_blocks(body, out);
            }
            if let Some(body) = else_blocks {
                exprs_in_blocks(body, out);
            }
        }
        Block::Do { spec, body, .. } => {
            if let Some(spec) = spec {
                exprs_in_do_spec(spec, out);
            }
            exprs_in_blocks(body, out);
        }
        Block::DoWhile { cond, body, .. } => {
            exprs_in_expr(cond, out);
            exprs_in_blocks(body, out);
        }
        Block::Comment { .. } => {}
    }
}

/// Collect every expression within a block list.
pub fn exprs_in_blocks<'a, A>(blocks: &'a [Block<A>], out: &mut Vec<&'a Expression<A>>) {
    for b in blocks {
        exprs_in_block(b, out);
    }
}

// =============================================================================
// Rewriting (bottom-up)
// =============================================================================

/// Apply `f` to every expression in `e`, children before parents.
pub fn rewrite_exprs_in_expr<A>(e: &mut Expression<A>, f: &mut impl FnMut(&mut Expression<A>)) {
    match e {
        Expression::Value { .. } => {}
        Expression::Unary { expr, .. } => rewrite_exprs_in_expr(expr, f),
        Expression::Binary { lhs, rhs, .. } => {
            rewrite_exprs_in_expr(lhs, f);
            rewrite_exprs_in_expr(rhs, f);
        }
        Expression::Subscript { array, indices, .. } => {
            rewrite_exprs_in_expr(array, f);
            for ix in indices {
                rewrite_exprs_in_expr(ix, f);
            }
        }
        Expression::FunctionCall { callee, args, .. } => {
            rewrite_exprs_in_expr(callee, f);
            if let Some(args) = args {
                for a in args {
                    rewrite_exprs_in_expr(a, f);
                }
            }
        }
    }
    f(e);
}

/// Apply `f` to every expression in a statement, bottom-up.
pub fn rewrite_exprs_in_statement<A>(
    st: &mut Statement<A>,
    f: &mut impl FnMut(&mut Expression<A>),
) {
    match st {
        Statement::Declaration { declarators, .. } => {
            for d in declarators {
                match d {
                    Declarator::Var { name, .. } => rewrite_exprs_in_expr(name, f),
                    Declarator::Array { name, dims, .. } => {
                        rewrite_exprs_in_expr(name, f);
                        for dim in dims {
                            rewrite_exprs_in_expr(dim, f);
                        }
                    }
                }
            }
        }
        Statement::Assign { lhs, rhs, .. } => {
            rewrite_exprs_in_expr(lhs, f);
            rewrite_exprs_in_expr(rhs, f);
        }
        Statement::Call { callee, args, .. } => {
            rewrite_exprs_in_expr(callee, f);
            if let Some(args) = args {
                for a in args {
                    rewrite_exprs_in_expr(a, f);
                }
            }
        }
        Statement::Print { args, .. } => {
            for a in args {
                rewrite_exprs_in_expr(a, f);
            }
        }
        Statement::Return { .. } => {}
    }
}

/// Apply `f` to every expression in an AST-block, bottom-up.
pub fn rewrite_exprs_in_block<A>(b: &mut Block<A>, f: &mut impl FnMut(&mut Expression<A>)) {
    match b {
        Block::Statement { statement, .. } => rewrite_exprs_in_statement(statement, f),
        Block::If {
            clauses,
            else_blocks,
            ..
        } => {
            for (cond, body) in clauses {
                rewrite_exprs_in_expr(cond, f);
                rewrite_exprs_in_blocks(body, f);
            }
            if let Some(body) = else_blocks {
                rewrite_exprs_in_blocks(body, f);
            }
        }
        Block::Do { spec, body, .. } => {
            if let Some(spec) = spec {
                rewrite_exprs_in_expr(&mut spec.counter, f);
                rewrite_exprs_in_expr(&mut spec.initial, f);
                rewrite_exprs_in_expr(&mut spec.limit, f);
                if let Some(stride) = &mut spec.stride {
                    rewrite_exprs_in_expr(stride, f);
                }
            }
            rewrite_exprs_in_blocks(body, f);
        }
        Block::DoWhile { cond, body, .. } => {
            rewrite_exprs_in_expr(cond, f);
            rewrite_exprs_in_blocks(body, f);
        }
        Block::Comment { .. } => {}
    }
}

/// Apply `f` to every expression in a block list, bottom-up.
pub fn rewrite_exprs_in_blocks<A>(
    blocks: &mut [Block<A>],
    f: &mut impl FnMut(&mut Expression<A>),
) {
    for b in blocks {
        rewrite_exprs_in_block(b, f);
    }
}

/// Apply `f` to every nested block list, innermost lists first and the given
/// list itself last. The renamer uses this to open declaration scopes from
/// the inside out, so inner declarations shadow outer ones.
pub fn rewrite_block_lists<A>(
    blocks: &mut Vec<Block<A>>,
    f: &mut impl FnMut(&mut Vec<Block<A>>),
) {
    for b in blocks.iter_mut() {
        match b {
            Block::If {
                clauses,
                else_blocks,
                ..
            } => {
                for (_, body) in clauses {
                    rewrite_block_lists(body, f);
                }
                if let Some(body) = else_blocks {
                    rewrite_block_lists(body, f);
                }
            }
            Block::Do { body, .. } | Block::DoWhile { body, .. } => {
                rewrite_block_lists(body, f);
            }
            Block::Statement { .. } | Block::Comment { .. } => {}
        }
    }
    f(blocks);
}
