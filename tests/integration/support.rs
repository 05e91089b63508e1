//! Shared builders for integration tests: hand-assembled ASTs and
//! basic-block graphs, standing in for the parser and partitioner
//! collaborators.

#![allow(dead_code)]

use fortran_flow::ast::types::{
    Annotated, BaseType, BinaryOp, Block, Declarator, Expression, ProgramFile, ProgramUnit,
    SrcSpan, Statement, TypeSpec, Value,
};
use fortran_flow::ast::Analysis;
use fortran_flow::cfg::{BBGr, BasicBlock};
use rustc_hash::{FxHashMap, FxHashSet};

pub type Anno = Analysis<()>;

pub fn var(n: &str) -> Expression<Anno> {
    Expression::Value {
        anno: Analysis::new(()),
        span: SrcSpan::line(1),
        value: Value::Variable(n.to_string()),
    }
}

pub fn int(n: &str) -> Expression<Anno> {
    Expression::Value {
        anno: Analysis::new(()),
        span: SrcSpan::line(1),
        value: Value::Integer(n.to_string()),
    }
}

pub fn add(lhs: Expression<Anno>, rhs: Expression<Anno>) -> Expression<Anno> {
    Expression::Binary {
        anno: Analysis::new(()),
        span: SrcSpan::line(1),
        op: BinaryOp::Add,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

pub fn fn_call(f: &str, args: Vec<Expression<Anno>>) -> Expression<Anno> {
    Expression::FunctionCall {
        anno: Analysis::new(()),
        span: SrcSpan::line(1),
        callee: Box::new(var(f)),
        args: Some(args),
    }
}

pub fn assign(lhs: Expression<Anno>, rhs: Expression<Anno>) -> Block<Anno> {
    Block::Statement {
        anno: Analysis::new(()),
        span: SrcSpan::line(1),
        statement: Statement::Assign {
            span: SrcSpan::line(1),
            lhs,
            rhs,
        },
    }
}

pub fn call_stmt(sub: &str, args: Option<Vec<Expression<Anno>>>) -> Block<Anno> {
    Block::Statement {
        anno: Analysis::new(()),
        span: SrcSpan::line(1),
        statement: Statement::Call {
            span: SrcSpan::line(1),
            callee: var(sub),
            args,
        },
    }
}

pub fn print_of(n: &str) -> Block<Anno> {
    Block::Statement {
        anno: Analysis::new(()),
        span: SrcSpan::line(1),
        statement: Statement::Print {
            span: SrcSpan::line(1),
            args: vec![var(n)],
        },
    }
}

pub fn declaration(names: &[&str]) -> Block<Anno> {
    Block::Statement {
        anno: Analysis::new(()),
        span: SrcSpan::line(1),
        statement: Statement::Declaration {
            span: SrcSpan::line(1),
            type_spec: TypeSpec::new(BaseType::Integer),
            declarators: names
                .iter()
                .map(|n| Declarator::Var {
                    anno: Analysis::new(()),
                    span: SrcSpan::line(1),
                    name: var(n),
                })
                .collect(),
        },
    }
}

/// Attach an instruction label, as the basic-block pass would.
pub fn labeled(mut b: Block<Anno>, label: usize) -> Block<Anno> {
    b.anno_mut().ins_label = Some(label);
    b
}

pub fn subroutine(name: &str, args: &[&str], body: Vec<Block<Anno>>) -> ProgramUnit<Anno> {
    ProgramUnit::Subroutine {
        anno: Analysis::new(()),
        span: SrcSpan::line(1),
        name: name.to_string(),
        args: Some(args.iter().map(|a| var(a)).collect()),
        body,
        subprograms: vec![],
    }
}

pub fn main_unit(name: &str, body: Vec<Block<Anno>>) -> ProgramUnit<Anno> {
    ProgramUnit::Main {
        anno: Analysis::new(()),
        span: SrcSpan::line(1),
        name: Some(name.to_string()),
        body,
        subprograms: vec![],
    }
}

pub fn file(units: Vec<ProgramUnit<Anno>>) -> ProgramFile<Anno> {
    ProgramFile::new(Analysis::new(()), units)
}

/// Build a basic-block graph from `(node, blocks)` pairs and edges, as the
/// partitioning pass would.
pub fn graph(nodes: Vec<(usize, BasicBlock<()>)>, edges: &[(usize, usize)]) -> BBGr<()> {
    let blocks: FxHashMap<usize, BasicBlock<()>> = nodes.into_iter().collect();
    BBGr::new(blocks, edges.to_vec())
}

/// Store a graph in a unit's annotation, as the partitioning pass would.
pub fn attach_graph(pu: &mut ProgramUnit<Anno>, gr: BBGr<()>) {
    pu.anno_mut().b_blocks = Some(Box::new(gr));
}

pub fn name_set(names: &[&str]) -> FxHashSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

pub fn label_set(labels: &[usize]) -> FxHashSet<usize> {
    labels.iter().copied().collect()
}
