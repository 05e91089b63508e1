//! Interprocedural call map.
//!
//! A textual map from each program unit to the names it calls, collected
//! from explicit `call` statements and from function-call heads anywhere in
//! the unit's expressions. Nested procedures get their own entries; their
//! calls are not attributed to the enclosing unit.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::ast::annotation::{pu_name, Analysis};
use crate::ast::types::{Block, Expression, Name, ProgramFile, ProgramUnit, Statement};
use crate::ast::visit::exprs_in_blocks;

/// Program-unit name -> names of the subroutines and functions it calls.
pub type CallMap = FxHashMap<Name, FxHashSet<Name>>;

/// Build the call map for a whole program file.
///
/// When two units share a name their call sets are merged with set union,
/// never overwritten.
pub fn gen_call_map<A>(pf: &ProgramFile<Analysis<A>>) -> CallMap {
    let mut map: CallMap = FxHashMap::default();
    for pu in &pf.program_units {
        collect_unit(pu, &mut map);
    }
    map
}

fn collect_unit<A>(pu: &ProgramUnit<Analysis<A>>, map: &mut CallMap) {
    let callees = unit_callees(pu.body());
    map.entry(pu_name(pu)).or_default().extend(callees);
    for sp in pu.subprograms() {
        collect_unit(sp, map);
    }
}

/// Callee names within one unit body: call-statement targets plus
/// function-call heads.
fn unit_callees<A>(body: &[Block<Analysis<A>>]) -> FxHashSet<Name> {
    let mut callees: FxHashSet<Name> = FxHashSet::default();

    for b in body {
        collect_call_statements(b, &mut callees);
    }

    let mut exprs = Vec::new();
    exprs_in_blocks(body, &mut exprs);
    for e in exprs {
        if let Expression::FunctionCall { callee, .. } = e {
            if let Some(n) = callee.source_var() {
                callees.insert(n.clone());
            }
        }
    }
    callees
}

fn collect_call_statements<A>(b: &Block<Analysis<A>>, out: &mut FxHashSet<Name>) {
    match b {
        Block::Statement {
            statement: Statement::Call { callee, .. },
            ..
        } => {
            if let Some(n) = callee.source_var() {
                out.insert(n.clone());
            }
        }
        Block::Statement { .. } | Block::Comment { .. } => {}
        Block::If {
            clauses,
            else_blocks,
            ..
        } => {
            for (_, body) in clauses {
                for b in body {
                    collect_call_statements(b, out);
                }
            }
            if let Some(body) = else_blocks {
                for b in body {
                    collect_call_statements(b, out);
                }
            }
        }
        Block::Do { body, .. } | Block::DoWhile { body, .. } => {
            for b in body {
                collect_call_statements(b, out);
            }
        }
    }
}
