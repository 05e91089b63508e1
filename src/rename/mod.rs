//! Scope analysis and unique renaming.
//!
//! Walks the program units of a file maintaining a lexical scope stack and a
//! stack of renaming environments, assigns every program unit and every
//! variable binding a file-unique name, and rewrites variable references to
//! use it. A rewritten occurrence both replaces the source spelling and
//! records the unique name in the node's annotation, so
//! [`crate::ast::annotation::var_name`] sees it either way.
//!
//! Unique names are built from the enclosing scope, the source spelling, and
//! a monotonically increasing counter, and always start with the root scope
//! sentinel `_`. Since `_` cannot start a Fortran identifier, collision with
//! any source name is impossible by construction, and the leading underscore
//! doubles as the already-renamed guard that makes renaming idempotent.
//!
//! Scope handling is strictly LIFO: every push is paired with a pop on all
//! paths, so the externally visible [`RenameState`] always ends at the root
//! scope with a single empty environment.

use rustc_hash::FxHashMap;
use tracing::trace;

use crate::ast::annotation::Analysis;
use crate::ast::types::{
    Annotated, Block, Expression, Name, ProgramFile, ProgramUnit, Statement, Value,
};
use crate::ast::visit::{rewrite_block_lists, rewrite_exprs_in_block, rewrite_exprs_in_blocks,
    rewrite_exprs_in_expr};

/// Root scope sentinel at the bottom of the scope stack.
const ROOT_SCOPE: &str = "_";

/// Threaded renamer state.
///
/// The scope stack and environment stack are innermost-first (top is the
/// last element). `uniq` is the unbounded fresh-number source; it is dropped
/// from the externally visible [`RenameState`].
#[derive(Debug)]
struct RenameCtx {
    scope_stack: Vec<Name>,
    uniq: u64,
    env_stack: Vec<FxHashMap<Name, Name>>,
}

impl RenameCtx {
    fn new() -> Self {
        Self {
            scope_stack: vec![ROOT_SCOPE.to_string()],
            uniq: 0,
            env_stack: vec![FxHashMap::default()],
        }
    }

    /// Consume the next fresh number. Monotonic, never reused.
    fn fresh(&mut self) -> u64 {
        self.uniq += 1;
        self.uniq
    }

    fn innermost_scope(&self) -> &str {
        self.scope_stack
            .last()
            .map(String::as_str)
            .unwrap_or(ROOT_SCOPE)
    }

    fn push_scope(&mut self, scope: Name) {
        trace!(scope = %scope, "push scope");
        self.scope_stack.push(scope);
    }

    fn pop_scope(&mut self) {
        debug_assert!(self.scope_stack.len() > 1, "popping the root scope");
        let popped = self.scope_stack.pop();
        trace!(scope = ?popped, "pop scope");
    }

    fn push_env(&mut self, env: FxHashMap<Name, Name>) {
        self.env_stack.push(env);
    }

    fn pop_env(&mut self) {
        debug_assert!(self.env_stack.len() > 1, "popping the root environment");
        self.env_stack.pop();
    }

    fn into_state(self) -> RenameState {
        RenameState {
            scope_stack: self.scope_stack,
            env_stack: self.env_stack,
        }
    }
}

/// Externally visible renamer state: the stacks at the end of the run, with
/// the fresh-number source dropped. After a complete [`rename`] both stacks
/// are back at their initial height.
#[derive(Debug, Clone, PartialEq)]
pub struct RenameState {
    pub scope_stack: Vec<Name>,
    pub env_stack: Vec<FxHashMap<Name, Name>>,
}

/// Rename every program unit and variable binding in the file.
///
/// Total over well-formed trees: undeclared variables simply keep their
/// source names for later passes to flag. Idempotent: names already carrying
/// the `_` prefix and units already carrying a unique name are left alone.
pub fn rename<A>(mut pf: ProgramFile<Analysis<A>>) -> (ProgramFile<Analysis<A>>, RenameState) {
    let mut ctx = RenameCtx::new();
    for pu in &mut pf.program_units {
        rename_unit(&mut ctx, pu);
    }
    (pf, ctx.into_state())
}

fn rename_unit<A>(ctx: &mut RenameCtx, pu: &mut ProgramUnit<Analysis<A>>) {
    let unit_name = match &pu.anno().unique_name {
        // Already renamed: keep the existing name, consume nothing.
        Some(existing) => existing.clone(),
        None => {
            let k = ctx.fresh();
            format!("{}_{}{}", ctx.innermost_scope(), pu.unit_name().render(), k)
        }
    };
    ctx.push_scope(unit_name.clone());

    // Parameter environment: each formal argument gets a unit-qualified
    // unique name. For functions the result name (and the function's own
    // name) bind to the unit name itself, so a write to either is a write
    // to the return value.
    let mut env: FxHashMap<Name, Name> = FxHashMap::default();
    if let Some(args) = pu.args() {
        for a in args {
            if let Some(v) = a.source_var() {
                if !v.starts_with('_') && !env.contains_key(v) {
                    let u = format!("{}_{}{}", unit_name, v, ctx.fresh());
                    env.insert(v.clone(), u);
                }
            }
        }
    }
    if let ProgramUnit::Function { name, result, .. } = &*pu {
        env.insert(name.clone(), unit_name.clone());
        if let Some(result) = result {
            env.insert(result.clone(), unit_name.clone());
        }
    }

    ctx.push_env(env.clone());
    {
        let mut rewrite = |e: &mut Expression<Analysis<A>>| rewrite_with_env(&env, e);
        if let Some(args) = pu.args_mut() {
            for a in args.iter_mut() {
                rewrite_exprs_in_expr(a, &mut rewrite);
            }
        }
        rewrite_exprs_in_blocks(pu.body_mut(), &mut rewrite);
    }
    ctx.pop_env();

    // Declaration scoping: open an environment for every declaration
    // statement, innermost block lists first, covering the declaration and
    // everything after it in its list. Inner declarations are handled before
    // outer ones, so shadowing resolves to the innermost binding.
    let scope = unit_name.clone();
    let is_module = matches!(pu, ProgramUnit::Module { .. });
    let mut module_env: FxHashMap<Name, Name> = FxHashMap::default();
    rewrite_block_lists(pu.body_mut(), &mut |blocks| {
        let envs = rename_decl_scopes(ctx, &scope, blocks);
        if is_module {
            for env in envs {
                module_env.extend(env);
            }
        }
    });

    // Nested procedures are renamed under this unit's scope.
    if let Some(subprograms) = pu.subprograms_mut() {
        for sp in subprograms.iter_mut() {
            rename_unit(ctx, sp);
        }
    }

    ctx.pop_scope();
    let anno = pu.anno_mut();
    anno.unique_name = Some(unit_name);
    if is_module {
        anno.module_env = Some(module_env);
    }
}

/// Handle the declaration statements of one block list, last to first.
///
/// For each declaration, a fresh environment binding its declarators is
/// pushed, the declaration and the remainder of the list are rewritten under
/// it, and the environment is popped. Returns the environments created, for
/// module-environment bookkeeping.
fn rename_decl_scopes<A>(
    ctx: &mut RenameCtx,
    scope: &str,
    blocks: &mut [Block<Analysis<A>>],
) -> Vec<FxHashMap<Name, Name>> {
    let mut created = Vec::new();
    for i in (0..blocks.len()).rev() {
        let env = match &blocks[i] {
            Block::Statement {
                statement: Statement::Declaration { declarators, .. },
                ..
            } => {
                let mut env: FxHashMap<Name, Name> = FxHashMap::default();
                for d in declarators {
                    // Array declarators bind their base name exactly like
                    // scalar ones; the dimension bounds are uses.
                    if let Some(v) = d.name_expr().source_var() {
                        if !v.starts_with('_') && !env.contains_key(v) {
                            env.insert(v.clone(), format!("{}_{}_{}", scope, v, ctx.fresh()));
                        }
                    }
                }
                env
            }
            _ => continue,
        };
        if env.is_empty() {
            continue;
        }
        ctx.push_env(env.clone());
        let mut rewrite = |e: &mut Expression<Analysis<A>>| rewrite_with_env(&env, e);
        for b in blocks[i..].iter_mut() {
            rewrite_exprs_in_block(b, &mut rewrite);
        }
        ctx.pop_env();
        created.push(env);
    }
    created
}

/// The variable rewrite rule: innermost environment only, `_`-prefixed
/// spellings are already renamed and pass through untouched. Lookup does not
/// walk the environment stack; scopes are entered with explicitly built
/// environments, so the innermost one is the whole story.
fn rewrite_with_env<A>(env: &FxHashMap<Name, Name>, e: &mut Expression<Analysis<A>>) {
    if let Expression::Value {
        anno,
        value: Value::Variable(v),
        ..
    } = e
    {
        if v.starts_with('_') {
            return;
        }
        if let Some(u) = env.get(v) {
            anno.unique_name = Some(u.clone());
            *v = u.clone();
        }
    }
}
