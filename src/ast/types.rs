//! AST type definitions.
//!
//! The parsed-Fortran tree this crate consumes. The parser itself lives in a
//! collaborator crate; what matters here is the node hierarchy and the
//! annotation slot every node carries. All node types are generic over the
//! annotation `A` so the analysis layer can wrap and unwrap annotations
//! without touching tree structure (see [`crate::ast::annotation`]).

use std::fmt;

/// A source-level identifier spelling.
pub type Name = String;

/// Half-open source region, 1-indexed lines, 0-indexed columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SrcSpan {
    pub start_line: u32,
    pub start_col: u32,
    pub end_line: u32,
    pub end_col: u32,
}

impl SrcSpan {
    /// Create a span covering an explicit region.
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Create a span covering a single whole line.
    pub fn line(line: u32) -> Self {
        Self {
            start_line: line,
            start_col: 0,
            end_line: line,
            end_col: 0,
        }
    }
}

impl fmt::Display for SrcSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}-{}:{}", self.start_line, self.start_col, self.end_line, self.end_col)
    }
}

// =============================================================================
// Program structure
// =============================================================================

/// A whole parsed source file: the root of the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramFile<A> {
    pub anno: A,
    pub program_units: Vec<ProgramUnit<A>>,
}

impl<A> ProgramFile<A> {
    pub fn new(anno: A, program_units: Vec<ProgramUnit<A>>) -> Self {
        Self {
            anno,
            program_units,
        }
    }
}

/// Name of a program unit, stable under renaming.
///
/// Fortran allows an anonymous main program and anonymous block data; the
/// structured forms keep those distinguishable from an explicitly named unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProgramUnitName {
    Named(Name),
    NamelessMain,
    NamelessBlockData,
}

impl ProgramUnitName {
    /// Canonical printable rendering, restricted to identifier characters.
    pub fn render(&self) -> Name {
        match self {
            ProgramUnitName::Named(n) => n.clone(),
            ProgramUnitName::NamelessMain => "MAIN".to_string(),
            ProgramUnitName::NamelessBlockData => "BLOCKDATA".to_string(),
        }
    }
}

/// A top-level Fortran scope.
///
/// `subprograms` holds internal procedures and module procedures; block data
/// cannot contain any.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgramUnit<A> {
    Main {
        anno: A,
        span: SrcSpan,
        name: Option<Name>,
        body: Vec<Block<A>>,
        subprograms: Vec<ProgramUnit<A>>,
    },
    Function {
        anno: A,
        span: SrcSpan,
        name: Name,
        args: Option<Vec<Expression<A>>>,
        result: Option<Name>,
        body: Vec<Block<A>>,
        subprograms: Vec<ProgramUnit<A>>,
    },
    Subroutine {
        anno: A,
        span: SrcSpan,
        name: Name,
        args: Option<Vec<Expression<A>>>,
        body: Vec<Block<A>>,
        subprograms: Vec<ProgramUnit<A>>,
    },
    Module {
        anno: A,
        span: SrcSpan,
        name: Name,
        body: Vec<Block<A>>,
        subprograms: Vec<ProgramUnit<A>>,
    },
    BlockData {
        anno: A,
        span: SrcSpan,
        name: Option<Name>,
        body: Vec<Block<A>>,
    },
}

impl<A> ProgramUnit<A> {
    /// The unit's source-level name.
    pub fn unit_name(&self) -> ProgramUnitName {
        match self {
            ProgramUnit::Main { name, .. } => name
                .clone()
                .map_or(ProgramUnitName::NamelessMain, ProgramUnitName::Named),
            ProgramUnit::Function { name, .. }
            | ProgramUnit::Subroutine { name, .. }
            | ProgramUnit::Module { name, .. } => ProgramUnitName::Named(name.clone()),
            ProgramUnit::BlockData { name, .. } => name
                .clone()
                .map_or(ProgramUnitName::NamelessBlockData, ProgramUnitName::Named),
        }
    }

    /// Formal argument expressions, if this unit kind has any.
    pub fn args(&self) -> Option<&[Expression<A>]> {
        match self {
            ProgramUnit::Function { args, .. } | ProgramUnit::Subroutine { args, .. } => {
                args.as_deref()
            }
            _ => None,
        }
    }

    pub fn args_mut(&mut self) -> Option<&mut Vec<Expression<A>>> {
        match self {
            ProgramUnit::Function { args, .. } | ProgramUnit::Subroutine { args, .. } => {
                args.as_mut()
            }
            _ => None,
        }
    }

    pub fn body(&self) -> &[Block<A>] {
        match self {
            ProgramUnit::Main { body, .. }
            | ProgramUnit::Function { body, .. }
            | ProgramUnit::Subroutine { body, .. }
            | ProgramUnit::Module { body, .. }
            | ProgramUnit::BlockData { body, .. } => body,
        }
    }

    pub fn body_mut(&mut self) -> &mut Vec<Block<A>> {
        match self {
            ProgramUnit::Main { body, .. }
            | ProgramUnit::Function { body, .. }
            | ProgramUnit::Subroutine { body, .. }
            | ProgramUnit::Module { body, .. }
            | ProgramUnit::BlockData { body, .. } => body,
        }
    }

    /// Contained internal or module procedures.
    pub fn subprograms(&self) -> &[ProgramUnit<A>] {
        match self {
            ProgramUnit::Main { subprograms, .. }
            | ProgramUnit::Function { subprograms, .. }
            | ProgramUnit::Subroutine { subprograms, .. }
            | ProgramUnit::Module { subprograms, .. } => subprograms,
            ProgramUnit::BlockData { .. } => &[],
        }
    }

    pub fn subprograms_mut(&mut self) -> Option<&mut Vec<ProgramUnit<A>>> {
        match self {
            ProgramUnit::Main { subprograms, .. }
            | ProgramUnit::Function { subprograms, .. }
            | ProgramUnit::Subroutine { subprograms, .. }
            | ProgramUnit::Module { subprograms, .. } => Some(subprograms),
            ProgramUnit::BlockData { .. } => None,
        }
    }
}

// =============================================================================
// Blocks and statements
// =============================================================================

/// A statement-level unit of the tree: what the basic-block pass labels.
#[derive(Debug, Clone, PartialEq)]
pub enum Block<A> {
    /// Plain executable or specification statement.
    Statement {
        anno: A,
        span: SrcSpan,
        statement: Statement<A>,
    },
    /// If construct: `(condition, body)` clauses for the if/else-if chain,
    /// plus an optional else body.
    If {
        anno: A,
        span: SrcSpan,
        clauses: Vec<(Expression<A>, Vec<Block<A>>)>,
        else_blocks: Option<Vec<Block<A>>>,
    },
    /// Counted (or infinite, when `spec` is absent) do loop.
    Do {
        anno: A,
        span: SrcSpan,
        spec: Option<DoSpec<A>>,
        body: Vec<Block<A>>,
    },
    DoWhile {
        anno: A,
        span: SrcSpan,
        cond: Expression<A>,
        body: Vec<Block<A>>,
    },
    Comment {
        anno: A,
        span: SrcSpan,
        text: String,
    },
}

impl<A> Block<A> {
    pub fn span(&self) -> SrcSpan {
        match self {
            Block::Statement { span, .. }
            | Block::If { span, .. }
            | Block::Do { span, .. }
            | Block::DoWhile { span, .. }
            | Block::Comment { span, .. } => *span,
        }
    }
}

/// Loop control of a counted do: `do counter = initial, limit [, stride]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DoSpec<A> {
    pub counter: Expression<A>,
    pub initial: Expression<A>,
    pub limit: Expression<A>,
    pub stride: Option<Expression<A>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement<A> {
    /// Type declaration with one or more declarators.
    Declaration {
        span: SrcSpan,
        type_spec: TypeSpec,
        declarators: Vec<Declarator<A>>,
    },
    Assign {
        span: SrcSpan,
        lhs: Expression<A>,
        rhs: Expression<A>,
    },
    /// `call sub(args)`. The argument list is optional because some dialects
    /// drop the parentheses entirely for nullary calls.
    Call {
        span: SrcSpan,
        callee: Expression<A>,
        args: Option<Vec<Expression<A>>>,
    },
    Print {
        span: SrcSpan,
        args: Vec<Expression<A>>,
    },
    Return {
        span: SrcSpan,
    },
}

/// Intrinsic base type of a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Integer,
    Real,
    DoublePrecision,
    Logical,
    Character,
    Complex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeSpec {
    pub base: BaseType,
}

impl TypeSpec {
    pub fn new(base: BaseType) -> Self {
        Self { base }
    }
}

/// One entity bound by a declaration statement.
///
/// The declared name is itself a variable expression so renaming can attach
/// a unique name to the binding occurrence like any other reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Declarator<A> {
    Var {
        anno: A,
        span: SrcSpan,
        name: Expression<A>,
    },
    /// Array declarator with explicit dimension bounds. The bounds are uses,
    /// not bindings; only the base name is bound.
    Array {
        anno: A,
        span: SrcSpan,
        name: Expression<A>,
        dims: Vec<Expression<A>>,
    },
}

impl<A> Declarator<A> {
    pub fn name_expr(&self) -> &Expression<A> {
        match self {
            Declarator::Var { name, .. } | Declarator::Array { name, .. } => name,
        }
    }

    pub fn name_expr_mut(&mut self) -> &mut Expression<A> {
        match self {
            Declarator::Var { name, .. } | Declarator::Array { name, .. } => name,
        }
    }
}

// =============================================================================
// Expressions
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Minus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression<A> {
    Value {
        anno: A,
        span: SrcSpan,
        value: Value,
    },
    Unary {
        anno: A,
        span: SrcSpan,
        op: UnaryOp,
        expr: Box<Expression<A>>,
    },
    Binary {
        anno: A,
        span: SrcSpan,
        op: BinaryOp,
        lhs: Box<Expression<A>>,
        rhs: Box<Expression<A>>,
    },
    /// Array element or section access: `base(indices)`.
    Subscript {
        anno: A,
        span: SrcSpan,
        array: Box<Expression<A>>,
        indices: Vec<Expression<A>>,
    },
    FunctionCall {
        anno: A,
        span: SrcSpan,
        callee: Box<Expression<A>>,
        args: Option<Vec<Expression<A>>>,
    },
}

impl<A> Expression<A> {
    pub fn span(&self) -> SrcSpan {
        match self {
            Expression::Value { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Binary { span, .. }
            | Expression::Subscript { span, .. }
            | Expression::FunctionCall { span, .. } => *span,
        }
    }

    /// The source spelling when this is a bare variable reference.
    pub fn source_var(&self) -> Option<&Name> {
        match self {
            Expression::Value {
                value: Value::Variable(n),
                ..
            } => Some(n),
            _ => None,
        }
    }
}

/// Literal and name values at expression leaves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Variable(Name),
    Integer(String),
    Real(String),
    Logical(bool),
    Str(String),
}

// =============================================================================
// Annotation access
// =============================================================================

/// Uniform access to the annotation slot every node carries.
pub trait Annotated<A> {
    fn anno(&self) -> &A;
    fn anno_mut(&mut self) -> &mut A;
}

impl<A> Annotated<A> for ProgramFile<A> {
    fn anno(&self) -> &A {
        &self.anno
    }
    fn anno_mut(&mut self) -> &mut A {
        &mut self.anno
    }
}

impl<A> Annotated<A> for ProgramUnit<A> {
    fn anno(&self) -> &A {
        match self {
            ProgramUnit::Main { anno, .. }
            | ProgramUnit::Function { anno, .. }
            | ProgramUnit::Subroutine { anno, .. }
            | ProgramUnit::Module { anno, .. }
            | ProgramUnit::BlockData { anno, .. } => anno,
        }
    }
    fn anno_mut(&mut self) -> &mut A {
        match self {
            ProgramUnit::Main { anno, .. }
            | ProgramUnit::Function { anno, .. }
            | ProgramUnit::Subroutine { anno, .. }
            | ProgramUnit::Module { anno, .. }
            | ProgramUnit::BlockData { anno, .. } => anno,
        }
    }
}

impl<A> Annotated<A> for Block<A> {
    fn anno(&self) -> &A {
        match self {
            Block::Statement { anno, .. }
            | Block::If { anno, .. }
            | Block::Do { anno, .. }
            | Block::DoWhile { anno, .. }
            | Block::Comment { anno, .. } => anno,
        }
    }
    fn anno_mut(&mut self) -> &mut A {
        match self {
            Block::Statement { anno, .. }
            | Block::If { anno, .. }
            | Block::Do { anno, .. }
            | Block::DoWhile { anno, .. }
            | Block::Comment { anno, .. } => anno,
        }
    }
}

impl<A> Annotated<A> for Expression<A> {
    fn anno(&self) -> &A {
        match self {
            Expression::Value { anno, .. }
            | Expression::Unary { anno, .. }
            | Expression::Binary { anno, .. }
            | Expression::Subscript { anno, .. }
            | Expression::FunctionCall { anno, .. } => anno,
        }
    }
    fn anno_mut(&mut self) -> &mut A {
        match self {
            Expression::Value { anno, .. }
            | Expression::Unary { anno, .. }
            | Expression::Binary { anno, .. }
            | Expression::Subscript { anno, .. }
            | Expression::FunctionCall { anno, .. } => anno,
        }
    }
}

impl<A> Annotated<A> for Declarator<A> {
    fn anno(&self) -> &A {
        match self {
            Declarator::Var { anno, .. } | Declarator::Array { anno, .. } => anno,
        }
    }
    fn anno_mut(&mut self) -> &mut A {
        match self {
            Declarator::Var { anno, .. } | Declarator::Array { anno, .. } => anno,
        }
    }
}

// =============================================================================
// Annotation mapping
// =============================================================================

impl<A> ProgramFile<A> {
    /// Rewrite every annotation in the file with `f`, preserving tree
    /// structure exactly. This is the engine behind `init_analysis` and
    /// `strip_analysis`.
    pub fn map_anno<B>(self, f: &mut impl FnMut(A) -> B) -> ProgramFile<B> {
        ProgramFile {
            anno: f(self.anno),
            program_units: self
                .program_units
                .into_iter()
                .map(|pu| pu.map_anno(f))
                .collect(),
        }
    }
}

impl<A> ProgramUnit<A> {
    pub fn map_anno<B>(self, f: &mut impl FnMut(A) -> B) -> ProgramUnit<B> {
        match self {
            ProgramUnit::Main {
                anno,
                span,
                name,
                body,
                subprograms,
            } => ProgramUnit::Main {
                anno: f(anno),
                span,
                name,
                body: map_blocks(body, f),
                subprograms: subprograms.into_iter().map(|p| p.map_anno(f)).collect(),
            },
            ProgramUnit::Function {
                anno,
                span,
                name,
                args,
                result,
                body,
                subprograms,
            } => ProgramUnit::Function {
                anno: f(anno),
                span,
                name,
                args: args.map(|es| es.into_iter().map(|e| e.map_anno(f)).collect()),
                result,
                body: map_blocks(body, f),
                subprograms: subprograms.into_iter().map(|p| p.map_anno(f)).collect(),
            },
            ProgramUnit::Subroutine {
                anno,
                span,
                name,
                args,
                body,
                subprograms,
            } => ProgramUnit::Subroutine {
                anno: f(anno),
                span,
                name,
                args: args.map(|es| es.into_iter().map(|e| e.map_anno(f)).collect()),
                body: map_blocks(body, f),
                subprograms: subprograms.into_iter().map(|p| p.map_anno(f)).collect(),
            },
            ProgramUnit::Module {
                anno,
                span,
                name,
                body,
                subprograms,
            } => ProgramUnit::Module {
                anno: f(anno),
                span,
                name,
                body: map_blocks(body, f),
                subprograms: subprograms.into_iter().map(|p| p.map_anno(f)).collect(),
            },
            ProgramUnit::BlockData {
                anno,
                span,
                name,
                body,
            } => ProgramUnit::BlockData {
                anno: f(anno),
                span,
                name,
                body: map_blocks(body, f),
            },
        }
    }
}

fn map_blocks<A, B>(blocks: Vec<Block<A>>, f: &mut impl FnMut(A) -> B) -> Vec<Block<B>> {
    blocks.into_iter().map(|b| b.map_anno(f)).collect()
}

impl<A> Block<A> {
    pub fn map_anno<B>(self, f: &mut impl FnMut(A) -> B) -> Block<B> {
        match self {
            Block::Statement {
                anno,
                span,
                statement,
            } => Block::Statement {
                anno: f(anno),
                span,
                statement: statement.map_anno(f),
            },
            Block::If {
                anno,
                span,
                clauses,
                else_blocks,
            } => Block::If {
                anno: f(anno),
                span,
                clauses: clauses
                    .into_iter()
                    .map(|(c, bs)| (c.map_anno(f), map_blocks(bs, f)))
                    .collect(),
                else_blocks: else_blocks.map(|bs| map_blocks(bs, f)),
            },
            Block::Do {
                anno,
                span,
                spec,
                body,
            } => Block::Do {
                anno: f(anno),
                span,
                spec: spec.map(|s| s.map_anno(f)),
                body: map_blocks(body, f),
            },
            Block::DoWhile {
                anno,
                span,
                cond,
                body,
            } => Block::DoWhile {
                anno: f(anno),
                span,
                cond: cond.map_anno(f),
                body: map_blocks(body, f),
            },
            Block::Comment { anno, span, text } => Block::Comment {
                anno: f(anno),
                span,
                text,
            },
        }
    }
}

impl<A> DoSpec<A> {
    pub fn map_anno<B>(self, f: &mut impl FnMut(A) -> B) -> DoSpec<B> {
        DoSpec {
            counter: self.counter.map_anno(f),
            initial: self.initial.map_anno(f),
            limit: self.limit.map_anno(f),
            stride: self.stride.map(|e| e.map_anno(f)),
        }
    }
}

impl<A> Statement<A> {
    pub fn map_anno<B>(self, f: &mut impl FnMut(A) -> B) -> Statement<B> {
        match self {
            Statement::Declaration {
                span,
                type_spec,
                declarators,
            } => Statement::Declaration {
                span,
                type_spec,
                declarators: declarators.into_iter().map(|d| d.map_anno(f)).collect(),
            },
            Statement::Assign { span, lhs, rhs } => Statement::Assign {
                span,
                lhs: lhs.map_anno(f),
                rhs: rhs.map_anno(f),
            },
            Statement::Call { span, callee, args } => Statement::Call {
                span,
                callee: callee.map_anno(f),
                args: args.map(|es| es.into_iter().map(|e| e.map_anno(f)).collect()),
            },
            Statement::Print { span, args } => Statement::Print {
                span,
                args: args.into_iter().map(|e| e.map_anno(f)).collect(),
            },
            Statement::Return { span } => Statement::Return { span },
        }
    }
}

impl<A> Declarator<A> {
    pub fn map_anno<B>(self, f: &mut impl FnMut(A) -> B) -> Declarator<B> {
        match self {
            Declarator::Var { anno, span, name } => Declarator::Var {
                anno: f(anno),
                span,
                name: name.map_anno(f),
            },
            Declarator::Array {
                anno,
                span,
                name,
                dims,
            } => Declarator::Array {
                anno: f(anno),
                span,
                name: name.map_anno(f),
                dims: dims.into_iter().map(|e| e.map_anno(f)).collect(),
            },
        }
    }
}

impl<A> Expression<A> {
    pub fn map_anno<B>(self, f: &mut impl FnMut(A) -> B) -> Expression<B> {
        match self {
            Expression::Value { anno, span, value } => Expression::Value {
                anno: f(anno),
                span,
                value,
            },
            Expression::Unary {
                anno,
                span,
                op,
                expr,
            } => Expression::Unary {
                anno: f(anno),
                span,
                op,
                expr: Box::new(expr.map_anno(f)),
            },
            Expression::Binary {
                anno,
                span,
                op,
                lhs,
                rhs,
            } => Expression::Binary {
                anno: f(anno),
                span,
                op,
                lhs: Box::new(lhs.map_anno(f)),
                rhs: Box::new(rhs.map_anno(f)),
            },
            Expression::Subscript {
                anno,
                span,
                array,
                indices,
            } => Expression::Subscript {
                anno: f(anno),
                span,
                array: Box::new(array.map_anno(f)),
                indices: indices.into_iter().map(|e| e.map_anno(f)).collect(),
            },
            Expression::FunctionCall {
                anno,
                span,
                callee,
                args,
            } => Expression::FunctionCall {
                anno: f(anno),
                span,
                callee: Box::new(callee.map_anno(f)),
                args: args.map(|es| es.into_iter().map(|e| e.map_anno(f)).collect()),
            },
        }
    }
}
