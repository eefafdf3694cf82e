//! AST nodes.
//!
//! All children are indices into the `Arena`, not boxes. The node set
//! is exactly what the type checker and the evaluator consume: the
//! statement forms, the expression forms, and the top-level
//! function/operator/class definitions.

use std::fmt;

use crate::arena::{ClassId, ExprRange, FuncId, OpId, StmtRange};
use crate::types::{MooseType, OpPosition};
use crate::{Name, Span};

/// Index of an expression in the arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct ExprId(pub u32);

/// Index of a statement in the arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct StmtId(pub u32);

/// Expression node.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

/// Expression variants.
///
/// All children are indices, so the node itself is `Copy`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    /// Integer literal: 42
    Int(i64),
    /// Float literal: 3.14 (stored as bits for Eq/Hash)
    Float(u64),
    /// String literal (interned, escapes folded)
    Str(Name),
    /// Boolean literal
    Bool(bool),
    /// The nil literal
    Nil,

    /// Variable reference
    Ident(Name),

    /// Tuple literal: (a, b)
    Tuple(ExprRange),
    /// List literal: [a, b, c]
    List(ExprRange),

    /// Prefix operator application: -x
    Prefix { op: Name, operand: ExprId },
    /// Infix operator application: a + b
    Infix { op: Name, left: ExprId, right: ExprId },
    /// Postfix operator application: x!
    Postfix { op: Name, operand: ExprId },

    /// Call by name: f(a, b). Constructor calls share this node; the
    /// checker marks them in the `TypeTable`.
    Call { callee: Name, args: ExprRange },

    /// Member access: object.member. The member is an `Ident` or a
    /// `Call` node, evaluated inside the object's environment.
    Deref { object: ExprId, member: ExprId },

    /// Index access: sequence[index]
    Index { object: ExprId, index: ExprId },

    /// The current class instance
    Me,

    /// Type test: value is Name
    Is { value: ExprId, name: Name },
}

/// Statement node.
#[derive(Clone, Eq, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

impl fmt::Debug for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} @ {:?}", self.kind, self.span)
    }
}

/// Statement variants.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum StmtKind {
    /// Expression statement; value discarded.
    Expr(ExprId),

    /// Assignment or declaration. The target is an expression in one
    /// of the assignable forms: identifier, tuple of targets, index,
    /// or member access.
    Assign {
        target: ExprId,
        /// Declared type annotation, if written.
        ty: Option<MooseType>,
        value: ExprId,
        mutable: bool,
    },

    /// Return from the enclosing function; bare `return` yields Void.
    Return(Option<ExprId>),

    /// Braced statement block; runs in a fresh child scope.
    Block(StmtRange),

    /// Conditional. Both branches are `Block` statements.
    If {
        cond: ExprId,
        then_block: StmtId,
        else_block: Option<StmtId>,
    },

    /// Function definition.
    Function(FuncId),
    /// Operator definition.
    Operation(OpId),
    /// Class definition.
    Class(ClassId),
}

/// A declared parameter.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Param {
    pub name: Name,
    pub ty: MooseType,
    pub mutable: bool,
    pub span: Span,
}

/// A function definition.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct FunctionDef {
    pub name: Name,
    pub params: Vec<Param>,
    pub ret: MooseType,
    /// A `Block` statement.
    pub body: StmtId,
    pub span: Span,
}

/// An operator definition.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct OperationDef {
    /// The operator symbol, e.g. `+`.
    pub op: Name,
    pub position: OpPosition,
    pub params: Vec<Param>,
    pub ret: MooseType,
    pub body: StmtId,
    pub span: Span,
}

/// A class property declaration.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct PropertyDef {
    pub name: Name,
    pub ty: MooseType,
    /// Optional default, evaluated into the class template.
    pub default: Option<ExprId>,
    pub span: Span,
}

/// A class definition.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ClassDef {
    pub name: Name,
    pub superclass: Option<Name>,
    pub properties: Vec<PropertyDef>,
    pub methods: Vec<FuncId>,
    pub operators: Vec<OpId>,
    pub span: Span,
}

/// A parsed program: the ordered top-level statements.
#[derive(Clone, Debug, Default)]
pub struct Module {
    pub stmts: Vec<StmtId>,
}
