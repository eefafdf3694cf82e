//! Arena allocation for the flat AST.
//!
//! Contiguous storage for all nodes; child references are `u32`
//! indices, and node lists are ranges into side vectors.

use crate::ast::{ClassDef, Expr, ExprId, FunctionDef, OperationDef, Stmt, StmtId};

/// Index of a function definition in the arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct FuncId(pub u32);

/// Index of an operator definition in the arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct OpId(pub u32);

/// Index of a class definition in the arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(transparent)]
pub struct ClassId(pub u32);

/// A contiguous run of expression ids in the arena's list storage.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct ExprRange {
    pub start: u32,
    pub len: u32,
}

impl ExprRange {
    pub const EMPTY: ExprRange = ExprRange { start: 0, len: 0 };

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }
}

/// A contiguous run of statement ids in the arena's list storage.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct StmtRange {
    pub start: u32,
    pub len: u32,
}

impl StmtRange {
    pub const EMPTY: StmtRange = StmtRange { start: 0, len: 0 };

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }
}

fn to_u32(value: usize, context: &str) -> u32 {
    u32::try_from(value)
        .unwrap_or_else(|_| panic!("arena capacity exceeded: {context} has {value} elements"))
}

/// Contiguous storage for all AST nodes of one program.
#[derive(Clone, Debug, Default)]
pub struct Arena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    expr_lists: Vec<ExprId>,
    stmt_lists: Vec<StmtId>,
    functions: Vec<FunctionDef>,
    operations: Vec<OperationDef>,
    classes: Vec<ClassDef>,
}

impl Arena {
    pub fn new() -> Self {
        Arena::default()
    }

    /// Allocate an expression, returning its id.
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(to_u32(self.exprs.len(), "exprs"));
        self.exprs.push(expr);
        id
    }

    /// Allocate a statement, returning its id.
    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId(to_u32(self.stmts.len(), "stmts"));
        self.stmts.push(stmt);
        id
    }

    /// Store an expression list, returning its range.
    pub fn alloc_expr_list(&mut self, ids: Vec<ExprId>) -> ExprRange {
        let start = to_u32(self.expr_lists.len(), "expr lists");
        let len = to_u32(ids.len(), "expr list");
        self.expr_lists.extend(ids);
        ExprRange { start, len }
    }

    /// Store a statement list, returning its range.
    pub fn alloc_stmt_list(&mut self, ids: Vec<StmtId>) -> StmtRange {
        let start = to_u32(self.stmt_lists.len(), "stmt lists");
        let len = to_u32(ids.len(), "stmt list");
        self.stmt_lists.extend(ids);
        StmtRange { start, len }
    }

    pub fn alloc_function(&mut self, def: FunctionDef) -> FuncId {
        let id = FuncId(to_u32(self.functions.len(), "functions"));
        self.functions.push(def);
        id
    }

    pub fn alloc_operation(&mut self, def: OperationDef) -> OpId {
        let id = OpId(to_u32(self.operations.len(), "operations"));
        self.operations.push(def);
        id
    }

    pub fn alloc_class(&mut self, def: ClassDef) -> ClassId {
        let id = ClassId(to_u32(self.classes.len(), "classes"));
        self.classes.push(def);
        id
    }

    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.0 as usize]
    }

    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.0 as usize]
    }

    #[inline]
    pub fn exprs(&self, range: ExprRange) -> &[ExprId] {
        &self.expr_lists[range.start as usize..(range.start + range.len) as usize]
    }

    #[inline]
    pub fn stmts(&self, range: StmtRange) -> &[StmtId] {
        &self.stmt_lists[range.start as usize..(range.start + range.len) as usize]
    }

    #[inline]
    pub fn function(&self, id: FuncId) -> &FunctionDef {
        &self.functions[id.0 as usize]
    }

    #[inline]
    pub fn operation(&self, id: OpId) -> &OperationDef {
        &self.operations[id.0 as usize]
    }

    #[inline]
    pub fn class(&self, id: ClassId) -> &ClassDef {
        &self.classes[id.0 as usize]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ExprKind;
    use crate::Span;

    #[test]
    fn expr_roundtrip() {
        let mut arena = Arena::new();
        let id = arena.alloc_expr(Expr::new(ExprKind::Int(7), Span::new(0, 1)));
        assert!(matches!(arena.expr(id).kind, ExprKind::Int(7)));
    }

    #[test]
    fn list_ranges_are_contiguous() {
        let mut arena = Arena::new();
        let a = arena.alloc_expr(Expr::new(ExprKind::Int(1), Span::DUMMY));
        let b = arena.alloc_expr(Expr::new(ExprKind::Int(2), Span::DUMMY));
        let range = arena.alloc_expr_list(vec![a, b]);
        assert_eq!(arena.exprs(range), &[a, b]);
    }
}
