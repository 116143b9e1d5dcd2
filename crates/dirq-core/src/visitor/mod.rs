//! Module: visitor
//! Responsibility: tree-visitor dispatch over the expression IR plus the
//! per-compile traversal state (alias bindings, directive context).
//!
//! One `CompilePass` is constructed fresh on the stack for every compile
//! call; visitors hold no cached state between calls, so concurrent
//! compiles against a shared schema provider need no synchronization.

mod alias;
mod context;

pub(crate) mod filter;
pub(crate) mod order;
pub(crate) mod select;

pub(crate) use alias::CompilePass;
pub(crate) use context::VisitContext;

use crate::{
    error::CompileError,
    expr::{CallExpr, CompareOp, Expr, MemberPath},
    value::Value,
};

///
/// Fragment
///
/// Result of visiting one sub-tree: rendered query text, or — in custom
/// mode — the literal value itself so the caller can cast/inspect it
/// before emission.
///

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Fragment {
    Text(String),
    Value(Value),
}

impl Fragment {
    pub(crate) fn into_text(self) -> Result<String, CompileError> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Value(value) => Err(CompileError::unsupported(
                "fragment",
                format!("expected rendered text, found value {value:?}"),
            )),
        }
    }

    pub(crate) fn into_value(self) -> Result<Value, CompileError> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Text(text) => Err(CompileError::unsupported(
                "fragment",
                format!("expected a literal value, found text '{text}'"),
            )),
        }
    }
}

///
/// ExprVisitor
///
/// Dispatch base for the lowering passes. `visit` drives an exhaustive
/// match over the five IR node kinds; every per-kind method defaults to an
/// unsupported-node error so each visitor opts into exactly the shapes it
/// can lower. Unsupported shapes fail fast — a miscompile is worse than a
/// hard failure.
///

pub(crate) trait ExprVisitor {
    fn visit(&mut self, expr: &Expr, ctx: &VisitContext) -> Result<Fragment, CompileError> {
        match expr {
            Expr::Root => self.visit_root(ctx),
            Expr::Member(path) => self.visit_member(path, ctx),
            Expr::Literal(value) => self.visit_literal(value, ctx),
            Expr::Compare { lhs, op, rhs } => self.visit_compare(lhs, *op, rhs, ctx),
            Expr::Call(call) => self.visit_call(call, ctx),
        }
    }

    fn visit_root(&mut self, _ctx: &VisitContext) -> Result<Fragment, CompileError> {
        Err(CompileError::unsupported(
            "root",
            "this pass cannot lower a bare lambda root",
        ))
    }

    fn visit_member(
        &mut self,
        path: &MemberPath,
        _ctx: &VisitContext,
    ) -> Result<Fragment, CompileError> {
        Err(CompileError::unsupported(
            "member",
            format!("this pass cannot lower member path '{}'", path.dotted()),
        ))
    }

    fn visit_literal(
        &mut self,
        value: &Value,
        _ctx: &VisitContext,
    ) -> Result<Fragment, CompileError> {
        Err(CompileError::unsupported(
            "literal",
            format!("this pass cannot lower literal {value:?}"),
        ))
    }

    fn visit_compare(
        &mut self,
        _lhs: &Expr,
        op: CompareOp,
        _rhs: &Expr,
        _ctx: &VisitContext,
    ) -> Result<Fragment, CompileError> {
        Err(CompileError::unsupported(
            "compare",
            format!("this pass cannot lower a '{}' comparison", op.as_aql()),
        ))
    }

    fn visit_call(
        &mut self,
        _call: &CallExpr,
        _ctx: &VisitContext,
    ) -> Result<Fragment, CompileError> {
        Err(CompileError::unsupported(
            "call",
            "this pass cannot lower method calls",
        ))
    }
}
