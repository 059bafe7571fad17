//! Typed expressions (spec §3.4).

use crate::constant::ConstantValue;
use crate::interner::Symbol;
use crate::token::{OpKind, SrcTokens};
use crate::types::Typespec;

/// How an expression's value may be used: bound by reference, assigned
/// to, or only read once (spec §3.4). References are always lvalues;
/// rvalues may bind to a `move_reference` exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueCategory {
  Lvalue,
  LvalueReference,
  Rvalue,
}

/// The classification carried alongside an expression's concrete shape
/// (spec §3.4: `kind ∈ {constant, dynamic, error, typename, function-name}`).
#[derive(Debug, Clone)]
pub enum ExprKind {
  Constant { typespec: Typespec, value: ConstantValue },
  Dynamic { typespec: Typespec },
  Error,
  Typename(Typespec),
  FunctionName(Symbol),
}

impl ExprKind {
  #[must_use] pub fn typespec(&self) -> Option<&Typespec> {
    match self {
      Self::Constant { typespec, .. } | Self::Dynamic { typespec } => Some(typespec),
      Self::Typename(t) => Some(t),
      Self::Error | Self::FunctionName(_) => None,
    }
  }

  #[must_use] pub fn constant_value(&self) -> Option<&ConstantValue> {
    match self {
      Self::Constant { value, .. } => Some(value),
      _ => None,
    }
  }

  #[must_use] pub fn is_error(&self) -> bool { matches!(self, Self::Error) }
}

/// The concrete shape of an expression node.
#[derive(Debug, Clone)]
pub enum ExprBody {
  Literal(ConstantValue),
  Identifier(Symbol),
  Unary { op: OpKind, operand: Box<Expr> },
  Binary { op: OpKind, lhs: Box<Expr>, rhs: Box<Expr> },
  Call { callee: Box<Expr>, args: Vec<Expr> },
  Cast { target: Typespec, operand: Box<Expr> },
  Subscript { base: Box<Expr>, index: Box<Expr> },
  Compound(Vec<crate::ast::stmt::Stmt>),
  If { cond: Box<Expr>, then_branch: Box<Expr>, else_branch: Option<Box<Expr>> },
}

/// `expression = { src_tokens, kind, body }` (spec §3.4), plus the value
/// category every expression carries.
#[derive(Debug, Clone)]
pub struct Expr {
  pub src_tokens: SrcTokens,
  pub kind: ExprKind,
  pub value_category: ValueCategory,
  pub body: Box<ExprBody>,
}

impl Expr {
  #[must_use] pub fn error(src_tokens: SrcTokens, body: ExprBody) -> Self {
    Self { src_tokens, kind: ExprKind::Error, value_category: ValueCategory::Rvalue, body: Box::new(body) }
  }

  #[must_use] pub fn constant(src_tokens: SrcTokens, typespec: Typespec, value: ConstantValue, body: ExprBody) -> Self {
    Self {
      src_tokens,
      kind: ExprKind::Constant { typespec, value },
      value_category: ValueCategory::Rvalue,
      body: Box::new(body),
    }
  }

  #[must_use] pub fn dynamic(src_tokens: SrcTokens, typespec: Typespec, value_category: ValueCategory, body: ExprBody) -> Self {
    Self { src_tokens, kind: ExprKind::Dynamic { typespec }, value_category, body: Box::new(body) }
  }

  #[must_use] pub fn typespec(&self) -> Option<&Typespec> { self.kind.typespec() }
  #[must_use] pub fn is_error(&self) -> bool { self.kind.is_error() }

  /// A `move_reference` may bind an rvalue exactly once (spec §3.4); this
  /// is the predicate callers consult before allowing that bind.
  #[must_use] pub fn can_bind_move_reference(&self) -> bool {
    matches!(self.value_category, ValueCategory::Rvalue | ValueCategory::LvalueReference)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{PrimitiveKind, Terminator, TypeInterner};

  #[test]
  fn rvalue_can_bind_move_reference_but_bare_lvalue_cannot() {
    let mut interner = TypeInterner::new();
    let id = interner.intern_primitive(PrimitiveKind::I32);
    let ts = Typespec::of(Terminator::BaseType(id));
    let span = SrcTokens::point(crate::token::Pos { byte: 0, line: 1 });
    let rvalue = Expr::constant(span, ts.clone(), ConstantValue::sint(1), ExprBody::Literal(ConstantValue::sint(1)));
    assert!(rvalue.can_bind_move_reference());
    let mut symbols = crate::interner::SymbolInterner::new();
    let name = symbols.intern("x");
    let lvalue = Expr::dynamic(span, ts, ValueCategory::Lvalue, ExprBody::Identifier(name));
    assert!(!lvalue.can_bind_move_reference());
  }
}
