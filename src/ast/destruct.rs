//! The destruct-operation stack (spec §3.6).
//!
//! A destruct scope is an ordered stack of deferred actions, unwound in
//! reverse insertion order when the owning scope exits, exactly once per
//! surviving value. Loops and switches record their own "begin index" so
//! `break`/`continue` can unwind only the suffix above it.

use crate::ast::expr::Expr;
use crate::interner::Symbol;

/// One deferred destructor action.
#[derive(Debug, Clone)]
pub enum DestructOpKind {
  /// Run the destructor of a named local.
  Variable(Symbol),
  /// Run the destructor of a temporary that has no name of its own.
  Temporary,
  /// Run the element destructors of an rvalue array, given a pointer
  /// expression to its first element (spec §3.6: "optional
  /// rvalue-array-elem-ptr").
  ArrayElements(Box<Expr>),
}

/// `{op, value, optional condition, optional move-destruct indicator,
/// optional rvalue-array-elem-ptr}` (spec §3.6). `indicator` is the live
/// boolean guarding whether the destructor still applies: set true at
/// construction, cleared the instant the value is moved from.
#[derive(Debug, Clone)]
pub struct DestructOp {
  pub kind: DestructOpKind,
  pub value: Box<Expr>,
  pub condition: Option<Box<Expr>>,
  pub indicator: Option<Symbol>,
}

/// An ordered stack of [`DestructOp`]s for one lexical scope, plus the
/// "begin index" a loop or switch records on entry so `break`/`continue`
/// unwind only the operations pushed since then.
#[derive(Debug, Clone, Default)]
pub struct DestructScope {
  ops: Vec<DestructOp>,
}

impl DestructScope {
  #[must_use] pub fn new() -> Self { Self::default() }

  pub fn push(&mut self, op: DestructOp) {
    self.ops.push(op);
  }

  #[must_use] pub fn begin_index(&self) -> usize { self.ops.len() }

  #[must_use] pub fn len(&self) -> usize { self.ops.len() }
  #[must_use] pub fn is_empty(&self) -> bool { self.ops.is_empty() }

  /// The ops to run on a normal scope exit, oldest-pushed-last (spec §3.6:
  /// "reverse insertion order").
  pub fn unwind_all(&mut self) -> Vec<DestructOp> {
    let mut ops = std::mem::take(&mut self.ops);
    ops.reverse();
    ops
  }

  /// The ops to run on `break`/`continue`: only the suffix pushed since
  /// `begin_index`, in reverse order, leaving the rest on the stack for the
  /// enclosing scope to unwind normally later.
  pub fn unwind_to(&mut self, begin_index: usize) -> Vec<DestructOp> {
    let mut suffix: Vec<DestructOp> = self.ops.split_off(begin_index);
    suffix.reverse();
    suffix
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::constant::ConstantValue;
  use crate::token::{Pos, SrcTokens};
  use crate::types::{PrimitiveKind, Terminator, TypeInterner, Typespec};

  fn dummy_expr() -> Box<Expr> {
    let span = SrcTokens::point(Pos { byte: 0, line: 1 });
    let mut interner = TypeInterner::new();
    let id = interner.intern_primitive(PrimitiveKind::I32);
    let ts = Typespec::of(Terminator::BaseType(id));
    Box::new(Expr::constant(span, ts, ConstantValue::sint(0), crate::ast::expr::ExprBody::Literal(ConstantValue::sint(0))))
  }

  fn op(name_sym: Symbol) -> DestructOp {
    DestructOp { kind: DestructOpKind::Variable(name_sym), value: dummy_expr(), condition: None, indicator: Some(name_sym) }
  }

  #[test]
  fn scenario_s6_break_unwinds_only_suffix_in_reverse() {
    let mut symbols = crate::interner::SymbolInterner::new();
    let a = symbols.intern("a");
    let b = symbols.intern("b");
    let mut scope = DestructScope::new();
    let loop_begin = scope.begin_index();
    scope.push(op(a));
    scope.push(op(b));
    let unwound = scope.unwind_to(loop_begin);
    let names: Vec<Symbol> = unwound.iter().map(|o| match o.kind { DestructOpKind::Variable(s) => s, _ => unreachable!() }).collect();
    assert_eq!(names, vec![b, a], "b was constructed after a, so it destructs first");
    assert!(scope.is_empty(), "the loop's own ops were fully unwound, nothing left for the enclosing scope");
  }

  #[test]
  fn full_unwind_reverses_insertion_order() {
    let mut symbols = crate::interner::SymbolInterner::new();
    let a = symbols.intern("a");
    let b = symbols.intern("b");
    let c = symbols.intern("c");
    let mut scope = DestructScope::new();
    scope.push(op(a));
    scope.push(op(b));
    scope.push(op(c));
    let unwound = scope.unwind_all();
    let names: Vec<Symbol> = unwound.iter().map(|o| match o.kind { DestructOpKind::Variable(s) => s, _ => unreachable!() }).collect();
    assert_eq!(names, vec![c, b, a]);
  }
}
