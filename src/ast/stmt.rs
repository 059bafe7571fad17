//! Statements and the function-body model (spec §3.5).

use crate::ast::destruct::DestructScope;
use crate::ast::expr::Expr;
use crate::interner::Symbol;
use crate::scope::VariableDecl;
use crate::token::SrcTokens;
use crate::types::{CallingConvention, Typespec};
use hashbrown::HashMap;

#[derive(Debug, Clone)]
pub enum Stmt {
  Expr(Expr),
  Let { decl: VariableDecl, init: Option<Expr> },
  Return(Option<Expr>),
  Break,
  Continue,
  While { cond: Expr, body: Box<Stmt>, destruct: DestructScope },
  For { decl: VariableDecl, iterable: Expr, body: Box<Stmt>, destruct: DestructScope },
  Switch { scrutinee: Expr, arms: Vec<(Vec<crate::constant::ConstantValue>, Stmt)>, default: Option<Box<Stmt>> },
  Block { stmts: Vec<Stmt>, destruct: DestructScope },
}

/// Linkage bits carried by a function body (spec §3.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Linkage {
  External,
  Internal,
  Intrinsic,
  Libc,
}

/// How far a function's declaration has progressed through resolution
/// (spec §3.5). Distinct from the resolve queue's per-call cycle tracking
/// (see [`crate::interp`]): this is one function's own progress, that is a
/// transient in-flight call stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveState {
  None,
  Parameters,
  Symbol,
  All,
  Error,
}

#[derive(Debug, Clone)]
pub enum FunctionBodyKind {
  Statements(Vec<Stmt>),
  Intrinsic(Symbol),
  Libc(String),
}

/// A function declaration's full body (spec §3.5): signature, linkage,
/// resolve progress, its codec-derived symbol name, and either a statement
/// list, an intrinsic id, or a libc binding. Generic functions additionally
/// carry an instantiation table keyed by their substituted parameter types.
#[derive(Debug, Clone)]
pub struct FunctionBody {
  pub src_tokens: SrcTokens,
  pub name: Symbol,
  pub params: Vec<VariableDecl>,
  pub ret: Typespec,
  pub cc: CallingConvention,
  pub linkage: Linkage,
  pub resolve_state: ResolveState,
  pub symbol_name: Option<String>,
  pub body: FunctionBodyKind,
  pub instantiations: HashMap<Vec<Typespec>, Vec<Stmt>>,
}

impl FunctionBody {
  #[must_use] pub fn is_generic(&self) -> bool { !self.instantiations.is_empty() || self.params.iter().any(|p| p.typespec.is_typename()) }

  /// Look up (or note the need for) a monomorphized instantiation keyed by
  /// the substituted parameter types.
  #[must_use] pub fn instantiation(&self, substituted_params: &[Typespec]) -> Option<&[Stmt]> {
    self.instantiations.get(substituted_params).map(Vec::as_slice)
  }

  pub fn add_instantiation(&mut self, substituted_params: Vec<Typespec>, stmts: Vec<Stmt>) {
    self.instantiations.insert(substituted_params, stmts);
  }
}
