//! Declaration sets and the scope chain (spec §3.3).
//!
//! Grounded on `original_source/src/ctx/decl_set.h`: that header keeps
//! separate `function_overload_set`/`operator_overload_set` containers with
//! a find-or-insert `add_function`/`add_operator` pair, rather than a single
//! polymorphic symbol table. We keep that per-kind split but recast the
//! find-or-insert scan as a `HashMap`-keyed lookup.

use crate::interner::Symbol;
use crate::token::{OpKind, SrcTokens};
use crate::types::{Typespec, TypeInfoId, CallingConvention};
use hashbrown::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
  pub name: Symbol,
  pub typespec: Typespec,
  pub is_mut: bool,
}

/// One "original" variadic variable and the N monomorphic copies it
/// expanded into (spec §3.3).
#[derive(Debug, Clone)]
pub struct VariadicExpansion {
  pub original: Symbol,
  pub expanded: Vec<Symbol>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
  pub name: Symbol,
  pub params: Vec<Typespec>,
  pub ret: Typespec,
  pub cc: CallingConvention,
  pub symbol_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperatorDecl {
  pub op: OpKind,
  pub params: Vec<Typespec>,
  pub ret: Typespec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDecl {
  pub name: Symbol,
  pub target: Typespec,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
  pub name: Symbol,
  pub type_id: TypeInfoId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
  #[error("a different declaration is already bound to this identifier")]
  Conflict,
}

/// A single `(min)` resolved from a forward reference: a placeholder that a
/// later declaration in the same scope may resolve, or that remains
/// unresolved at the end of the phase (spec §3.3, §5).
#[derive(Debug, Clone)]
pub struct UnresolvedPlaceholder {
  pub name: Symbol,
  pub first_use: SrcTokens,
}

/// One declaration set: everything visible directly in one lexical scope,
/// in insertion order where that order matters (overload sets).
#[derive(Debug, Default)]
pub struct Scope {
  variables: HashMap<Symbol, VariableDecl>,
  variadic_expansions: HashMap<Symbol, VariadicExpansion>,
  functions: HashMap<Symbol, Vec<FunctionDecl>>,
  operators: HashMap<OpKind, Vec<OperatorDecl>>,
  type_aliases: HashMap<Symbol, TypeAliasDecl>,
  structs: HashMap<Symbol, StructDecl>,
  unresolved: HashMap<Symbol, UnresolvedPlaceholder>,
}

impl Scope {
  #[must_use] pub fn new() -> Self { Self::default() }

  /// Insert a variable. First insertion wins: re-inserting an identical
  /// declaration is a no-op; inserting a different one under the same name
  /// is the caller's error (spec §3.3).
  pub fn add_variable(&mut self, decl: VariableDecl) -> Result<(), ScopeError> {
    match self.variables.get(&decl.name) {
      None => { self.variables.insert(decl.name, decl); Ok(()) }
      Some(existing) if *existing == decl => Ok(()),
      Some(_) => Err(ScopeError::Conflict),
    }
  }

  #[must_use] pub fn lookup_variable(&self, name: Symbol) -> Option<&VariableDecl> {
    self.variables.get(&name)
  }

  pub fn add_variadic_expansion(&mut self, exp: VariadicExpansion) {
    self.variadic_expansions.insert(exp.original, exp);
  }

  #[must_use] pub fn lookup_variadic_expansion(&self, original: Symbol) -> Option<&VariadicExpansion> {
    self.variadic_expansions.get(&original)
  }

  /// Add a function overload. An identical signature under the same name
  /// is a no-op; a distinct signature extends the overload set.
  pub fn add_function(&mut self, decl: FunctionDecl) {
    let set = self.functions.entry(decl.name).or_default();
    if !set.iter().any(|f| f.params == decl.params) {
      set.push(decl);
    }
  }

  #[must_use] pub fn function_overloads(&self, name: Symbol) -> &[FunctionDecl] {
    self.functions.get(&name).map_or(&[], Vec::as_slice)
  }

  pub fn add_operator(&mut self, decl: OperatorDecl) {
    let set = self.operators.entry(decl.op).or_default();
    if !set.iter().any(|o| o.params == decl.params) {
      set.push(decl);
    }
  }

  #[must_use] pub fn operator_overloads(&self, op: OpKind) -> &[OperatorDecl] {
    self.operators.get(&op).map_or(&[], Vec::as_slice)
  }

  pub fn add_type_alias(&mut self, decl: TypeAliasDecl) -> Result<(), ScopeError> {
    match self.type_aliases.get(&decl.name) {
      None => { self.type_aliases.insert(decl.name, decl); Ok(()) }
      Some(existing) if *existing == decl => Ok(()),
      Some(_) => Err(ScopeError::Conflict),
    }
  }

  #[must_use] pub fn lookup_type_alias(&self, name: Symbol) -> Option<&TypeAliasDecl> {
    self.type_aliases.get(&name)
  }

  pub fn add_struct(&mut self, decl: StructDecl) -> Result<(), ScopeError> {
    match self.structs.get(&decl.name) {
      None => { self.structs.insert(decl.name, decl); Ok(()) }
      Some(existing) if *existing == decl => Ok(()),
      Some(_) => Err(ScopeError::Conflict),
    }
  }

  #[must_use] pub fn lookup_struct(&self, name: Symbol) -> Option<&StructDecl> {
    self.structs.get(&name)
  }

  /// Record a forward reference to a not-yet-declared identifier. Returns
  /// the existing placeholder if one is already pending.
  pub fn add_unresolved(&mut self, name: Symbol, first_use: SrcTokens) {
    self.unresolved.entry(name).or_insert(UnresolvedPlaceholder { name, first_use });
  }

  /// Drop a placeholder once its name is declared for real.
  pub fn resolve_placeholder(&mut self, name: Symbol) -> Option<UnresolvedPlaceholder> {
    self.unresolved.remove(&name)
  }

  #[must_use] pub fn unresolved_placeholders(&self) -> impl Iterator<Item = &UnresolvedPlaceholder> {
    self.unresolved.values()
  }

  /// True if any name in this scope (of any kind) is bound.
  #[must_use] pub fn is_qualified_name_bound(&self, name: Symbol) -> bool {
    self.variables.contains_key(&name)
      || self.functions.contains_key(&name)
      || self.type_aliases.contains_key(&name)
      || self.structs.contains_key(&name)
  }
}

/// A strict LIFO chain of scopes (spec §5: "the scope stack... strictly
/// LIFO"). Unqualified lookup walks from the innermost scope outward,
/// combining function/operator overload sets across every scope on the way
/// rather than stopping at the first hit (spec §4.3: "combining unqualified
/// matches across parents").
#[derive(Debug, Default)]
pub struct ScopeStack {
  scopes: Vec<Scope>,
}

impl ScopeStack {
  #[must_use] pub fn new() -> Self {
    Self { scopes: vec![Scope::new()] }
  }

  pub fn push_scope(&mut self) {
    self.scopes.push(Scope::new());
  }

  /// Pop the innermost scope. Callers run destructor unwinding themselves
  /// (spec §3.6) before calling this; popping here discards the declaration
  /// set only.
  pub fn pop_scope(&mut self) -> Scope {
    self.scopes.pop().expect("scope stack underflow: popped the root scope")
  }

  #[must_use] pub fn current(&self) -> &Scope {
    self.scopes.last().expect("scope stack is never empty")
  }

  #[must_use] pub fn current_mut(&mut self) -> &mut Scope {
    self.scopes.last_mut().expect("scope stack is never empty")
  }

  #[must_use] pub fn depth(&self) -> usize { self.scopes.len() }

  /// Unqualified variable lookup: innermost scope wins (shadowing), no
  /// combination across parents (only overload sets combine).
  #[must_use] pub fn lookup_variable_unqualified(&self, name: Symbol) -> Option<&VariableDecl> {
    self.scopes.iter().rev().find_map(|s| s.lookup_variable(name))
  }

  #[must_use] pub fn lookup_type_alias_unqualified(&self, name: Symbol) -> Option<&TypeAliasDecl> {
    self.scopes.iter().rev().find_map(|s| s.lookup_type_alias(name))
  }

  #[must_use] pub fn lookup_struct_unqualified(&self, name: Symbol) -> Option<&StructDecl> {
    self.scopes.iter().rev().find_map(|s| s.lookup_struct(name))
  }

  /// Combine function overloads for `name` from every scope on the chain,
  /// innermost first (so a closer redeclaration sorts first; the ranker
  /// considers the whole combined set regardless of order).
  #[must_use] pub fn combined_function_overloads(&self, name: Symbol) -> Vec<&FunctionDecl> {
    self.scopes.iter().rev().flat_map(|s| s.function_overloads(name)).collect()
  }

  #[must_use] pub fn combined_operator_overloads(&self, op: OpKind) -> Vec<&OperatorDecl> {
    self.scopes.iter().rev().flat_map(|s| s.operator_overloads(op)).collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{Terminator, PrimitiveKind, TypeInterner};

  fn int32_ts(interner: &mut TypeInterner) -> Typespec {
    Typespec::of(Terminator::BaseType(interner.intern_primitive(PrimitiveKind::I32)))
  }

  #[test]
  fn reinserting_identical_variable_is_a_noop() {
    let mut interner = TypeInterner::new();
    let mut symbols = crate::interner::SymbolInterner::new();
    let name = symbols.intern("x");
    let mut scope = Scope::new();
    let decl = VariableDecl { name, typespec: int32_ts(&mut interner), is_mut: false };
    assert!(scope.add_variable(decl.clone()).is_ok());
    assert!(scope.add_variable(decl).is_ok());
  }

  #[test]
  fn conflicting_variable_is_an_error() {
    let mut interner = TypeInterner::new();
    let mut symbols = crate::interner::SymbolInterner::new();
    let name = symbols.intern("x");
    let mut scope = Scope::new();
    scope.add_variable(VariableDecl { name, typespec: int32_ts(&mut interner), is_mut: false }).unwrap();
    let bool_id = interner.intern_primitive(PrimitiveKind::Bool);
    let err = scope.add_variable(VariableDecl {
      name, typespec: Typespec::of(Terminator::BaseType(bool_id)), is_mut: false,
    });
    assert_eq!(err, Err(ScopeError::Conflict));
  }

  #[test]
  fn function_overloads_extend_rather_than_clash() {
    let mut interner = TypeInterner::new();
    let mut symbols = crate::interner::SymbolInterner::new();
    let name = symbols.intern("f");
    let mut scope = Scope::new();
    scope.add_function(FunctionDecl {
      name, params: vec![int32_ts(&mut interner)], ret: int32_ts(&mut interner),
      cc: CallingConvention::Bozon, symbol_name: None,
    });
    let bool_id = interner.intern_primitive(PrimitiveKind::Bool);
    scope.add_function(FunctionDecl {
      name, params: vec![Typespec::of(Terminator::BaseType(bool_id))], ret: int32_ts(&mut interner),
      cc: CallingConvention::Bozon, symbol_name: None,
    });
    assert_eq!(scope.function_overloads(name).len(), 2);
  }

  #[test]
  fn unqualified_lookup_walks_outward_for_shadowing() {
    let mut interner = TypeInterner::new();
    let mut symbols = crate::interner::SymbolInterner::new();
    let name = symbols.intern("x");
    let mut stack = ScopeStack::new();
    stack.current_mut().add_variable(VariableDecl { name, typespec: int32_ts(&mut interner), is_mut: false }).unwrap();
    stack.push_scope();
    let bool_id = interner.intern_primitive(PrimitiveKind::Bool);
    stack.current_mut().add_variable(VariableDecl {
      name, typespec: Typespec::of(Terminator::BaseType(bool_id)), is_mut: true,
    }).unwrap();
    let found = stack.lookup_variable_unqualified(name).unwrap();
    assert!(found.is_mut, "inner scope shadows outer");
    stack.pop_scope();
    let found = stack.lookup_variable_unqualified(name).unwrap();
    assert!(!found.is_mut);
  }

  #[test]
  fn combined_overloads_see_every_scope() {
    let mut interner = TypeInterner::new();
    let mut symbols = crate::interner::SymbolInterner::new();
    let name = symbols.intern("f");
    let mut stack = ScopeStack::new();
    stack.current_mut().add_function(FunctionDecl {
      name, params: vec![int32_ts(&mut interner)], ret: int32_ts(&mut interner),
      cc: CallingConvention::Bozon, symbol_name: None,
    });
    stack.push_scope();
    let bool_id = interner.intern_primitive(PrimitiveKind::Bool);
    stack.current_mut().add_function(FunctionDecl {
      name, params: vec![Typespec::of(Terminator::BaseType(bool_id))], ret: int32_ts(&mut interner),
      cc: CallingConvention::Bozon, symbol_name: None,
    });
    assert_eq!(stack.combined_function_overloads(name).len(), 2);
  }
}
