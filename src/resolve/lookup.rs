//! Scope-chain lookup (spec §3.3, §4.3): combining unqualified matches
//! across parent scopes, and direct qualified lookup.

use crate::interner::Symbol;
use crate::scope::{FunctionDecl, Scope, ScopeStack, StructDecl, TypeAliasDecl, VariableDecl};
use crate::token::OpKind;

/// The outcome of an unqualified lookup: a single kind of declaration may
/// match (a variable, a type alias, a struct), or a set of overloads may
/// (functions); these are mutually exclusive per spec §3.3's declaration
/// kinds living in separate namespaces within one scope.
#[derive(Debug)]
pub enum Lookup<'a> {
  Variable(&'a VariableDecl),
  TypeAlias(&'a TypeAliasDecl),
  Struct(&'a StructDecl),
  Functions(Vec<&'a FunctionDecl>),
  NotFound,
}

/// Unqualified lookup of `name`, walking the scope chain from innermost
/// outward. Variables/aliases/structs use first-match shadowing; function
/// overload sets are combined across every scope on the chain (spec §4.3).
#[must_use] pub fn lookup_unqualified<'a>(scopes: &'a ScopeStack, name: Symbol) -> Lookup<'a> {
  if let Some(v) = scopes.lookup_variable_unqualified(name) {
    return Lookup::Variable(v);
  }
  if let Some(a) = scopes.lookup_type_alias_unqualified(name) {
    return Lookup::TypeAlias(a);
  }
  if let Some(s) = scopes.lookup_struct_unqualified(name) {
    return Lookup::Struct(s);
  }
  let overloads = scopes.combined_function_overloads(name);
  if !overloads.is_empty() {
    return Lookup::Functions(overloads);
  }
  Lookup::NotFound
}

/// Qualified lookup: resolve `name` directly inside the named scope, with
/// no fallback to parents (spec §3.3: "identifiers may be qualified
/// (fully-scoped)...").
#[must_use] pub fn lookup_qualified<'a>(scope: &'a Scope, name: Symbol) -> Lookup<'a> {
  if let Some(v) = scope.lookup_variable(name) {
    return Lookup::Variable(v);
  }
  if let Some(a) = scope.lookup_type_alias(name) {
    return Lookup::TypeAlias(a);
  }
  if let Some(s) = scope.lookup_struct(name) {
    return Lookup::Struct(s);
  }
  let overloads = scope.function_overloads(name);
  if !overloads.is_empty() {
    return Lookup::Functions(overloads.iter().collect());
  }
  Lookup::NotFound
}

/// Operator overload lookup, combined across the scope chain, falling
/// back to the built-in table (spec §4.5) when the caller finds nothing
/// here.
#[must_use] pub fn lookup_operator_overloads<'a>(scopes: &'a ScopeStack, op: OpKind) -> Vec<&'a crate::scope::OperatorDecl> {
  scopes.combined_operator_overloads(op)
}
