//! The typespec algebra (spec §3.2, §4.1): a linear list of modifier
//! layers terminating in a single terminator, plus the operations used
//! throughout name resolution, overload ranking, and lowering.

use crate::token::SrcTokens;
use crate::types::modifier::Modifier;
use crate::types::terminator::Terminator;
use smallvec::SmallVec;

/// A typespec: `[modifiers...] terminator?`. Two typespecs are structurally
/// equal iff their modifier sequences and terminators are equal (testable
/// property 2); `src_tokens` is diagnostic-only and intentionally excluded
/// from `PartialEq`/`Hash` (hence the hand-written impls below instead of
/// `#[derive]`).
#[derive(Debug, Clone)]
pub struct Typespec {
  pub src_tokens: SrcTokens,
  pub modifiers: SmallVec<[Modifier; 4]>,
  pub terminator: Option<Box<Terminator>>,
}

impl PartialEq for Typespec {
  fn eq(&self, other: &Self) -> bool {
    self.modifiers == other.modifiers && self.terminator == other.terminator
  }
}
impl Eq for Typespec {}

impl std::hash::Hash for Typespec {
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
    self.modifiers.hash(state);
    self.terminator.hash(state);
  }
}

/// An operation attempted on a typespec that cannot apply: the codec
/// rejects ill-formed input by returning this marker rather than panicking
/// or throwing (spec §4.1 "Failure mode").
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TypespecError {
  #[error("cannot add this modifier layer on top of an existing terminator")]
  AlreadyTerminated,
  #[error("`mut` and `consteval` cannot coexist on the same layer")]
  MutConstevalClash,
  #[error("this modifier may only appear as the outermost layer")]
  NotOutermost,
  #[error("operation requires a non-empty typespec")]
  Empty,
}

fn dummy_span() -> SrcTokens {
  SrcTokens::point(crate::token::Pos { byte: 0, line: 0 })
}

impl Typespec {
  #[must_use] pub fn empty(src_tokens: SrcTokens) -> Self {
    Self { src_tokens, modifiers: SmallVec::new(), terminator: None }
  }

  #[must_use] pub fn terminated(src_tokens: SrcTokens, terminator: Terminator) -> Self {
    Self { src_tokens, modifiers: SmallVec::new(), terminator: Some(Box::new(terminator)) }
  }

  /// Convenience constructor for programmatic construction in tests and
  /// the resolver, where a precise span is not meaningful.
  #[must_use] pub fn of(terminator: Terminator) -> Self {
    Self::terminated(dummy_span(), terminator)
  }

  #[must_use] pub fn is_empty(&self) -> bool { self.terminator.is_none() }
  #[must_use] pub fn not_empty(&self) -> bool { self.terminator.is_some() }

  /// Push a modifier layer onto this typespec (outer to inner: pushing
  /// again wraps the previous state one layer deeper).
  pub fn add_layer(&mut self, m: Modifier) -> Result<(), TypespecError> {
    if m.outermost_only() && !self.modifiers.is_empty() {
      return Err(TypespecError::NotOutermost);
    }
    if (m == Modifier::Mut && self.modifiers.first() == Some(&Modifier::Consteval))
      || (m == Modifier::Consteval && self.modifiers.first() == Some(&Modifier::Mut))
    {
      return Err(TypespecError::MutConstevalClash);
    }
    self.modifiers.insert(0, m);
    Ok(())
  }

  /// Pop the outermost modifier layer. A caller error (per spec §4.1) to
  /// call this on an empty typespec.
  pub fn remove_layer(&mut self) -> Result<Modifier, TypespecError> {
    if self.modifiers.is_empty() {
      return Err(TypespecError::Empty);
    }
    Ok(self.modifiers.remove(0))
  }

  /// The outermost modifier, or `None` if there are no modifier layers
  /// (i.e. the terminator is exposed).
  #[must_use] pub fn outer_modifier(&self) -> Option<Modifier> { self.modifiers.first().copied() }

  #[must_use] pub fn terminator(&self) -> Option<&Terminator> { self.terminator.as_deref() }

  /// A view of this typespec with its outermost modifier stripped, if any.
  #[must_use] pub fn blind_get(&self) -> Typespec {
    let mut modifiers = self.modifiers.clone();
    if !modifiers.is_empty() {
      modifiers.remove(0);
    }
    Typespec { src_tokens: self.src_tokens, modifiers, terminator: self.terminator.clone() }
  }

  fn strip_if_outer(&self, target: Modifier) -> Typespec {
    if self.outer_modifier() == Some(target) { self.blind_get() } else { self.clone() }
  }

  #[must_use] pub fn remove_mut(&self) -> Typespec { self.strip_if_outer(Modifier::Mut) }
  #[must_use] pub fn remove_consteval(&self) -> Typespec { self.strip_if_outer(Modifier::Consteval) }
  #[must_use] pub fn remove_pointer(&self) -> Typespec { self.strip_if_outer(Modifier::Pointer) }
  #[must_use] pub fn remove_optional(&self) -> Typespec { self.strip_if_outer(Modifier::Optional) }

  #[must_use] pub fn remove_mutability_modifiers(&self) -> Typespec {
    match self.outer_modifier() {
      Some(Modifier::Mut | Modifier::Consteval) => self.blind_get(),
      _ => self.clone(),
    }
  }

  #[must_use] pub fn remove_any_reference(&self) -> Typespec {
    if self.outer_modifier().is_some_and(Modifier::is_reference) { self.blind_get() } else { self.clone() }
  }

  #[must_use] pub fn remove_lvalue_or_move_reference(&self) -> Typespec {
    match self.outer_modifier() {
      Some(Modifier::LvalueReference | Modifier::MoveReference) => self.blind_get(),
      _ => self.clone(),
    }
  }

  #[must_use] pub fn is_any_reference(&self) -> bool {
    self.outer_modifier().is_some_and(Modifier::is_reference)
  }

  #[must_use] pub fn is_mut(&self) -> bool { self.outer_modifier() == Some(Modifier::Mut) }
  #[must_use] pub fn is_consteval(&self) -> bool { self.outer_modifier() == Some(Modifier::Consteval) }
  #[must_use] pub fn is_pointer(&self) -> bool { self.outer_modifier() == Some(Modifier::Pointer) }
  #[must_use] pub fn is_optional(&self) -> bool { self.outer_modifier() == Some(Modifier::Optional) }
  #[must_use] pub fn is_variadic(&self) -> bool { self.outer_modifier() == Some(Modifier::Variadic) }

  #[must_use] pub fn is_typename(&self) -> bool {
    self.modifiers.is_empty() && matches!(self.terminator(), Some(Terminator::Typename))
  }

  /// Completeness (spec §3.2): the terminator must be complete and no
  /// layer may be `variadic` (an incomplete, pack-shaped typespec).
  #[must_use] pub fn is_complete(&self) -> bool {
    if self.modifiers.contains(&Modifier::Variadic) {
      return false;
    }
    self.terminator().is_some_and(Terminator::is_complete)
  }

  /// An "optional pointer-like": `?P` where `P` is pointer, function
  /// pointer, or reference. These are represented as a single nullable
  /// machine pointer, not a `(value, has_value)` pair (spec §3.2, §4.6.1).
  #[must_use] pub fn is_optional_pointer_like(&self) -> bool {
    if !self.is_optional() {
      return false;
    }
    let inner = self.blind_get();
    inner.is_pointer()
      || inner.is_any_reference()
      || matches!(inner.terminator(), Some(Terminator::Function(_))) && inner.modifiers.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::type_info::{PrimitiveKind, TypeInterner};

  fn i32_ty(interner: &mut TypeInterner) -> Typespec {
    Typespec::of(Terminator::BaseType(interner.intern_primitive(PrimitiveKind::I32)))
  }

  #[test]
  fn add_then_remove_layer_is_identity() {
    let mut interner = TypeInterner::new();
    let mut t = i32_ty(&mut interner);
    let before = t.clone();
    t.add_layer(Modifier::Pointer).unwrap();
    assert_ne!(t, before);
    t.remove_layer().unwrap();
    assert_eq!(t, before);
  }

  #[test]
  fn mut_and_consteval_clash() {
    let mut interner = TypeInterner::new();
    let mut t = i32_ty(&mut interner);
    t.add_layer(Modifier::Consteval).unwrap();
    assert_eq!(t.add_layer(Modifier::Mut), Err(TypespecError::MutConstevalClash));
  }

  #[test]
  fn reference_must_be_outermost() {
    let mut interner = TypeInterner::new();
    let mut t = i32_ty(&mut interner);
    t.add_layer(Modifier::Pointer).unwrap();
    assert_eq!(t.add_layer(Modifier::LvalueReference), Err(TypespecError::NotOutermost));
  }

  #[test]
  fn optional_pointer_like_sentinel() {
    let mut interner = TypeInterner::new();
    let mut t = i32_ty(&mut interner);
    t.add_layer(Modifier::Pointer).unwrap();
    t.add_layer(Modifier::Optional).unwrap();
    assert!(t.is_optional_pointer_like());

    let mut t2 = i32_ty(&mut interner);
    t2.add_layer(Modifier::Optional).unwrap();
    assert!(!t2.is_optional_pointer_like());
  }

  #[test]
  fn completeness_requires_no_auto_or_unresolved() {
    let t = Typespec::of(Terminator::Auto);
    assert!(!t.is_complete());
    let t = Typespec::of(Terminator::Void);
    assert!(t.is_complete());
  }

  #[test]
  fn variadic_layer_is_never_complete() {
    let mut interner = TypeInterner::new();
    let mut t = i32_ty(&mut interner);
    t.add_layer(Modifier::Variadic).unwrap();
    assert!(!t.is_complete());
  }

  #[test]
  fn structural_equality_recurses_into_tuples() {
    let mut interner = TypeInterner::new();
    let a = Typespec::of(Terminator::Tuple(vec![i32_ty(&mut interner), i32_ty(&mut interner)]));
    let b = Typespec::of(Terminator::Tuple(vec![i32_ty(&mut interner), i32_ty(&mut interner)]));
    assert_eq!(a, b);
  }
}
