//! Typespec terminators: the closed set of nodes a modifier chain ends in
//! (spec §3.2).

use crate::types::type_info::{TypeInfoId, EnumId};
use crate::types::typespec::Typespec;

/// Calling convention tag carried by function terminators. Only `Bozon`
/// (the language's own convention) and `C` (for `libc`-bridged declarations,
/// spec §4.7) are modeled; platform ABI selection (spec §4.6.2) is a
/// property of the *backend*, not the typespec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallingConvention {
  Bozon,
  C,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionSig {
  pub params: Vec<Typespec>,
  pub ret: Box<Typespec>,
  pub cc: CallingConvention,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayType {
  pub size: u64,
  pub elem: Box<Typespec>,
}

/// The closed set of terminators. Structural equality (`PartialEq`)
/// recurses into `Function`/`Array`/`Tuple`; `BaseType`/`Enum` compare by
/// arena identity (spec §3.2: "base-type identity is pointer-identity").
/// `Hash`/`Eq` are derived alongside `PartialEq` so `Typespec` (and, in
/// turn, `Vec<Typespec>`) can key a `HashMap` for generic instantiation
/// caching (`ast::stmt::FunctionBody::instantiations`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Terminator {
  Unresolved,
  BaseType(TypeInfoId),
  Enum(EnumId),
  Void,
  Function(FunctionSig),
  Array(ArrayType),
  ArraySlice(Box<Typespec>),
  Tuple(Vec<Typespec>),
  Auto,
  Typename,
}

impl Terminator {
  /// A terminator is complete (spec §3.2) iff it is one of base/enum/void,
  /// or a compound terminator all of whose components are complete, and it
  /// is never `auto`/`unresolved`. `Function` additionally requires all
  /// parameter and return types to be complete.
  #[must_use] pub fn is_complete(&self) -> bool {
    match self {
      Self::Unresolved | Self::Auto | Self::Typename => false,
      Self::BaseType(_) | Self::Enum(_) | Self::Void => true,
      Self::Function(sig) => sig.params.iter().all(Typespec::is_complete) && sig.ret.is_complete(),
      Self::Array(arr) => arr.elem.is_complete(),
      Self::ArraySlice(elem) => elem.is_complete(),
      Self::Tuple(elems) => elems.iter().all(Typespec::is_complete),
    }
  }
}
