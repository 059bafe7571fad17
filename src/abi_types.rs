//! ABI value-shape types shared by both backends (spec §4.6.2).
//!
//! Kept separate from `backend::abi`'s classifier itself so the LLVM and C
//! emitters (spec §4.6, §4.7) can depend on one small, backend-agnostic
//! vocabulary instead of each other.

use crate::types::TypeInfoId;

/// How a value crosses a function boundary (spec §4.6.2, glossary
/// "ABI pass kind").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
  Value,
  Reference,
  OneRegister,
  TwoRegisters,
  NonTrivial,
}

/// The fixed attribute set an indirect (by-pointer) parameter receives
/// (spec §4.6.2: "a fixed set of attributes").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndirectAttributes {
  pub noalias: bool,
  pub nocapture: bool,
  pub nonnull: bool,
}

impl IndirectAttributes {
  #[must_use] pub fn for_byval() -> Self {
    Self { noalias: true, nocapture: true, nonnull: true }
  }
}

/// The classification result for one parameter or return value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AbiClass {
  pub kind: PassKind,
  pub attrs: IndirectAttributes,
  /// Present for `NonTrivial`/`Reference`: the pointee type, used to
  /// render `byval(T)`/`sret(T)` attributes.
  pub byval_type: Option<TypeInfoId>,
}

impl AbiClass {
  #[must_use] pub fn value() -> Self {
    Self { kind: PassKind::Value, attrs: IndirectAttributes::default(), byval_type: None }
  }

  #[must_use] pub fn indirect(kind: PassKind, byval_type: TypeInfoId) -> Self {
    Self { kind, attrs: IndirectAttributes::for_byval(), byval_type: Some(byval_type) }
  }
}

/// Target-triple-derived primitive widths and endianness the C emitter
/// needs (spec §4.7: "taken from target properties supplied by the
/// driver").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetProperties {
  pub pointer_bits: u32,
  pub short_bits: u32,
  pub int_bits: u32,
  pub long_bits: u32,
  pub long_long_bits: u32,
  pub big_endian: bool,
}

impl TargetProperties {
  /// The `generic`/LP64 shape used when no `--target` is given.
  #[must_use] pub fn generic_lp64() -> Self {
    Self { pointer_bits: 64, short_bits: 16, int_bits: 32, long_bits: 64, long_long_bits: 64, big_endian: false }
  }
}
