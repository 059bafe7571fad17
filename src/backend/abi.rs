//! The five-valued ABI pass-kind classifier (spec §4.6.2).
//!
//! `generic` is fully implemented (register size 8 bytes, the common
//! LP64 shape used when no target triple narrows things further).
//! `microsoft_x64`/`systemv_amd64` are implemented for the common case of
//! aggregates up to two eightbytes; per spec §4.6.2's own framing, "ABI
//! pass kind" classification is a contract the backends must honor, not a
//! from-scratch reimplementation of either platform's full register-class
//! algorithm (the x86-64 SysV psABI's field-merging rules for mixed
//! integer/SSE eightbytes are out of scope here).

use crate::abi_types::{AbiClass, PassKind};
use crate::types::{Terminator, TypeInfo, TypeInfoId, TypeInterner, Typespec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
  Generic,
  MicrosoftX64,
  SystemVAmd64,
}

const REGISTER_BYTES: u64 = 8;

/// Size in bytes, ignoring alignment padding (documented simplification:
/// struct layout/padding is a backend-emission detail, not part of the
/// classifier's contract).
#[must_use] pub fn size_of(ts: &Typespec, types: &TypeInterner) -> u64 {
  if ts.is_pointer() || ts.is_any_reference() {
    return REGISTER_BYTES;
  }
  match ts.terminator() {
    None => 0,
    Some(Terminator::Void) => 0,
    Some(Terminator::BaseType(id)) => size_of_type(*id, types),
    Some(Terminator::Enum(enum_id)) => u64::from(types.get_enum(*enum_id).underlying.bit_width()) / 8,
    Some(Terminator::Array(arr)) => arr.size * size_of(&arr.elem, types),
    Some(Terminator::ArraySlice(_)) => 2 * REGISTER_BYTES,
    Some(Terminator::Tuple(elems)) => elems.iter().map(|e| size_of(e, types)).sum(),
    Some(Terminator::Function(_)) => REGISTER_BYTES,
    Some(Terminator::Unresolved | Terminator::Auto | Terminator::Typename) => {
      unreachable!("classifier invariant violated: incomplete typespec reached the ABI classifier")
    }
  }
}

fn size_of_type(id: TypeInfoId, types: &TypeInterner) -> u64 {
  match types.get(id) {
    TypeInfo::Primitive(p) => u64::from(p.bit_width()) / 8,
    TypeInfo::Struct(s) => s.fields.iter().map(|(_, f)| size_of(f, types)).sum(),
  }
}

/// Classify one parameter or return-value typespec under `platform`.
#[must_use] pub fn classify(platform: Platform, ts: &Typespec, types: &TypeInterner) -> AbiClass {
  if ts.is_pointer() || ts.is_any_reference() {
    return AbiClass::value();
  }
  match ts.terminator() {
    Some(Terminator::BaseType(_) | Terminator::Enum(_) | Terminator::Void | Terminator::Function(_)) => AbiClass::value(),
    Some(Terminator::Array(_) | Terminator::Tuple(_) | Terminator::ArraySlice(_)) => {
      classify_aggregate(platform, ts, types)
    }
    Some(Terminator::Unresolved | Terminator::Auto | Terminator::Typename) | None => {
      unreachable!("classifier invariant violated: incomplete typespec reached the ABI classifier")
    }
  }
}

fn classify_aggregate(platform: Platform, ts: &Typespec, types: &TypeInterner) -> AbiClass {
  let size = size_of(ts, types);
  let kind = match platform {
    // `generic.cpp`'s classifier: anything up to one register passes in it,
    // up to two registers passes split across two, anything larger goes
    // by reference.
    Platform::Generic | Platform::SystemVAmd64 => {
      if size <= REGISTER_BYTES {
        PassKind::OneRegister
      } else if size <= 2 * REGISTER_BYTES {
        PassKind::TwoRegisters
      } else {
        PassKind::NonTrivial
      }
    }
    // `microsoft_x64.cpp`'s `get_pass_kind`: only an exact 1/2/4/8-byte
    // aggregate is passed in a single register; `get_two_register_types`
    // is `bz_unreachable` there, so nothing on this platform is ever
    // `TwoRegisters` — anything else, including a 16-byte aggregate,
    // is passed by reference.
    Platform::MicrosoftX64 => {
      if matches!(size, 1 | 2 | 4 | 8) { PassKind::OneRegister } else { PassKind::NonTrivial }
    }
  };
  match kind {
    PassKind::OneRegister | PassKind::TwoRegisters => AbiClass { kind, attrs: Default::default(), byval_type: None },
    // The emitter looks up the real aggregate type from the typespec
    // itself to render `byval(T)`; the classifier only needs to say which
    // parameters require it.
    PassKind::NonTrivial => AbiClass { kind: PassKind::NonTrivial, attrs: crate::abi_types::IndirectAttributes::for_byval(), byval_type: None },
    PassKind::Value | PassKind::Reference => unreachable!("aggregate classification never yields Value/Reference directly"),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{PrimitiveKind, Terminator, TypeInterner, Typespec};

  #[test]
  fn scalar_is_always_value() {
    let mut types = TypeInterner::new();
    let ts = Typespec::of(Terminator::BaseType(types.intern_primitive(PrimitiveKind::I64)));
    assert_eq!(classify(Platform::Generic, &ts, &types).kind, PassKind::Value);
  }

  #[test]
  fn small_array_is_one_register() {
    let mut types = TypeInterner::new();
    let elem = Typespec::of(Terminator::BaseType(types.intern_primitive(PrimitiveKind::I8)));
    let ts = Typespec::of(Terminator::Array(crate::types::ArrayType { size: 4, elem: Box::new(elem) }));
    assert_eq!(size_of(&ts, &types), 4);
    assert_eq!(classify(Platform::Generic, &ts, &types).kind, PassKind::OneRegister);
  }

  #[test]
  fn large_tuple_is_non_trivial() {
    let mut types = TypeInterner::new();
    let elem = Typespec::of(Terminator::BaseType(types.intern_primitive(PrimitiveKind::I64)));
    let ts = Typespec::of(Terminator::Tuple(vec![elem.clone(), elem.clone(), elem]));
    assert_eq!(size_of(&ts, &types), 24);
    let class = classify(Platform::Generic, &ts, &types);
    assert_eq!(class.kind, PassKind::NonTrivial);
    assert!(class.attrs.noalias && class.attrs.nocapture && class.attrs.nonnull);
  }

  #[test]
  fn two_eightbyte_tuple_is_two_registers_on_generic_and_systemv() {
    let mut types = TypeInterner::new();
    let elem = Typespec::of(Terminator::BaseType(types.intern_primitive(PrimitiveKind::I64)));
    let ts = Typespec::of(Terminator::Tuple(vec![elem.clone(), elem]));
    for platform in [Platform::Generic, Platform::SystemVAmd64] {
      assert_eq!(classify(platform, &ts, &types).kind, PassKind::TwoRegisters);
    }
  }

  #[test]
  fn microsoft_x64_never_splits_across_two_registers() {
    let mut types = TypeInterner::new();
    let elem = Typespec::of(Terminator::BaseType(types.intern_primitive(PrimitiveKind::I64)));
    // A 16-byte aggregate: OneRegister/TwoRegisters on generic/sysv, but
    // MS x64 has no two-register aggregate passing, so this must go by
    // reference instead.
    let ts = Typespec::of(Terminator::Tuple(vec![elem.clone(), elem]));
    assert_eq!(classify(Platform::MicrosoftX64, &ts, &types).kind, PassKind::NonTrivial);
  }

  #[test]
  fn microsoft_x64_rejects_non_power_of_two_sizes_to_non_trivial() {
    let mut types = TypeInterner::new();
    let byte = Typespec::of(Terminator::BaseType(types.intern_primitive(PrimitiveKind::I8)));
    // 3 bytes: fits in one register by size, but isn't an exact 1/2/4/8
    // width, so MS x64's classifier still passes it by reference.
    let ts = Typespec::of(Terminator::Array(crate::types::ArrayType { size: 3, elem: Box::new(byte) }));
    assert_eq!(size_of(&ts, &types), 3);
    assert_eq!(classify(Platform::MicrosoftX64, &ts, &types).kind, PassKind::NonTrivial);
  }

  #[test]
  fn microsoft_x64_passes_exact_power_of_two_sizes_in_one_register() {
    let mut types = TypeInterner::new();
    let byte = Typespec::of(Terminator::BaseType(types.intern_primitive(PrimitiveKind::I8)));
    let ts = Typespec::of(Terminator::Array(crate::types::ArrayType { size: 4, elem: Box::new(byte) }));
    assert_eq!(classify(Platform::MicrosoftX64, &ts, &types).kind, PassKind::OneRegister);
  }
}
