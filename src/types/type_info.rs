//! Interned type prototypes.
//!
//! Base-type identity is pointer identity of the `type_info` (spec §3.2).
//! Rather than reference-counted graphs of `type_info` nodes (as
//! `Entity`/`FileSpan` back-reference graphs elsewhere in this codebase's
//! lineage do), we follow the §9 design note and intern everything into
//! arenas, using dense indices as the identity.

use crate::interner::Symbol;
use crate::types::typespec::Typespec;

/// The closed set of built-in primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
  I8, I16, I32, I64,
  U8, U16, U32, U64,
  F32, F64,
  Char,
  Bool,
  Str,
}

impl PrimitiveKind {
  #[must_use] pub fn name(self) -> &'static str {
    match self {
      Self::I8 => "int8", Self::I16 => "int16", Self::I32 => "int32", Self::I64 => "int64",
      Self::U8 => "uint8", Self::U16 => "uint16", Self::U32 => "uint32", Self::U64 => "uint64",
      Self::F32 => "float32", Self::F64 => "float64",
      Self::Char => "char",
      Self::Bool => "bool",
      Self::Str => "str",
    }
  }

  #[must_use] pub fn is_signed_int(self) -> bool {
    matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
  }

  #[must_use] pub fn is_unsigned_int(self) -> bool {
    matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
  }

  #[must_use] pub fn is_int(self) -> bool { self.is_signed_int() || self.is_unsigned_int() }

  #[must_use] pub fn is_float(self) -> bool { matches!(self, Self::F32 | Self::F64) }

  /// Bit width of integer/float primitives; meaningless for `char`/`bool`/`str`.
  #[must_use] pub fn bit_width(self) -> u32 {
    match self {
      Self::I8 | Self::U8 => 8,
      Self::I16 | Self::U16 => 16,
      Self::I32 | Self::U32 | Self::F32 => 32,
      Self::I64 | Self::U64 | Self::F64 => 64,
      Self::Char => 32,
      Self::Bool => 8,
      Self::Str => 0,
    }
  }

  /// The next-wider primitive of the same signedness class, used by the
  /// overload ranker's integer-widening rule (spec §4.3).
  #[must_use] pub fn widen(self) -> Option<Self> {
    Some(match self {
      Self::I8 => Self::I16, Self::I16 => Self::I32, Self::I32 => Self::I64,
      Self::U8 => Self::U16, Self::U16 => Self::U32, Self::U32 => Self::U64,
      Self::F32 => Self::F64,
      Self::I64 | Self::U64 | Self::F64 | Self::Char | Self::Bool | Self::Str => return None,
    })
  }
}

#[derive(Debug, Clone)]
pub struct StructInfo {
  pub name: Symbol,
  pub fields: Vec<(Symbol, Typespec)>,
}

/// A user type prototype: either a built-in primitive or a user struct.
#[derive(Debug, Clone)]
pub enum TypeInfo {
  Primitive(PrimitiveKind),
  Struct(StructInfo),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeInfoId(u32);

#[derive(Debug, Clone)]
pub struct EnumInfo {
  pub name: Symbol,
  pub underlying: PrimitiveKind,
  pub variants: Vec<(Symbol, i128)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnumId(u32);

/// Monotonic arena of `type_info`/enum records. Like [`crate::SymbolInterner`],
/// entries are only ever appended; `TypeInfoId`/`EnumId` equality is the
/// only notion of "same type" the rest of the crate needs (spec §3.2:
/// "base-type identity is pointer-identity of its `type_info`").
#[derive(Debug, Default)]
pub struct TypeInterner {
  types: Vec<TypeInfo>,
  enums: Vec<EnumInfo>,
  primitive_ids: hashbrown::HashMap<PrimitiveKind, TypeInfoId>,
}

impl TypeInterner {
  #[must_use] pub fn new() -> Self { Self::default() }

  /// Intern (and dedup) a primitive. Structs are never deduplicated
  /// structurally -- two separately-declared structs with identical fields
  /// are still distinct types -- so there is no corresponding
  /// `intern_struct`; callers use [`Self::declare_struct`].
  pub fn intern_primitive(&mut self, kind: PrimitiveKind) -> TypeInfoId {
    if let Some(&id) = self.primitive_ids.get(&kind) {
      return id;
    }
    let id = TypeInfoId(u32::try_from(self.types.len()).expect("type arena overflow"));
    self.types.push(TypeInfo::Primitive(kind));
    self.primitive_ids.insert(kind, id);
    id
  }

  pub fn declare_struct(&mut self, info: StructInfo) -> TypeInfoId {
    let id = TypeInfoId(u32::try_from(self.types.len()).expect("type arena overflow"));
    self.types.push(TypeInfo::Struct(info));
    id
  }

  pub fn declare_enum(&mut self, info: EnumInfo) -> EnumId {
    let id = EnumId(u32::try_from(self.enums.len()).expect("enum arena overflow"));
    self.enums.push(info);
    id
  }

  #[must_use] pub fn get(&self, id: TypeInfoId) -> &TypeInfo { &self.types[id.0 as usize] }
  #[must_use] pub fn get_enum(&self, id: EnumId) -> &EnumInfo { &self.enums[id.0 as usize] }

  #[must_use] pub fn as_primitive(&self, id: TypeInfoId) -> Option<PrimitiveKind> {
    match self.get(id) {
      TypeInfo::Primitive(p) => Some(*p),
      TypeInfo::Struct(_) => None,
    }
  }

  /// Look up an already-interned primitive by kind, without interning it.
  /// Used by the symbol-name decoder (spec §3.2), which must not silently
  /// create types for names it merely parses out of a string.
  #[must_use] pub fn find_primitive(&self, kind: PrimitiveKind) -> Option<TypeInfoId> {
    self.primitive_ids.get(&kind).copied()
  }

  /// Look up an already-declared struct by its name, for the symbol-name
  /// decoder. Linear scan: decoding is a cold path (diagnostics, linker
  /// symbol round-trips in tests), not the hot resolution loop.
  #[must_use] pub fn find_struct_by_name(&self, name: &str, symbols: &crate::interner::SymbolInterner) -> Option<TypeInfoId> {
    self.types.iter().enumerate().find_map(|(i, t)| match t {
      TypeInfo::Struct(s) if symbols.resolve(s.name) == name => {
        Some(TypeInfoId(u32::try_from(i).expect("type arena overflow")))
      }
      _ => None,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn primitive_interning_dedups() {
    let mut interner = TypeInterner::new();
    let a = interner.intern_primitive(PrimitiveKind::I32);
    let b = interner.intern_primitive(PrimitiveKind::I32);
    let c = interner.intern_primitive(PrimitiveKind::U32);
    assert_eq!(a, b);
    assert_ne!(a, c);
  }

  #[test]
  fn structurally_identical_structs_are_distinct_ids() {
    let mut interner = TypeInterner::new();
    let mut symbols = crate::interner::SymbolInterner::new();
    let name = symbols.intern("Point");
    let a = interner.declare_struct(StructInfo { name, fields: vec![] });
    let b = interner.declare_struct(StructInfo { name, fields: vec![] });
    assert_ne!(a, b, "declarations are never deduplicated, only primitives are");
  }
}
