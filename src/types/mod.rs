//! The type system: type prototypes (`type_info`), the symbol-name codec,
//! and the typespec (modifier/terminator) algebra.
//!
//! Mirrors the three-layer shape of a `types` module built around
//! `entity.rs` et al.: a small set of interned, index-identified
//! structural records, plus a linear algebraic description (the typespec)
//! built on top of them.

pub mod type_info;
pub mod modifier;
pub mod terminator;
pub mod typespec;
pub mod symbol_name;

pub use modifier::Modifier;
pub use terminator::{Terminator, FunctionSig, ArrayType, CallingConvention};
pub use type_info::{TypeInfo, TypeInfoId, PrimitiveKind, StructInfo, EnumId, EnumInfo, TypeInterner};
pub use typespec::{Typespec, TypespecError};
pub use symbol_name::{encode, decode, CodecError};
