//! The `Session`: one value threading every phase's shared, mutable state
//! (spec §9 "no statics; pass a Session value").
//!
//! Replaces process-wide globals (default/builtin `type_info`s, the LLVM
//! context) with ordinary fields owned by one struct, constructed once per
//! compilation and passed by `&mut` down the pipeline.

use crate::abi_types::TargetProperties;
use crate::backend::abi::Platform;
use crate::diagnostics::{DiagnosticSink, WarningPolicy};
use crate::interner::{Symbol, SymbolInterner};
use crate::scope::ScopeStack;
use crate::types::{PrimitiveKind, TypeInterner};

/// The built-in primitive `Symbol`s interned once at session start, so
/// later phases never re-intern `"int32"`/`"compile_error"`/etc. by
/// re-parsing a name table.
#[derive(Debug, Clone, Copy)]
pub struct WellKnownSymbols {
  pub compile_error: Symbol,
  pub compile_warning: Symbol,
  pub sizeof: Symbol,
  pub main: Symbol,
}

impl WellKnownSymbols {
  fn intern(symbols: &mut SymbolInterner) -> Self {
    Self {
      compile_error: symbols.intern("compile_error"),
      compile_warning: symbols.intern("compile_warning"),
      sizeof: symbols.intern("sizeof"),
      main: symbols.intern("main"),
    }
  }
}

/// Shared state for one compilation (spec §5: "shared mutable state is
/// limited to the diagnostic sink, the type interner, and the scope
/// stack"). Everything else a phase needs is either read-only input
/// (the parsed AST) or local to that phase.
pub struct Session {
  pub symbols: SymbolInterner,
  pub types: TypeInterner,
  pub scopes: ScopeStack,
  pub diagnostics: DiagnosticSink,
  pub target: TargetProperties,
  pub platform: Platform,
  pub well_known: WellKnownSymbols,
}

impl Session {
  #[must_use] pub fn new(policy: WarningPolicy, target: TargetProperties, platform: Platform) -> Self {
    let mut symbols = SymbolInterner::new();
    let well_known = WellKnownSymbols::intern(&mut symbols);
    let mut types = TypeInterner::new();
    for kind in [
      PrimitiveKind::I8, PrimitiveKind::I16, PrimitiveKind::I32, PrimitiveKind::I64,
      PrimitiveKind::U8, PrimitiveKind::U16, PrimitiveKind::U32, PrimitiveKind::U64,
      PrimitiveKind::F32, PrimitiveKind::F64, PrimitiveKind::Char, PrimitiveKind::Bool, PrimitiveKind::Str,
    ] {
      types.intern_primitive(kind);
    }
    Self {
      symbols,
      types,
      scopes: ScopeStack::new(),
      diagnostics: DiagnosticSink::new(policy),
      target,
      platform,
      well_known,
    }
  }

  /// The session-default configuration: generic LP64 target, no
  /// `--target` override, no custom warning policy.
  #[must_use] pub fn with_defaults() -> Self {
    Self::new(WarningPolicy::new(), TargetProperties::generic_lp64(), Platform::Generic)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::PrimitiveKind;

  #[test]
  fn builtin_primitives_are_preinterned() {
    let session = Session::with_defaults();
    assert!(session.types.find_primitive(PrimitiveKind::I32).is_some());
    assert!(session.types.find_primitive(PrimitiveKind::Str).is_some());
  }

  #[test]
  fn well_known_symbols_resolve_to_their_names() {
    let session = Session::with_defaults();
    assert_eq!(session.symbols.resolve(session.well_known.compile_error), "compile_error");
    assert_eq!(session.symbols.resolve(session.well_known.main), "main");
  }
}
