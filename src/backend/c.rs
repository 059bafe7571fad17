//! C source emission (spec §4.7): the fallback backend used when
//! `llvm-backend` is disabled or `--backend=c` is requested explicitly.
//!
//! Grounded on an ELF-writing codegen pass elsewhere in this codebase's
//! lineage: that pass is an output-writing stage with its own fresh-label/
//! alignment bookkeeping (`function_pad`, `align_to`) even though it
//! targets raw ELF rather than a text format. We keep its "one small
//! counter per kind of fresh name" shape but apply it to C identifiers
//! instead of machine labels.

use crate::abi_types::TargetProperties;
use crate::ast::destruct::{DestructOp, DestructOpKind};
use crate::interner::{Symbol, SymbolInterner};
use crate::types::{PrimitiveKind, Terminator, TypeInfo, TypeInfoId, TypeInterner, Typespec};
use std::fmt::Write as _;

/// Fresh-identifier counters, one per kind, so two helpers generating
/// names concurrently never collide (spec §4.7: "`v_<hex>`/`t_<hex>`/
/// `gv_<name>_<hex>`").
#[derive(Debug, Default)]
pub struct NameGen {
  next_value: u32,
  next_type: u32,
  next_global: u32,
}

impl NameGen {
  #[must_use] pub fn new() -> Self { Self::default() }

  pub fn fresh_value(&mut self) -> String {
    let id = self.next_value;
    self.next_value += 1;
    format!("v_{id:x}")
  }

  pub fn fresh_type(&mut self) -> String {
    let id = self.next_type;
    self.next_type += 1;
    format!("t_{id:x}")
  }

  pub fn fresh_global(&mut self, hint: &str) -> String {
    let id = self.next_global;
    self.next_global += 1;
    let sanitized: String = hint.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' }).collect();
    format!("gv_{sanitized}_{id:x}")
  }
}

/// The fixed builtin helper library every emitted translation unit links
/// against (spec §4.7: "saturating negation, checked division, bitreverse,
/// popcount, ctz/clz, funnel-shift, byteswap"). Kept as one static text
/// block rather than generated per-use; unused helpers cost nothing once
/// the C compiler's own dead-code elimination runs.
pub const BUILTIN_HELPERS: &str = r#"
#include <stdint.h>
#include <stdlib.h>

static inline int32_t bozon_neg_sat_i32(int32_t a) { return a == INT32_MIN ? INT32_MAX : -a; }
static inline int64_t bozon_neg_sat_i64(int64_t a) { return a == INT64_MIN ? INT64_MAX : -a; }

static inline int32_t bozon_checked_div_i32(int32_t a, int32_t b) {
  if (b == 0 || (a == INT32_MIN && b == -1)) { abort(); }
  return a / b;
}
static inline int64_t bozon_checked_div_i64(int64_t a, int64_t b) {
  if (b == 0 || (a == INT64_MIN && b == -1)) { abort(); }
  return a / b;
}

static inline uint32_t bozon_bitreverse_u32(uint32_t x) {
  x = ((x & 0x55555555u) << 1) | ((x >> 1) & 0x55555555u);
  x = ((x & 0x33333333u) << 2) | ((x >> 2) & 0x33333333u);
  x = ((x & 0x0f0f0f0fu) << 4) | ((x >> 4) & 0x0f0f0f0fu);
  x = (x << 24) | ((x & 0xff00u) << 8) | ((x >> 8) & 0xff00u) | (x >> 24);
  return x;
}

static inline uint32_t bozon_popcount_u32(uint32_t x) { return (uint32_t)__builtin_popcount(x); }
static inline uint32_t bozon_ctz_u32(uint32_t x) { return x == 0 ? 32u : (uint32_t)__builtin_ctz(x); }
static inline uint32_t bozon_clz_u32(uint32_t x) { return x == 0 ? 32u : (uint32_t)__builtin_clz(x); }

static inline uint32_t bozon_funshl_u32(uint32_t hi, uint32_t lo, uint32_t shift) {
  shift %= 32u;
  if (shift == 0) { return hi; }
  return (hi << shift) | (lo >> (32u - shift));
}

static inline uint16_t bozon_bswap_u16(uint16_t x) { return (uint16_t)__builtin_bswap16(x); }
static inline uint32_t bozon_bswap_u32(uint32_t x) { return __builtin_bswap32(x); }
static inline uint64_t bozon_bswap_u64(uint64_t x) { return __builtin_bswap64(x); }
"#;

/// Map a typespec to the C type spelling used in declarations (spec
/// §4.7.1). Declarator syntax (arrays, function pointers) is handled by
/// [`declare`] rather than here, since C's declarator grammar reads
/// inside-out around the identifier.
#[must_use] pub fn base_type_name(ts: &Typespec, types: &TypeInterner, symbols: &SymbolInterner, target: &TargetProperties) -> String {
  if ts.is_pointer() || ts.is_any_reference() {
    return format!("{}*", base_type_name(&ts.blind_get(), types, symbols, target));
  }
  if ts.is_optional() {
    if ts.is_optional_pointer_like() {
      return base_type_name(&ts.blind_get(), types, symbols, target);
    }
    // Non-pointer-like optionals are emitted as a generated `{T value; bool has_value;}`
    // struct by the type-declaration pass; here we just name it by convention.
    return format!("bozon_opt_{}", mangle(&ts.blind_get(), types, symbols));
  }
  match ts.terminator() {
    Some(Terminator::Void) => "void".to_string(),
    Some(Terminator::BaseType(id)) => match types.get(*id) {
      TypeInfo::Primitive(p) => primitive_c_name(*p, target).to_string(),
      TypeInfo::Struct(s) => format!("struct {}", symbols.resolve(s.name)),
    },
    Some(Terminator::Enum(enum_id)) => {
      let info = types.get_enum(*enum_id);
      primitive_c_name(info.underlying, target).to_string()
    }
    Some(Terminator::Array(_) | Terminator::Tuple(_) | Terminator::ArraySlice(_)) => format!("struct bozon_agg_{}", mangle(ts, types, symbols)),
    Some(Terminator::Function(_)) => "void*".to_string(),
    Some(Terminator::Unresolved | Terminator::Auto | Terminator::Typename) | None => {
      unreachable!("lowering invariant violated: incomplete typespec reached the C emitter")
    }
  }
}

fn primitive_c_name(p: PrimitiveKind, target: &TargetProperties) -> &'static str {
  let _ = target; // widths are taken from <stdint.h>, not recomputed per target
  match p {
    PrimitiveKind::I8 => "int8_t",
    PrimitiveKind::I16 => "int16_t",
    PrimitiveKind::I32 => "int32_t",
    PrimitiveKind::I64 => "int64_t",
    PrimitiveKind::U8 => "uint8_t",
    PrimitiveKind::U16 => "uint16_t",
    PrimitiveKind::U32 => "uint32_t",
    PrimitiveKind::U64 => "uint64_t",
    PrimitiveKind::F32 => "float",
    PrimitiveKind::F64 => "double",
    PrimitiveKind::Char => "uint32_t",
    PrimitiveKind::Bool => "_Bool",
    PrimitiveKind::Str => "struct bozon_str",
  }
}

/// A short, stable string fingerprint of a typespec, used for generated
/// aggregate-type names. Not a content hash: good enough for one
/// compilation unit's namespace, collisions would only occur across
/// genuinely distinct type shapes sharing a textual encoding, which the
/// symbol-name codec already treats as equal.
fn mangle(ts: &Typespec, types: &TypeInterner, symbols: &SymbolInterner) -> String {
  crate::types::encode(ts, types, symbols).replace(['.', ' '], "_")
}

/// Emit a declarator: `<base type> <ident>` for scalars, with arrays and
/// function pointers folded into C's inside-out declarator syntax.
#[must_use] pub fn declare(ts: &Typespec, ident: &str, types: &TypeInterner, symbols: &SymbolInterner, target: &TargetProperties) -> String {
  match ts.terminator() {
    Some(Terminator::Array(arr)) if ts.outer_modifier().is_none() => {
      format!("{} {}[{}]", base_type_name(&arr.elem, types, symbols, target), ident, arr.size)
    }
    _ => format!("{} {}", base_type_name(ts, types, symbols, target), ident),
  }
}

/// Topologically order struct declarations so each is emitted only after
/// every struct it embeds by value (spec §4.7.1: "typedefs sorted so a
/// struct never forward-references a by-value member"). Pointer/reference
/// members do not create an edge since C is fine forward-declaring
/// `struct Foo*` before `struct Foo` is complete.
pub fn topo_sort_structs(ids: &[TypeInfoId], types: &TypeInterner) -> Vec<TypeInfoId> {
  let mut visited = hashbrown::HashSet::new();
  let mut order = Vec::with_capacity(ids.len());
  fn visit(id: TypeInfoId, types: &TypeInterner, visited: &mut hashbrown::HashSet<TypeInfoId>, order: &mut Vec<TypeInfoId>) {
    if !visited.insert(id) {
      return;
    }
    if let TypeInfo::Struct(s) = types.get(id) {
      for (_, field_ts) in &s.fields {
        if field_ts.is_pointer() || field_ts.is_any_reference() {
          continue;
        }
        if let Some(Terminator::BaseType(field_id)) = field_ts.terminator() {
          if matches!(types.get(*field_id), TypeInfo::Struct(_)) {
            visit(*field_id, types, visited, order);
          }
        }
      }
    }
    order.push(id);
  }
  for &id in ids {
    visit(id, types, &mut visited, &mut order);
  }
  order
}

/// Linearize a destruct-scope's unwound ops into C statements run in the
/// order the caller already reversed them into (spec §3.6, §4.7.3: the C
/// emitter has no `defer`-like construct, so destructors are always
/// flattened to straight-line code at each exit point rather than emitted
/// once and jumped to).
pub fn emit_destructors(ops: &[DestructOp], symbols: &SymbolInterner, out: &mut String) {
  for op in ops {
    let guard = op.indicator.map(|s| symbols.resolve(s).to_string());
    let call = match &op.kind {
      DestructOpKind::Variable(sym) => format!("{}_dtor(&{});", symbols.resolve(*sym), symbols.resolve(*sym)),
      DestructOpKind::Temporary => "/* temporary destructor: inlined at use site */".to_string(),
      DestructOpKind::ArrayElements(_) => "/* array element destructors emitted by the caller's loop */".to_string(),
    };
    match guard {
      Some(flag) => { let _ = writeln!(out, "if ({flag}) {{ {call} }}"); }
      None => { let _ = writeln!(out, "{call}"); }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::Modifier;

  #[test]
  fn fresh_names_are_unique_and_kind_tagged() {
    let mut gen = NameGen::new();
    assert_eq!(gen.fresh_value(), "v_0");
    assert_eq!(gen.fresh_value(), "v_1");
    assert_eq!(gen.fresh_type(), "t_0");
    assert_eq!(gen.fresh_global("my name!"), "gv_my_name__0");
  }

  #[test]
  fn pointer_type_adds_one_star() {
    let mut types = TypeInterner::new();
    let symbols = SymbolInterner::new();
    let target = TargetProperties::generic_lp64();
    let mut ts = Typespec::of(Terminator::BaseType(types.intern_primitive(PrimitiveKind::I32)));
    ts.add_layer(Modifier::Pointer).unwrap();
    assert_eq!(base_type_name(&ts, &types, &symbols, &target), "int32_t*");
  }

  #[test]
  fn struct_dependency_order_places_members_first() {
    let mut types = TypeInterner::new();
    let mut symbols = SymbolInterner::new();
    let inner_name = symbols.intern("Inner");
    let outer_name = symbols.intern("Outer");
    let i32_ts = Typespec::of(Terminator::BaseType(types.intern_primitive(PrimitiveKind::I32)));
    let inner_id = types.declare_struct(crate::types::StructInfo { name: inner_name, fields: vec![] });
    let outer_field = Typespec::of(Terminator::BaseType(inner_id));
    let outer_id = types.declare_struct(crate::types::StructInfo {
      name: outer_name,
      fields: vec![(symbols.intern("inner"), outer_field)],
    });
    let _ = i32_ts;
    let order = topo_sort_structs(&[outer_id, inner_id], &types);
    assert_eq!(order, vec![inner_id, outer_id]);
  }

  /// The helper identifiers are part of this crate's emitted-C contract
  /// (spec §9 "C backend panic wording"): anything linking hand-written C
  /// against generated output names these functions literally, so their
  /// spelling is pinned here rather than left to drift across edits of
  /// `BUILTIN_HELPERS`.
  #[test]
  fn builtin_helper_names_are_pinned() {
    for name in [
      "bozon_neg_sat_i32",
      "bozon_neg_sat_i64",
      "bozon_checked_div_i32",
      "bozon_checked_div_i64",
      "bozon_bitreverse_u32",
      "bozon_popcount_u32",
      "bozon_ctz_u32",
      "bozon_clz_u32",
      "bozon_funshl_u32",
      "bozon_bswap_u16",
      "bozon_bswap_u32",
      "bozon_bswap_u64",
    ] {
      assert!(BUILTIN_HELPERS.contains(name), "BUILTIN_HELPERS missing expected symbol {name}");
    }
  }
}
