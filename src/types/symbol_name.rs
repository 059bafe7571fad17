//! The symbol-name codec (spec §3.2, §6.4): a bijective textual encoding of
//! complete typespecs used as linker symbols and in diagnostic demangling.
//!
//! Grounded on `original_source/src/ast/typespec.cpp`'s `get_symbol_name`/
//! `decode_symbol_name` pair. That implementation represents "the pointee of
//! a pointer/reference is const" with an explicit modifier node; our
//! modifier set (spec §3.2) instead represents mutability as the presence
//! or absence of a `Mut` layer, so encoding synthesizes the `const.`/
//! `consteval.` marker at every pointee/referent position instead of
//! reading it off an explicit node. The two encodings agree exactly on the
//! worked example `encode(*const [3: int32]) == "0P.const.0A.1.3.int32"`.

use crate::types::modifier::Modifier;
use crate::types::terminator::Terminator;
use crate::types::type_info::{PrimitiveKind, TypeInfo, TypeInfoId, TypeInterner};
use crate::types::typespec::Typespec;
use crate::interner::SymbolInterner;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
  #[error("unexpected end of encoded symbol name")]
  UnexpectedEnd,
  #[error("unknown type name {0:?} in encoded symbol name")]
  UnknownTypeName(String),
  #[error("malformed array/tuple count in encoded symbol name")]
  MalformedCount,
  #[error("typespec is not complete; it has no symbol name")]
  Incomplete,
}

fn collapse_array_dims(arr: &crate::types::terminator::ArrayType) -> (Vec<u64>, &Typespec) {
  let mut dims = vec![arr.size];
  let mut elem = &*arr.elem;
  while elem.modifiers.is_empty() {
    if let Some(Terminator::Array(inner)) = elem.terminator() {
      dims.push(inner.size);
      elem = &inner.elem;
    } else {
      break;
    }
  }
  (dims, elem)
}

fn encode_terminator(term: &Terminator, types: &TypeInterner, symbols: &SymbolInterner) -> String {
  match term {
    Terminator::Unresolved | Terminator::Auto | Terminator::Typename =>
      panic!("codec invariant violated: incomplete terminator reached the symbol-name codec"),
    Terminator::Void => "void".to_string(),
    Terminator::BaseType(id) => base_type_name(*id, types, symbols).to_string(),
    Terminator::Enum(id) => symbols.resolve(types.get_enum(*id).name).to_string(),
    Terminator::Array(arr) => {
      let (dims, elem) = collapse_array_dims(arr);
      let mut out = format!("0A.{}.", dims.len());
      for d in &dims {
        out.push_str(&format!("{d}."));
      }
      out.push_str(&encode(elem, types, symbols));
      out
    }
    Terminator::ArraySlice(elem) => format!("0S.{}", encode(elem, types, symbols)),
    Terminator::Tuple(elems) => {
      let mut out = format!("0T.{}", elems.len());
      for e in elems {
        out.push('.');
        out.push_str(&encode(e, types, symbols));
      }
      out
    }
    Terminator::Function(sig) => {
      let mut out = format!("0F.{}.", sig.params.len());
      for p in &sig.params {
        out.push_str(&encode(p, types, symbols));
        out.push('.');
      }
      out.push_str(&encode(&sig.ret, types, symbols));
      out
    }
  }
}

fn base_type_name<'a>(id: TypeInfoId, types: &'a TypeInterner, symbols: &'a SymbolInterner) -> std::borrow::Cow<'a, str> {
  match types.get(id) {
    TypeInfo::Primitive(p) => std::borrow::Cow::Borrowed(p.name()),
    TypeInfo::Struct(s) => std::borrow::Cow::Borrowed(symbols.resolve(s.name)),
  }
}

fn encode_from(mods: &[Modifier], term: &Terminator, types: &TypeInterner, symbols: &SymbolInterner, mut_check: bool) -> String {
  if mut_check {
    return match mods.split_first() {
      Some((Modifier::Mut, rest)) => encode_from(rest, term, types, symbols, false),
      Some((Modifier::Consteval, rest)) => format!("consteval.{}", encode_from(rest, term, types, symbols, false)),
      _ => format!("const.{}", encode_from(mods, term, types, symbols, false)),
    };
  }
  match mods.split_first() {
    Some((Modifier::Pointer, rest)) => format!("0P.{}", encode_from(rest, term, types, symbols, true)),
    Some((m, rest)) if m.is_reference() => format!("0R.{}", encode_from(rest, term, types, symbols, true)),
    Some((Modifier::Optional, rest)) => format!("0O.{}", encode_from(rest, term, types, symbols, false)),
    Some((Modifier::Mut, rest)) => encode_from(rest, term, types, symbols, false),
    Some((Modifier::Consteval, rest)) => format!("consteval.{}", encode_from(rest, term, types, symbols, false)),
    Some((Modifier::Variadic, _)) => panic!("codec invariant violated: variadic typespec reached the symbol-name codec"),
    None => encode_terminator(term, types, symbols),
  }
}

/// Encode a complete typespec into its linker-symbol/diagnostic form
/// (spec §3.2, §6.4). Panics if `ts` is not complete: incomplete types
/// never reach codegen, so requesting their symbol name is an internal
/// invariant violation rather than a user-facing error.
#[must_use] pub fn encode(ts: &Typespec, types: &TypeInterner, symbols: &SymbolInterner) -> String {
  let term = ts.terminator().expect("codec invariant violated: empty typespec has no symbol name");
  encode_from(&ts.modifiers, term, types, symbols, false)
}

struct NameTable<'a> {
  types: &'a TypeInterner,
  symbols: &'a SymbolInterner,
}

impl<'a> NameTable<'a> {
  fn resolve(&self, name: &str) -> Option<TypeInfoId> {
    for kind in PRIMITIVE_KINDS {
      if kind.name() == name {
        // primitives are always interned on first use elsewhere; here we
        // only need to find an id if one already exists.
        return self.types.find_primitive(*kind);
      }
    }
    self.types.find_struct_by_name(name, self.symbols)
  }
}

const PRIMITIVE_KINDS: &[PrimitiveKind] = &[
  PrimitiveKind::I8, PrimitiveKind::I16, PrimitiveKind::I32, PrimitiveKind::I64,
  PrimitiveKind::U8, PrimitiveKind::U16, PrimitiveKind::U32, PrimitiveKind::U64,
  PrimitiveKind::F32, PrimitiveKind::F64, PrimitiveKind::Char, PrimitiveKind::Bool, PrimitiveKind::Str,
];

struct Cursor<'a> { s: &'a str }

impl<'a> Cursor<'a> {
  fn eat(&mut self, prefix: &str) -> bool {
    if let Some(rest) = self.s.strip_prefix(prefix) {
      self.s = rest;
      true
    } else {
      false
    }
  }

  fn parse_uint(&mut self) -> Result<u64, CodecError> {
    let end = self.s.find(|c: char| !c.is_ascii_digit()).unwrap_or(self.s.len());
    if end == 0 {
      return Err(CodecError::MalformedCount);
    }
    let (digits, rest) = self.s.split_at(end);
    self.s = rest;
    digits.parse().map_err(|_| CodecError::MalformedCount)
  }

  fn parse_ident(&mut self) -> Result<&'a str, CodecError> {
    let end = self.s.find(|c: char| !(c.is_alphanumeric() || c == '_')).unwrap_or(self.s.len());
    if end == 0 {
      return Err(CodecError::UnexpectedEnd);
    }
    let (ident, rest) = self.s.split_at(end);
    self.s = rest;
    Ok(ident)
  }
}

fn decode_value(cur: &mut Cursor<'_>, table: &NameTable<'_>, mut_check: bool) -> Result<Typespec, CodecError> {
  if mut_check {
    if cur.eat("const.") {
      return decode_value(cur, table, false);
    }
    if cur.eat("consteval.") {
      let mut inner = decode_value(cur, table, false)?;
      inner.add_layer(Modifier::Consteval).expect("codec: fresh layer never clashes");
      return Ok(inner);
    }
    let mut inner = decode_value(cur, table, false)?;
    inner.add_layer(Modifier::Mut).expect("codec: fresh layer never clashes");
    return Ok(inner);
  }

  if cur.eat("0P.") {
    let mut inner = decode_value(cur, table, true)?;
    inner.add_layer(Modifier::Pointer).expect("codec: fresh layer never clashes");
    return Ok(inner);
  }
  if cur.eat("0R.") {
    let mut inner = decode_value(cur, table, true)?;
    inner.add_layer(Modifier::LvalueReference).expect("codec: fresh layer never clashes");
    return Ok(inner);
  }
  if cur.eat("0O.") {
    let mut inner = decode_value(cur, table, false)?;
    inner.add_layer(Modifier::Optional).expect("codec: fresh layer never clashes");
    return Ok(inner);
  }
  if cur.eat("0A.") {
    let n = cur.parse_uint()?;
    if !cur.eat(".") { return Err(CodecError::UnexpectedEnd); }
    let mut dims = Vec::with_capacity(n as usize);
    for _ in 0..n {
      dims.push(cur.parse_uint()?);
      if !cur.eat(".") { return Err(CodecError::UnexpectedEnd); }
    }
    let elem = decode_value(cur, table, false)?;
    let mut ts = elem;
    for &d in dims.iter().rev() {
      ts = Typespec::of(Terminator::Array(crate::types::terminator::ArrayType { size: d, elem: Box::new(ts) }));
    }
    return Ok(ts);
  }
  if cur.eat("0S.") {
    let elem = decode_value(cur, table, false)?;
    return Ok(Typespec::of(Terminator::ArraySlice(Box::new(elem))));
  }
  if cur.eat("0T.") {
    let k = cur.parse_uint()?;
    let mut elems = Vec::with_capacity(k as usize);
    for _ in 0..k {
      if !cur.eat(".") { return Err(CodecError::UnexpectedEnd); }
      elems.push(decode_value(cur, table, false)?);
    }
    return Ok(Typespec::of(Terminator::Tuple(elems)));
  }
  if cur.eat("0F.") {
    let n = cur.parse_uint()?;
    if !cur.eat(".") { return Err(CodecError::UnexpectedEnd); }
    let mut params = Vec::with_capacity(n as usize);
    for _ in 0..n {
      params.push(decode_value(cur, table, false)?);
      if !cur.eat(".") { return Err(CodecError::UnexpectedEnd); }
    }
    let ret = decode_value(cur, table, false)?;
    return Ok(Typespec::of(Terminator::Function(crate::types::terminator::FunctionSig {
      params, ret: Box::new(ret), cc: crate::types::terminator::CallingConvention::Bozon,
    })));
  }
  if cur.eat("void") {
    return Ok(Typespec::of(Terminator::Void));
  }
  let ident = cur.parse_ident()?;
  match table.resolve(ident) {
    Some(id) => Ok(Typespec::of(Terminator::BaseType(id))),
    None => Err(CodecError::UnknownTypeName(ident.to_string())),
  }
}

/// Decode a symbol name produced by [`encode`]. Exact inverse: for every
/// complete typespec `t`, `decode(encode(t)) == t` (testable property 1).
pub fn decode(s: &str, types: &TypeInterner, symbols: &SymbolInterner) -> Result<Typespec, CodecError> {
  let table = NameTable { types, symbols };
  let mut cur = Cursor { s };
  let ts = decode_value(&mut cur, &table, false)?;
  if !cur.s.is_empty() {
    return Err(CodecError::UnexpectedEnd);
  }
  Ok(ts)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::terminator::ArrayType;

  fn setup() -> (TypeInterner, SymbolInterner) {
    (TypeInterner::new(), SymbolInterner::new())
  }

  #[test]
  fn scenario_s5_pointer_to_const_array() {
    let (mut types, symbols) = setup();
    let i32_id = types.intern_primitive(PrimitiveKind::I32);
    let mut ts = Typespec::of(Terminator::Array(ArrayType {
      size: 3,
      elem: Box::new(Typespec::of(Terminator::BaseType(i32_id))),
    }));
    ts.add_layer(Modifier::Pointer).unwrap();
    let encoded = encode(&ts, &types, &symbols);
    assert_eq!(encoded, "0P.const.0A.1.3.int32");
    let decoded = decode(&encoded, &types, &symbols).unwrap();
    assert_eq!(decoded, ts);
  }

  #[test]
  fn mut_pointer_omits_const_marker() {
    let (mut types, symbols) = setup();
    let i32_id = types.intern_primitive(PrimitiveKind::I32);
    let mut ts = Typespec::of(Terminator::BaseType(i32_id));
    ts.add_layer(Modifier::Mut).unwrap();
    ts.add_layer(Modifier::Pointer).unwrap();
    let encoded = encode(&ts, &types, &symbols);
    assert_eq!(encoded, "0P.int32");
    assert_eq!(decode(&encoded, &types, &symbols).unwrap(), ts);
  }

  #[test]
  fn consteval_pointee() {
    let (mut types, symbols) = setup();
    let i32_id = types.intern_primitive(PrimitiveKind::I32);
    let mut ts = Typespec::of(Terminator::BaseType(i32_id));
    ts.add_layer(Modifier::Consteval).unwrap();
    ts.add_layer(Modifier::Pointer).unwrap();
    let encoded = encode(&ts, &types, &symbols);
    assert_eq!(encoded, "0P.consteval.int32");
    assert_eq!(decode(&encoded, &types, &symbols).unwrap(), ts);
  }

  #[test]
  fn tuple_round_trip() {
    let (mut types, symbols) = setup();
    let i32_id = types.intern_primitive(PrimitiveKind::I32);
    let bool_id = types.intern_primitive(PrimitiveKind::Bool);
    let ts = Typespec::of(Terminator::Tuple(vec![
      Typespec::of(Terminator::BaseType(i32_id)),
      Typespec::of(Terminator::BaseType(bool_id)),
    ]));
    let encoded = encode(&ts, &types, &symbols);
    assert_eq!(encoded, "0T.2.int32.bool");
    assert_eq!(decode(&encoded, &types, &symbols).unwrap(), ts);
  }

  #[test]
  fn slice_and_void_round_trip() {
    let (mut types, symbols) = setup();
    let i32_id = types.intern_primitive(PrimitiveKind::I32);
    let ts = Typespec::of(Terminator::ArraySlice(Box::new(Typespec::of(Terminator::BaseType(i32_id)))));
    let encoded = encode(&ts, &types, &symbols);
    assert_eq!(encoded, "0S.int32");
    assert_eq!(decode(&encoded, &types, &symbols).unwrap(), ts);

    let void_ts = Typespec::of(Terminator::Void);
    assert_eq!(encode(&void_ts, &types, &symbols), "void");
    assert_eq!(decode("void", &types, &symbols).unwrap(), void_ts);
  }

  #[test]
  fn unknown_type_name_is_an_error_not_a_panic() {
    let (types, symbols) = setup();
    assert_eq!(decode("nonexistent", &types, &symbols), Err(CodecError::UnknownTypeName("nonexistent".to_string())));
  }

  proptest::proptest! {
    #[test]
    fn round_trip_holds_for_generated_primitive_typespecs(
      pointer in proptest::bool::ANY,
      mutable in proptest::bool::ANY,
      kind_idx in 0usize..PRIMITIVE_KINDS.len(),
    ) {
      let (mut types, symbols) = setup();
      let id = types.intern_primitive(PRIMITIVE_KINDS[kind_idx]);
      let mut ts = Typespec::of(Terminator::BaseType(id));
      if pointer {
        if mutable {
          ts.add_layer(Modifier::Mut).unwrap();
        }
        ts.add_layer(Modifier::Pointer).unwrap();
      }
      let encoded = encode(&ts, &types, &symbols);
      let decoded = decode(&encoded, &types, &symbols).unwrap();
      proptest::prop_assert_eq!(decoded, ts);
    }
  }
}
