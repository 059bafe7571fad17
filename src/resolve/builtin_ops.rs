//! The built-in operator table (spec §4.5). Operator resolution first
//! consults user-declared overloads ([`crate::resolve::lookup::lookup_operator_overloads`]);
//! if none applies, this table is tried.

use crate::token::OpKind;
use crate::types::{Modifier, PrimitiveKind, Terminator, TypeInfoId, TypeInterner, Typespec};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BuiltinOpError {
  #[error("no built-in operator applies to these operand types")]
  NoMatch,
  #[error("unary `&` requires an lvalue operand")]
  AddressOfRvalue,
  #[error("`++`/`--` require a mutable, non-const lvalue")]
  IncDecOnRvalueOrConst,
  #[error("unary `~` does not apply to signed integers; cast to an unsigned type first")]
  BitwiseNotOnSigned,
  #[error("bitwise operators do not apply to signed integers; cast to an unsigned type first")]
  BitwiseOnSigned,
}

fn primitive_of(ts: &Typespec, types: &TypeInterner) -> Option<PrimitiveKind> {
  match ts.terminator() {
    Some(Terminator::BaseType(id)) => types.as_primitive(*id),
    _ => None,
  }
}

fn is_pointer_like(ts: &Typespec) -> bool { ts.is_pointer() }

/// Resolve a unary built-in operator. Returns the result typespec or a
/// specific rejection reason (spec §4.5's "Notes" column).
pub fn resolve_unary(
  op: OpKind,
  operand: &Typespec,
  operand_is_lvalue: bool,
  types: &mut TypeInterner,
) -> Result<Typespec, BuiltinOpError> {
  let prim = primitive_of(operand, types);
  match op {
    OpKind::Plus => {
      if prim.is_some_and(|p| p.is_int() || p.is_float()) {
        Ok(operand.clone())
      } else {
        Err(BuiltinOpError::NoMatch)
      }
    }
    OpKind::Minus => {
      if prim.is_some_and(|p| p.is_signed_int() || p.is_float()) {
        Ok(operand.clone())
      } else {
        Err(BuiltinOpError::NoMatch)
      }
    }
    OpKind::Tilde => match prim {
      Some(p) if p.is_unsigned_int() || p == PrimitiveKind::Bool => Ok(operand.clone()),
      Some(p) if p.is_signed_int() => Err(BuiltinOpError::BitwiseNotOnSigned),
      _ => Err(BuiltinOpError::NoMatch),
    },
    OpKind::Bang => {
      if prim == Some(PrimitiveKind::Bool) {
        Ok(operand.clone())
      } else {
        Err(BuiltinOpError::NoMatch)
      }
    }
    OpKind::Amp => {
      if !operand_is_lvalue {
        return Err(BuiltinOpError::AddressOfRvalue);
      }
      let mut result = operand.clone();
      result.add_layer(Modifier::Pointer).expect("fresh layer never clashes");
      Ok(result)
    }
    OpKind::Star => {
      if is_pointer_like(operand) {
        Ok(operand.blind_get())
      } else {
        Err(BuiltinOpError::NoMatch)
      }
    }
    OpKind::PlusPlus | OpKind::MinusMinus => {
      let eligible = prim.is_some_and(|p| p.is_int() || p == PrimitiveKind::Char) || is_pointer_like(operand);
      if !eligible {
        return Err(BuiltinOpError::NoMatch);
      }
      if !operand_is_lvalue {
        return Err(BuiltinOpError::IncDecOnRvalueOrConst);
      }
      Ok(operand.clone())
    }
    _ => Err(BuiltinOpError::NoMatch),
  }
}

fn wider(a: PrimitiveKind, b: PrimitiveKind) -> Option<PrimitiveKind> {
  if a == b {
    return Some(a);
  }
  if !((a.is_signed_int() && b.is_signed_int()) || (a.is_unsigned_int() && b.is_unsigned_int())) {
    return None;
  }
  Some(if a.bit_width() >= b.bit_width() { a } else { b })
}

fn base_ts(kind: PrimitiveKind, types: &mut TypeInterner) -> Typespec {
  Typespec::of(Terminator::BaseType(types.intern_primitive(kind)))
}

/// Resolve a binary built-in operator.
pub fn resolve_binary(
  op: OpKind,
  lhs: &Typespec,
  rhs: &Typespec,
  types: &mut TypeInterner,
) -> Result<Typespec, BuiltinOpError> {
  let (lp, rp) = (primitive_of(lhs, types), primitive_of(rhs, types));
  match op {
    OpKind::Plus | OpKind::Minus => {
      if let (Some(l), Some(r)) = (lp, rp) {
        if l.is_int() && r.is_int() {
          if let Some(w) = wider(l, r) {
            return Ok(base_ts(w, types));
          }
        }
        if l.is_float() && r.is_float() && l == r {
          return Ok(lhs.clone());
        }
        if l == PrimitiveKind::Char && r.is_int() {
          return Ok(lhs.clone());
        }
      }
      if is_pointer_like(lhs) && rp.is_some_and(PrimitiveKind::is_int) {
        return Ok(lhs.clone());
      }
      if op == OpKind::Minus && is_pointer_like(lhs) && is_pointer_like(rhs) {
        return Ok(base_ts(PrimitiveKind::I64, types));
      }
      Err(BuiltinOpError::NoMatch)
    }
    OpKind::Star | OpKind::Slash | OpKind::Percent => {
      match (lp, rp) {
        (Some(l), Some(r)) if l == r && (l.is_int() || l.is_float()) => Ok(lhs.clone()),
        _ => Err(BuiltinOpError::NoMatch),
      }
    }
    OpKind::EqEq | OpKind::NotEq | OpKind::Lt | OpKind::Le | OpKind::Gt | OpKind::Ge => {
      let comparable = match (lp, rp) {
        (Some(l), Some(r)) => l == r && (l.is_int() || l.is_float() || l == PrimitiveKind::Char || l == PrimitiveKind::Bool || l == PrimitiveKind::Str),
        _ => is_pointer_like(lhs) && is_pointer_like(rhs),
      };
      if comparable { Ok(base_ts(PrimitiveKind::Bool, types)) } else { Err(BuiltinOpError::NoMatch) }
    }
    OpKind::Amp | OpKind::Caret | OpKind::Pipe => {
      match (lp, rp) {
        (Some(l), Some(r)) if l == r && (l.is_unsigned_int() || l == PrimitiveKind::Bool) => Ok(lhs.clone()),
        (Some(l), Some(_)) if l.is_signed_int() => Err(BuiltinOpError::BitwiseOnSigned),
        _ => Err(BuiltinOpError::NoMatch),
      }
    }
    OpKind::Shl | OpKind::Shr => {
      match (lp, rp) {
        (Some(l), Some(r)) if l.is_unsigned_int() && r.is_unsigned_int() => Ok(lhs.clone()),
        _ => Err(BuiltinOpError::NoMatch),
      }
    }
    OpKind::AmpAmp | OpKind::PipePipe | OpKind::CaretCaret => {
      match (lp, rp) {
        (Some(PrimitiveKind::Bool), Some(PrimitiveKind::Bool)) => Ok(base_ts(PrimitiveKind::Bool, types)),
        _ => Err(BuiltinOpError::NoMatch),
      }
    }
    OpKind::Comma => Ok(rhs.clone()),
    _ => Err(BuiltinOpError::NoMatch),
  }
}

/// Whether `as` between two base types is a built-in numeric/char
/// conversion (spec §4.5's `as` row). Narrowing is allowed but the caller
/// is expected to warn.
#[must_use] pub fn is_builtin_cast(from: TypeInfoId, to: TypeInfoId, types: &TypeInterner) -> bool {
  let (Some(f), Some(t)) = (types.as_primitive(from), types.as_primitive(to)) else { return false; };
  (f.is_int() || f.is_float()) && (t.is_int() || t.is_float())
    || f == PrimitiveKind::Char && matches!(t, PrimitiveKind::U32 | PrimitiveKind::I32)
    || t == PrimitiveKind::Char && matches!(f, PrimitiveKind::U32 | PrimitiveKind::I32)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unary_minus_rejects_unsigned() {
    let mut types = TypeInterner::new();
    let u = base_ts(PrimitiveKind::U32, &mut types);
    assert_eq!(resolve_unary(OpKind::Minus, &u, true, &mut types), Err(BuiltinOpError::NoMatch));
  }

  #[test]
  fn unary_tilde_rejects_signed_with_specific_reason() {
    let mut types = TypeInterner::new();
    let s = base_ts(PrimitiveKind::I32, &mut types);
    assert_eq!(resolve_unary(OpKind::Tilde, &s, true, &mut types), Err(BuiltinOpError::BitwiseNotOnSigned));
  }

  #[test]
  fn address_of_requires_lvalue() {
    let mut types = TypeInterner::new();
    let i = base_ts(PrimitiveKind::I32, &mut types);
    assert_eq!(resolve_unary(OpKind::Amp, &i, false, &mut types), Err(BuiltinOpError::AddressOfRvalue));
    assert!(resolve_unary(OpKind::Amp, &i, true, &mut types).is_ok());
  }

  #[test]
  fn plus_widens_to_the_larger_operand() {
    let mut types = TypeInterner::new();
    let i32t = base_ts(PrimitiveKind::I32, &mut types);
    let i64t = base_ts(PrimitiveKind::I64, &mut types);
    let result = resolve_binary(OpKind::Plus, &i32t, &i64t, &mut types).unwrap();
    assert_eq!(result, i64t);
  }

  #[test]
  fn bitwise_and_rejects_signed() {
    let mut types = TypeInterner::new();
    let i32t = base_ts(PrimitiveKind::I32, &mut types);
    assert_eq!(resolve_binary(OpKind::Amp, &i32t, &i32t, &mut types), Err(BuiltinOpError::BitwiseOnSigned));
  }

  #[test]
  fn pointer_minus_pointer_is_int64() {
    let mut types = TypeInterner::new();
    let mut p = base_ts(PrimitiveKind::I32, &mut types);
    p.add_layer(Modifier::Pointer).unwrap();
    let result = resolve_binary(OpKind::Minus, &p, &p, &mut types).unwrap();
    assert_eq!(result, base_ts(PrimitiveKind::I64, &mut types));
  }
}
