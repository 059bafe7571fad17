//! Compile-time values (spec §3.7) and the `safe_*` arithmetic-folding
//! routines (spec §4.2).
//!
//! Grounded on `original_source/src/ctx/safe_operations.cpp`: that file
//! implements exactly this wrap-on-overflow / warn-not-trap policy per
//! integer width, plus the char±int range check and the shift-amount mask.
//! We keep its per-operation shape (one function per arithmetic op, each
//! taking the acting width and a diagnostic sink) but fold the four integer
//! widths into one function parameterized by `width`.

use crate::diagnostics::{DiagnosticSink, WarningCategory};
use crate::interner::Symbol;
use crate::token::SrcTokens;
use crate::types::Typespec;

/// A tagged union over the primitive compile-time value set plus `type`
/// and `aggregate` (spec §3.7). Integers carry their bit width explicitly
/// since `safe_*` folding and the symbol-codec's width-sensitive rules both
/// need it.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
  SInt { width: u32, value: i64 },
  UInt { width: u32, value: u64 },
  Float32(f32),
  Float64(f64),
  Char(char),
  Str(String),
  Bool(bool),
  Null,
  Array(Vec<ConstantValue>),
  Tuple(Vec<ConstantValue>),
  Function(Symbol),
  Type(Typespec),
  Aggregate(Vec<ConstantValue>),
}

impl ConstantValue {
  #[must_use] pub fn sint(value: i64) -> Self { Self::SInt { width: 32, value } }
  #[must_use] pub fn uint(value: u64) -> Self { Self::UInt { width: 32, value } }
}

fn mask_signed(width: u32, value: i128) -> i64 {
  debug_assert!(matches!(width, 8 | 16 | 32 | 64));
  if width == 64 {
    value as i64
  } else {
    let bits = width;
    let m = 1i128 << bits;
    let mut v = value.rem_euclid(m);
    if v >= m / 2 { v -= m; }
    v as i64
  }
}

fn mask_unsigned(width: u32, value: u128) -> u64 {
  if width == 64 {
    value as u64
  } else {
    (value % (1u128 << width)) as u64
  }
}

fn int_min(width: u32) -> i64 {
  match width { 8 => i8::MIN as i64, 16 => i16::MIN as i64, 32 => i32::MIN as i64, 64 => i64::MIN, _ => unreachable!() }
}

macro_rules! signed_binop {
  ($name:ident, $op:tt) => {
    #[must_use] pub fn $name(span: SrcTokens, sink: &mut DiagnosticSink, width: u32, a: i64, b: i64) -> i64 {
      let raw = (a as i128) $op (b as i128);
      let wrapped = mask_signed(width, raw);
      if wrapped as i128 != raw {
        sink.report_warning(span, WarningCategory::IntOverflow, format!("integer overflow; wrapped to {wrapped}"));
      }
      wrapped
    }
  };
}

signed_binop!(safe_add_signed, +);
signed_binop!(safe_sub_signed, -);
signed_binop!(safe_mul_signed, *);

macro_rules! unsigned_binop {
  ($name:ident, $op:tt) => {
    #[must_use] pub fn $name(span: SrcTokens, sink: &mut DiagnosticSink, width: u32, a: u64, b: u64) -> u64 {
      let raw = (a as u128) $op (b as u128);
      let wrapped = mask_unsigned(width, raw);
      if wrapped as u128 != raw {
        sink.report_warning(span, WarningCategory::IntOverflow, format!("integer overflow; wrapped to {wrapped}"));
      }
      wrapped
    }
  };
}

unsigned_binop!(safe_add_unsigned, +);
unsigned_binop!(safe_sub_unsigned, -);
unsigned_binop!(safe_mul_unsigned, *);

#[must_use] pub fn safe_div_signed(span: SrcTokens, sink: &mut DiagnosticSink, width: u32, a: i64, b: i64) -> Option<i64> {
  if b == 0 {
    sink.report_warning(span, WarningCategory::IntDivideByZero, "division by zero");
    return None;
  }
  if a == int_min(width) && b == -1 {
    sink.report_warning(span, WarningCategory::IntOverflow, format!("integer overflow; wrapped to {}", int_min(width)));
    return Some(int_min(width));
  }
  Some(a / b)
}

#[must_use] pub fn safe_mod_signed(span: SrcTokens, sink: &mut DiagnosticSink, _width: u32, a: i64, b: i64) -> Option<i64> {
  if b == 0 {
    sink.report_warning(span, WarningCategory::IntDivideByZero, "modulo by zero");
    return None;
  }
  Some(a % b)
}

#[must_use] pub fn safe_div_unsigned(span: SrcTokens, sink: &mut DiagnosticSink, _width: u32, a: u64, b: u64) -> Option<u64> {
  if b == 0 {
    sink.report_warning(span, WarningCategory::IntDivideByZero, "division by zero");
    return None;
  }
  Some(a / b)
}

#[must_use] pub fn safe_mod_unsigned(span: SrcTokens, sink: &mut DiagnosticSink, _width: u32, a: u64, b: u64) -> Option<u64> {
  if b == 0 {
    sink.report_warning(span, WarningCategory::IntDivideByZero, "modulo by zero");
    return None;
  }
  Some(a % b)
}

#[must_use] pub fn safe_neg_signed(span: SrcTokens, sink: &mut DiagnosticSink, width: u32, a: i64) -> i64 {
  if a == int_min(width) {
    sink.report_warning(span, WarningCategory::IntOverflow, format!("negation of INT_MIN; wrapped to {a}"));
    return a;
  }
  -a
}

/// Shift amount is masked into `0..width` and a warning is reported if it
/// was out of that range (spec §4.2).
#[must_use] pub fn safe_shl_unsigned(span: SrcTokens, sink: &mut DiagnosticSink, width: u32, a: u64, amount: u32) -> u64 {
  let masked = amount % width;
  if masked != amount {
    sink.report_warning(span, WarningCategory::IntOverflow, format!("shift amount {amount} out of range; masked to {masked}"));
  }
  mask_unsigned(width, (a as u128) << masked)
}

#[must_use] pub fn safe_shr_unsigned(span: SrcTokens, sink: &mut DiagnosticSink, width: u32, a: u64, amount: u32) -> u64 {
  let masked = amount % width;
  if masked != amount {
    sink.report_warning(span, WarningCategory::IntOverflow, format!("shift amount {amount} out of range; masked to {masked}"));
  }
  a >> masked
}

const UNICODE_MAX: u32 = 0x0010_FFFF;

/// `char + int` / `char - int` perform uint32 arithmetic (spec §4.2); a
/// result outside the Unicode scalar range is an *error*, not a warning.
pub fn safe_char_add_int(span: SrcTokens, sink: &mut DiagnosticSink, c: char, delta: i64) -> Result<char, ()> {
  let raw = i64::from(u32::from(c)) + delta;
  if !(0..=i64::from(UNICODE_MAX)).contains(&raw) {
    sink.report_error(span, format!("character arithmetic result {raw:#x} is outside the Unicode scalar range"));
    return Err(());
  }
  char::from_u32(raw as u32).ok_or_else(|| {
    sink.report_error(span, format!("character arithmetic result {raw:#x} is not a valid Unicode scalar value"));
  })
}

fn finite_check(span: SrcTokens, sink: &mut DiagnosticSink, operands_finite: bool, result: f64) -> f64 {
  if operands_finite && !result.is_finite() {
    sink.report_warning(span, WarningCategory::FloatNonFinite, "floating-point operation produced a non-finite result");
  }
  result
}

#[must_use] pub fn safe_add_float(span: SrcTokens, sink: &mut DiagnosticSink, a: f64, b: f64) -> f64 {
  finite_check(span, sink, a.is_finite() && b.is_finite(), a + b)
}
#[must_use] pub fn safe_sub_float(span: SrcTokens, sink: &mut DiagnosticSink, a: f64, b: f64) -> f64 {
  finite_check(span, sink, a.is_finite() && b.is_finite(), a - b)
}
#[must_use] pub fn safe_mul_float(span: SrcTokens, sink: &mut DiagnosticSink, a: f64, b: f64) -> f64 {
  finite_check(span, sink, a.is_finite() && b.is_finite(), a * b)
}

/// Float division by zero is not an error: it folds to the IEEE result
/// (`inf`/`nan`) plus a warning (spec §4.2).
#[must_use] pub fn safe_div_float(span: SrcTokens, sink: &mut DiagnosticSink, a: f64, b: f64) -> f64 {
  let result = a / b;
  if b == 0.0 {
    sink.report_warning(span, WarningCategory::FloatDivideByZero, "floating-point division by zero");
    return result;
  }
  finite_check(span, sink, a.is_finite(), result)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::diagnostics::WarningPolicy;

  fn span() -> SrcTokens { SrcTokens::point(crate::token::Pos { byte: 0, line: 1 }) }

  #[test]
  fn scenario_s1_overflow_wraps_and_warns() {
    let mut sink = DiagnosticSink::new(WarningPolicy::new());
    let result = safe_add_signed(span(), &mut sink, 8, 127, 1);
    assert_eq!(result, -128);
    assert!(sink.diagnostics().iter().any(|d| d.render().starts_with("warning:")));
  }

  #[test]
  fn scenario_s2_divide_by_zero_warns_and_yields_none() {
    let mut sink = DiagnosticSink::new(WarningPolicy::new());
    assert_eq!(safe_div_signed(span(), &mut sink, 32, 1, 0), None);
    assert!(sink.diagnostics().iter().any(|d| d.render().contains("division by zero")));
  }

  #[test]
  fn char_arithmetic_out_of_range_is_an_error_not_a_warning() {
    let mut sink = DiagnosticSink::new(WarningPolicy::new());
    let result = safe_char_add_int(span(), &mut sink, '\u{10FFFF}', 1);
    assert!(result.is_err());
    assert!(sink.has_errors());
  }

  #[test]
  fn char_arithmetic_in_range_succeeds_silently() {
    let mut sink = DiagnosticSink::new(WarningPolicy::new());
    let result = safe_char_add_int(span(), &mut sink, 'a', 1).unwrap();
    assert_eq!(result, 'b');
    assert!(sink.is_empty());
  }

  #[test]
  fn shift_amount_is_masked_and_warned() {
    let mut sink = DiagnosticSink::new(WarningPolicy::new());
    let result = safe_shl_unsigned(span(), &mut sink, 8, 1, 9);
    assert_eq!(result, 1 << (9 % 8));
    assert!(!sink.is_empty());
  }

  #[test]
  fn int_min_negation_warns_and_keeps_value() {
    let mut sink = DiagnosticSink::new(WarningPolicy::new());
    let result = safe_neg_signed(span(), &mut sink, 32, i32::MIN as i64);
    assert_eq!(result, i32::MIN as i64);
    assert!(!sink.is_empty());
  }

  #[test]
  fn float_division_by_zero_folds_to_ieee_result_with_warning() {
    let mut sink = DiagnosticSink::new(WarningPolicy::new());
    let result = safe_div_float(span(), &mut sink, 1.0, 0.0);
    assert!(result.is_infinite());
    assert!(!sink.is_empty());
  }
}
