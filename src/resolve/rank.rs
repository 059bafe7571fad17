//! The `(min, sum)` overload ranker (spec §4.3 table; testable property 5).

use crate::ast::ValueCategory;
use crate::types::{Modifier, PrimitiveKind, Terminator, TypeInterner, Typespec};

/// Per-argument score. Lower is better; `-1` means inapplicable.
pub type Score = i32;

pub const INAPPLICABLE: Score = -1;

/// Score a single `(parameter, argument)` pair (spec §4.3 table).
///
/// `arg_is_null_literal` covers the `null`-to-optional-pointer-like and
/// `null`-to-pointer-with-sentinel rule, which depends on the argument
/// being the literal `null` rather than merely having a matching type.
#[must_use]
pub fn score_argument(
  param: &Typespec,
  arg: &Typespec,
  arg_category: ValueCategory,
  arg_is_null_literal: bool,
  types: &TypeInterner,
) -> Score {
  if param == arg {
    return 0;
  }

  if arg_is_null_literal && (param.is_optional_pointer_like() || param.is_pointer()) {
    return 1;
  }

  if param.is_any_reference() {
    let bound_ok = match param.outer_modifier() {
      Some(Modifier::LvalueReference) => matches!(arg_category, ValueCategory::Lvalue | ValueCategory::LvalueReference),
      Some(Modifier::MoveReference) => matches!(arg_category, ValueCategory::Rvalue | ValueCategory::LvalueReference),
      _ => true,
    };
    if !bound_ok {
      return INAPPLICABLE;
    }
    let referent = param.blind_get();
    return score_argument(&referent, arg, arg_category, arg_is_null_literal, types);
  }

  // const/mut layer difference: adding or removing one `mut` layer costs +1
  // (removing from an rvalue is explicitly allowed per spec §4.3).
  if param.is_mut() != arg.is_mut() {
    let stripped_param = param.remove_mut();
    let stripped_arg = arg.remove_mut();
    let inner = score_argument(&stripped_param, &stripped_arg, arg_category, arg_is_null_literal, types);
    return if inner == INAPPLICABLE { INAPPLICABLE } else { inner + 1 };
  }

  match (param.terminator(), arg.terminator()) {
    (Some(Terminator::BaseType(p)), Some(Terminator::BaseType(a))) => {
      score_base_type(*p, *a, types)
    }
    (Some(Terminator::Tuple(ps)), Some(Terminator::Tuple(as_))) if ps.len() == as_.len() => {
      let mut sum = 0;
      for (p, a) in ps.iter().zip(as_.iter()) {
        let s = score_argument(p, a, ValueCategory::Rvalue, false, types);
        if s == INAPPLICABLE { return INAPPLICABLE; }
        sum += s;
      }
      sum
    }
    (Some(Terminator::Array(p)), Some(Terminator::Array(a))) if p.size == a.size => {
      score_argument(&p.elem, &a.elem, ValueCategory::Rvalue, false, types)
    }
    (Some(Terminator::Void), Some(Terminator::Void)) => 0,
    _ => INAPPLICABLE,
  }
}

fn score_base_type(param: crate::types::TypeInfoId, arg: crate::types::TypeInfoId, types: &TypeInterner) -> Score {
  if param == arg {
    return 0;
  }
  let (Some(p), Some(a)) = (types.as_primitive(param), types.as_primitive(arg)) else {
    return INAPPLICABLE;
  };
  score_primitive_widening(p, a)
}

fn same_signedness_class(a: PrimitiveKind, b: PrimitiveKind) -> bool {
  (a.is_signed_int() && b.is_signed_int())
    || (a.is_unsigned_int() && b.is_unsigned_int())
    || (a == PrimitiveKind::F32 || a == PrimitiveKind::F64) && (b == PrimitiveKind::F32 || b == PrimitiveKind::F64)
}

/// Widening from `from` to `to` within the same signedness class costs +1
/// per doubled width; any cross-class/narrowing conversion is inapplicable
/// for an implicit argument match (spec §4.3).
fn score_primitive_widening(to: PrimitiveKind, from: PrimitiveKind) -> Score {
  if !same_signedness_class(to, from) {
    return INAPPLICABLE;
  }
  let mut steps = 0;
  let mut cur = from;
  loop {
    if cur == to {
      return steps;
    }
    match cur.widen() {
      Some(next) => { cur = next; steps += 1; }
      None => return INAPPLICABLE,
    }
  }
}

/// `(min, sum)` of a candidate's per-argument scores (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchLevel {
  pub min: Score,
  pub sum: Score,
}

impl MatchLevel {
  #[must_use] pub fn of(scores: &[Score]) -> Option<Self> {
    if scores.iter().any(|&s| s == INAPPLICABLE) {
      return None;
    }
    let min = scores.iter().copied().min().unwrap_or(0);
    let sum = scores.iter().sum();
    Some(Self { min, sum })
  }

  /// Componentwise dominance: `self` is at least as good as `other` on
  /// both axes, and strictly better on at least one.
  #[must_use] pub fn dominates(self, other: Self) -> bool {
    (self.min <= other.min && self.sum <= other.sum) && (self.min < other.min || self.sum < other.sum)
  }
}

pub struct RankedCandidate<C> {
  pub candidate: C,
  pub level: MatchLevel,
}

/// Rank a set of candidates by their per-argument scores, each supplied by
/// `scores_of`. Returns `Ok(Some(winner))`, `Ok(None)` if every candidate
/// was inapplicable, or `Err(tied)` on an ambiguous call (spec §4.3:
/// "ties produce an ambiguous-call error citing the tied candidates").
pub fn rank_candidates<C>(candidates: Vec<C>, scores_of: impl Fn(&C) -> Vec<Score>) -> Result<Option<C>, Vec<C>> {
  let mut levels: Vec<RankedCandidate<C>> = candidates
    .into_iter()
    .filter_map(|c| {
      let level = MatchLevel::of(&scores_of(&c))?;
      Some(RankedCandidate { candidate: c, level })
    })
    .collect();

  if levels.is_empty() {
    return Ok(None);
  }
  if levels.len() == 1 {
    return Ok(Some(levels.pop().unwrap().candidate));
  }

  let is_le = |a: MatchLevel, b: MatchLevel| a.min <= b.min && a.sum <= b.sum;

  let best_indices: Vec<usize> = (0..levels.len())
    .filter(|&i| (0..levels.len()).all(|j| is_le(levels[i].level, levels[j].level)))
    .collect();

  match best_indices.as_slice() {
    [i] => Ok(Some(levels.swap_remove(*i).candidate)),
    [] => {
      // No candidate is <= every other on both axes: ambiguous, cite the
      // Pareto frontier (candidates no other strictly beats on both axes).
      let all_levels: Vec<MatchLevel> = levels.iter().map(|r| r.level).collect();
      let strictly_beats = |a: MatchLevel, b: MatchLevel| is_le(a, b) && a != b;
      let frontier: Vec<C> = levels
        .into_iter()
        .filter(|r| !all_levels.iter().any(|&other| strictly_beats(other, r.level)))
        .map(|r| r.candidate)
        .collect();
      Err(frontier)
    }
    _ => {
      // Multiple candidates are each <= every other: they are equal to one
      // another on both axes (spec §4.3: "ties produce an ambiguous-call
      // error citing the tied candidates").
      let tied: Vec<C> = best_indices.into_iter().rev().map(|i| levels.swap_remove(i).candidate).collect();
      Err(tied)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{Terminator, TypeInterner};

  fn ts(interner: &mut TypeInterner, kind: PrimitiveKind) -> Typespec {
    Typespec::of(Terminator::BaseType(interner.intern_primitive(kind)))
  }

  #[test]
  fn exact_match_scores_zero() {
    let mut interner = TypeInterner::new();
    let t = ts(&mut interner, PrimitiveKind::I32);
    assert_eq!(score_argument(&t, &t, ValueCategory::Rvalue, false, &interner), 0);
  }

  #[test]
  fn scenario_s3_int32_vs_int64_overload_picks_exact_width() {
    let mut interner = TypeInterner::new();
    let i32p = ts(&mut interner, PrimitiveKind::I32);
    let i64p = ts(&mut interner, PrimitiveKind::I64);
    let arg = ts(&mut interner, PrimitiveKind::I32);
    let score_i32 = score_argument(&i32p, &arg, ValueCategory::Rvalue, false, &interner);
    let score_i64 = score_argument(&i64p, &arg, ValueCategory::Rvalue, false, &interner);
    assert_eq!(score_i32, 0);
    assert_eq!(score_i64, 1, "int32 -> int64 is one widening step");
    let winner = rank_candidates(vec!["i32", "i64"], |c| {
      vec![if *c == "i32" { score_i32 } else { score_i64 }]
    }).unwrap().unwrap();
    assert_eq!(winner, "i32");
  }

  #[test]
  fn cross_signedness_is_inapplicable() {
    let mut interner = TypeInterner::new();
    let i32p = ts(&mut interner, PrimitiveKind::I32);
    let u32p = ts(&mut interner, PrimitiveKind::U32);
    assert_eq!(score_argument(&i32p, &u32p, ValueCategory::Rvalue, false, &interner), INAPPLICABLE);
  }

  #[test]
  fn null_to_optional_pointer_like_scores_one() {
    let mut interner = TypeInterner::new();
    let mut param = ts(&mut interner, PrimitiveKind::I32);
    param.add_layer(Modifier::Pointer).unwrap();
    param.add_layer(Modifier::Optional).unwrap();
    let arg = Typespec::of(Terminator::Void);
    assert_eq!(score_argument(&param, &arg, ValueCategory::Rvalue, true, &interner), 1);
  }

  #[test]
  fn truly_tied_candidates_are_reported_ambiguous() {
    let result = rank_candidates(vec![1, 2], |_| vec![1]);
    assert!(result.is_err());
  }
}
