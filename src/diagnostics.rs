//! Diagnostic model: errors, warnings (gated by category), notes and
//! suggestions, all carrying a [`SrcTokens`] span (spec §6.3, §7).

use crate::token::SrcTokens;

/// Warning categories, gate-keyed by [`WarningPolicy`]. Names match spec §7
/// and the CLI's `-W<name>`/`-Wno-<name>` surface (spec §6.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCategory {
  IntOverflow,
  IntDivideByZero,
  FloatDivideByZero,
  FloatNonFinite,
  NullPointerDereference,
  UnusedValue,
  BadFileExtension,
  BinaryStdout,
  UnknownTarget,
  CompileTimeWarning,
}

impl WarningCategory {
  #[must_use] pub fn name(self) -> &'static str {
    match self {
      Self::IntOverflow => "int_overflow",
      Self::IntDivideByZero => "int_divide_by_zero",
      Self::FloatDivideByZero => "float_divide_by_zero",
      Self::FloatNonFinite => "float_non_finite",
      Self::NullPointerDereference => "null_pointer_dereference",
      Self::UnusedValue => "unused_value",
      Self::BadFileExtension => "bad_file_extension",
      Self::BinaryStdout => "binary_stdout",
      Self::UnknownTarget => "unknown_target",
      Self::CompileTimeWarning => "compile_time_warning",
    }
  }

  #[must_use] pub fn from_name(s: &str) -> Option<Self> {
    Some(match s {
      "int_overflow" => Self::IntOverflow,
      "int_divide_by_zero" => Self::IntDivideByZero,
      "float_divide_by_zero" => Self::FloatDivideByZero,
      "float_non_finite" => Self::FloatNonFinite,
      "null_pointer_dereference" => Self::NullPointerDereference,
      "unused_value" => Self::UnusedValue,
      "bad_file_extension" => Self::BadFileExtension,
      "binary_stdout" => Self::BinaryStdout,
      "unknown_target" => Self::UnknownTarget,
      "compile_time_warning" => Self::CompileTimeWarning,
      _ => return None,
    })
  }

  /// The default on/off state before any `-W`/`-Wno-` flag is applied.
  #[must_use] pub fn default_enabled(self) -> bool {
    // every category defaults to on except the noisiest style lint
    !matches!(self, Self::UnusedValue)
  }
}

/// Per-compilation policy for which warning categories are enabled, and
/// which are promoted to hard errors (`-Werror`-style). New relative to
/// spec.md's category list: spec §6.3 only describes the wire format.
#[derive(Debug, Clone)]
pub struct WarningPolicy {
  enabled: [bool; Self::CATEGORY_COUNT],
  promoted: [bool; Self::CATEGORY_COUNT],
}

impl WarningPolicy {
  const CATEGORY_COUNT: usize = 10;
  const ALL: [WarningCategory; Self::CATEGORY_COUNT] = [
    WarningCategory::IntOverflow,
    WarningCategory::IntDivideByZero,
    WarningCategory::FloatDivideByZero,
    WarningCategory::FloatNonFinite,
    WarningCategory::NullPointerDereference,
    WarningCategory::UnusedValue,
    WarningCategory::BadFileExtension,
    WarningCategory::BinaryStdout,
    WarningCategory::UnknownTarget,
    WarningCategory::CompileTimeWarning,
  ];

  fn index(cat: WarningCategory) -> usize {
    Self::ALL.iter().position(|&c| c == cat).expect("exhaustive category list")
  }

  #[must_use] pub fn new() -> Self {
    let mut enabled = [false; Self::CATEGORY_COUNT];
    for (i, &cat) in Self::ALL.iter().enumerate() {
      enabled[i] = cat.default_enabled();
    }
    Self { enabled, promoted: [false; Self::CATEGORY_COUNT] }
  }

  pub fn set_enabled(&mut self, cat: WarningCategory, enabled: bool) {
    self.enabled[Self::index(cat)] = enabled;
  }

  pub fn promote_to_error(&mut self, cat: WarningCategory) {
    self.promoted[Self::index(cat)] = true;
  }

  #[must_use] pub fn is_enabled(&self, cat: WarningCategory) -> bool {
    self.enabled[Self::index(cat)]
  }

  #[must_use] pub fn is_error(&self, cat: WarningCategory) -> bool {
    self.promoted[Self::index(cat)]
  }
}

impl Default for WarningPolicy {
  fn default() -> Self { Self::new() }
}

/// A suggested fix, shown alongside an error or warning. New relative to
/// spec.md's distillation (see SPEC_FULL.md's "Supplemented features").
#[derive(Debug, Clone)]
pub struct Suggestion {
  pub replacement: String,
  pub note: String,
}

#[derive(Debug, Clone)]
pub enum DiagnosticKind {
  Error,
  Warning(WarningCategory),
  Note,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
  pub span: SrcTokens,
  pub kind: DiagnosticKind,
  pub message: String,
  pub suggestion: Option<Suggestion>,
}

impl Diagnostic {
  #[must_use] pub fn error(span: SrcTokens, message: impl Into<String>) -> Self {
    Self { span, kind: DiagnosticKind::Error, message: message.into(), suggestion: None }
  }

  #[must_use] pub fn warning(span: SrcTokens, cat: WarningCategory, message: impl Into<String>) -> Self {
    Self { span, kind: DiagnosticKind::Warning(cat), message: message.into(), suggestion: None }
  }

  #[must_use] pub fn note(span: SrcTokens, message: impl Into<String>) -> Self {
    Self { span, kind: DiagnosticKind::Note, message: message.into(), suggestion: None }
  }

  #[must_use] pub fn with_suggestion(mut self, replacement: impl Into<String>, note: impl Into<String>) -> Self {
    self.suggestion = Some(Suggestion { replacement: replacement.into(), note: note.into() });
    self
  }

  /// Render the one-line-per-diagnostic prefix form the test harness
  /// matches against literally (spec §6.3).
  #[must_use] pub fn render(&self) -> String {
    let prefix = match self.kind {
      DiagnosticKind::Error => "error: ",
      DiagnosticKind::Warning(_) => "warning: ",
      DiagnosticKind::Note => "note: ",
    };
    let mut out = format!("{prefix}{}", self.message);
    if let Some(sugg) = &self.suggestion {
      out.push_str(&format!("\nsuggestion: {} ({})", sugg.replacement, sugg.note));
    }
    out
  }

  #[must_use] pub fn is_error(&self) -> bool { matches!(self.kind, DiagnosticKind::Error) }
}

/// Append-only diagnostic stream, shared by every phase via [`crate::Session`].
#[derive(Debug, Clone, Default)]
pub struct DiagnosticSink {
  diagnostics: Vec<Diagnostic>,
  policy: WarningPolicyHandle,
}

#[derive(Debug, Clone, Default)]
struct WarningPolicyHandle(Option<std::rc::Rc<WarningPolicy>>);

impl DiagnosticSink {
  #[must_use] pub fn new(policy: WarningPolicy) -> Self {
    Self { diagnostics: Vec::new(), policy: WarningPolicyHandle(Some(std::rc::Rc::new(policy))) }
  }

  fn policy(&self) -> WarningPolicy {
    self.policy.0.as_deref().cloned().unwrap_or_default()
  }

  pub fn push(&mut self, diag: Diagnostic) {
    self.diagnostics.push(diag);
  }

  /// Report a warning in `cat`, respecting the policy: suppressed if the
  /// category is disabled, promoted to an error if `-Werror`'d.
  pub fn report_warning(&mut self, span: SrcTokens, cat: WarningCategory, message: impl Into<String>) {
    let policy = self.policy();
    if !policy.is_enabled(cat) {
      return;
    }
    let message = message.into();
    if policy.is_error(cat) {
      self.push(Diagnostic::error(span, message));
    } else {
      self.push(Diagnostic::warning(span, cat, message));
    }
  }

  pub fn report_error(&mut self, span: SrcTokens, message: impl Into<String>) {
    self.push(Diagnostic::error(span, message));
  }

  #[must_use] pub fn diagnostics(&self) -> &[Diagnostic] { &self.diagnostics }

  #[must_use] pub fn has_errors(&self) -> bool {
    self.diagnostics.iter().any(Diagnostic::is_error)
  }

  #[must_use] pub fn len(&self) -> usize { self.diagnostics.len() }
  #[must_use] pub fn is_empty(&self) -> bool { self.diagnostics.is_empty() }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn dummy_span() -> SrcTokens {
    let p = crate::token::Pos { byte: 0, line: 1 };
    SrcTokens::point(p)
  }

  #[test]
  fn disabled_category_is_suppressed() {
    let mut policy = WarningPolicy::new();
    policy.set_enabled(WarningCategory::IntOverflow, false);
    let mut sink = DiagnosticSink::new(policy);
    sink.report_warning(dummy_span(), WarningCategory::IntOverflow, "overflow");
    assert!(sink.is_empty());
  }

  #[test]
  fn promoted_category_becomes_error() {
    let mut policy = WarningPolicy::new();
    policy.promote_to_error(WarningCategory::IntDivideByZero);
    let mut sink = DiagnosticSink::new(policy);
    sink.report_warning(dummy_span(), WarningCategory::IntDivideByZero, "div by zero");
    assert!(sink.has_errors());
  }

  #[test]
  fn render_matches_literal_prefix() {
    let d = Diagnostic::error(dummy_span(), "bad thing");
    assert_eq!(d.render(), "error: bad thing");
    let d = Diagnostic::warning(dummy_span(), WarningCategory::IntOverflow, "oops")
      .with_suggestion("cast to uint8", "narrowing is intentional here");
    assert!(d.render().starts_with("warning: oops"));
    assert!(d.render().contains("suggestion: cast to uint8"));
  }
}
