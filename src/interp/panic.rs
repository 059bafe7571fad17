//! Compile-time execution panics (spec §4.4): captured as diagnostics at
//! the panicking call's source span, never as a process abort.

use crate::diagnostics::Diagnostic;
use crate::token::SrcTokens;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecPanic {
  #[error("index {index} is out of bounds for a value of length {len}")]
  OutOfBoundsIndex { index: i64, len: usize },
  #[error("dereferenced a null pointer")]
  NullPointerDereference,
  #[error("`get_value` called on a null optional")]
  NullGetValue,
  #[error("integer overflow is rejected by the active overflow policy")]
  IntegerOverflow,
  #[error("division by zero")]
  DivideByZero,
  #[error("{0}")]
  CompileError(String),
  #[error("reentrant `consteval` cycle detected while resolving this declaration")]
  ResolveCycle,
  #[error("execution exceeded the bounded step limit")]
  StepLimitExceeded,
  /// A builtin whose semantics are not yet specified (spec §9 Open
  /// Questions: "surface as TODO intrinsics with a clear error"), e.g.
  /// `sizeof` before a concrete size rule is supplied.
  #[error("`{0}` is not yet implemented by the compile-time executor")]
  TodoIntrinsic(String),
}

impl ExecPanic {
  /// Surface this panic as a regular diagnostic at the caller's span
  /// (spec §4.4: "captured as a diagnostic rather than aborting").
  #[must_use] pub fn into_diagnostic(self, span: SrcTokens) -> Diagnostic {
    Diagnostic::error(span, self.to_string())
  }
}
