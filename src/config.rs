//! Project configuration (ambient concern, not in spec.md's CLI-only
//! surface): an optional `bozon.toml` supplying defaults that CLI flags
//! (see `src/bin/bozonc.rs`) override field-by-field.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EmitKind {
  Obj,
  Asm,
  LlvmBc,
  LlvmIr,
  C,
  Null,
}

impl Default for EmitKind {
  fn default() -> Self { Self::Obj }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptLevel {
  O0,
  O1,
  O2,
  O3,
  Os,
  Oz,
}

impl Default for OptLevel {
  fn default() -> Self { Self::O0 }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AsmSyntax {
  Att,
  Intel,
}

impl Default for AsmSyntax {
  fn default() -> Self { Self::Att }
}

/// `bozon.toml`: optional defaults for `target`, `opt_level`, and warning
/// policy (spec.md is silent on a project file; this is an ambient
/// configuration concern carried regardless, per the non-goals framing).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectConfig {
  pub target: Option<String>,
  #[serde(default)]
  pub opt_level: OptLevel,
  #[serde(default)]
  pub stdlib_dir: Option<String>,
  #[serde(default)]
  pub warnings_enabled: Vec<String>,
  #[serde(default)]
  pub warnings_disabled: Vec<String>,
  #[serde(default)]
  pub warnings_as_errors: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read {path}: {source}")]
  Io { path: String, #[source] source: std::io::Error },
  #[error("failed to parse {path} as TOML: {source}")]
  Parse { path: String, #[source] source: toml::de::Error },
}

impl ProjectConfig {
  /// Load and parse a `bozon.toml` at `path`. Absence of the file itself
  /// is the caller's concern (searched "next to the source file"); this
  /// only handles the read-and-parse once a candidate path is chosen.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.display().to_string(), source })
  }

  /// Apply this config's warning toggles onto a freshly-built policy,
  /// returning the categories that failed to parse (unknown name) so the
  /// caller can surface them as diagnostics rather than silently ignoring
  /// a typo in `bozon.toml`.
  #[must_use] pub fn apply_warning_policy(&self, policy: &mut crate::diagnostics::WarningPolicy) -> Vec<String> {
    let mut unknown = Vec::new();
    for name in &self.warnings_enabled {
      match crate::diagnostics::WarningCategory::from_name(name) {
        Some(cat) => policy.set_enabled(cat, true),
        None => unknown.push(name.clone()),
      }
    }
    for name in &self.warnings_disabled {
      match crate::diagnostics::WarningCategory::from_name(name) {
        Some(cat) => policy.set_enabled(cat, false),
        None => unknown.push(name.clone()),
      }
    }
    for name in &self.warnings_as_errors {
      match crate::diagnostics::WarningCategory::from_name(name) {
        Some(cat) => policy.promote_to_error(cat),
        None => unknown.push(name.clone()),
      }
    }
    unknown
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::diagnostics::{WarningCategory, WarningPolicy};

  #[test]
  fn parses_a_minimal_project_file() {
    let toml = r#"
      target = "x86_64-unknown-linux-gnu"
      opt_level = "o2"
      warnings_as_errors = ["int_overflow"]
    "#;
    let cfg: ProjectConfig = toml::from_str(toml).unwrap();
    assert_eq!(cfg.target.as_deref(), Some("x86_64-unknown-linux-gnu"));
    assert_eq!(cfg.opt_level, OptLevel::O2);
    assert_eq!(cfg.warnings_as_errors, vec!["int_overflow".to_string()]);
  }

  #[test]
  fn unknown_warning_name_is_reported_not_silently_dropped() {
    let cfg = ProjectConfig { warnings_disabled: vec!["not_a_real_category".into()], ..Default::default() };
    let mut policy = WarningPolicy::new();
    let unknown = cfg.apply_warning_policy(&mut policy);
    assert_eq!(unknown, vec!["not_a_real_category".to_string()]);
  }

  #[test]
  fn known_warning_toggles_apply_to_the_policy() {
    let cfg = ProjectConfig { warnings_as_errors: vec!["int_divide_by_zero".into()], ..Default::default() };
    let mut policy = WarningPolicy::new();
    cfg.apply_warning_policy(&mut policy);
    assert!(policy.is_error(WarningCategory::IntDivideByZero));
  }

  #[test]
  fn defaults_are_permissive_when_file_is_empty() {
    let cfg: ProjectConfig = toml::from_str("").unwrap();
    assert_eq!(cfg.opt_level, OptLevel::O0);
    assert!(cfg.target.is_none());
  }
}
