//! `bozonc`: the command-line driver (spec §6.1).
//!
//! This binary is the thin, stubbed front end the crate documentation
//! promises: it wires CLI flags and an optional `bozon.toml` to a
//! [`Session`], hands a trivial placeholder `main` function to the core
//! pipeline (there is no lexer/parser in this crate; those are external
//! collaborators per the scope notes), and drives compile-time execution
//! plus backend emission end to end.

use anyhow::Context;
use bozonc::abi_types::TargetProperties;
use bozonc::ast::stmt::{FunctionBody, FunctionBodyKind, Linkage, ResolveState};
use bozonc::backend::abi::Platform;
use bozonc::backend::c;
use bozonc::config::{AsmSyntax, EmitKind, OptLevel, ProjectConfig};
use bozonc::constant::ConstantValue;
use bozonc::diagnostics::{WarningCategory, WarningPolicy};
use bozonc::interp::Executor;
use bozonc::session::Session;
use bozonc::token::{Pos, SrcTokens};
use bozonc::types::{CallingConvention, Terminator, Typespec};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "bozon", about = "Ahead-of-time compiler for the Bozon systems language")]
struct CliArgs {
  /// Source file to compile.
  source: PathBuf,

  #[arg(long, value_enum, default_value = "obj")]
  emit: EmitKind,

  #[arg(short = 'o')]
  output: Option<PathBuf>,

  #[arg(short = 'I', action = clap::ArgAction::Append)]
  include_dirs: Vec<PathBuf>,

  #[arg(long)]
  stdlib_dir: Option<PathBuf>,

  #[arg(long)]
  target: Option<String>,

  #[arg(short = 'O')]
  opt_level_numeric: Option<u8>,
  #[arg(long = "Os", action = clap::ArgAction::SetTrue)]
  opt_level_size: bool,
  #[arg(long = "Oz", action = clap::ArgAction::SetTrue)]
  opt_level_size_aggressive: bool,

  /// `-W<name>` / `-Wno-<name>`, e.g. `-Wint_overflow` / `-Wno-unused_value`.
  #[arg(short = 'W', action = clap::ArgAction::Append)]
  warnings: Vec<String>,

  #[arg(long)]
  return_zero_on_error: bool,

  #[arg(long, value_enum, default_value = "att")]
  x86_asm_syntax: AsmSyntax,
}

impl CliArgs {
  fn resolved_opt_level(&self) -> Option<OptLevel> {
    if self.opt_level_size_aggressive {
      return Some(OptLevel::Oz);
    }
    if self.opt_level_size {
      return Some(OptLevel::Os);
    }
    self.opt_level_numeric.map(|n| match n {
      0 => OptLevel::O0,
      1 => OptLevel::O1,
      2 => OptLevel::O2,
      _ => OptLevel::O3,
    })
  }

  fn apply_warning_flags(&self, policy: &mut WarningPolicy) -> Vec<String> {
    let mut unknown = Vec::new();
    for flag in &self.warnings {
      let (name, enabled) = match flag.strip_prefix("no-") {
        Some(rest) => (rest, false),
        None => (flag.as_str(), true),
      };
      match WarningCategory::from_name(name) {
        Some(cat) => policy.set_enabled(cat, enabled),
        None => unknown.push(flag.clone()),
      }
    }
    unknown
  }
}

fn find_project_config(source: &Path) -> Option<PathBuf> {
  let candidate = source.parent()?.join("bozon.toml");
  candidate.is_file().then_some(candidate)
}

/// Resolve a `--target`/`bozon.toml` target triple to the ABI-classifier
/// `Platform` it implies (spec §4.6.2). Unrecognized or absent triples fall
/// back to `Generic`, the same default `Session::with_defaults` uses.
fn resolve_platform(triple: Option<&str>) -> Platform {
  match triple {
    Some(t) if t.contains("windows") || t.contains("msvc") => Platform::MicrosoftX64,
    Some(t) if t.contains("linux") || t.contains("darwin") || t.contains("apple") || t.contains("freebsd") => Platform::SystemVAmd64,
    _ => Platform::Generic,
  }
}

/// Build a placeholder `main` (see module docs): `fn main() -> int32 { return 0; }`.
/// Stands in for the parser's output until a real front end exists.
fn stub_frontend(session: &mut Session) -> FunctionBody {
  let span = SrcTokens::point(Pos { byte: 0, line: 1 });
  let ret_ty = Typespec::of(Terminator::BaseType(
    session.types.find_primitive(bozonc::types::PrimitiveKind::I32).expect("i32 preinterned by Session::new"),
  ));
  FunctionBody {
    src_tokens: span,
    name: session.well_known.main,
    params: vec![],
    ret: ret_ty,
    cc: CallingConvention::Bozon,
    linkage: Linkage::External,
    resolve_state: ResolveState::All,
    symbol_name: Some("main".to_string()),
    body: FunctionBodyKind::Statements(vec![bozonc::ast::Stmt::Return(Some(bozonc::ast::Expr::constant(
      span,
      Typespec::of(Terminator::BaseType(
        session.types.find_primitive(bozonc::types::PrimitiveKind::I32).expect("i32 preinterned"),
      )),
      ConstantValue::sint(0),
      bozonc::ast::ExprBody::Literal(ConstantValue::sint(0)),
    )))]),
    instantiations: Default::default(),
  }
}

fn emit(args: &CliArgs, _session: &Session, main: &FunctionBody, result: &ConstantValue) -> anyhow::Result<()> {
  let rendered = match args.emit {
    EmitKind::Null => String::new(),
    EmitKind::C => {
      let mut out = c::BUILTIN_HELPERS.to_string();
      out.push_str(&format!(
        "\nint32_t {}(void) {{ return {}; }}\n",
        main.symbol_name.as_deref().unwrap_or("main"),
        render_constant(result)
      ));
      out
    }
    EmitKind::Asm => {
      anyhow::bail!(
        "--emit=asm ({:?} syntax) requires the `llvm-backend` feature to be enabled at build time",
        args.x86_asm_syntax
      );
    }
    EmitKind::Obj | EmitKind::LlvmBc | EmitKind::LlvmIr => {
      anyhow::bail!("--emit={:?} requires the `llvm-backend` feature to be enabled at build time", args.emit);
    }
  };
  match &args.output {
    Some(path) if path.as_os_str() != "-" => {
      std::fs::write(path, rendered).with_context(|| format!("writing output to {}", path.display()))?;
    }
    _ => {
      if !rendered.is_empty() {
        log::warn!("writing binary-unsafe output to stdout");
        println!("{rendered}");
      }
    }
  }
  Ok(())
}

fn render_constant(value: &ConstantValue) -> String {
  match value {
    ConstantValue::SInt { value, .. } => value.to_string(),
    ConstantValue::UInt { value, .. } => value.to_string(),
    _ => "0".to_string(),
  }
}

fn no_functions(_: bozonc::Symbol) -> Option<&'static FunctionBody> { None }

struct RunOutcome {
  has_errors: bool,
  return_zero_on_error: bool,
}

fn run() -> anyhow::Result<RunOutcome> {
  env_logger::init();
  let args = CliArgs::parse();
  log::info!("compiling {}", args.source.display());

  let mut policy = WarningPolicy::new();
  let project_config = find_project_config(&args.source)
    .map(|p| ProjectConfig::load(&p).with_context(|| format!("loading {}", p.display())))
    .transpose()?
    .unwrap_or_default();
  for unknown in project_config.apply_warning_policy(&mut policy) {
    log::warn!("bozon.toml: unknown warning category {unknown:?}");
  }
  for unknown in args.apply_warning_flags(&mut policy) {
    log::warn!("unrecognized -W flag {unknown:?}");
  }

  let opt_level = args.resolved_opt_level().unwrap_or(project_config.opt_level);
  log::debug!("optimization level {opt_level:?}");
  log::debug!(
    "search paths: -I {:?}, stdlib {:?}",
    args.include_dirs,
    args.stdlib_dir.as_deref().or(project_config.stdlib_dir.as_deref().map(Path::new))
  );
  let target = TargetProperties::generic_lp64();
  let target_triple = args.target.as_deref().or(project_config.target.as_deref());
  let platform = resolve_platform(target_triple);
  log::debug!("target triple {target_triple:?} resolved to ABI platform {platform:?}");
  let mut session = Session::new(policy, target, platform);

  std::fs::metadata(&args.source).with_context(|| format!("reading {}", args.source.display()))?;
  let main = stub_frontend(&mut session);
  log::debug!("resolved stub declaration {:?}", main.name);

  let mut executor = Executor::new(&no_functions)
    .with_builtin_names(session.well_known.compile_error, session.well_known.compile_warning)
    .with_sizeof_name(session.well_known.sizeof);
  let result = executor.execute(&main, vec![], &mut session.diagnostics);

  emit(&args, &session, &main, &result)?;

  let has_errors = session.diagnostics.has_errors();
  for diag in session.diagnostics.diagnostics() {
    eprintln!("{}", diag.render());
  }
  Ok(RunOutcome { has_errors, return_zero_on_error: args.return_zero_on_error })
}

fn main() -> ExitCode {
  match run() {
    Ok(RunOutcome { has_errors, return_zero_on_error }) => {
      if has_errors && !return_zero_on_error { ExitCode::FAILURE } else { ExitCode::SUCCESS }
    }
    Err(err) => {
      eprintln!("error: {err:#}");
      ExitCode::FAILURE
    }
  }
}
