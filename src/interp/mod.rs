//! The compile-time executor (spec §4.4): `execute(function, args) ->
//! (constant_value, diagnostics)`.

pub mod panic;
pub mod value;

use crate::ast::{Expr, ExprBody, ExprKind, FunctionBody, FunctionBodyKind, Stmt};
use crate::constant::{self, ConstantValue};
use crate::diagnostics::DiagnosticSink;
use crate::interner::Symbol;
use crate::token::{OpKind, SrcTokens};
use panic::ExecPanic;
use value::{ControlFlow, Frame};

/// Tracks the chain of `consteval` functions currently being executed, so
/// a reentrant call into a declaration already on the stack is reported as
/// a bounded cycle error rather than recursing forever (spec §4.4, §5:
/// "an explicit resolve queue that detects cycles in O(depth)").
#[derive(Debug, Default)]
pub struct ResolveQueue {
  stack: Vec<Symbol>,
}

impl ResolveQueue {
  #[must_use] pub fn new() -> Self { Self::default() }

  fn enter(&mut self, name: Symbol) -> Result<(), ExecPanic> {
    if self.stack.contains(&name) {
      return Err(ExecPanic::ResolveCycle);
    }
    self.stack.push(name);
    Ok(())
  }

  fn leave(&mut self) {
    self.stack.pop();
  }
}

/// A bound on total evaluated statements, guarding against runaway loops
/// in `consteval` code (the executor must always terminate with either a
/// result or a panic).
const STEP_LIMIT: u64 = 1_000_000;

pub struct Executor<'a> {
  pub queue: ResolveQueue,
  pub lookup_function: &'a dyn Fn(Symbol) -> Option<&'a FunctionBody>,
  compile_error_symbol: Option<Symbol>,
  compile_warning_symbol: Option<Symbol>,
  sizeof_symbol: Option<Symbol>,
  steps: u64,
}

impl<'a> Executor<'a> {
  #[must_use] pub fn new(lookup_function: &'a dyn Fn(Symbol) -> Option<&'a FunctionBody>) -> Self {
    Self { queue: ResolveQueue::new(), lookup_function, compile_error_symbol: None, compile_warning_symbol: None, sizeof_symbol: None, steps: 0 }
  }

  /// Bind the interned names of the `compile_error`/`compile_warning`
  /// intrinsics (spec §4.4), so calls to them can be recognized without
  /// the executor owning a [`crate::interner::SymbolInterner`] itself.
  #[must_use] pub fn with_builtin_names(mut self, compile_error: Symbol, compile_warning: Symbol) -> Self {
    self.compile_error_symbol = Some(compile_error);
    self.compile_warning_symbol = Some(compile_warning);
    self
  }

  /// Bind `sizeof`'s name so calls to it surface the Open-Question TODO
  /// diagnostic (spec §9) rather than falling through to "unresolved
  /// function" as if it were ordinary user code.
  #[must_use] pub fn with_sizeof_name(mut self, sizeof: Symbol) -> Self {
    self.sizeof_symbol = Some(sizeof);
    self
  }

  fn tick(&mut self) -> Result<(), ExecPanic> {
    self.steps += 1;
    if self.steps > STEP_LIMIT {
      return Err(ExecPanic::StepLimitExceeded);
    }
    Ok(())
  }

  /// `execute(function, args) -> (constant_value, diagnostics)` (spec
  /// §4.4). Deterministic: identical `function`/`args` always produce
  /// identical results and diagnostics, since the executor reads no state
  /// outside its `Frame` and the (append-only, not consulted for values)
  /// diagnostic sink.
  pub fn execute(&mut self, function: &FunctionBody, args: Vec<ConstantValue>, sink: &mut DiagnosticSink) -> ConstantValue {
    self.queue.stack.clear();
    self.steps = 0;
    match self.execute_inner(function, args, sink) {
      Ok(v) => v,
      Err(panic) => {
        sink.push(panic.into_diagnostic(function.src_tokens));
        ConstantValue::Null
      }
    }
  }

  fn execute_inner(&mut self, function: &FunctionBody, args: Vec<ConstantValue>, sink: &mut DiagnosticSink) -> Result<ConstantValue, ExecPanic> {
    self.queue.enter(function.name)?;
    let result = (|| {
      let stmts = match &function.body {
        FunctionBodyKind::Statements(stmts) => stmts,
        FunctionBodyKind::Intrinsic(_) => return Err(ExecPanic::CompileError("intrinsic has no interpretable body".into())),
        FunctionBodyKind::Libc(_) => return Err(ExecPanic::CompileError("libc-bound function has no interpretable body".into())),
      };
      let mut frame = Frame::new();
      for (param, arg) in function.params.iter().zip(args.into_iter()) {
        frame.bind(param.name, arg);
      }
      let flow = self.exec_block(stmts, &mut frame, sink)?;
      Ok(match flow {
        ControlFlow::Return(v) => v,
        _ => frame.return_value.unwrap_or(ConstantValue::Null),
      })
    })();
    self.queue.leave();
    result
  }

  fn exec_block(&mut self, stmts: &[Stmt], frame: &mut Frame, sink: &mut DiagnosticSink) -> Result<ControlFlow, ExecPanic> {
    for stmt in stmts {
      let flow = self.exec_stmt(stmt, frame, sink)?;
      if flow != ControlFlow::Normal {
        return Ok(flow);
      }
    }
    Ok(ControlFlow::Normal)
  }

  fn exec_stmt(&mut self, stmt: &Stmt, frame: &mut Frame, sink: &mut DiagnosticSink) -> Result<ControlFlow, ExecPanic> {
    self.tick()?;
    match stmt {
      Stmt::Expr(e) => { self.eval(e, frame, sink)?; Ok(ControlFlow::Normal) }
      Stmt::Let { decl, init } => {
        let value = match init {
          Some(e) => self.eval(e, frame, sink)?,
          None => ConstantValue::Null,
        };
        frame.bind(decl.name, value);
        Ok(ControlFlow::Normal)
      }
      Stmt::Return(e) => {
        let value = match e {
          Some(e) => self.eval(e, frame, sink)?,
          None => ConstantValue::Null,
        };
        Ok(ControlFlow::Return(value))
      }
      Stmt::Break => Ok(ControlFlow::Break),
      Stmt::Continue => Ok(ControlFlow::Continue),
      Stmt::Block { stmts, .. } => self.exec_block(stmts, frame, sink),
      Stmt::While { cond, body, .. } => {
        loop {
          self.tick()?;
          if !self.eval_bool(cond, frame, sink)? {
            break;
          }
          match self.exec_stmt(body, frame, sink)? {
            ControlFlow::Break => break,
            ControlFlow::Continue | ControlFlow::Normal => {}
            r @ ControlFlow::Return(_) => return Ok(r),
          }
        }
        Ok(ControlFlow::Normal)
      }
      Stmt::For { decl, iterable, body, .. } => {
        let ConstantValue::Array(items) = self.eval(iterable, frame, sink)? else {
          return Err(ExecPanic::CompileError("`for` requires an array-valued iterable".into()));
        };
        for item in items {
          self.tick()?;
          frame.bind(decl.name, item);
          match self.exec_stmt(body, frame, sink)? {
            ControlFlow::Break => break,
            ControlFlow::Continue | ControlFlow::Normal => {}
            r @ ControlFlow::Return(_) => return Ok(r),
          }
        }
        Ok(ControlFlow::Normal)
      }
      Stmt::Switch { scrutinee, arms, default } => {
        let value = self.eval(scrutinee, frame, sink)?;
        for (labels, arm) in arms {
          if labels.iter().any(|l| *l == value) {
            return self.exec_stmt(arm, frame, sink);
          }
        }
        match default {
          Some(arm) => self.exec_stmt(arm, frame, sink),
          None => Ok(ControlFlow::Normal),
        }
      }
    }
  }

  fn eval_bool(&mut self, expr: &Expr, frame: &mut Frame, sink: &mut DiagnosticSink) -> Result<bool, ExecPanic> {
    match self.eval(expr, frame, sink)? {
      ConstantValue::Bool(b) => Ok(b),
      _ => Err(ExecPanic::CompileError("condition did not evaluate to bool".into())),
    }
  }

  fn eval(&mut self, expr: &Expr, frame: &mut Frame, sink: &mut DiagnosticSink) -> Result<ConstantValue, ExecPanic> {
    self.tick()?;
    if let ExprKind::Constant { value, .. } = &expr.kind {
      return Ok(value.clone());
    }
    match expr.body.as_ref() {
      ExprBody::Literal(v) => Ok(v.clone()),
      ExprBody::Identifier(name) => frame
        .get(*name)
        .cloned()
        .ok_or_else(|| ExecPanic::CompileError("read of an unbound identifier during execution".into())),
      ExprBody::Unary { op, operand } => {
        let v = self.eval(operand, frame, sink)?;
        self.eval_unary(expr.src_tokens, *op, v, sink)
      }
      ExprBody::Binary { op, lhs, rhs } => {
        let l = self.eval(lhs, frame, sink)?;
        if *op == OpKind::Comma {
          return self.eval(rhs, frame, sink);
        }
        let r = self.eval(rhs, frame, sink)?;
        self.eval_binary(expr.src_tokens, *op, l, r, sink)
      }
      ExprBody::Cast { operand, .. } => self.eval(operand, frame, sink),
      ExprBody::If { cond, then_branch, else_branch } => {
        if self.eval_bool(cond, frame, sink)? {
          self.eval(then_branch, frame, sink)
        } else if let Some(else_branch) = else_branch {
          self.eval(else_branch, frame, sink)
        } else {
          Ok(ConstantValue::Null)
        }
      }
      ExprBody::Subscript { base, index } => {
        let base_v = self.eval(base, frame, sink)?;
        let idx_v = self.eval(index, frame, sink)?;
        let ConstantValue::Array(items) = base_v else {
          return Err(ExecPanic::CompileError("subscript of a non-array value".into()));
        };
        let idx = match idx_v {
          ConstantValue::SInt { value, .. } => value,
          ConstantValue::UInt { value, .. } => value as i64,
          _ => return Err(ExecPanic::CompileError("subscript index is not an integer".into())),
        };
        usize::try_from(idx)
          .ok()
          .and_then(|i| items.get(i).cloned())
          .ok_or(ExecPanic::OutOfBoundsIndex { index: idx, len: items.len() })
      }
      ExprBody::Call { callee, args } => self.eval_call(expr.src_tokens, callee, args, frame, sink),
      ExprBody::Compound(stmts) => match self.exec_block(stmts, frame, sink)? {
        ControlFlow::Return(v) => Ok(v),
        _ => Ok(ConstantValue::Null),
      },
    }
  }

  fn eval_call(&mut self, span: SrcTokens, callee: &Expr, args: &[Expr], frame: &mut Frame, sink: &mut DiagnosticSink) -> Result<ConstantValue, ExecPanic> {
    let ExprBody::Identifier(name) = callee.body.as_ref() else {
      return Err(ExecPanic::CompileError("indirect calls are not supported by the compile-time executor".into()));
    };
    let mut evaluated = Vec::with_capacity(args.len());
    for a in args {
      evaluated.push(self.eval(a, frame, sink)?);
    }
    if let Some(result) = self.try_builtin_call(span, *name, &evaluated, sink)? {
      return Ok(result);
    }
    let function = (self.lookup_function)(*name)
      .ok_or_else(|| ExecPanic::CompileError("call to an unresolved function during execution".into()))?;
    self.execute_inner(function, evaluated, sink)
  }

  /// `compile_error`/`compile_warning` intrinsics (spec §4.4): emit at the
  /// caller's `src_tokens` rather than the callee's. Also recognizes
  /// `sizeof` (spec §9 Open Questions) and rejects it with
  /// [`ExecPanic::TodoIntrinsic`] until a concrete size rule is specified.
  fn try_builtin_call(&mut self, span: SrcTokens, name: Symbol, args: &[ConstantValue], sink: &mut DiagnosticSink) -> Result<Option<ConstantValue>, ExecPanic> {
    let message = || match args.first() {
      Some(ConstantValue::Str(s)) => s.clone(),
      _ => String::new(),
    };
    if Some(name) == self.compile_error_symbol {
      return Err(ExecPanic::CompileError(message()));
    }
    if Some(name) == self.compile_warning_symbol {
      sink.report_warning(span, crate::diagnostics::WarningCategory::CompileTimeWarning, message());
      return Ok(Some(ConstantValue::Null));
    }
    if Some(name) == self.sizeof_symbol {
      return Err(ExecPanic::TodoIntrinsic("sizeof".into()));
    }
    Ok(None)
  }

  fn eval_unary(&mut self, span: SrcTokens, op: OpKind, v: ConstantValue, sink: &mut DiagnosticSink) -> Result<ConstantValue, ExecPanic> {
    match (op, v) {
      (OpKind::Plus, v) => Ok(v),
      (OpKind::Minus, ConstantValue::SInt { width, value }) => Ok(ConstantValue::SInt { width, value: constant::safe_neg_signed(span, sink, width, value) }),
      (OpKind::Minus, ConstantValue::Float64(f)) => Ok(ConstantValue::Float64(-f)),
      (OpKind::Minus, ConstantValue::Float32(f)) => Ok(ConstantValue::Float32(-f)),
      (OpKind::Tilde, ConstantValue::UInt { width, value }) => Ok(ConstantValue::UInt { width, value: !value & mask(width) }),
      (OpKind::Tilde, ConstantValue::Bool(b)) => Ok(ConstantValue::Bool(!b)),
      (OpKind::Bang, ConstantValue::Bool(b)) => Ok(ConstantValue::Bool(!b)),
      _ => Err(ExecPanic::CompileError("unary operator not applicable to this constant value at execution time".into())),
    }
  }

  fn eval_binary(&mut self, span: SrcTokens, op: OpKind, l: ConstantValue, r: ConstantValue, sink: &mut DiagnosticSink) -> Result<ConstantValue, ExecPanic> {
    use ConstantValue::{Bool, Float64, SInt, UInt};
    match (op, l, r) {
      (OpKind::Plus, SInt { width, value: a }, SInt { value: b, .. }) => Ok(SInt { width, value: constant::safe_add_signed(span, sink, width, a, b) }),
      (OpKind::Minus, SInt { width, value: a }, SInt { value: b, .. }) => Ok(SInt { width, value: constant::safe_sub_signed(span, sink, width, a, b) }),
      (OpKind::Star, SInt { width, value: a }, SInt { value: b, .. }) => Ok(SInt { width, value: constant::safe_mul_signed(span, sink, width, a, b) }),
      (OpKind::Slash, SInt { width, value: a }, SInt { value: b, .. }) => {
        constant::safe_div_signed(span, sink, width, a, b).map(|v| SInt { width, value: v }).ok_or(ExecPanic::DivideByZero)
      }
      (OpKind::Percent, SInt { width, value: a }, SInt { value: b, .. }) => {
        constant::safe_mod_signed(span, sink, width, a, b).map(|v| SInt { width, value: v }).ok_or(ExecPanic::DivideByZero)
      }
      (OpKind::Plus, UInt { width, value: a }, UInt { value: b, .. }) => Ok(UInt { width, value: constant::safe_add_unsigned(span, sink, width, a, b) }),
      (OpKind::Minus, UInt { width, value: a }, UInt { value: b, .. }) => Ok(UInt { width, value: constant::safe_sub_unsigned(span, sink, width, a, b) }),
      (OpKind::Star, UInt { width, value: a }, UInt { value: b, .. }) => Ok(UInt { width, value: constant::safe_mul_unsigned(span, sink, width, a, b) }),
      (OpKind::Slash, UInt { width, value: a }, UInt { value: b, .. }) => {
        constant::safe_div_unsigned(span, sink, width, a, b).map(|v| UInt { width, value: v }).ok_or(ExecPanic::DivideByZero)
      }
      (OpKind::Percent, UInt { width, value: a }, UInt { value: b, .. }) => {
        constant::safe_mod_unsigned(span, sink, width, a, b).map(|v| UInt { width, value: v }).ok_or(ExecPanic::DivideByZero)
      }
      (OpKind::Shl, UInt { width, value: a }, UInt { value: b, .. }) => Ok(UInt { width, value: constant::safe_shl_unsigned(span, sink, width, a, b as u32) }),
      (OpKind::Shr, UInt { width, value: a }, UInt { value: b, .. }) => Ok(UInt { width, value: constant::safe_shr_unsigned(span, sink, width, a, b as u32) }),
      (OpKind::Plus, Float64(a), Float64(b)) => Ok(Float64(constant::safe_add_float(span, sink, a, b))),
      (OpKind::Minus, Float64(a), Float64(b)) => Ok(Float64(constant::safe_sub_float(span, sink, a, b))),
      (OpKind::Star, Float64(a), Float64(b)) => Ok(Float64(constant::safe_mul_float(span, sink, a, b))),
      (OpKind::Slash, Float64(a), Float64(b)) => Ok(Float64(constant::safe_div_float(span, sink, a, b))),
      (OpKind::EqEq, a, b) => Ok(Bool(a == b)),
      (OpKind::NotEq, a, b) => Ok(Bool(a != b)),
      (OpKind::Lt, SInt { value: a, .. }, SInt { value: b, .. }) => Ok(Bool(a < b)),
      (OpKind::Le, SInt { value: a, .. }, SInt { value: b, .. }) => Ok(Bool(a <= b)),
      (OpKind::Gt, SInt { value: a, .. }, SInt { value: b, .. }) => Ok(Bool(a > b)),
      (OpKind::Ge, SInt { value: a, .. }, SInt { value: b, .. }) => Ok(Bool(a >= b)),
      (OpKind::AmpAmp, Bool(a), Bool(b)) => Ok(Bool(a && b)),
      (OpKind::PipePipe, Bool(a), Bool(b)) => Ok(Bool(a || b)),
      (OpKind::CaretCaret, Bool(a), Bool(b)) => Ok(Bool(a != b)),
      (OpKind::Amp, UInt { width, value: a }, UInt { value: b, .. }) => Ok(UInt { width, value: a & b }),
      (OpKind::Pipe, UInt { width, value: a }, UInt { value: b, .. }) => Ok(UInt { width, value: a | b }),
      (OpKind::Caret, UInt { width, value: a }, UInt { value: b, .. }) => Ok(UInt { width, value: a ^ b }),
      _ => Err(ExecPanic::CompileError("binary operator not applicable to these constant values at execution time".into())),
    }
  }
}

fn mask(width: u32) -> u64 {
  if width >= 64 { u64::MAX } else { (1u64 << width) - 1 }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::ast::stmt::{FunctionBodyKind, Linkage, ResolveState};
  use crate::diagnostics::WarningPolicy;
  use crate::scope::VariableDecl;
  use crate::token::Pos;
  use crate::types::{PrimitiveKind, Terminator, TypeInterner, Typespec};

  fn span() -> SrcTokens { SrcTokens::point(Pos { byte: 0, line: 1 }) }

  fn lit(v: ConstantValue) -> Expr {
    Expr::constant(span(), Typespec::of(Terminator::Void), v.clone(), ExprBody::Literal(v))
  }

  fn no_functions(_: Symbol) -> Option<&'static FunctionBody> { None }

  #[test]
  fn execute_runs_a_return_statement() {
    let mut interner = TypeInterner::new();
    let mut symbols = crate::interner::SymbolInterner::new();
    let f = FunctionBody {
      src_tokens: span(),
      name: symbols.intern("f"),
      params: vec![],
      ret: Typespec::of(Terminator::BaseType(interner.intern_primitive(PrimitiveKind::I32))),
      cc: crate::types::CallingConvention::Bozon,
      linkage: Linkage::Internal,
      resolve_state: ResolveState::All,
      symbol_name: None,
      body: FunctionBodyKind::Statements(vec![Stmt::Return(Some(lit(ConstantValue::SInt { width: 32, value: 42 })))]),
      instantiations: Default::default(),
    };
    let mut sink = DiagnosticSink::new(WarningPolicy::new());
    let mut exec = Executor::new(&no_functions);
    let result = exec.execute(&f, vec![], &mut sink);
    assert_eq!(result, ConstantValue::SInt { width: 32, value: 42 });
    assert!(sink.is_empty());
  }

  #[test]
  fn execute_folds_overflow_the_same_as_safe_add_signed() {
    let mut interner = TypeInterner::new();
    let mut symbols = crate::interner::SymbolInterner::new();
    let a = lit(ConstantValue::SInt { width: 8, value: 127 });
    let b = lit(ConstantValue::SInt { width: 8, value: 1 });
    let expr = Expr::dynamic(
      span(),
      Typespec::of(Terminator::BaseType(interner.intern_primitive(PrimitiveKind::I8))),
      crate::ast::ValueCategory::Rvalue,
      ExprBody::Binary { op: OpKind::Plus, lhs: Box::new(a), rhs: Box::new(b) },
    );
    let f = FunctionBody {
      src_tokens: span(),
      name: symbols.intern("f"),
      params: vec![],
      ret: Typespec::of(Terminator::Void),
      cc: crate::types::CallingConvention::Bozon,
      linkage: Linkage::Internal,
      resolve_state: ResolveState::All,
      symbol_name: None,
      body: FunctionBodyKind::Statements(vec![Stmt::Return(Some(expr))]),
      instantiations: Default::default(),
    };
    let mut sink = DiagnosticSink::new(WarningPolicy::new());
    let mut exec = Executor::new(&no_functions);
    let result = exec.execute(&f, vec![], &mut sink);
    assert_eq!(result, ConstantValue::SInt { width: 8, value: -128 });
    assert!(!sink.is_empty(), "overflow should warn, matching fold(op,x,y) == interpret(op(x,y))'s warning set");
  }

  #[test]
  fn reentrant_cycle_is_reported_not_infinite_looped() {
    let mut symbols = crate::interner::SymbolInterner::new();
    let mut queue = ResolveQueue::new();
    let name = symbols.intern("f");
    queue.enter(name).unwrap();
    assert_eq!(queue.enter(name), Err(ExecPanic::ResolveCycle));
  }

  #[test]
  fn sizeof_is_rejected_as_a_todo_intrinsic_not_an_unresolved_call() {
    let mut symbols = crate::interner::SymbolInterner::new();
    let f_name = symbols.intern("f");
    let sizeof_name = symbols.intern("sizeof");
    let callee = Expr::dynamic(span(), Typespec::of(Terminator::Void), crate::ast::ValueCategory::Rvalue, ExprBody::Identifier(sizeof_name));
    let call = Expr::dynamic(
      span(),
      Typespec::of(Terminator::Void),
      crate::ast::ValueCategory::Rvalue,
      ExprBody::Call { callee: Box::new(callee), args: vec![] },
    );
    let f = FunctionBody {
      src_tokens: span(),
      name: f_name,
      params: vec![],
      ret: Typespec::of(Terminator::Void),
      cc: crate::types::CallingConvention::Bozon,
      linkage: Linkage::Internal,
      resolve_state: ResolveState::All,
      symbol_name: None,
      body: FunctionBodyKind::Statements(vec![Stmt::Return(Some(call))]),
      instantiations: Default::default(),
    };
    let mut sink = DiagnosticSink::new(WarningPolicy::new());
    let mut exec = Executor::new(&no_functions).with_sizeof_name(sizeof_name);
    exec.execute(&f, vec![], &mut sink);
    assert!(sink.has_errors());
    let rendered = sink.diagnostics()[0].render();
    assert!(rendered.contains("not yet implemented"), "expected a TODO-intrinsic message, got {rendered:?}");
  }
}
