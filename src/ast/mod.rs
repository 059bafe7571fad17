//! The typed AST (spec §3.4, §3.5) and its destructor model (spec §3.6).

pub mod destruct;
pub mod expr;
pub mod stmt;

pub use destruct::{DestructOp, DestructOpKind, DestructScope};
pub use expr::{Expr, ExprBody, ExprKind, ValueCategory};
pub use stmt::{FunctionBody, FunctionBodyKind, Linkage, ResolveState, Stmt};
