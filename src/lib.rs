//! `bozonc`: an ahead-of-time compiler for the Bozon systems language.
//!
//! This crate implements the middle and back end of the pipeline: the type
//! system, name resolution and overload ranking, the typed AST and its
//! destructor model, the compile-time executor, and the dual-backend
//! lowering to LLVM IR or C source. Lexing and parsing are treated as
//! external collaborators (see [`token`] for the minimal interchange
//! types) and are not implemented here.

pub mod token;
pub mod diagnostics;
pub mod interner;
pub mod types;
pub mod scope;
pub mod ast;
pub mod constant;
pub mod resolve;
pub mod interp;
pub mod abi_types;
pub mod backend;
pub mod session;
pub mod config;

pub use session::Session;
pub use diagnostics::{Diagnostic, DiagnosticSink};
pub use interner::{Symbol, SymbolInterner};
