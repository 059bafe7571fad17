//! Dual-backend lowering (spec §4.6, §4.7): LLVM IR or C source.

pub mod abi;
pub mod c;
pub mod llvm;

pub use abi::{classify, Platform};
