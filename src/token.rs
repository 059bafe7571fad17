//! Token and source-span model handed to the core by the (external,
//! out-of-scope) lexer and parser.
//!
//! The tokenizer delivers a flat, immutable array of [`Token`]s with byte
//! spans into their source file. Every node in the unresolved AST the
//! parser builds locates itself in diagnostics via an [`SrcTokens`] triple.

use std::rc::Rc;

/// A source file, identified by path, with its full text kept around so
/// spans can be rendered back to line/column for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
  pub path: Rc<str>,
  pub text: Rc<str>,
}

/// A byte offset into a [`SourceFile`], together with the 1-based line it
/// falls on (precomputed by the lexer so the core never has to rescan).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
  pub byte: u32,
  pub line: u32,
}

/// The kind of a single token. The core only ever inspects `kind` to
/// decide precedence/overloadability of operators; the rest of the lexical
/// detail (exact keyword spelling, literal text) lives on the parser side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
  Identifier,
  IntLiteral,
  FloatLiteral,
  StringLiteral,
  CharLiteral,
  Keyword(Keyword),
  Operator(OpKind),
  Punct(PunctKind),
  Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
  Fn, Let, Const, Mut, Consteval, Struct, Enum, If, Else, While, For,
  Break, Continue, Return, As, Null, True, False,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PunctKind {
  LParen, RParen, LBrace, RBrace, LBracket, RBracket,
  Comma, Semicolon, Colon, Arrow, FatArrow,
}

/// Operator token kinds. This is the closed set consulted by the built-in
/// operator table (spec §4.5) and by per-scope `operator_overload_set`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
  Plus, Minus, Star, Slash, Percent,
  PlusPlus, MinusMinus,
  EqEq, NotEq, Lt, Le, Gt, Ge,
  Amp, Caret, Pipe, Tilde,
  Shl, Shr,
  AmpAmp, PipePipe, CaretCaret, Bang,
  Comma,
  Eq, Assign,
}

#[derive(Debug, Clone)]
pub struct Token {
  pub kind: TokenKind,
  pub begin: Pos,
  pub end: Pos,
  pub file: Rc<SourceFile>,
}

/// A source span locating a node for diagnostics: the token the node
/// begins at, the token that is "interesting" (where a caret should point),
/// and the token the node ends at. `begin == pivot == end` for leaf nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SrcTokens {
  pub begin: Pos,
  pub pivot: Pos,
  pub end: Pos,
}

impl SrcTokens {
  #[must_use] pub fn point(p: Pos) -> Self { Self { begin: p, pivot: p, end: p } }

  #[must_use] pub fn spanning(begin: Pos, pivot: Pos, end: Pos) -> Self {
    Self { begin, pivot, end }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn point_span_collapses_to_one_position() {
    let p = Pos { byte: 10, line: 2 };
    let st = SrcTokens::point(p);
    assert_eq!(st.begin, st.pivot);
    assert_eq!(st.pivot, st.end);
  }
}
