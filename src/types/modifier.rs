//! Typespec modifiers: the closed set of layers that can prefix a
//! terminator (spec §3.2).

/// One modifier layer. `LvalueReference`/`MoveReference`/`Variadic` are
/// only ever valid as the outermost layer of a typespec (enforced by
/// [`super::typespec::Typespec::add_layer`], not by this type itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
  Mut,
  Consteval,
  Pointer,
  Optional,
  LvalueReference,
  MoveReference,
  AutoReference,
  AutoReferenceMut,
  Variadic,
}

impl Modifier {
  #[must_use] pub fn is_reference(self) -> bool {
    matches!(
      self,
      Self::LvalueReference | Self::MoveReference | Self::AutoReference | Self::AutoReferenceMut
    )
  }

  /// Modifiers that may only appear as the outermost layer of a typespec.
  #[must_use] pub fn outermost_only(self) -> bool {
    matches!(self, Self::LvalueReference | Self::MoveReference | Self::Variadic)
  }
}
