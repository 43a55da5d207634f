/// An identifier for a given letter or symbol, based on its index in the `Vocabulary`'s `glyphs`
/// field.
pub type GlyphId = usize;

/// An identifier for a given word, based on its index in the `Vocabulary`'s `words` field.
pub type WordId = usize;
