use smallvec::SmallVec;

use crate::types::WordId;
use crate::vocabulary::Vocabulary;
use crate::MAX_GLYPH_COUNT;

/// Structure tracking number of occurrences of each glyph in each cell across a slot's options,
/// indexed by `[cell_idx][glyph_id]`. This lets us answer "does any remaining option have this
/// letter here?" without scanning the options.
pub type GlyphCountsByCell = Vec<SmallVec<[u32; MAX_GLYPH_COUNT]>>;

/// Initialize the glyph counts for a slot of the given length from its options. Every option is
/// expected to have exactly `slot_length` glyphs.
pub fn build_glyph_counts_by_cell<I>(
    vocabulary: &Vocabulary,
    slot_length: usize,
    options: I,
) -> GlyphCountsByCell
where
    I: IntoIterator<Item = WordId>,
{
    let mut result: GlyphCountsByCell = (0..slot_length)
        .map(|_| (0..vocabulary.glyphs.len()).map(|_| 0).collect())
        .collect();

    for word_id in options {
        let word = &vocabulary.words[word_id];
        for (cell_counts, &glyph) in result.iter_mut().zip(&word.glyphs) {
            cell_counts[glyph] += 1;
        }
    }

    result
}
