//! The domain store tracks which words are still possible for each slot. Domains start out as the
//! node-consistent subset of the vocabulary (every word of the right length) and only ever shrink
//! after that. Every elimination is recorded in an undo log, so that a search can take a
//! checkpoint before making a choice and roll back everything that choice implied when it
//! backtracks.

use std::collections::HashSet;
use std::fmt;
use std::fmt::{Debug, Formatter};

use crate::puzzle::{Puzzle, SlotId};
use crate::types::{GlyphId, WordId};
use crate::util::{build_glyph_counts_by_cell, GlyphCountsByCell};
use crate::vocabulary::Vocabulary;
use crate::CHECK_INVARIANTS;

/// A position in the undo log, as returned by `DomainStore::checkpoint`.
pub type Checkpoint = usize;

/// The live state of a single slot's domain.
#[derive(Clone)]
struct SlotDomain {
    /// Every word that was node-consistent for this slot at initialization, in ascending order.
    options: Vec<WordId>,

    /// The subset of `options` that has been ruled out since.
    eliminations: HashSet<WordId>,

    /// Glyph counts for the options that haven't been eliminated.
    glyph_counts_by_cell: GlyphCountsByCell,
}

impl SlotDomain {
    fn remaining_option_count(&self) -> usize {
        self.options.len() - self.eliminations.len()
    }

    fn contains(&self, word_id: WordId) -> bool {
        self.options.binary_search(&word_id).is_ok() && !self.eliminations.contains(&word_id)
    }
}

/// A mapping from each slot in a puzzle to its current candidate words.
#[derive(Clone)]
pub struct DomainStore<'a> {
    vocabulary: &'a Vocabulary,
    domains: Vec<SlotDomain>,

    /// Every elimination made since the log was last cleared, in order.
    undo_log: Vec<(SlotId, WordId)>,
}

impl Debug for DomainStore<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomainStore")
            .field(
                "sizes",
                &self
                    .domains
                    .iter()
                    .map(SlotDomain::remaining_option_count)
                    .collect::<Vec<_>>(),
            )
            .field("undo_log", &format!("({} entries)", self.undo_log.len()))
            .finish()
    }
}

impl<'a> DomainStore<'a> {
    /// Build a domain for every slot in the puzzle by filtering the vocabulary down to the words
    /// whose length matches the slot's length.
    #[must_use]
    pub fn initialize(puzzle: &Puzzle, vocabulary: &'a Vocabulary) -> DomainStore<'a> {
        let domains = puzzle
            .slots()
            .iter()
            .map(|slot| {
                let options: Vec<WordId> = (0..vocabulary.len())
                    .filter(|&word_id| vocabulary.words[word_id].length() == slot.length)
                    .collect();

                SlotDomain {
                    glyph_counts_by_cell: build_glyph_counts_by_cell(
                        vocabulary,
                        slot.length,
                        options.iter().copied(),
                    ),
                    options,
                    eliminations: HashSet::new(),
                }
            })
            .collect();

        DomainStore {
            vocabulary,
            domains,
            undo_log: vec![],
        }
    }

    #[must_use]
    pub fn vocabulary(&self) -> &'a Vocabulary {
        self.vocabulary
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.domains.len()
    }

    /// How many words are still possible for this slot?
    #[must_use]
    pub fn size(&self, slot_id: SlotId) -> usize {
        self.domains[slot_id].remaining_option_count()
    }

    #[must_use]
    pub fn is_empty(&self, slot_id: SlotId) -> bool {
        self.size(slot_id) == 0
    }

    #[must_use]
    pub fn contains(&self, slot_id: SlotId, word_id: WordId) -> bool {
        self.domains[slot_id].contains(word_id)
    }

    /// The words still possible for this slot, in ascending id order.
    pub fn words(&self, slot_id: SlotId) -> impl Iterator<Item = WordId> + '_ {
        let domain = &self.domains[slot_id];
        domain
            .options
            .iter()
            .copied()
            .filter(move |word_id| !domain.eliminations.contains(word_id))
    }

    /// How many of this slot's remaining words have the given glyph in the given cell?
    #[must_use]
    pub fn glyph_count(&self, slot_id: SlotId, cell_idx: usize, glyph: GlyphId) -> u32 {
        self.domains[slot_id]
            .glyph_counts_by_cell
            .get(cell_idx)
            .and_then(|counts| counts.get(glyph))
            .copied()
            .unwrap_or(0)
    }

    /// Remove a word from a slot's domain, recording it in the undo log. Returns `false` if the
    /// word wasn't in the domain to begin with.
    pub fn eliminate(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        let domain = &mut self.domains[slot_id];
        if !domain.contains(word_id) {
            return false;
        }

        domain.eliminations.insert(word_id);
        let word = &self.vocabulary.words[word_id];
        for (cell_counts, &glyph) in domain.glyph_counts_by_cell.iter_mut().zip(&word.glyphs) {
            cell_counts[glyph] -= 1;
        }

        self.undo_log.push((slot_id, word_id));
        true
    }

    /// Remove every word except the given one from a slot's domain, returning the number of words
    /// removed.
    pub fn restrict_to(&mut self, slot_id: SlotId, word_id: WordId) -> usize {
        let others: Vec<WordId> = self
            .words(slot_id)
            .filter(|&other_word_id| other_word_id != word_id)
            .collect();

        for &other_word_id in &others {
            self.eliminate(slot_id, other_word_id);
        }

        others.len()
    }

    /// Mark the current state so that it can be restored with `rollback`.
    #[must_use]
    pub fn checkpoint(&self) -> Checkpoint {
        self.undo_log.len()
    }

    /// Restore every word eliminated since the given checkpoint, most recent first.
    pub fn rollback(&mut self, checkpoint: Checkpoint) {
        while self.undo_log.len() > checkpoint {
            let Some((slot_id, word_id)) = self.undo_log.pop() else {
                break;
            };

            let domain = &mut self.domains[slot_id];
            let was_eliminated = domain.eliminations.remove(&word_id);
            if CHECK_INVARIANTS && !was_eliminated {
                panic!("Undo log entry for a word that wasn't eliminated?");
            }

            let word = &self.vocabulary.words[word_id];
            for (cell_counts, &glyph) in domain.glyph_counts_by_cell.iter_mut().zip(&word.glyphs) {
                cell_counts[glyph] += 1;
            }
        }
    }

    /// Forget the undo log, making every elimination so far permanent.
    pub fn clear_undo_log(&mut self) {
        self.undo_log.clear();
    }
}
