//! Partial or complete assignments of words to slots, and the check that decides whether an
//! assignment is allowed.

use std::collections::BTreeMap;

use crate::puzzle::{Puzzle, Slot, SlotId};
use crate::types::WordId;
use crate::vocabulary::Vocabulary;

/// A mapping from slots to the single word chosen for each of them. Slots without a word are
/// unassigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    choices: Vec<Option<WordId>>,
    assigned_count: usize,
}

impl Assignment {
    /// An empty assignment for a puzzle with the given number of slots.
    #[must_use]
    pub fn new(slot_count: usize) -> Assignment {
        Assignment {
            choices: vec![None; slot_count],
            assigned_count: 0,
        }
    }

    /// Assign a word to a slot, returning the word it replaced, if any.
    pub fn assign(&mut self, slot_id: SlotId, word_id: WordId) -> Option<WordId> {
        let previous = self.choices[slot_id].replace(word_id);
        if previous.is_none() {
            self.assigned_count += 1;
        }
        previous
    }

    /// Clear a slot's word, returning it.
    pub fn unassign(&mut self, slot_id: SlotId) -> Option<WordId> {
        let previous = self.choices[slot_id].take();
        if previous.is_some() {
            self.assigned_count -= 1;
        }
        previous
    }

    #[must_use]
    pub fn get(&self, slot_id: SlotId) -> Option<WordId> {
        self.choices[slot_id]
    }

    #[must_use]
    pub fn is_assigned(&self, slot_id: SlotId) -> bool {
        self.choices[slot_id].is_some()
    }

    /// How many slots have a word?
    #[must_use]
    pub fn len(&self) -> usize {
        self.assigned_count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigned_count == 0
    }

    /// Does every slot have a word?
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.assigned_count == self.choices.len()
    }

    /// The assigned slots and their words, in slot id order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, WordId)> + '_ {
        self.choices
            .iter()
            .enumerate()
            .filter_map(|(slot_id, word_id)| word_id.map(|word_id| (slot_id, word_id)))
    }

    /// Resolve ids into the slots and word strings they stand for.
    #[must_use]
    pub fn to_word_map(&self, puzzle: &Puzzle, vocabulary: &Vocabulary) -> BTreeMap<Slot, String> {
        self.iter()
            .map(|(slot_id, word_id)| {
                (
                    puzzle.slot(slot_id).clone(),
                    vocabulary.word_string(word_id).to_string(),
                )
            })
            .collect()
    }
}

/// Is this assignment allowed? Only assigned slots are checked: every word must fit its slot, no
/// word may be used twice, and overlapping slots must agree on their shared letter.
#[must_use]
pub fn is_consistent(puzzle: &Puzzle, vocabulary: &Vocabulary, assignment: &Assignment) -> bool {
    let assigned: Vec<(SlotId, WordId)> = assignment.iter().collect();

    for (idx, &(slot_id, word_id)) in assigned.iter().enumerate() {
        let word = &vocabulary.words[word_id];
        if word.length() != puzzle.slot(slot_id).length {
            return false;
        }

        for &(other_slot_id, other_word_id) in &assigned[idx + 1..] {
            // Words are interned, so equal ids mean equal strings.
            if word_id == other_word_id {
                return false;
            }

            if let Some(overlap) = puzzle.overlap(slot_id, other_slot_id) {
                let glyph = word.glyphs.get(overlap.cell_idx);
                let other_glyph = vocabulary.words[other_word_id]
                    .glyphs
                    .get(overlap.other_cell_idx);

                if glyph.is_none() || glyph != other_glyph {
                    return false;
                }
            }
        }
    }

    true
}
