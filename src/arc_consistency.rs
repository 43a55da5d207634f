//! This module contains a crossword-specific implementation of the AC-3 algorithm for establishing
//! and maintaining arc consistency. For our purposes, an arc is an ordered pair of overlapping slots
//! `(x, y)`, and it's consistent when every word left in `x`'s domain has at least one word in
//! `y`'s domain with the same letter in their shared cell. For example, if 1D doesn't have any
//! options starting with the letter A, we want to remove any options for 1A that start with A.
//!
//! We keep a worklist of arcs and revise them one at a time. Whenever revising `(x, y)` removes
//! something from `x`, every other arc pointing at `x` might have lost its support, so we queue it
//! again. We keep going until nothing is queued (a fixpoint) or some domain is wiped out.

use log::trace;
use std::collections::{HashSet, VecDeque};

use crate::domains::DomainStore;
use crate::puzzle::{Puzzle, SlotId};
use crate::types::WordId;

/// An ordered pair of slots `(x, y)`; revising it prunes `x` against `y`.
pub type ConstraintArc = (SlotId, SlotId);

/// Result from a successful call to `enforce_arc_consistency`.
#[derive(Debug, Clone, Default)]
pub struct ArcConsistencySuccess {
    /// How many arcs were revised.
    pub revisions: usize,

    /// How many words were removed across all domains.
    pub eliminations: usize,
}

/// Result from a failed call to `enforce_arc_consistency`, identifying the slot whose domain was
/// wiped out.
#[derive(Debug, Clone)]
pub struct ArcConsistencyFailure {
    pub wiped_out_slot_id: SlotId,
    pub revisions: usize,
}

/// Result from a call to `enforce_arc_consistency`.
pub type ArcConsistencyResult = Result<ArcConsistencySuccess, ArcConsistencyFailure>;

/// Does `y`'s domain contain any word that agrees with the given word from `x` at their overlap?
/// Slots that don't overlap trivially support each other.
#[must_use]
pub fn has_support(
    puzzle: &Puzzle,
    domains: &DomainStore,
    x: SlotId,
    y: SlotId,
    word_id: WordId,
) -> bool {
    let Some(overlap) = puzzle.overlap(x, y) else {
        return true;
    };

    domains.vocabulary().words[word_id]
        .glyphs
        .get(overlap.cell_idx)
        .is_some_and(|&glyph| domains.glyph_count(y, overlap.other_cell_idx, glyph) > 0)
}

/// Make `x` arc-consistent with `y` by removing every word from `x`'s domain that has no
/// compatible word in `y`'s domain. Returns whether `x`'s domain changed.
pub fn revise(puzzle: &Puzzle, domains: &mut DomainStore, x: SlotId, y: SlotId) -> bool {
    if puzzle.overlap(x, y).is_none() {
        return false;
    }

    // Removing words from `x` only changes `x`'s glyph counts, so we can safely decide everything
    // up front against `y`'s current counts.
    let unsupported: Vec<WordId> = {
        let domains: &DomainStore = domains;
        domains
            .words(x)
            .filter(|&word_id| !has_support(puzzle, domains, x, y, word_id))
            .collect()
    };

    for &word_id in &unsupported {
        domains.eliminate(x, word_id);
    }

    !unsupported.is_empty()
}

/// Every arc in the puzzle: each ordered pair of slots that overlap.
#[must_use]
pub fn all_arcs(puzzle: &Puzzle) -> Vec<ConstraintArc> {
    (0..puzzle.slot_count())
        .flat_map(|x| puzzle.neighbors(x).iter().map(move |&y| (x, y)))
        .collect()
}

/// Prune domains until every arc is consistent. If `initial_arcs` is `None`, every arc in the
/// puzzle is checked; otherwise we start with just the given arcs (which is enough when the rest of
/// the puzzle was already consistent before a few domains shrank).
pub fn enforce_arc_consistency(
    puzzle: &Puzzle,
    domains: &mut DomainStore,
    initial_arcs: Option<Vec<ConstraintArc>>,
) -> ArcConsistencyResult {
    let initial_arcs = initial_arcs.unwrap_or_else(|| all_arcs(puzzle));

    // We never need the same arc in the queue twice, so we track what's in it.
    let mut queue: VecDeque<ConstraintArc> = VecDeque::with_capacity(initial_arcs.len());
    let mut queued: HashSet<ConstraintArc> = HashSet::with_capacity(initial_arcs.len());
    for arc in initial_arcs {
        if queued.insert(arc) {
            queue.push_back(arc);
        }
    }

    let mut success = ArcConsistencySuccess::default();

    while let Some(arc) = queue.pop_front() {
        queued.remove(&arc);
        let (x, y) = arc;

        let size_before = domains.size(x);
        success.revisions += 1;
        if !revise(puzzle, domains, x, y) {
            continue;
        }
        success.eliminations += size_before - domains.size(x);

        if domains.is_empty(x) {
            trace!(
                "Domain of slot {} wiped out after {} revisions",
                puzzle.slot(x),
                success.revisions
            );
            return Err(ArcConsistencyFailure {
                wiped_out_slot_id: x,
                revisions: success.revisions,
            });
        }

        // `x` lost words, so anything relying on `x` for support needs to be rechecked. `y` is
        // exempt because everything removed from `x` had nothing to match in `y` anyway.
        for &z in puzzle.neighbors(x) {
            if z != y && queued.insert((z, x)) {
                queue.push_back((z, x));
            }
        }
    }

    Ok(success)
}

/// Is every arc in the puzzle consistent right now? This doesn't modify anything.
#[must_use]
pub fn is_arc_consistent(puzzle: &Puzzle, domains: &DomainStore) -> bool {
    all_arcs(puzzle).into_iter().all(|(x, y)| {
        domains
            .words(x)
            .all(|word_id| has_support(puzzle, domains, x, y, word_id))
    })
}

#[cfg(test)]
mod tests {
    use crate::arc_consistency::{
        all_arcs, enforce_arc_consistency, is_arc_consistent, revise, ArcConsistencyFailure,
    };
    use crate::domains::DomainStore;
    use crate::puzzle::tests::{across, down, resource_path};
    use crate::puzzle::Puzzle;
    use crate::vocabulary::Vocabulary;
    use std::fs;

    fn words(domains: &DomainStore, slot_id: usize) -> Vec<String> {
        domains
            .words(slot_id)
            .map(|word_id| domains.vocabulary().word_string(word_id).to_string())
            .collect()
    }

    #[test]
    fn test_revise() {
        let puzzle =
            Puzzle::new(vec![across(0, 0, 3), down(0, 0, 5)], [((0, 1), (0, 0))]).unwrap();
        let vocabulary = Vocabulary::new(["cat", "dog", "dodge", "algae"]);
        let mut domains = DomainStore::initialize(&puzzle, &vocabulary);

        assert!(revise(&puzzle, &mut domains, 0, 1));
        assert_eq!(words(&domains, 0), vec!["dog"]);
        assert_eq!(
            words(&domains, 1),
            vec!["dodge", "algae"],
            "revise only touches x"
        );

        assert!(!revise(&puzzle, &mut domains, 0, 1), "already consistent");
        assert!(revise(&puzzle, &mut domains, 1, 0));
        assert_eq!(words(&domains, 1), vec!["dodge"]);
    }

    #[test]
    fn test_revise_without_overlap_is_noop() {
        let puzzle = Puzzle::new(vec![across(0, 0, 3), across(0, 2, 3)], []).unwrap();
        let vocabulary = Vocabulary::new(["cat", "dog"]);
        let mut domains = DomainStore::initialize(&puzzle, &vocabulary);

        assert!(!revise(&puzzle, &mut domains, 0, 1));
        assert_eq!(domains.size(0), 2);
        assert!(all_arcs(&puzzle).is_empty());
    }

    #[test]
    fn test_enforce_arc_consistency_reaches_fixpoint() {
        let puzzle = Puzzle::from_template_string(
            &fs::read_to_string(resource_path("structure0.txt")).unwrap(),
        )
        .unwrap();
        let vocabulary = Vocabulary::from_file(resource_path("words0.txt")).unwrap();
        let mut domains = DomainStore::initialize(&puzzle, &vocabulary);

        let result = enforce_arc_consistency(&puzzle, &mut domains, None)
            .expect("Failed to establish consistency");
        assert!(result.eliminations > 0);
        assert!(is_arc_consistent(&puzzle, &domains));

        for (x, y) in all_arcs(&puzzle) {
            assert!(!revise(&puzzle, &mut domains, x, y));
        }

        // The 5-letter down slot has to start like a 3-letter word and end like a 4-letter word,
        // which only leaves "seven", and that in turn pins down both across slots.
        let slot_words = |slot| words(&domains, puzzle.slot_id(&slot).unwrap());
        assert_eq!(slot_words(down(1, 0, 5)), vec!["seven"]);
        assert_eq!(slot_words(across(1, 0, 3)), vec!["six"]);
        assert_eq!(slot_words(across(1, 4, 4)), vec!["nine"]);
        assert_eq!(slot_words(down(4, 1, 4)), vec!["five", "nine"]);
    }

    #[test]
    fn test_enforce_arc_consistency_detects_wipeout() {
        let puzzle =
            Puzzle::new(vec![across(0, 0, 3), down(0, 0, 5)], [((0, 1), (0, 0))]).unwrap();
        let vocabulary = Vocabulary::new(["cat", "dog", "eagle", "fjord"]);
        let mut domains = DomainStore::initialize(&puzzle, &vocabulary);

        let Err(ArcConsistencyFailure {
            wiped_out_slot_id, ..
        }) = enforce_arc_consistency(&puzzle, &mut domains, None)
        else {
            panic!("Established consistency for an impossible puzzle?");
        };
        assert_eq!(wiped_out_slot_id, 0);
    }

    #[test]
    fn test_enforce_arc_consistency_with_initial_arcs() {
        // A chain: 0 crosses 1, 1 crosses 2.
        let puzzle = Puzzle::new(
            vec![across(0, 0, 3), down(2, 0, 3), across(2, 2, 3)],
            [((0, 1), (2, 0)), ((1, 2), (2, 0))],
        )
        .unwrap();
        let vocabulary = Vocabulary::new(["cat", "tan", "nib", "tub", "bin", "dog"]);
        let mut domains = DomainStore::initialize(&puzzle, &vocabulary);

        // Pretend slot 0 was just narrowed to "cat"; propagating from it should reach slot 2
        // through slot 1.
        domains.restrict_to(0, vocabulary.get_word_id("cat").unwrap());
        enforce_arc_consistency(&puzzle, &mut domains, Some(vec![(1, 0)])).unwrap();

        assert_eq!(words(&domains, 1), vec!["tan", "tub"]);
        assert_eq!(words(&domains, 2), vec!["nib", "bin"]);
        assert!(is_arc_consistent(&puzzle, &domains));
    }

    #[test]
    fn test_non_overlapping_slots_are_trivially_consistent() {
        let puzzle = Puzzle::new(vec![across(0, 0, 3), across(0, 2, 3)], []).unwrap();
        let vocabulary = Vocabulary::new(["cat"]);
        let mut domains = DomainStore::initialize(&puzzle, &vocabulary);

        let result = enforce_arc_consistency(&puzzle, &mut domains, None).unwrap();
        assert_eq!(result.revisions, 0);
        assert_eq!(domains.size(0), 1);
        assert_eq!(domains.size(1), 1);
    }
}
