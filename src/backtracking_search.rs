//! This module implements puzzle filling using a recursive backtracking search. Variables (slots)
//! are ordered with the "minimum remaining values" heuristic, falling back to degree and then to
//! reading order so that runs are reproducible; values (words) are ordered with the "least
//! constraining value" heuristic. The search is exhaustive, so if it fails, no fill exists.
//!
//! Optionally, the search maintains arc consistency as it goes: after each choice it narrows the
//! chosen slot's domain to the chosen word and propagates the consequences with AC-3. Everything
//! that propagation removes is rolled back through the domain store's undo log when we backtrack,
//! so pruning done in one branch never leaks into its siblings.

use log::{debug, trace};
use smallvec::SmallVec;
use std::cmp::Reverse;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::arc_consistency::{
    enforce_arc_consistency, ArcConsistencyFailure, ArcConsistencySuccess, ConstraintArc,
};
use crate::assignment::{is_consistent, Assignment};
use crate::domains::DomainStore;
use crate::puzzle::{Puzzle, SlotId};
use crate::types::WordId;
use crate::{CHECK_INVARIANTS, MAX_SLOT_LENGTH};

/// A struct tracking stats about the filling process.
#[derive(Debug, Clone, Default)]
pub struct Statistics {
    pub states: usize,
    pub backtracks: usize,
    pub revisions: usize,
    pub total_time: Duration,
    pub initial_arc_consistency_time: Duration,
    pub search_time: Duration,
}

/// Knobs for a fill attempt. None of them affect whether a fill is found, only how fast.
#[derive(Debug, Clone, Copy, Default)]
pub struct FillOptions<'a> {
    /// Give up after this much time has passed.
    pub timeout: Option<Duration>,

    /// An optional atomic flag that can be set to signal that the fill operation should be
    /// canceled.
    pub abort: Option<&'a AtomicBool>,

    /// Propagate each choice with AC-3 instead of just checking it against other choices.
    pub maintain_arc_consistency: bool,
}

/// A struct representing the results of a fill operation.
#[derive(Debug)]
pub struct FillSuccess {
    pub statistics: Statistics,
    pub assignment: Assignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillFailure {
    /// There's no fill for this puzzle.
    HardFailure,
    Timeout,
    Abort,
}

impl fmt::Display for FillFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillFailure::HardFailure => write!(f, "No solution."),
            FillFailure::Timeout => write!(f, "Timed out before finding a solution"),
            FillFailure::Abort => write!(f, "Fill was aborted"),
        }
    }
}

impl std::error::Error for FillFailure {}

/// Choose the next slot to fill: the unassigned slot with the fewest remaining words, preferring
/// slots with more neighbors and then slots that come first in reading order.
#[must_use]
pub fn select_unassigned_variable(
    puzzle: &Puzzle,
    domains: &DomainStore,
    assignment: &Assignment,
) -> Option<SlotId> {
    (0..puzzle.slot_count())
        .filter(|&slot_id| !assignment.is_assigned(slot_id))
        .min_by_key(|&slot_id| {
            (
                domains.size(slot_id),
                Reverse(puzzle.neighbors(slot_id).len()),
                puzzle.slot(slot_id),
            )
        })
}

/// Order a slot's remaining words so that the ones that constrain the puzzle least come first. A
/// word's cost is the number of unassigned neighbors that still have that exact word in their own
/// domain. Ties keep ascending word id order.
#[must_use]
pub fn order_domain_values(
    puzzle: &Puzzle,
    domains: &DomainStore,
    assignment: &Assignment,
    slot_id: SlotId,
) -> Vec<WordId> {
    let unassigned_neighbors: SmallVec<[SlotId; MAX_SLOT_LENGTH]> = puzzle
        .neighbors(slot_id)
        .iter()
        .copied()
        .filter(|&neighbor_id| !assignment.is_assigned(neighbor_id))
        .collect();

    let mut values: Vec<WordId> = domains.words(slot_id).collect();
    values.sort_by_cached_key(|&word_id| {
        unassigned_neighbors
            .iter()
            .filter(|&&neighbor_id| domains.contains(neighbor_id, word_id))
            .count()
    });
    values
}

/// The state threaded through a single search.
struct Search<'a, 'b> {
    puzzle: &'a Puzzle,
    domains: DomainStore<'a>,
    options: &'b FillOptions<'b>,
    deadline: Option<Instant>,
    statistics: Statistics,
}

impl Search<'_, '_> {
    /// Bail out if we've passed our deadline or been asked to stop.
    fn check_interrupts(&self) -> Result<(), FillFailure> {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(FillFailure::Timeout);
            }
        }
        if let Some(abort) = self.options.abort {
            if abort.load(Ordering::Relaxed) {
                return Err(FillFailure::Abort);
            }
        }
        Ok(())
    }

    /// Try to extend the given assignment to a complete one. `Ok(false)` means no extension of
    /// it is possible; in that case the assignment and domains are left as we found them.
    fn backtrack(&mut self, assignment: &mut Assignment) -> Result<bool, FillFailure> {
        self.statistics.states += 1;
        self.check_interrupts()?;

        let Some(slot_id) = select_unassigned_variable(self.puzzle, &self.domains, assignment)
        else {
            // Every slot has a word, and every word was checked when it was added.
            return Ok(true);
        };

        let vocabulary = self.domains.vocabulary();

        for word_id in order_domain_values(self.puzzle, &self.domains, assignment, slot_id) {
            assignment.assign(slot_id, word_id);

            if is_consistent(self.puzzle, vocabulary, assignment) {
                trace!(
                    "Trying {:?} for slot {} at depth {}",
                    vocabulary.word_string(word_id),
                    self.puzzle.slot(slot_id),
                    assignment.len()
                );

                let checkpoint = self.domains.checkpoint();
                if self.propagate_choice(slot_id, word_id) && self.backtrack(assignment)? {
                    return Ok(true);
                }
                self.domains.rollback(checkpoint);
            }

            assignment.unassign(slot_id);
            self.statistics.backtracks += 1;
        }

        Ok(false)
    }

    /// If we're maintaining arc consistency, narrow the slot to the chosen word and propagate
    /// that to the rest of the puzzle. Returns `false` if that wipes out some other slot.
    fn propagate_choice(&mut self, slot_id: SlotId, word_id: WordId) -> bool {
        if !self.options.maintain_arc_consistency {
            return true;
        }

        self.domains.restrict_to(slot_id, word_id);

        let arcs: Vec<ConstraintArc> = self
            .puzzle
            .neighbors(slot_id)
            .iter()
            .map(|&neighbor_id| (neighbor_id, slot_id))
            .collect();

        match enforce_arc_consistency(self.puzzle, &mut self.domains, Some(arcs)) {
            Ok(ArcConsistencySuccess { revisions, .. }) => {
                self.statistics.revisions += revisions;
                true
            }
            Err(ArcConsistencyFailure {
                revisions,
                wiped_out_slot_id,
            }) => {
                self.statistics.revisions += revisions;
                trace!(
                    "Choice for slot {} wipes out slot {}",
                    self.puzzle.slot(slot_id),
                    self.puzzle.slot(wiped_out_slot_id)
                );
                false
            }
        }
    }
}

/// Search for a complete assignment, starting from the empty assignment and using the given
/// domains (normally already arc-consistent) as the pool of candidate words for each slot.
pub fn backtracking_search(
    puzzle: &Puzzle,
    domains: DomainStore,
    options: &FillOptions,
    deadline: Option<Instant>,
) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();

    let mut search = Search {
        puzzle,
        domains,
        options,
        deadline,
        statistics: Statistics::default(),
    };
    let mut assignment = Assignment::new(puzzle.slot_count());

    let found = search.backtrack(&mut assignment)?;
    search.statistics.search_time = start.elapsed();

    debug!(
        "Search finished after {} states and {} backtracks",
        search.statistics.states, search.statistics.backtracks
    );

    if !found {
        return Err(FillFailure::HardFailure);
    }

    if CHECK_INVARIANTS
        && !(assignment.is_complete()
            && is_consistent(puzzle, search.domains.vocabulary(), &assignment))
    {
        panic!("Search returned an incomplete or inconsistent assignment?");
    }

    Ok(FillSuccess {
        statistics: search.statistics,
        assignment,
    })
}
