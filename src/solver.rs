//! The entry points for filling a puzzle: establish node and arc consistency, then search.

use log::debug;
use std::time::Instant;

use crate::arc_consistency::{enforce_arc_consistency, ArcConsistencyFailure};
use crate::assignment::Assignment;
use crate::backtracking_search::{backtracking_search, FillFailure, FillOptions, FillSuccess};
use crate::domains::DomainStore;
use crate::puzzle::Puzzle;
use crate::vocabulary::Vocabulary;

/// Search for a fill for the given puzzle using words from the given vocabulary.
pub fn find_fill(
    puzzle: &Puzzle,
    vocabulary: &Vocabulary,
    options: &FillOptions,
) -> Result<FillSuccess, FillFailure> {
    let start = Instant::now();
    // A timeout too far out to represent is the same as no timeout.
    let deadline = options
        .timeout
        .and_then(|timeout| start.checked_add(timeout));

    let mut domains = DomainStore::initialize(puzzle, vocabulary);

    debug!(
        "Filling {} slots from a vocabulary of {} words",
        puzzle.slot_count(),
        vocabulary.len()
    );

    // Establish initial arc consistency. If we can't even do that, we're obviously not going to be
    // able to find a fill.
    let initial_revisions = match enforce_arc_consistency(puzzle, &mut domains, None) {
        Ok(success) => {
            debug!(
                "Initial arc consistency removed {} words in {} revisions",
                success.eliminations, success.revisions
            );
            success.revisions
        }
        Err(ArcConsistencyFailure {
            wiped_out_slot_id,
            revisions,
        }) => {
            debug!(
                "No words left for slot {} after {revisions} revisions",
                puzzle.slot(wiped_out_slot_id)
            );
            return Err(FillFailure::HardFailure);
        }
    };
    let initial_arc_consistency_time = start.elapsed();

    // Nothing the search does should ever undo the initial pruning.
    domains.clear_undo_log();

    let mut result = backtracking_search(puzzle, domains, options, deadline)?;
    result.statistics.revisions += initial_revisions;
    result.statistics.initial_arc_consistency_time = initial_arc_consistency_time;
    result.statistics.total_time = start.elapsed();

    debug!("{:?}", result.statistics);

    Ok(result)
}

/// Fill the given puzzle with default options, returning `None` if there's no solution.
#[must_use]
pub fn solve(puzzle: &Puzzle, vocabulary: &Vocabulary) -> Option<Assignment> {
    find_fill(puzzle, vocabulary, &FillOptions::default())
        .ok()
        .map(|result| result.assignment)
}
