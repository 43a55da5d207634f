//! This module describes the shape of a puzzle independent of any vocabulary: the slots that need
//! to be filled, and the overlaps that force crossing slots to agree on a shared letter.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;

#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::assignment::Assignment;
use crate::vocabulary::Vocabulary;

/// An identifier for a given slot, based on its index in the `Puzzle`'s `slots` field.
pub type SlotId = usize;

/// Zero-indexed x and y coords for a cell in the grid, where y = 0 in the top row.
pub type GridCoord = (usize, usize);

/// Character representing a blocked cell in templates and rendered grids.
pub const BLOCK_CHAR: char = '#';

/// Character representing an open cell that doesn't have a letter yet in rendered grids.
pub const EMPTY_CHAR: char = '.';

/// The direction that a slot is facing.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    Across,
    Down,
}

/// A maximal run of cells that holds a single word. Slots are compared by value.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Slot {
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Across => "across",
            Direction::Down => "down",
        }
    }

    fn from_name(name: &str) -> Option<Direction> {
        [Direction::Across, Direction::Down]
            .into_iter()
            .find(|direction| direction.as_str() == name)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Slot {
    /// Parse a key like "1,2,down,5" (column, row, direction, length).
    pub fn from_key(key: &str) -> Result<Slot, PuzzleError> {
        let invalid = || PuzzleError::InvalidSlotKey(key.to_string());

        let fields: Vec<&str> = key.split(',').map(str::trim).collect();
        let &[x, y, direction, length] = fields.as_slice() else {
            return Err(invalid());
        };

        Ok(Slot {
            start_cell: (
                x.parse().map_err(|_| invalid())?,
                y.parse().map_err(|_| invalid())?,
            ),
            direction: Direction::from_name(direction).ok_or_else(invalid)?,
            length: length.parse().map_err(|_| invalid())?,
        })
    }

    /// The inverse of `from_key`.
    #[must_use]
    pub fn to_key(&self) -> String {
        let (x, y) = self.start_cell;
        format!("{x},{y},{},{}", self.direction, self.length)
    }

    /// The cells this slot covers, in word order.
    pub fn cell_coords(&self) -> impl Iterator<Item = GridCoord> {
        let (x, y) = self.start_cell;
        let direction = self.direction;
        (0..self.length).map(move |cell_idx| match direction {
            Direction::Across => (x + cell_idx, y),
            Direction::Down => (x, y + cell_idx),
        })
    }
}

/// Slots are ordered by position in reading order (row, then column), then by direction. This is
/// what makes tie-breaks during search reproducible.
impl Ord for Slot {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.start_cell.1, self.start_cell.0, self.direction, self.length).cmp(&(
            other.start_cell.1,
            other.start_cell.0,
            other.direction,
            other.length,
        ))
    }
}

impl PartialOrd for Slot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_key())
    }
}

#[cfg(feature = "serde")]
impl Serialize for Slot {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_key())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Slot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Slot::from_key(&String::deserialize(deserializer)?).map_err(serde::de::Error::custom)
    }
}

/// The cell shared by two slots, expressed as an index into each slot's word. The first index
/// belongs to the slot whose row of the overlap table this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overlap {
    pub cell_idx: usize,
    pub other_cell_idx: usize,
}

impl Overlap {
    /// The same overlap, seen from the other slot.
    #[must_use]
    pub fn mirrored(self) -> Overlap {
        Overlap {
            cell_idx: self.other_cell_idx,
            other_cell_idx: self.cell_idx,
        }
    }
}

/// Ways that a puzzle definition can be malformed. These are all detected before any solving
/// happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    ZeroLengthSlot(Slot),
    DuplicateSlot(Slot),
    UnknownSlot(SlotId),
    SelfOverlap(SlotId),
    OverlapOutOfRange {
        slot_id: SlotId,
        cell_idx: usize,
        length: usize,
    },
    AsymmetricOverlap {
        slot_id: SlotId,
        other_slot_id: SlotId,
    },
    CellOverflow(GridCoord),
    GridTooLarge(Slot),
    InvalidTemplateChar {
        ch: char,
        row: usize,
        column: usize,
    },
    EmptyTemplate,
    InvalidSlotKey(String),
}

impl fmt::Display for PuzzleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PuzzleError::ZeroLengthSlot(slot) => write!(f, "Slot {slot} has no cells"),
            PuzzleError::DuplicateSlot(slot) => write!(f, "Slot {slot} appears more than once"),
            PuzzleError::UnknownSlot(slot_id) => {
                write!(f, "Overlap references unknown slot id {slot_id}")
            }
            PuzzleError::SelfOverlap(slot_id) => {
                write!(f, "Slot id {slot_id} can't overlap with itself")
            }
            PuzzleError::OverlapOutOfRange {
                slot_id,
                cell_idx,
                length,
            } => write!(
                f,
                "Overlap index {cell_idx} is out of range for slot id {slot_id} (length {length})"
            ),
            PuzzleError::AsymmetricOverlap {
                slot_id,
                other_slot_id,
            } => write!(
                f,
                "Conflicting overlaps given between slot ids {slot_id} and {other_slot_id}"
            ),
            PuzzleError::CellOverflow((x, y)) => {
                write!(f, "More than two slots share the cell at ({x}, {y})")
            }
            PuzzleError::GridTooLarge(slot) => {
                write!(f, "Slot {slot} runs past the largest representable grid")
            }
            PuzzleError::InvalidTemplateChar { ch, row, column } => write!(
                f,
                "Grid contains invalid character “{ch}” at row {}, column {}",
                row + 1,
                column + 1
            ),
            PuzzleError::EmptyTemplate => write!(f, "Grid must have at least one row"),
            PuzzleError::InvalidSlotKey(key) => write!(f, "Invalid slot key: {key:?}"),
        }
    }
}

impl std::error::Error for PuzzleError {}

/// An immutable puzzle definition: the slots, the overlap table between them, and the grid they're
/// laid out in.
#[derive(Debug, Clone)]
pub struct Puzzle {
    /// The width and height of the grid.
    pub width: usize,
    pub height: usize,

    /// Every cell covered by some slot. Cells not in the set are blocked.
    open_cells: HashSet<GridCoord>,

    slots: Vec<Slot>,

    /// Dense, symmetric table indexed by `[slot_id][other_slot_id]`.
    overlaps: Vec<Vec<Option<Overlap>>>,

    /// For each slot, the ids of the slots it overlaps with, in ascending order.
    neighbors: Vec<Vec<SlotId>>,
}

impl Puzzle {
    /// Build a puzzle from a set of slots and an explicit overlap table. Each entry maps an ordered
    /// pair of slot ids to the index in each slot's word where they have to match; the mirrored
    /// entry is implied, but if it's also given it has to agree.
    pub fn new<I>(slots: Vec<Slot>, overlap_entries: I) -> Result<Puzzle, PuzzleError>
    where
        I: IntoIterator<Item = ((SlotId, SlotId), (usize, usize))>,
    {
        validate_slots(&slots)?;
        let (width, height) = slot_extents(&slots)?;

        let mut overlaps = vec![vec![None; slots.len()]; slots.len()];

        for ((slot_id, other_slot_id), (cell_idx, other_cell_idx)) in overlap_entries {
            for id in [slot_id, other_slot_id] {
                if id >= slots.len() {
                    return Err(PuzzleError::UnknownSlot(id));
                }
            }

            if slot_id == other_slot_id {
                return Err(PuzzleError::SelfOverlap(slot_id));
            }

            for (id, idx) in [(slot_id, cell_idx), (other_slot_id, other_cell_idx)] {
                if idx >= slots[id].length {
                    return Err(PuzzleError::OverlapOutOfRange {
                        slot_id: id,
                        cell_idx: idx,
                        length: slots[id].length,
                    });
                }
            }

            let overlap = Overlap {
                cell_idx,
                other_cell_idx,
            };
            record_overlap(&mut overlaps, slot_id, other_slot_id, overlap)?;
        }

        let open_cells = slots.iter().flat_map(Slot::cell_coords).collect();

        Ok(Puzzle::from_parts(width, height, open_cells, slots, overlaps))
    }

    /// Build a puzzle from a set of slots, deriving overlaps from the cells they share.
    pub fn from_slots(slots: Vec<Slot>) -> Result<Puzzle, PuzzleError> {
        validate_slots(&slots)?;
        let (width, height) = slot_extents(&slots)?;
        let open_cells = slots.iter().flat_map(Slot::cell_coords).collect();

        Puzzle::from_slots_in_grid(width, height, open_cells, slots)
    }

    /// Build a puzzle from a template string with `#` representing blocks and `_` or `.`
    /// representing empty cells. Rows shorter than the longest row are padded with blocks.
    pub fn from_template_string(template: &str) -> Result<Puzzle, PuzzleError> {
        let rows: Vec<Vec<char>> = template
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                if line.is_empty() {
                    None
                } else {
                    Some(line.chars().collect())
                }
            })
            .collect();

        if rows.is_empty() {
            return Err(PuzzleError::EmptyTemplate);
        }

        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);

        let mut open_cells = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            for x in 0..width {
                open_cells.push(match row.get(x).copied() {
                    None | Some(BLOCK_CHAR) => false,
                    Some('_' | '.') => true,
                    Some(ch) => {
                        return Err(PuzzleError::InvalidTemplateChar {
                            ch,
                            row: y,
                            column: x,
                        })
                    }
                });
            }
        }

        let mut slots: Vec<Slot> = vec![];

        for y in 0..height {
            let mut run_start: Option<usize> = None;
            for x in 0..=width {
                let open = x < width && open_cells[y * width + x];
                match (open, run_start) {
                    (true, None) => run_start = Some(x),
                    (false, Some(start)) => {
                        if x - start > 1 {
                            slots.push(Slot {
                                start_cell: (start, y),
                                direction: Direction::Across,
                                length: x - start,
                            });
                        }
                        run_start = None;
                    }
                    _ => {}
                }
            }
        }

        for x in 0..width {
            let mut run_start: Option<usize> = None;
            for y in 0..=height {
                let open = y < height && open_cells[y * width + x];
                match (open, run_start) {
                    (true, None) => run_start = Some(y),
                    (false, Some(start)) => {
                        if y - start > 1 {
                            slots.push(Slot {
                                start_cell: (x, start),
                                direction: Direction::Down,
                                length: y - start,
                            });
                        }
                        run_start = None;
                    }
                    _ => {}
                }
            }
        }

        let open_cells = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .filter(|&(x, y)| open_cells[y * width + x])
            .collect();

        Puzzle::from_slots_in_grid(width, height, open_cells, slots)
    }

    /// Derive overlaps from shared cells. Slots must already be validated.
    fn from_slots_in_grid(
        width: usize,
        height: usize,
        open_cells: HashSet<GridCoord>,
        slots: Vec<Slot>,
    ) -> Result<Puzzle, PuzzleError> {
        // Build a map from cell location to the slots running through it, which we can then use to
        // calculate overlaps.
        let mut entries_by_loc: HashMap<GridCoord, Vec<(SlotId, usize)>> = HashMap::new();
        for (slot_id, slot) in slots.iter().enumerate() {
            for (cell_idx, loc) in slot.cell_coords().enumerate() {
                entries_by_loc
                    .entry(loc)
                    .or_default()
                    .push((slot_id, cell_idx));
            }
        }

        let mut overlaps = vec![vec![None; slots.len()]; slots.len()];

        let mut locs: Vec<GridCoord> = entries_by_loc.keys().copied().collect();
        locs.sort_by_key(|&(x, y)| (y, x));

        for loc in locs {
            match entries_by_loc[&loc].as_slice() {
                [_] => {}
                &[(slot_id, cell_idx), (other_slot_id, other_cell_idx)] => {
                    record_overlap(
                        &mut overlaps,
                        slot_id,
                        other_slot_id,
                        Overlap {
                            cell_idx,
                            other_cell_idx,
                        },
                    )?;
                }
                _ => return Err(PuzzleError::CellOverflow(loc)),
            }
        }

        Ok(Puzzle::from_parts(width, height, open_cells, slots, overlaps))
    }

    fn from_parts(
        width: usize,
        height: usize,
        open_cells: HashSet<GridCoord>,
        slots: Vec<Slot>,
        overlaps: Vec<Vec<Option<Overlap>>>,
    ) -> Puzzle {
        let neighbors = overlaps
            .iter()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .filter(|(_, overlap)| overlap.is_some())
                    .map(|(other_slot_id, _)| other_slot_id)
                    .collect()
            })
            .collect();

        Puzzle {
            width,
            height,
            open_cells,
            slots,
            overlaps,
            neighbors,
        }
    }

    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    #[must_use]
    pub fn slot(&self, slot_id: SlotId) -> &Slot {
        &self.slots[slot_id]
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Look up the id of a slot by value.
    #[must_use]
    pub fn slot_id(&self, slot: &Slot) -> Option<SlotId> {
        self.slots.iter().position(|candidate| candidate == slot)
    }

    /// Where do these two slots have to agree, if anywhere?
    #[must_use]
    pub fn overlap(&self, slot_id: SlotId, other_slot_id: SlotId) -> Option<Overlap> {
        self.overlaps[slot_id][other_slot_id]
    }

    #[must_use]
    pub fn neighbors(&self, slot_id: SlotId) -> &[SlotId] {
        &self.neighbors[slot_id]
    }

    #[must_use]
    pub fn is_open(&self, coord: GridCoord) -> bool {
        self.open_cells.contains(&coord)
    }
}

/// Reject slots that can't be part of a well-formed puzzle.
fn validate_slots(slots: &[Slot]) -> Result<(), PuzzleError> {
    for (slot_id, slot) in slots.iter().enumerate() {
        if slot.length == 0 {
            return Err(PuzzleError::ZeroLengthSlot(slot.clone()));
        }
        if slots[..slot_id].contains(slot) {
            return Err(PuzzleError::DuplicateSlot(slot.clone()));
        }
    }
    Ok(())
}

/// Store an overlap in both directions, failing if it contradicts one we already have.
fn record_overlap(
    overlaps: &mut [Vec<Option<Overlap>>],
    slot_id: SlotId,
    other_slot_id: SlotId,
    overlap: Overlap,
) -> Result<(), PuzzleError> {
    for (a, b, overlap) in [
        (slot_id, other_slot_id, overlap),
        (other_slot_id, slot_id, overlap.mirrored()),
    ] {
        match overlaps[a][b] {
            Some(existing) if existing != overlap => {
                return Err(PuzzleError::AsymmetricOverlap {
                    slot_id: a,
                    other_slot_id: b,
                });
            }
            _ => overlaps[a][b] = Some(overlap),
        }
    }
    Ok(())
}

/// The smallest grid size that fits all of the given slots. Fails if a slot runs past the largest
/// coordinate we can represent, or if the grid's cell count would overflow.
fn slot_extents(slots: &[Slot]) -> Result<(usize, usize), PuzzleError> {
    let mut extents = (0, 0);

    for slot in slots {
        let (x, y) = slot.start_cell;
        let (slot_width, slot_height) = match slot.direction {
            Direction::Across => (x.checked_add(slot.length), y.checked_add(1)),
            Direction::Down => (x.checked_add(1), y.checked_add(slot.length)),
        };
        let (Some(slot_width), Some(slot_height)) = (slot_width, slot_height) else {
            return Err(PuzzleError::GridTooLarge(slot.clone()));
        };

        extents = (extents.0.max(slot_width), extents.1.max(slot_height));
        if extents.0.checked_mul(extents.1).is_none() {
            return Err(PuzzleError::GridTooLarge(slot.clone()));
        }
    }

    Ok(extents)
}

/// Turn the given puzzle and (possibly partial) assignment into a rendered string.
#[must_use]
pub fn render_grid(puzzle: &Puzzle, vocabulary: &Vocabulary, assignment: &Assignment) -> String {
    let mut letters: HashMap<GridCoord, char> = HashMap::new();

    for (slot_id, word_id) in assignment.iter() {
        let word = &vocabulary.words[word_id];
        for (coord, &glyph) in puzzle.slot(slot_id).cell_coords().zip(&word.glyphs) {
            letters.insert(coord, vocabulary.glyphs[glyph]);
        }
    }

    (0..puzzle.height)
        .map(|y| {
            (0..puzzle.width)
                .map(|x| {
                    if puzzle.is_open((x, y)) {
                        letters.get(&(x, y)).copied().unwrap_or(EMPTY_CHAR)
                    } else {
                        BLOCK_CHAR
                    }
                })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
pub(crate) mod tests {
    use crate::assignment::Assignment;
    use crate::puzzle::{render_grid, Direction, Overlap, Puzzle, PuzzleError, Slot};
    use crate::vocabulary::Vocabulary;
    use std::path::PathBuf;

    pub fn resource_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("resources")
            .join(name)
    }

    pub fn across(x: usize, y: usize, length: usize) -> Slot {
        Slot {
            start_cell: (x, y),
            direction: Direction::Across,
            length,
        }
    }

    pub fn down(x: usize, y: usize, length: usize) -> Slot {
        Slot {
            start_cell: (x, y),
            direction: Direction::Down,
            length,
        }
    }

    #[test]
    fn test_template_slots_and_overlaps() {
        let puzzle = Puzzle::from_template_string(
            "
            #___#
            #_##_
            #_##_
            #_##_
            #____
            ",
        )
        .unwrap();

        assert_eq!((puzzle.width, puzzle.height), (5, 5));
        assert_eq!(
            puzzle.slots(),
            &[across(1, 0, 3), across(1, 4, 4), down(1, 0, 5), down(4, 1, 4)]
        );

        assert_eq!(
            puzzle.overlap(0, 2),
            Some(Overlap {
                cell_idx: 0,
                other_cell_idx: 0
            })
        );
        assert_eq!(
            puzzle.overlap(3, 1),
            Some(Overlap {
                cell_idx: 3,
                other_cell_idx: 3
            })
        );
        assert_eq!(puzzle.overlap(0, 1), None);
        assert_eq!(puzzle.overlap(0, 3), None);
        assert_eq!(puzzle.neighbors(2), &[0, 1]);

        for slot_id in 0..puzzle.slot_count() {
            for other_slot_id in 0..puzzle.slot_count() {
                assert_eq!(
                    puzzle.overlap(slot_id, other_slot_id),
                    puzzle
                        .overlap(other_slot_id, slot_id)
                        .map(Overlap::mirrored),
                );
            }
        }
    }

    #[test]
    fn test_template_pads_short_rows_and_skips_single_cells() {
        let puzzle = Puzzle::from_template_string("..\n.\n...").unwrap();

        assert_eq!((puzzle.width, puzzle.height), (3, 3));
        assert!(!puzzle.is_open((2, 0)));
        assert_eq!(
            puzzle.slots(),
            &[across(0, 0, 2), across(0, 2, 3), down(0, 0, 3)]
        );
    }

    #[test]
    fn test_template_errors() {
        assert_eq!(
            Puzzle::from_template_string("  \n\n").unwrap_err(),
            PuzzleError::EmptyTemplate
        );
        assert_eq!(
            Puzzle::from_template_string("__\n_x").unwrap_err(),
            PuzzleError::InvalidTemplateChar {
                ch: 'x',
                row: 1,
                column: 1
            }
        );
    }

    #[test]
    fn test_explicit_overlap_table() {
        let puzzle =
            Puzzle::new(vec![across(0, 0, 3), down(1, 0, 5)], [((1, 0), (0, 1))]).unwrap();

        assert_eq!(
            puzzle.overlap(0, 1),
            Some(Overlap {
                cell_idx: 1,
                other_cell_idx: 0
            })
        );
        assert_eq!(puzzle.neighbors(0), &[1]);
        assert_eq!(puzzle.neighbors(1), &[0]);
        assert_eq!((puzzle.width, puzzle.height), (3, 5));

        // Giving both directions is fine as long as they agree.
        assert!(Puzzle::new(
            vec![across(0, 0, 3), down(1, 0, 5)],
            [((0, 1), (1, 0)), ((1, 0), (0, 1))]
        )
        .is_ok());
    }

    #[test]
    fn test_slots_past_the_largest_grid_are_rejected() {
        assert_eq!(
            Puzzle::new(vec![across(usize::MAX - 1, 0, 3)], []).unwrap_err(),
            PuzzleError::GridTooLarge(across(usize::MAX - 1, 0, 3))
        );
        assert_eq!(
            Puzzle::from_slots(vec![down(0, usize::MAX, 2)]).unwrap_err(),
            PuzzleError::GridTooLarge(down(0, usize::MAX, 2))
        );

        // Each slot fits on its own, but not both together.
        assert_eq!(
            Puzzle::new(vec![across(0, 0, usize::MAX), down(0, 0, 3)], []).unwrap_err(),
            PuzzleError::GridTooLarge(down(0, 0, 3))
        );
    }

    #[test]
    fn test_far_away_slots_only_cost_their_cells() {
        let puzzle = Puzzle::new(
            vec![across(1_000_000, 1_000_000, 3), down(1_000_001, 999_999, 3)],
            [((0, 1), (1, 1))],
        )
        .unwrap();

        assert_eq!((puzzle.width, puzzle.height), (1_000_003, 1_000_002));
        assert!(puzzle.is_open((1_000_001, 1_000_000)));
        assert!(!puzzle.is_open((0, 0)));
        assert_eq!(puzzle.neighbors(0), &[1]);
    }

    #[test]
    fn test_malformed_puzzles_are_rejected() {
        assert_eq!(
            Puzzle::new(vec![across(0, 0, 0)], []).unwrap_err(),
            PuzzleError::ZeroLengthSlot(across(0, 0, 0))
        );
        assert_eq!(
            Puzzle::new(vec![across(0, 0, 3), across(0, 0, 3)], []).unwrap_err(),
            PuzzleError::DuplicateSlot(across(0, 0, 3))
        );
        assert_eq!(
            Puzzle::new(vec![across(0, 0, 3)], [((0, 1), (0, 0))]).unwrap_err(),
            PuzzleError::UnknownSlot(1)
        );
        assert_eq!(
            Puzzle::new(vec![across(0, 0, 3)], [((0, 0), (0, 0))]).unwrap_err(),
            PuzzleError::SelfOverlap(0)
        );
        assert_eq!(
            Puzzle::new(vec![across(0, 0, 3), down(1, 0, 5)], [((0, 1), (3, 0))]).unwrap_err(),
            PuzzleError::OverlapOutOfRange {
                slot_id: 0,
                cell_idx: 3,
                length: 3
            }
        );
        assert_eq!(
            Puzzle::new(
                vec![across(0, 0, 3), down(1, 0, 5)],
                [((0, 1), (1, 0)), ((1, 0), (2, 1))]
            )
            .unwrap_err(),
            PuzzleError::AsymmetricOverlap {
                slot_id: 1,
                other_slot_id: 0
            }
        );
    }

    #[test]
    fn test_parallel_slots_sharing_cells_are_rejected() {
        assert!(matches!(
            Puzzle::from_slots(vec![across(0, 0, 3), across(1, 0, 3)]),
            Err(PuzzleError::AsymmetricOverlap { .. })
        ));
        assert_eq!(
            Puzzle::from_slots(vec![across(0, 0, 3), down(1, 0, 3), down(1, 0, 2)]).unwrap_err(),
            PuzzleError::CellOverflow((1, 0))
        );
    }

    #[test]
    fn test_slot_keys() {
        assert_eq!(down(3, 4, 12).to_key(), "3,4,down,12");
        assert_eq!(Slot::from_key("1,2,across,5"), Ok(across(1, 2, 5)));
        assert_eq!(Slot::from_key(" 0, 7 ,down,2"), Ok(down(0, 7, 2)));
        assert_eq!(
            Slot::from_key("1,2,sideways,5"),
            Err(PuzzleError::InvalidSlotKey("1,2,sideways,5".into()))
        );
        assert!(Slot::from_key("1,2,across").is_err());
        assert!(Slot::from_key("1,2,across,5,6").is_err());
        assert!(Slot::from_key("-1,2,across,5").is_err());

        for slot in [across(0, 0, 3), down(14, 2, 21)] {
            assert_eq!(Slot::from_key(&slot.to_key()), Ok(slot.clone()));
            assert_eq!(slot.to_string(), slot.to_key());
        }
        assert_eq!(
            down(2, 5, 3).cell_coords().collect::<Vec<_>>(),
            vec![(2, 5), (2, 6), (2, 7)]
        );
    }

    #[test]
    fn test_slot_ordering_is_reading_order() {
        let mut slots = vec![down(0, 1, 3), across(2, 0, 3), down(0, 0, 4), across(0, 0, 4)];
        slots.sort();
        assert_eq!(
            slots,
            vec![across(0, 0, 4), down(0, 0, 4), across(2, 0, 3), down(0, 1, 3)]
        );
    }

    #[test]
    fn test_render_grid() {
        let puzzle = Puzzle::from_template_string("___\n_#_\n___").unwrap();
        let vocabulary = Vocabulary::new(["cat", "tap"]);
        let mut assignment = Assignment::new(puzzle.slot_count());

        assert_eq!(
            render_grid(&puzzle, &vocabulary, &assignment),
            "...\n.#.\n..."
        );

        assignment.assign(0, vocabulary.get_word_id("cat").unwrap());
        let slot_id = puzzle.slot_id(&down(2, 0, 3)).unwrap();
        assignment.assign(slot_id, vocabulary.get_word_id("tap").unwrap());

        assert_eq!(
            render_grid(&puzzle, &vocabulary, &assignment),
            "cat\n.#a\n..p"
        );
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use crate::puzzle::{Direction, Slot};

    #[test]
    fn test_slot_serialization() {
        let slot = Slot {
            start_cell: (1, 2),
            direction: Direction::Across,
            length: 5,
        };

        assert_eq!(serde_json::to_string(&slot).unwrap(), "\"1,2,across,5\"");
        assert_eq!(
            serde_json::to_string(&Direction::Down).unwrap(),
            "\"down\""
        );
    }

    #[test]
    fn test_slot_deserialization() {
        let slot: Slot = serde_json::from_str("\"3,4,down,12\"").unwrap();

        assert_eq!(
            slot,
            Slot {
                start_cell: (3, 4),
                direction: Direction::Down,
                length: 12,
            }
        );
    }
}
