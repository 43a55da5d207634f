#![warn(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod arc_consistency;
pub mod assignment;
pub mod backtracking_search;
pub mod domains;
pub mod logging;
pub mod puzzle;
pub mod solver;
pub mod types;
pub mod util;
pub mod vocabulary;

pub use solver::{find_fill, solve};

pub const CHECK_INVARIANTS: bool = cfg!(feature = "check_invariants");

/// The expected maximum number of distinct characters appearing in a vocabulary.
pub const MAX_GLYPH_COUNT: usize = 64;

/// The expected maximum length for a single slot.
pub const MAX_SLOT_LENGTH: usize = 21;
