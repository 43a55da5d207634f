//! The vocabulary is the set of candidate words available for filling a puzzle. Words are
//! normalized and interned so that the rest of the solver can refer to them (and their letters) by
//! integer id.

use smallvec::SmallVec;
use std::collections::HashMap;
use std::path::Path;
use std::{fmt, fs};
use unicode_normalization::UnicodeNormalization;

use crate::types::{GlyphId, WordId};
use crate::MAX_SLOT_LENGTH;

/// A struct representing a word in the vocabulary.
#[derive(Debug, Clone)]
pub struct Word {
    /// The word as it would appear in a grid.
    pub normalized_string: String,

    /// The glyph ids making up `normalized_string`.
    pub glyphs: SmallVec<[GlyphId; MAX_SLOT_LENGTH]>,
}

impl Word {
    /// How many cells does this word occupy?
    #[must_use]
    pub fn length(&self) -> usize {
        self.glyphs.len()
    }
}

/// Turn a word as it appears in a word list into the form that gets placed in the grid.
#[must_use]
pub fn normalize_word(raw: &str) -> String {
    raw
        .to_lowercase()
        .nfc() // Normalize Unicode combining forms
        .filter(|c| !c.is_whitespace())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VocabularyError {
    InvalidPath(String),
    Empty,
}

impl fmt::Display for VocabularyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VocabularyError::InvalidPath(path) => write!(f, "Can’t read file: “{path}”"),
            VocabularyError::Empty => write!(f, "Word list is empty"),
        }
    }
}

impl std::error::Error for VocabularyError {}

/// An interned collection of distinct words.
#[derive(Clone, Default)]
pub struct Vocabulary {
    /// Every distinct char appearing in any word, indexed by `GlyphId`.
    pub glyphs: Vec<char>,
    glyph_id_by_char: HashMap<char, GlyphId>,

    /// Every distinct word, indexed by `WordId`, in the order they were first added.
    pub words: Vec<Word>,
    pub word_id_by_string: HashMap<String, WordId>,
}

impl Vocabulary {
    /// Build a vocabulary from words in memory. Words that normalize to an empty string are
    /// skipped, and words that normalize to the same string are merged.
    pub fn new<I, S>(words: I) -> Vocabulary
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocabulary = Vocabulary::default();
        for word in words {
            vocabulary.add_word(word.as_ref());
        }
        vocabulary
    }

    /// Build a vocabulary from the contents of a word list file: one word per line, optionally
    /// followed by `;` and a score (which is ignored). Blank lines and comment lines (starting with
    /// `//` or `#`) are skipped.
    pub fn from_file_contents(contents: &str) -> Result<Vocabulary, VocabularyError> {
        let vocabulary = Vocabulary::new(contents.lines().filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with("//") || line.starts_with('#') {
                None
            } else {
                line.split(';').next()
            }
        }));

        if vocabulary.is_empty() {
            Err(VocabularyError::Empty)
        } else {
            Ok(vocabulary)
        }
    }

    /// Build a vocabulary from a word list file on disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Vocabulary, VocabularyError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|_| VocabularyError::InvalidPath(path.to_string_lossy().into()))?;
        Vocabulary::from_file_contents(&contents)
    }

    /// Add a word if it isn't already present, returning its id (or `None` if it's empty once
    /// normalized).
    pub fn add_word(&mut self, raw: &str) -> Option<WordId> {
        let normalized = normalize_word(raw);
        if normalized.is_empty() {
            return None;
        }

        if let Some(&word_id) = self.word_id_by_string.get(&normalized) {
            return Some(word_id);
        }

        let glyphs = normalized
            .chars()
            .map(|ch| self.glyph_id_for_char(ch))
            .collect();

        let word_id = self.words.len();
        self.words.push(Word {
            normalized_string: normalized.clone(),
            glyphs,
        });
        self.word_id_by_string.insert(normalized, word_id);

        Some(word_id)
    }

    /// What's the unique glyph id for the given char? We do this lazily, instead of just mapping
    /// every letter up front, because entries may also contain numbers, non-English letters, or
    /// punctuation.
    pub fn glyph_id_for_char(&mut self, ch: char) -> GlyphId {
        self.glyph_id_by_char.get(&ch).copied().unwrap_or_else(|| {
            self.glyphs.push(ch);
            let id = self.glyphs.len() - 1;
            self.glyph_id_by_char.insert(ch, id);
            id
        })
    }

    /// Look up a word's id, normalizing it first.
    #[must_use]
    pub fn get_word_id(&self, word: &str) -> Option<WordId> {
        self.word_id_by_string.get(&normalize_word(word)).copied()
    }

    #[must_use]
    pub fn word_string(&self, word_id: WordId) -> &str {
        &self.words[word_id].normalized_string
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl fmt::Debug for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vocabulary")
            .field("glyphs", &self.glyphs)
            .field("words", &self.words.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use crate::puzzle::tests::resource_path;
    use crate::vocabulary::{Vocabulary, VocabularyError};

    #[test]
    fn test_words_are_normalized_and_deduplicated() {
        let vocabulary = Vocabulary::new(["Cat", "cat ", "ice cream", "", "  ", "dog"]);

        assert_eq!(vocabulary.len(), 3);
        assert_eq!(vocabulary.word_string(0), "cat");
        assert_eq!(vocabulary.word_string(1), "icecream");
        assert_eq!(vocabulary.words[1].length(), 8);
        assert_eq!(vocabulary.get_word_id("DOG"), Some(2));
        assert_eq!(vocabulary.get_word_id("bird"), None);

        // "c", "a", "t", "i", "e", "r", "m", "d", "o", "g"
        assert_eq!(vocabulary.glyphs.len(), 10);
        assert_eq!(
            vocabulary.words[0].glyphs.as_slice(),
            &[0, 1, 2],
            "glyphs are interned in order of appearance"
        );
    }

    #[test]
    #[allow(clippy::unicode_not_nfc)]
    fn test_unusual_characters() {
        let vocabulary = Vocabulary::new([
            // Non-English character expressed as one two-byte `char`
            "monsutâ",
            // Non-English character expressed as two chars w/ combining form
            "hélen",
        ]);

        assert_eq!(
            vocabulary
                .words
                .iter()
                .map(|word| word.length())
                .collect::<Vec<_>>(),
            vec![7, 5]
        );
    }

    #[test]
    fn test_file_contents() {
        let vocabulary = Vocabulary::from_file_contents(
            "// comment\n# tricks\nskate;50\n\n  ollie\nskate;40\n",
        )
        .unwrap();

        assert_eq!(vocabulary.len(), 2);
        assert_eq!(vocabulary.word_string(0), "skate");
        assert_eq!(vocabulary.word_string(1), "ollie");

        assert_eq!(
            Vocabulary::from_file_contents("\n// nothing here\n").unwrap_err(),
            VocabularyError::Empty
        );
    }

    #[test]
    fn test_from_file() {
        let vocabulary = Vocabulary::from_file(resource_path("words0.txt")).unwrap();
        assert_eq!(vocabulary.len(), 10);
        assert!(vocabulary.get_word_id("seven").is_some());

        assert!(matches!(
            Vocabulary::from_file(resource_path("missing.txt")),
            Err(VocabularyError::InvalidPath(_))
        ));
    }
}
