//! Word source for race passages
//!
//! Loads a JSON word list (`{"words": [...]}`) and draws random passages
//! from it without replacement.

use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use rand::Rng;
use serde::Deserialize;

use crate::error::WordListError;

/// Words per race passage
pub const DEFAULT_WORD_COUNT: usize = 15;

#[derive(Debug, Clone, Deserialize)]
pub struct WordList {
    words: Vec<String>,
}

impl WordList {
    pub fn new(words: Vec<String>) -> Result<Self, WordListError> {
        if words.is_empty() {
            return Err(WordListError::Empty);
        }
        Ok(Self { words })
    }

    /// Load a word list from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WordListError> {
        let reader = BufReader::new(File::open(path)?);
        let list: WordList = serde_json::from_reader(reader)?;
        Self::new(list.words)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Pick `count` words at distinct positions, in draw order
    ///
    /// Draws a uniform index and redraws on collision, so `count` must not
    /// exceed the list length.
    pub fn pick_random<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<String>, WordListError> {
        if count > self.words.len() {
            return Err(WordListError::NotEnoughWords {
                requested: count,
                available: self.words.len(),
            });
        }

        let mut chosen = HashSet::with_capacity(count);
        let mut picked = Vec::with_capacity(count);
        while picked.len() < count {
            let index = rng.gen_range(0..self.words.len());
            if chosen.insert(index) {
                picked.push(self.words[index].clone());
            }
        }

        Ok(picked)
    }

    /// A space-separated passage of `count` random words
    pub fn sentence<R: Rng + ?Sized>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<String, WordListError> {
        Ok(self.pick_random(count, rng)?.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;

    fn words(n: usize) -> WordList {
        WordList::new((0..n).map(|i| format!("w{}", i)).collect()).unwrap()
    }

    #[test]
    fn test_pick_random_is_distinct() {
        let list = words(20);
        let mut rng = StdRng::seed_from_u64(7);

        let picked = list.pick_random(15, &mut rng).unwrap();

        assert_eq!(picked.len(), 15);
        let unique: HashSet<_> = picked.iter().collect();
        assert_eq!(unique.len(), 15);
        assert!(picked.iter().all(|w| list.words().contains(w)));
    }

    #[test]
    fn test_pick_whole_list() {
        let list = words(5);
        let mut rng = StdRng::seed_from_u64(1);

        let mut picked = list.pick_random(5, &mut rng).unwrap();
        picked.sort();

        assert_eq!(picked, ["w0", "w1", "w2", "w3", "w4"]);
    }

    #[test]
    fn test_pick_more_than_available() {
        let list = words(3);
        let mut rng = StdRng::seed_from_u64(1);

        assert!(matches!(
            list.pick_random(4, &mut rng),
            Err(WordListError::NotEnoughWords {
                requested: 4,
                available: 3
            })
        ));
    }

    #[test]
    fn test_sentence() {
        let list = words(10);
        let mut rng = StdRng::seed_from_u64(3);

        let sentence = list.sentence(4, &mut rng).unwrap();

        assert_eq!(sentence.split(' ').count(), 4);
    }

    #[test]
    fn test_empty_list_is_rejected() {
        assert!(matches!(WordList::new(Vec::new()), Err(WordListError::Empty)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"words": ["alpha", "beta", "gamma"]}}"#).unwrap();

        let list = WordList::load(file.path()).unwrap();

        assert_eq!(list.len(), 3);
        assert_eq!(list.words(), ["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_load_invalid_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(matches!(
            WordList::load(file.path()),
            Err(WordListError::Json(_))
        ));
    }
}
