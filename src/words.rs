use color_eyre::{
    eyre::{bail, eyre},
    Report, Result,
};
use rand::Rng;
use std::fmt::{self, Debug, Display, Write};

/// A single guessable letter, `A` through `Z`.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct Letter(u8);

impl Letter {
    pub const fn new(letter: char) -> Self {
        if !letter.is_ascii_uppercase() {
            panic!("letter out of range");
        }
        Self((letter as u8) - b'A')
    }

    /// Normalizes keyboard input: any ASCII letter, either case.
    pub fn from_key(ch: char) -> Option<Self> {
        ch.is_ascii_alphabetic()
            .then(|| Self((ch.to_ascii_uppercase() as u8) - b'A'))
    }
}

impl TryFrom<char> for Letter {
    type Error = Report;

    fn try_from(value: char) -> Result<Self> {
        if !value.is_ascii_uppercase() {
            bail!("invalid letter range: {value}")
        }
        Ok(Self(value as u8 - b'A'))
    }
}

impl Debug for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Letter").field(&char::from(*self)).finish()
    }
}

impl Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_char(char::from(*self))
    }
}

impl From<Letter> for char {
    fn from(value: Letter) -> Self {
        (value.0 + b'A') as char
    }
}

#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub struct LetterSet(u32);

impl LetterSet {
    pub const EMPTY: LetterSet = LetterSet(0);

    pub fn contains(self, letter: Letter) -> bool {
        self.0 & (1 << letter.0) != 0
    }

    pub fn insert(&mut self, letter: Letter) -> bool {
        let old = self.0;
        let new = old | (1 << letter.0);
        self.0 = new;
        old != new
    }

    #[cfg(test)]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[cfg(test)]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_superset(self, other: LetterSet) -> bool {
        self.0 & other.0 == other.0
    }
}

impl Debug for LetterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.into_iter().map(char::from))
            .finish()
    }
}

impl<const N: usize> From<[Letter; N]> for LetterSet {
    fn from(values: [Letter; N]) -> Self {
        values.into_iter().collect()
    }
}

impl FromIterator<Letter> for LetterSet {
    fn from_iter<T: IntoIterator<Item = Letter>>(iter: T) -> Self {
        let mut value = 0;
        for letter in iter {
            value |= 1 << letter.0;
        }
        Self(value)
    }
}

impl IntoIterator for LetterSet {
    type Item = Letter;

    type IntoIter = LetterSetIter;

    fn into_iter(self) -> Self::IntoIter {
        LetterSetIter(self.0)
    }
}

pub struct LetterSetIter(u32);

impl Iterator for LetterSetIter {
    type Item = Letter;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.0.trailing_zeros();
        if next < 26 {
            self.0 &= !(1 << next);
            Some(Letter(next as u8))
        } else {
            None
        }
    }
}

/// A non-empty sequence of uppercase letters.
#[derive(PartialEq, Eq, Clone)]
pub struct Word {
    letters: Box<[Letter]>,
    distinct: LetterSet,
}

impl Word {
    pub fn letters(&self) -> &[Letter] {
        &self.letters
    }

    pub fn contains(&self, letter: Letter) -> bool {
        self.distinct.contains(letter)
    }

    /// True once every letter of the word is in `guessed`.
    pub fn is_revealed_by(&self, guessed: LetterSet) -> bool {
        guessed.is_superset(self.distinct)
    }
}

impl Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Word").field(&self.to_string()).finish()
    }
}

impl Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.letters.iter().try_for_each(|l| write!(f, "{l}"))
    }
}

impl TryFrom<&str> for Word {
    type Error = Report;

    fn try_from(value: &str) -> Result<Self> {
        let letters = value
            .chars()
            .map(Letter::try_from)
            .collect::<Result<Box<[_]>>>()?;
        if letters.is_empty() {
            return Err(eyre!("words must not be empty"));
        }
        let distinct = letters.iter().copied().collect();
        Ok(Word { letters, distinct })
    }
}

const BUILTIN: [&str; 30] = [
    "MICROSERVICES",
    "AUTHENTICATION",
    "CONTAINERIZATION",
    "VIRTUALIZATION",
    "INFRASTRUCTURE",
    "DEPENDENCY",
    "POLYMORPHISM",
    "REFACTORING",
    "SERIALIZATION",
    "ASYNCHRONOUS",
    "ORCHESTRATION",
    "DISTRIBUTED",
    "RECURSION",
    "ENCRYPTION",
    "ARCHITECTURE",
    "MIDDLEWARE",
    "CONCURRENCY",
    "SCALABILITY",
    "OPTIMIZATION",
    "DEPLOYMENT",
    "VERSIONING",
    "COMPILATION",
    "ABSTRACTION",
    "INTEGRATION",
    "PERSISTENCE",
    "DEDUPLICATION",
    "PARALLELISM",
    "IDEMPOTENT",
    "BLOCKCHAIN",
    "AUGMENTATION",
];

const FALLBACK: &str = "RECURSION";

/// Candidate words for a session.
#[derive(Clone, Debug)]
pub struct WordBank {
    words: Vec<Word>,
}

impl WordBank {
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN
                .iter()
                .map(|&w| w.try_into().expect("incorrect word in built-in bank")),
        )
    }

    pub fn new(words: impl IntoIterator<Item = Word>) -> Self {
        Self {
            words: words.into_iter().collect(),
        }
    }

    #[cfg(test)]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Picks a word uniformly at random.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Word> {
        if self.words.is_empty() {
            bail!("word bank is empty");
        }
        let index = rng.gen_range(0..self.words.len());
        self.words
            .get(index)
            .cloned()
            .ok_or_else(|| eyre!("word index {index} out of range"))
    }

    /// The word used when selection fails.
    pub fn fallback() -> Word {
        FALLBACK
            .try_into()
            .expect("fallback word should be valid")
    }
}

impl Default for WordBank {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_builtin_bank() {
        let bank = WordBank::builtin();

        assert_eq!(bank.words().len(), 30);
        assert!(bank.words().iter().all(|w| !w.letters().is_empty()));
    }

    #[test]
    fn test_letter_from_key() {
        assert_eq!(Letter::from_key('q'), Some(Letter::new('Q')));
        assert_eq!(Letter::from_key('Q'), Some(Letter::new('Q')));
        assert_eq!(Letter::from_key('1'), None);
        assert_eq!(Letter::from_key('é'), None);
        assert!(Letter::try_from('a').is_err());
    }

    #[test]
    fn test_word_parsing() {
        let word: Word = "CACHE".try_into().unwrap();
        assert_eq!(word.letters().len(), 5);
        assert_eq!(word.to_string(), "CACHE");
        assert!(word.contains(Letter::new('H')));
        assert!(!word.contains(Letter::new('Q')));

        assert!(Word::try_from("").is_err());
        assert!(Word::try_from("cache").is_err());
        assert!(Word::try_from("CA CHE").is_err());
    }

    #[test]
    fn test_revealed() {
        let word: Word = "CACHE".try_into().unwrap();
        let mut guessed = LetterSet::from([Letter::new('C'), Letter::new('A'), Letter::new('H')]);
        assert!(!word.is_revealed_by(guessed));
        guessed.insert(Letter::new('Z'));
        assert!(!word.is_revealed_by(guessed));
        guessed.insert(Letter::new('E'));
        assert!(word.is_revealed_by(guessed));
    }

    #[test]
    fn test_letter_set() {
        let mut set = LetterSet::EMPTY;
        assert!(set.is_empty());
        assert!(set.insert(Letter::new('B')));
        assert!(!set.insert(Letter::new('B')));
        assert!(set.insert(Letter::new('A')));
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.into_iter().collect::<Vec<_>>(),
            [Letter::new('A'), Letter::new('B')]
        );
    }

    #[test]
    fn test_choose() {
        let mut rng = StdRng::seed_from_u64(7);
        let bank = WordBank::builtin();
        for _ in 0..50 {
            let word = bank.choose(&mut rng).unwrap();
            assert!(bank.words().contains(&word));
        }

        let empty = WordBank::new([]);
        assert!(empty.choose(&mut rng).is_err());
        assert_eq!(WordBank::fallback().to_string(), "RECURSION");
    }
}
