//! Scripted random sources.
//!
//! Engines only ever read the random source through `next_u32` (rolls) and
//! `random_range` (picks), so a source that replays a fixed list of words
//! pins every branch of a tick exactly.

use rand::RngCore;

/// A random source that cycles through a fixed list of `u32` words.
///
/// `u32::MAX` is the highest possible roll and `0` the lowest; a zero word
/// also makes every `random_range` pick its first element.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    words: Vec<u32>,
    cursor: usize,
    draws: usize,
}

impl ScriptedRng {
    /// Cycle through `words`. An empty list behaves like `vec![0]`.
    #[must_use]
    pub fn new(words: Vec<u32>) -> Self {
        let words = if words.is_empty() { vec![0] } else { words };
        Self {
            words,
            cursor: 0,
            draws: 0,
        }
    }

    /// A source that always rolls the maximum.
    #[must_use]
    pub fn always_high() -> Self {
        Self::new(vec![u32::MAX])
    }

    /// A source that always rolls zero.
    #[must_use]
    pub fn always_low() -> Self {
        Self::new(vec![0])
    }

    /// Number of words handed out so far.
    #[must_use]
    pub fn draws(&self) -> usize {
        self.draws
    }

    fn next_word(&mut self) -> u32 {
        let word = self.words[self.cursor];
        self.cursor = (self.cursor + 1) % self.words.len();
        self.draws += 1;
        word
    }
}

impl RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        self.next_word()
    }

    fn next_u64(&mut self) -> u64 {
        let low = u64::from(self.next_word());
        let high = u64::from(self.next_word());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = self.next_word().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}
