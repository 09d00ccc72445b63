use crate::fifo::Word;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Seeded stimulus source; the same seed always yields the same words.
pub struct Stimulus {
    rng: StdRng,
    ceil: u64,
}

impl Stimulus {
    pub fn new(seed: u64, width: u32) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ceil: 1 << width.min(32),
        }
    }

    /// Uniform word in `0..2^width`.
    #[inline]
    pub fn word(&mut self) -> Word {
        self.rng.gen_range(0..self.ceil) as Word
    }

    #[inline]
    pub fn words(&mut self, n: usize) -> Vec<Word> {
        (0..n).map(|_| self.word()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_words() {
        let a = Stimulus::new(7, 8).words(32);
        let b = Stimulus::new(7, 8).words(32);
        assert_eq!(a, b);
        assert!(a.iter().all(|&w| w < 256));
    }
}
