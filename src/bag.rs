//! 7-bag randomizer for piece generation
//!
//! All 7 pieces are shuffled and dealt out before reshuffling, so every
//! kind appears exactly once per 7 draws measured from a bag boundary and
//! no kind is absent for more than 12 consecutive pieces.

use crate::tetromino::TetrominoType;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// The 7-bag piece randomizer
#[derive(Debug, Clone)]
pub struct Bag {
    queue: Vec<TetrominoType>,
    rng: ChaCha8Rng,
}

impl Bag {
    /// Create a new bag with a random seed
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create a new bag with a fixed seed (for reproducible games/tests)
    pub fn with_seed(seed: u64) -> Self {
        Self {
            queue: Vec::with_capacity(7),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Draw the next piece, refilling the bag when it runs empty
    pub fn draw(&mut self) -> TetrominoType {
        if self.queue.is_empty() {
            self.refill();
        }
        self.queue.remove(0)
    }

    /// Append a fresh shuffled permutation of all 7 kinds
    fn refill(&mut self) {
        let mut permutation = TetrominoType::all().to_vec();
        permutation.shuffle(&mut self.rng);
        self.queue.extend(permutation);
    }
}

impl Default for Bag {
    fn default() -> Self {
        Self::new()
    }
}
