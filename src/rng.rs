//! Deterministic random number generation.
//!
//! All randomness in a game (deck shuffles, ambassador pool draws) flows
//! through a single [`GameRng`] owned by the game state. The generator is
//! seeded, and its position is captured in every snapshot, so replaying the
//! same commands against the same snapshot always produces the same shuffles.
//!
//! ## Persistence
//!
//! ChaCha lets us read and restore the stream position cheaply, so the
//! snapshot stores `{seed, word_pos}` rather than the full generator state.
//! [`GameRng`] serializes through [`GameRngState`] for exactly this reason.

use rand::distributions::uniform::{SampleRange, SampleUniform};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic RNG for game state.
///
/// Wraps ChaCha8 with a recorded seed so the stream can be checkpointed into
/// a snapshot and resumed later.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "GameRngState", into = "GameRngState")]
pub struct GameRng {
    rng: ChaCha8Rng,
    seed: u64,
}

/// Serializable checkpoint of a [`GameRng`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// The seed the generator was created with.
    pub seed: u64,
    /// Position within the ChaCha stream.
    pub word_pos: u128,
}

impl GameRng {
    /// Create a new RNG from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        GameRng {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this generator was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Capture the current stream position for a snapshot.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.rng.get_word_pos(),
        }
    }

    /// Restore a generator from a snapshot checkpoint.
    #[must_use]
    pub fn from_state(state: GameRngState) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(state.seed);
        rng.set_word_pos(state.word_pos);
        GameRng { rng, seed: state.seed }
    }

    /// Generate a value in the given range.
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: SampleUniform,
        R: SampleRange<T>,
    {
        self.rng.gen_range(range)
    }

    /// Shuffle a slice in place (Fisher-Yates).
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        use rand::seq::SliceRandom;
        slice.shuffle(&mut self.rng);
    }

    /// Choose a random element from a slice.
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.rng)
    }
}

impl PartialEq for GameRng {
    fn eq(&self, other: &Self) -> bool {
        self.state() == other.state()
    }
}

impl From<GameRng> for GameRngState {
    fn from(rng: GameRng) -> Self {
        rng.state()
    }
}

impl From<GameRngState> for GameRng {
    fn from(state: GameRngState) -> Self {
        GameRng::from_state(state)
    }
}
