use rand::Rng;

/// RandMode controls how the generator is seeded. Predictable for tests and
/// replayable sessions, random for normal play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandMode {
    Predictable,
    RandomUniform,
}

/// Linear congruential generator shared by every platform port, so a fixed
/// seed reproduces the same game on any host.
#[derive(Debug, Clone)]
pub struct MsRand {
    seed: u32,
    rand_mode: RandMode,
}

impl MsRand {
    pub fn new_uniform() -> MsRand {
        MsRand {
            seed: rand::thread_rng().gen(),
            rand_mode: RandMode::RandomUniform,
        }
    }

    pub fn new_predictable(seed: u32) -> MsRand {
        MsRand {
            seed,
            rand_mode: RandMode::Predictable,
        }
    }

    pub fn mode(&self) -> RandMode {
        self.rand_mode
    }

    /// next_value advances the seed and returns it masked to 31 bits
    pub fn next_value(&mut self) -> u32 {
        self.seed = self.seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        self.seed & 0x7fff_ffff
    }
}
