/// Sine-hash generator: `frac(sin(counter) * 10000)` with a counter that starts
/// at the seed and advances by one per draw.
///
/// Statistically weak, but every value depends only on the seed and the number
/// of previous draws, which is what keeps compositions reproducible.
#[derive(Debug, Clone, PartialEq)]
pub struct SeededRng {
    seed: i64,
    counter: i64,
    draws: u64,
}

impl SeededRng {
    pub fn new(seed: i64) -> Self {
        Self {
            seed,
            counter: seed,
            draws: 0,
        }
    }

    pub fn reset(&mut self, seed: i64) {
        self.seed = seed;
        self.counter = seed;
        self.draws = 0;
    }

    pub fn seed(&self) -> i64 {
        self.seed
    }

    /// Number of values drawn since the last reset.
    pub fn draw_count(&self) -> u64 {
        self.draws
    }

    /// Next value in `[0, 1)`.
    pub fn next(&mut self) -> f64 {
        let x = (self.counter as f64).sin() * 10_000.0;
        self.counter = self.counter.wrapping_add(1);
        self.draws += 1;
        x - x.floor()
    }
}
