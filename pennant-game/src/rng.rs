//! Seeded 32-bit sequence generator.
//!
//! Every random decision in a game flows through one [`SeededRandom`] owned by
//! that game. The generator keeps a single 32-bit state word and advances it
//! with one mix function per draw, so a seed fully determines the sequence.

use rand::{RngCore, SeedableRng};

const MIX_INCREMENT: u32 = 0x6D2B_79F5;
const FLOAT_SCALE: f64 = 4_294_967_296.0;

/// Deterministic generator producing floats, bounded integers, picks and shuffles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRandom {
    state: u32,
    draws: u64,
}

impl SeededRandom {
    /// Construct a generator from a 32-bit seed.
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self {
            state: seed,
            draws: 0,
        }
    }

    /// Reset the sequence as if freshly constructed with `seed`.
    pub const fn reseed(&mut self, seed: u32) {
        self.state = seed;
        self.draws = 0;
    }

    /// Number of draws taken since construction or the last reseed.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }

    fn mix(&mut self) -> u32 {
        self.draws = self.draws.saturating_add(1);
        self.state = self.state.wrapping_add(MIX_INCREMENT);
        let a = self.state;
        let mut t = (a ^ (a >> 15)).wrapping_mul(a | 1);
        t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61)) ^ t;
        t ^ (t >> 14)
    }

    /// Uniform float in `[0, 1)`.
    pub fn next_float(&mut self) -> f64 {
        f64::from(self.mix()) / FLOAT_SCALE
    }

    /// Uniform integer in `[min, max]`. Returns `min` when the range is empty.
    pub fn next_int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = i64::from(max) - i64::from(min) + 1;
        offset_by_fraction(min, span, self.next_float())
    }

    /// Uniform integer in `[min, max)`. Returns `min` when the range is empty.
    pub fn next_int_exclusive(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = i64::from(max) - i64::from(min);
        offset_by_fraction(min, span, self.next_float())
    }

    /// Uniform index in `[0, len)`; `0` for an empty range.
    pub fn next_index(&mut self, len: usize) -> usize {
        let upper = i32::try_from(len).unwrap_or(i32::MAX);
        usize::try_from(self.next_int_exclusive(0, upper)).unwrap_or(0)
    }

    /// Bernoulli trial succeeding with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_float() < p
    }

    /// Pick one element uniformly.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.next_index(items.len());
        items.get(index)
    }

    /// Pick one element with probability proportional to its weight.
    ///
    /// Non-positive and non-finite weights never win. Returns `None` when no
    /// weight is positive.
    pub fn weighted_pick<'a, T>(&mut self, items: &'a [(T, f64)]) -> Option<&'a T> {
        let total: f64 = items
            .iter()
            .map(|(_, weight)| sanitize_weight(*weight))
            .sum();
        if total <= 0.0 {
            return None;
        }
        let mut roll = self.next_float() * total;
        let mut last = None;
        for (item, weight) in items {
            let weight = sanitize_weight(*weight);
            if weight <= 0.0 {
                continue;
            }
            if roll < weight {
                return Some(item);
            }
            roll -= weight;
            last = Some(item);
        }
        last
    }

    /// Fisher-Yates shuffle returning a new vector; the input is untouched.
    pub fn shuffle<T: Clone>(&mut self, items: &[T]) -> Vec<T> {
        let mut out = items.to_vec();
        for i in (1..out.len()).rev() {
            let upper = i32::try_from(i).unwrap_or(i32::MAX);
            let j = usize::try_from(self.next_int(0, upper)).unwrap_or(0);
            out.swap(i, j);
        }
        out
    }
}

fn sanitize_weight(weight: f64) -> f64 {
    if weight.is_finite() && weight > 0.0 {
        weight
    } else {
        0.0
    }
}

fn offset_by_fraction(min: i32, span: i64, fraction: f64) -> i32 {
    let scaled = (fraction * crate::numbers::i64_to_f64(span)).floor();
    let offset = num_traits::cast::<f64, i64>(scaled)
        .unwrap_or(0)
        .clamp(0, span - 1);
    i32::try_from(i64::from(min) + offset).unwrap_or(min)
}

impl RngCore for SeededRandom {
    fn next_u32(&mut self) -> u32 {
        self.mix()
    }

    fn next_u64(&mut self) -> u64 {
        let high = u64::from(self.mix());
        let low = u64::from(self.mix());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.mix().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for SeededRandom {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}
