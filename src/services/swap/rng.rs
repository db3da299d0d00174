// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 ® John Hauger Mitander <john@mitander.dev>

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

/// Shared random source for pair order, recovery order and swap amounts.
pub struct SwapRng {
    inner: Mutex<StdRng>,
}

impl SwapRng {
    pub fn from_entropy() -> Self {
        Self {
            inner: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn shuffle<T>(&self, items: &mut [T]) {
        let mut rng = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        items.shuffle(&mut *rng);
    }

    /// Uniform draw in `lo..=hi`; `hi < lo` collapses to `lo`.
    pub fn between(&self, lo: u64, hi: u64) -> u64 {
        if hi <= lo {
            return lo;
        }
        let mut rng = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(lo..=hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_order() {
        let a = SwapRng::seeded(42);
        let b = SwapRng::seeded(42);
        let mut xs: Vec<u32> = (0..16).collect();
        let mut ys = xs.clone();
        a.shuffle(&mut xs);
        b.shuffle(&mut ys);
        assert_eq!(xs, ys);
    }

    #[test]
    fn between_stays_inclusive() {
        let rng = SwapRng::seeded(1);
        for _ in 0..1_000 {
            let v = rng.between(10, 12);
            assert!((10..=12).contains(&v));
        }
        assert_eq!(rng.between(9, 3), 9);
    }
}
