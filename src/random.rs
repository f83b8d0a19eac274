use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// Randomness used by the engines: reflex delays, timing targets and grid
/// layouts all go through this so tests can pin them.
pub trait RandomSource {
    /// Uniform value in `[low, high)`. Returns `low` when the range is empty.
    fn next_in_range(&mut self, low: u64, high: u64) -> u64;

    fn shuffle(&mut self, cells: &mut [u8]);
}

/// Default source backed by `StdRng`
#[derive(Debug, Clone)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible stream, handy for demos and property-style tests
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for StdRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for StdRandom {
    fn next_in_range(&mut self, low: u64, high: u64) -> u64 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..high)
    }

    fn shuffle(&mut self, cells: &mut [u8]) {
        cells.shuffle(&mut self.rng);
    }
}

/// Replays queued values in order.
///
/// Values outside the requested range are clamped into it; once the queue
/// runs dry the low bound is returned. Shuffles leave the slice untouched
/// unless a layout was queued with [`ScriptedRandom::with_layout`].
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    values: VecDeque<u64>,
    layouts: VecDeque<Vec<u8>>,
}

impl ScriptedRandom {
    pub fn new<I: IntoIterator<Item = u64>>(values: I) -> Self {
        Self {
            values: values.into_iter().collect(),
            layouts: VecDeque::new(),
        }
    }

    pub fn push(&mut self, value: u64) {
        self.values.push_back(value);
    }

    pub fn with_layout(mut self, layout: Vec<u8>) -> Self {
        self.layouts.push_back(layout);
        self
    }
}

impl RandomSource for ScriptedRandom {
    fn next_in_range(&mut self, low: u64, high: u64) -> u64 {
        let upper = high.saturating_sub(1).max(low);
        self.values
            .pop_front()
            .map_or(low, |v| v.clamp(low, upper))
    }

    fn shuffle(&mut self, cells: &mut [u8]) {
        if let Some(layout) = self.layouts.pop_front() {
            if layout.len() == cells.len() {
                cells.copy_from_slice(&layout);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_random_stays_in_range() {
        let mut rng = StdRandom::seeded(7);
        for _ in 0..1_000 {
            let v = rng.next_in_range(2_000, 5_000);
            assert!((2_000..5_000).contains(&v));
        }
    }

    #[test]
    fn std_random_empty_range_returns_low() {
        let mut rng = StdRandom::seeded(1);
        assert_eq!(rng.next_in_range(10, 10), 10);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = StdRandom::seeded(42);
        let mut cells: Vec<u8> = (1..=25).collect();
        rng.shuffle(&mut cells);
        let mut sorted = cells.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (1..=25).collect::<Vec<u8>>());
    }

    #[test]
    fn scripted_values_are_clamped() {
        let mut rng = ScriptedRandom::new([3_000, 9_999, 1]);
        assert_eq!(rng.next_in_range(2_000, 5_000), 3_000);
        assert_eq!(rng.next_in_range(2_000, 5_000), 4_999);
        assert_eq!(rng.next_in_range(2_000, 5_000), 2_000);
        // exhausted
        assert_eq!(rng.next_in_range(5, 16), 5);
    }

    #[test]
    fn scripted_layout_applies_once() {
        let layout: Vec<u8> = (1..=4).rev().collect();
        let mut rng = ScriptedRandom::default().with_layout(layout.clone());

        let mut cells = vec![1, 2, 3, 4];
        rng.shuffle(&mut cells);
        assert_eq!(cells, layout);

        let mut again = vec![1, 2, 3, 4];
        rng.shuffle(&mut again);
        assert_eq!(again, vec![1, 2, 3, 4]);
    }
}
