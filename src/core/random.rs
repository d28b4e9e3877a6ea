//! Injectable randomness for alert and metrics generation.
//!
//! Production code hands in a `rand` generator; tests hand in a scripted
//! source so generated content can be asserted exactly.

use rand::Rng;

pub trait RandomSource {
    /// True with the given probability (clamped to `0.0..=1.0`, NaN is never).
    fn chance(&mut self, probability: f64) -> bool;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize;

    /// Uniform integer in `low..high`. Returns `low` when the range is empty.
    fn range(&mut self, low: u32, high: u32) -> u32;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn chance(&mut self, probability: f64) -> bool {
        if probability.is_nan() {
            return false;
        }
        self.gen_bool(probability.clamp(0.0, 1.0))
    }

    fn pick(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }

    fn range(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        self.gen_range(low..high)
    }
}

/// Deterministic source replaying fixed answers, for tests.
#[cfg(test)]
pub(crate) struct ScriptedSource {
    chances: std::collections::VecDeque<bool>,
    picks: std::collections::VecDeque<usize>,
    ranges: std::collections::VecDeque<u32>,
}

#[cfg(test)]
impl ScriptedSource {
    pub(crate) fn new() -> Self {
        Self {
            chances: Default::default(),
            picks: Default::default(),
            ranges: Default::default(),
        }
    }

    pub(crate) fn with_chances(mut self, chances: &[bool]) -> Self {
        self.chances.extend(chances);
        self
    }

    pub(crate) fn with_picks(mut self, picks: &[usize]) -> Self {
        self.picks.extend(picks);
        self
    }

    /// Offsets added to `low`; missing entries yield `low`.
    pub(crate) fn with_ranges(mut self, offsets: &[u32]) -> Self {
        self.ranges.extend(offsets);
        self
    }
}

#[cfg(test)]
impl RandomSource for ScriptedSource {
    fn chance(&mut self, _probability: f64) -> bool {
        self.chances.pop_front().unwrap_or(false)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.picks.pop_front().unwrap_or(0) % len
    }

    fn range(&mut self, low: u32, high: u32) -> u32 {
        let offset = self.ranges.pop_front().unwrap_or(0);
        low + offset.min(high.saturating_sub(low).saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_rng_source_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert!(rng.pick(3) < 3);
            let v = rng.range(200, 300);
            assert!((200..300).contains(&v));
        }
        assert_eq!(rng.range(5, 5), 5);
    }

    #[test]
    fn test_rng_source_extreme_probabilities() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(rng.chance(1.0));
        assert!(!rng.chance(0.0));
        assert!(rng.chance(7.5)); // clamped
    }

    #[test]
    fn test_scripted_source_replays() {
        let mut src = ScriptedSource::new()
            .with_chances(&[true, false])
            .with_picks(&[2, 4])
            .with_ranges(&[10]);
        assert!(src.chance(0.3));
        assert!(!src.chance(0.3));
        assert!(!src.chance(0.3)); // exhausted
        assert_eq!(src.pick(3), 2);
        assert_eq!(src.pick(3), 1);
        assert_eq!(src.range(200, 300), 210);
        assert_eq!(src.range(200, 300), 200);
    }
}
