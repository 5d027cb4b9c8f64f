// ============================================================
// Layer 4 — Infinite Stream Sampler
// ============================================================
// Turns a dataset of N items into an endless index stream:
//
//   [perm #1 of 0..N] [perm #2 of 0..N] [perm #3 of 0..N] ...
//
// Each permutation is a fresh Fisher-Yates shuffle drawn from
// the sampler's own StdRng, so every index appears exactly once
// per cycle and cycles are independent of each other.
//
// The sampler is a cursor: `next_index` is the only way to move
// it, and it never ends. It also implements Iterator (always
// `Some`) so it can be fed to `take`, `zip`, etc.
//
// Reference: rand crate documentation (SliceRandom)

use std::path::Path;

use rand::{rngs::StdRng, seq::SliceRandom};

use crate::error::{PipelineError, PipelineResult};

#[derive(Debug)]
pub struct InfiniteSampler {
    order:  Vec<usize>,
    cursor: usize,
    cycles: u64,
    rng:    StdRng,
}

impl InfiniteSampler {
    /// `source` only names the dataset in the error for N = 0.
    pub fn new(len: usize, rng: StdRng, source: &Path) -> PipelineResult<Self> {
        if len == 0 {
            return Err(PipelineError::EmptyDataset(source.to_path_buf()));
        }
        let mut sampler = Self {
            order: (0..len).collect(),
            cursor: 0,
            cycles: 0,
            rng,
        };
        sampler.reshuffle();
        Ok(sampler)
    }

    /// Completed-or-started cycles, starting at 1.
    #[cfg(test)]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn next_index(&mut self) -> usize {
        if self.cursor == self.order.len() {
            self.reshuffle();
        }
        let index = self.order[self.cursor];
        self.cursor += 1;
        index
    }

    fn reshuffle(&mut self) {
        self.order.shuffle(&mut self.rng);
        self.cursor = 0;
        self.cycles += 1;
        tracing::trace!("Sampler cycle {} over {} items", self.cycles, self.order.len());
    }
}

impl Iterator for InfiniteSampler {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        Some(self.next_index())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::randomness::RandomnessContext;
    use rand::SeedableRng;

    fn sampler(len: usize, seed: u64) -> InfiniteSampler {
        InfiniteSampler::new(len, StdRng::seed_from_u64(seed), Path::new("mem")).unwrap()
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let err = InfiniteSampler::new(0, StdRng::seed_from_u64(0), Path::new("empty")).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyDataset(_)));
    }

    #[test]
    fn test_every_cycle_is_a_permutation() {
        let n = 7;
        let mut s = sampler(n, 3);
        for _ in 0..5 {
            let mut cycle: Vec<usize> = (0..n).map(|_| s.next_index()).collect();
            cycle.sort_unstable();
            assert_eq!(cycle, (0..n).collect::<Vec<_>>());
        }
        assert_eq!(s.cycles(), 5);
    }

    #[test]
    fn test_single_item_repeats_forever() {
        let mut s = sampler(1, 9);
        assert!(s.by_ref().take(100).all(|i| i == 0));
    }

    #[test]
    fn test_same_seed_identical_streams() {
        let mut ctx_a = RandomnessContext::new(1234);
        let mut ctx_b = RandomnessContext::new(1234);

        let mut streams_a: Vec<InfiniteSampler> = [5, 11]
            .iter()
            .map(|&n| InfiniteSampler::new(n, ctx_a.fork("s"), Path::new("a")).unwrap())
            .collect();
        let mut streams_b: Vec<InfiniteSampler> = [5, 11]
            .iter()
            .map(|&n| InfiniteSampler::new(n, ctx_b.fork("s"), Path::new("b")).unwrap())
            .collect();

        for (a, b) in streams_a.iter_mut().zip(streams_b.iter_mut()) {
            let xs: Vec<usize> = a.take(200).collect();
            let ys: Vec<usize> = b.take(200).collect();
            assert_eq!(xs, ys);
        }
    }

    #[test]
    fn test_cycles_are_redrawn() {
        // 40! orderings: two identical consecutive cycles would mean the
        // permutation is not being redrawn.
        let n = 40;
        let mut s = sampler(n, 5);
        let first: Vec<usize> = s.by_ref().take(n).collect();
        let second: Vec<usize> = s.by_ref().take(n).collect();
        assert_ne!(first, second);
    }
}
