//! Cyclic sequence of impulse vectors used to push rooms apart.
//!
//! The base force `f = max(width, height) / 4` is combined with `f / 2` and
//! zero into every unordered pair (with repetition), giving six vectors that
//! repeat forever. Handing consecutive rooms different vectors keeps them
//! from all moving as one block.

use glam::Vec2;

use crate::constants::NUDGE_DIVISOR;

#[derive(Debug, Clone)]
pub struct NudgeCycle {
    forces: Vec<Vec2>,
    index: usize,
}

impl NudgeCycle {
    pub fn new(width: u32, height: u32) -> Self {
        let f = (width / NUDGE_DIVISOR).max(height / NUDGE_DIVISOR);
        let base = [0, f, f / 2];

        let mut forces = Vec::with_capacity(base.len() * (base.len() + 1) / 2);
        for (i, &a) in base.iter().enumerate() {
            for &b in &base[i..] {
                forces.push(Vec2::new(a as f32, b as f32));
            }
        }

        Self { forces, index: 0 }
    }

    /// Number of vectors before the sequence repeats.
    pub fn period(&self) -> usize {
        self.forces.len()
    }

    /// The next vector in the cycle.
    pub fn next_nudge(&mut self) -> Vec2 {
        let force = self.forces[self.index];
        self.index = (self.index + 1) % self.forces.len();
        force
    }

    /// The next vector, halved and rounded down.
    pub fn next_half_nudge(&mut self) -> Vec2 {
        (self.next_nudge() / 2.0).floor()
    }

    /// Start over from the first vector.
    pub fn restart(&mut self) {
        self.index = 0;
    }
}

impl Iterator for NudgeCycle {
    type Item = Vec2;

    fn next(&mut self) -> Option<Vec2> {
        Some(self.next_nudge())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_vectors_in_combination_order() {
        let cycle = NudgeCycle::new(1024, 512);
        let forces: Vec<Vec2> = cycle.take(6).collect();
        assert_eq!(
            forces,
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(0.0, 256.0),
                Vec2::new(0.0, 128.0),
                Vec2::new(256.0, 256.0),
                Vec2::new(256.0, 128.0),
                Vec2::new(128.0, 128.0),
            ]
        );
    }

    #[test]
    fn test_cycle_repeats_with_period() {
        let mut cycle = NudgeCycle::new(800, 600);
        let period = cycle.period();
        assert_eq!(period, 6);

        let first: Vec<Vec2> = (0..period * 3).map(|_| cycle.next_nudge()).collect();
        for n in 0..period * 2 {
            assert_eq!(first[n], first[n + period]);
        }
    }

    #[test]
    fn test_restart() {
        let mut cycle = NudgeCycle::new(100, 100);
        let a = cycle.next_nudge();
        cycle.next_nudge();
        cycle.next_nudge();
        cycle.restart();
        assert_eq!(cycle.next_nudge(), a);
    }

    #[test]
    fn test_half_nudge_rounds_down() {
        // f = 25, f / 2 = 12
        let mut cycle = NudgeCycle::new(100, 100);
        cycle.next_nudge();
        cycle.next_nudge();
        assert_eq!(cycle.next_half_nudge(), Vec2::new(0.0, 6.0));
        assert_eq!(cycle.next_half_nudge(), Vec2::new(12.0, 12.0));
    }
}
