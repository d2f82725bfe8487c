//! Randomness adapter backed by `rand`

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::application::ports::outbound::DiceRollerPort;

/// Dice roller over a seedable RNG; a fixed seed replays the same faces
pub struct RandDiceRoller {
    rng: Mutex<StdRng>,
}

impl RandDiceRoller {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl DiceRollerPort for RandDiceRoller {
    fn roll_die(&self, faces: u32) -> u32 {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.gen_range(1..=faces.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faces_in_range() {
        let roller = RandDiceRoller::new(None);
        for _ in 0..200 {
            let face = roller.roll_die(6);
            assert!((1..=6).contains(&face));
        }
        assert_eq!(roller.roll_die(1), 1);
    }

    #[test]
    fn test_seed_replays() {
        let a = RandDiceRoller::new(Some(7));
        let b = RandDiceRoller::new(Some(7));
        let left: Vec<u32> = (0..10).map(|_| a.roll_die(20)).collect();
        let right: Vec<u32> = (0..10).map(|_| b.roll_die(20)).collect();
        assert_eq!(left, right);
    }
}
