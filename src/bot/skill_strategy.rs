use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::iter::FusedIterator;
use std::sync::Mutex;
use tracing::trace;

use super::board::{dispersion_mm, throw_at};
use super::checkout::choose_target;
use super::types::{BotStrategy, SkillLevel};
use crate::game::{evaluate_dart, DartVerdict, Game, InMode, OutMode, Score, DARTS_PER_TURN};

/// Aims with the checkout planner and throws with skill-scaled Gaussian scatter
pub struct SkillBasedStrategy {
    rng: Mutex<StdRng>,
}

impl SkillBasedStrategy {
    /// `Some(seed)` gives reproducible turns, `None` seeds from the OS
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn next_turn_seed(&self) -> u64 {
        // A poisoned lock still holds a usable rng
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.random()
    }
}

impl Default for SkillBasedStrategy {
    fn default() -> Self {
        Self::new(None)
    }
}

impl BotStrategy for SkillBasedStrategy {
    fn plan_turn(&self, game: &Game, skill: SkillLevel) -> Option<BotTurn> {
        let player = game.current_player()?;
        Some(BotTurn {
            remaining: player.current_score,
            has_opened: player.has_opened,
            darts_left: DARTS_PER_TURN.saturating_sub(game.darts_in_turn()),
            in_mode: game.in_mode(),
            out_mode: game.out_mode(),
            sigma: dispersion_mm(skill),
            rng: StdRng::seed_from_u64(self.next_turn_seed()),
            finished: false,
        })
    }

    fn strategy_name(&self) -> &'static str {
        "SkillBasedStrategy"
    }
}

/// The darts of one simulated turn, produced lazily.
///
/// Stops after the last dart of the turn, a bust, or a checkout.
#[derive(Debug)]
pub struct BotTurn {
    remaining: u32,
    has_opened: bool,
    darts_left: u8,
    in_mode: InMode,
    out_mode: OutMode,
    sigma: f64,
    rng: StdRng,
    finished: bool,
}

impl BotTurn {
    pub fn darts_left(&self) -> u8 {
        if self.finished {
            0
        } else {
            self.darts_left
        }
    }
}

impl Iterator for BotTurn {
    type Item = Score;

    fn next(&mut self) -> Option<Score> {
        if self.finished || self.darts_left == 0 {
            return None;
        }

        let aim = choose_target(
            self.remaining,
            self.darts_left,
            self.has_opened,
            self.in_mode,
            self.out_mode,
        );
        let landed = throw_at(&aim, self.sigma, &mut self.rng);
        self.darts_left -= 1;

        match evaluate_dart(
            self.remaining,
            self.has_opened,
            &landed,
            self.in_mode,
            self.out_mode,
        ) {
            DartVerdict::NotOpened => {}
            DartVerdict::Scored { remaining } => {
                self.has_opened = true;
                self.remaining = remaining;
            }
            DartVerdict::Bust | DartVerdict::Checkout => self.finished = true,
        }

        trace!(aim = %aim, landed = %landed, remaining = self.remaining, "Bot dart");
        Some(landed)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = usize::from(self.darts_left());
        (left.min(1), Some(left))
    }
}

impl FusedIterator for BotTurn {}
