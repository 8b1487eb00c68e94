use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, warn};

use super::skill::SkillRating;
use crate::shared::PlayerId;

/// Matchmaking tolerances
#[derive(Debug, Clone)]
pub struct MatchmakingConfig {
    /// Largest rating gap accepted between two fully certain players
    pub max_rating_diff: f64,
}

impl Default for MatchmakingConfig {
    fn default() -> Self {
        Self {
            max_rating_diff: 200.0,
        }
    }
}

impl MatchmakingConfig {
    /// Reads `DARTS_MATCH_MAX_DIFF`, falling back to the default
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(raw) = env::var("DARTS_MATCH_MAX_DIFF") {
            match raw.parse::<f64>() {
                Ok(value) if value >= 0.0 => config.max_rating_diff = value,
                _ => warn!(value = %raw, "Ignoring invalid DARTS_MATCH_MAX_DIFF"),
            }
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub player_id: PlayerId,
    pub rating: SkillRating,
}

/// Picks the acceptable opponent with the smallest rating gap.
/// The player itself is never matched; ties keep the earlier candidate.
pub fn find_best_match(
    player: &MatchCandidate,
    candidates: &[MatchCandidate],
    config: &MatchmakingConfig,
) -> Option<MatchCandidate> {
    let best = candidates
        .iter()
        .filter(|c| c.player_id != player.player_id)
        .filter(|c| {
            player
                .rating
                .is_good_match_with(&c.rating, config.max_rating_diff)
        })
        .fold(None::<&MatchCandidate>, |best, c| match best {
            Some(b) if gap(player, b) <= gap(player, c) => Some(b),
            _ => Some(c),
        })
        .copied();

    debug!(
        player_id = %player.player_id,
        candidates = candidates.len(),
        matched = ?best.map(|c| c.player_id),
        "Matchmaking"
    );
    best
}

fn gap(a: &MatchCandidate, b: &MatchCandidate) -> f64 {
    (a.rating.rating() - b.rating.rating()).abs()
}
