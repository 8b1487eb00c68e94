//! Elo-like skill ratings and the matchmaking built on them.

pub mod matchmaking;
pub mod skill;

pub use matchmaking::{find_best_match, MatchCandidate, MatchmakingConfig};
pub use skill::SkillRating;
