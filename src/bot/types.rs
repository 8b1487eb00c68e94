use serde::{Deserialize, Serialize};

use super::skill_strategy::BotTurn;
use crate::game::Game;

pub const MAX_SKILL: u8 = 100;

/// How well a bot throws, from 0 (hits the board by accident) to 100 (near-perfect)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct SkillLevel(u8);

impl From<u8> for SkillLevel {
    fn from(value: u8) -> Self {
        SkillLevel::new(value)
    }
}

impl From<SkillLevel> for u8 {
    fn from(skill: SkillLevel) -> Self {
        skill.0
    }
}

impl SkillLevel {
    /// Values above 100 are clamped
    pub fn new(value: u8) -> Self {
        Self(value.min(MAX_SKILL))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Skill as a fraction in [0, 1]
    pub fn fraction(self) -> f64 {
        f64::from(self.0) / f64::from(MAX_SKILL)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BotDifficulty {
    Easy,
    Medium,
    Hard,
}

impl From<BotDifficulty> for SkillLevel {
    fn from(difficulty: BotDifficulty) -> Self {
        match difficulty {
            BotDifficulty::Easy => SkillLevel::new(25),
            BotDifficulty::Medium => SkillLevel::new(55),
            BotDifficulty::Hard => SkillLevel::new(85),
        }
    }
}

/// Trait for bot throwing strategies
pub trait BotStrategy: Send + Sync {
    /// Plans the rest of the current player's turn.
    /// Returns `None` if the game is not in progress.
    fn plan_turn(&self, game: &Game, skill: SkillLevel) -> Option<BotTurn>;

    /// Get the name of this strategy
    fn strategy_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_is_clamped() {
        assert_eq!(SkillLevel::new(150).value(), 100);
        assert_eq!(SkillLevel::new(0).fraction(), 0.0);
        assert_eq!(SkillLevel::new(100).fraction(), 1.0);
    }

    #[test]
    fn test_difficulty_maps_to_increasing_skill() {
        let easy = SkillLevel::from(BotDifficulty::Easy);
        let medium = SkillLevel::from(BotDifficulty::Medium);
        let hard = SkillLevel::from(BotDifficulty::Hard);
        assert!(easy < medium && medium < hard);
    }

    #[test]
    fn test_skill_deserialization_is_clamped() {
        let skill: SkillLevel = serde_json::from_str("250").unwrap();
        assert_eq!(skill.value(), 100);
        assert!(skill.fraction() <= 1.0);
        assert_eq!(serde_json::to_string(&SkillLevel::new(42)).unwrap(), "42");
    }

    #[test]
    fn test_difficulty_deserialization() {
        let difficulty: BotDifficulty = serde_json::from_str(r#""medium""#).unwrap();
        assert_eq!(difficulty, BotDifficulty::Medium);
    }
}
