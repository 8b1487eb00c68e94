use serde::{Deserialize, Serialize};

use crate::rating::SkillRating;
use crate::shared::{GameId, PlayerId};

/// Lifetime aggregates for one player.
///
/// Only changes through [`PlayerStatistics::with_game`] and [`PlayerStatistics::with_180`],
/// so the totals are always a fold over completed games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatistics {
    total_games: u32,
    wins: u32,
    total_darts: u32,
    total_points: u32,
    count_180s: u32,
    highest_checkout: u32,
    best_3_dart_score: u32,
}

impl PlayerStatistics {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_game(
        self,
        is_win: bool,
        darts_thrown: u32,
        points_scored: u32,
        checkout_score: Option<u32>,
    ) -> Self {
        let mut best_3_dart_score = self.best_3_dart_score;
        if darts_thrown >= 3 && points_scored > 0 {
            let turn_average =
                (f64::from(points_scored) / f64::from(darts_thrown) * 3.0).round() as u32;
            best_3_dart_score = best_3_dart_score.max(turn_average);
        }

        Self {
            total_games: self.total_games + 1,
            wins: self.wins + u32::from(is_win),
            total_darts: self.total_darts + darts_thrown,
            total_points: self.total_points + points_scored,
            count_180s: self.count_180s,
            highest_checkout: checkout_score.map_or(self.highest_checkout, |c| {
                self.highest_checkout.max(c)
            }),
            best_3_dart_score,
        }
    }

    pub fn with_180(self) -> Self {
        Self {
            count_180s: self.count_180s + 1,
            ..self
        }
    }

    pub fn total_games(&self) -> u32 {
        self.total_games
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    pub fn total_darts(&self) -> u32 {
        self.total_darts
    }

    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    pub fn count_180s(&self) -> u32 {
        self.count_180s
    }

    pub fn highest_checkout(&self) -> u32 {
        self.highest_checkout
    }

    pub fn best_3_dart_score(&self) -> u32 {
        self.best_3_dart_score
    }

    /// Percentage of games won, 0 without games
    pub fn win_rate(&self) -> f64 {
        if self.total_games == 0 {
            return 0.0;
        }
        f64::from(self.wins) / f64::from(self.total_games) * 100.0
    }

    pub fn average_per_dart(&self) -> f64 {
        if self.total_darts == 0 {
            return 0.0;
        }
        f64::from(self.total_points) / f64::from(self.total_darts)
    }

    pub fn average_3_dart(&self) -> f64 {
        self.average_per_dart() * 3.0
    }
}

/// What one player did in one finished game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerGameSummary {
    pub player_id: PlayerId,
    pub is_win: bool,
    pub darts_thrown: u32,
    pub points_scored: u32,
    /// Score the winner checked out from
    pub checkout_score: Option<u32>,
    pub count_180s: u32,
}

impl PlayerGameSummary {
    /// Folds this game into `stats`
    pub fn apply_to(&self, stats: PlayerStatistics) -> PlayerStatistics {
        let stats = stats.with_game(
            self.is_win,
            self.darts_thrown,
            self.points_scored,
            self.checkout_score,
        );
        (0..self.count_180s).fold(stats, |s, _| s.with_180())
    }
}

/// Result of folding one finished game into the statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameStatsReport {
    pub game_id: GameId,
    pub winner_id: PlayerId,
    pub summaries: Vec<PlayerGameSummary>,
    pub ratings: Vec<(PlayerId, SkillRating)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_statistics_have_zero_derived_values() {
        let stats = PlayerStatistics::empty();
        assert_eq!(stats.win_rate(), 0.0);
        assert_eq!(stats.average_per_dart(), 0.0);
        assert_eq!(stats.average_3_dart(), 0.0);
    }

    #[test]
    fn a_single_won_game() {
        let stats = PlayerStatistics::empty().with_game(true, 15, 501, Some(40));
        assert_eq!(stats.total_games(), 1);
        assert_eq!(stats.wins(), 1);
        assert_eq!(stats.win_rate(), 100.0);
        assert_eq!(stats.highest_checkout(), 40);
        assert_eq!(stats.best_3_dart_score(), 100);
        assert!((stats.average_3_dart() - 100.2).abs() < 1e-9);
    }

    #[test]
    fn short_games_do_not_set_a_best_score() {
        let stats = PlayerStatistics::empty().with_game(false, 2, 100, None);
        assert_eq!(stats.best_3_dart_score(), 0);
        assert_eq!(stats.highest_checkout(), 0);
    }

    #[test]
    fn summaries_apply_their_180s() {
        let summary = PlayerGameSummary {
            player_id: PlayerId::new(),
            is_win: false,
            darts_thrown: 9,
            points_scored: 360,
            checkout_score: None,
            count_180s: 2,
        };
        let stats = summary.apply_to(PlayerStatistics::empty());
        assert_eq!(stats.count_180s(), 2);
        assert_eq!(stats.total_points(), 360);
    }

    fn game() -> impl Strategy<Value = (bool, u32, u32, Option<u32>)> {
        (
            any::<bool>(),
            0u32..200,
            0u32..=1001,
            proptest::option::of(2u32..=170),
        )
    }

    proptest! {
        #[test]
        fn fold_order_does_not_matter(a in game(), b in game()) {
            let ab = PlayerStatistics::empty()
                .with_game(a.0, a.1, a.2, a.3)
                .with_game(b.0, b.1, b.2, b.3);
            let ba = PlayerStatistics::empty()
                .with_game(b.0, b.1, b.2, b.3)
                .with_game(a.0, a.1, a.2, a.3);
            prop_assert_eq!(ab, ba);
        }
    }
}
