use serde::{Deserialize, Serialize};

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 4000.0;
pub const MIN_UNCERTAINTY: f64 = 50.0;
pub const MAX_UNCERTAINTY: f64 = 500.0;

const DEFAULT_RATING: f64 = 1200.0;
const DEFAULT_UNCERTAINTY: f64 = 350.0;
const MIN_K_FACTOR: f64 = 16.0;
const UNCERTAINTY_STEP: f64 = 10.0;

/// (three-dart average, rating) anchors, interpolated linearly
const AVERAGE_ANCHORS: [(f64, f64); 7] = [
    (0.0, 400.0),
    (20.0, 800.0),
    (30.0, 1000.0),
    (45.0, 1200.0),
    (60.0, 1500.0),
    (80.0, 1800.0),
    (100.0, 2200.0),
];
const RATING_PER_POINT_ABOVE_TOP: f64 = 20.0;

/// A player's estimated strength and how sure we are about it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSkillRating")]
pub struct SkillRating {
    rating: f64,
    uncertainty: f64,
    games_played: u32,
}

#[derive(Deserialize)]
struct RawSkillRating {
    rating: f64,
    uncertainty: f64,
    games_played: u32,
}

impl From<RawSkillRating> for SkillRating {
    fn from(raw: RawSkillRating) -> Self {
        SkillRating::new(raw.rating, raw.uncertainty, raw.games_played)
    }
}

impl Default for SkillRating {
    fn default() -> Self {
        Self {
            rating: DEFAULT_RATING,
            uncertainty: DEFAULT_UNCERTAINTY,
            games_played: 0,
        }
    }
}

impl SkillRating {
    /// Out-of-range values are clamped
    pub fn new(rating: f64, uncertainty: f64, games_played: u32) -> Self {
        Self {
            rating: rating.clamp(MIN_RATING, MAX_RATING),
            uncertainty: uncertainty.clamp(MIN_UNCERTAINTY, MAX_UNCERTAINTY),
            games_played,
        }
    }

    /// Seeds a rating for a player who has history but has never been rated
    pub fn from_three_dart_average(average: f64, games_played: u32) -> Self {
        Self::new(
            rating_for_average(average),
            uncertainty_for_games(games_played),
            games_played,
        )
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    pub fn uncertainty(&self) -> f64 {
        self.uncertainty
    }

    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    fn k_factor(&self) -> f64 {
        (self.uncertainty / 5.0).max(MIN_K_FACTOR)
    }

    /// Elo update after `winner` beat `loser`. Returns (new winner, new loser).
    pub fn calculate_new_ratings(winner: &SkillRating, loser: &SkillRating) -> (Self, Self) {
        let expected_winner = 1.0 / (1.0 + 10f64.powf((loser.rating - winner.rating) / 400.0));
        let expected_loser = 1.0 - expected_winner;

        let new_winner = Self::new(
            winner.rating + winner.k_factor() * (1.0 - expected_winner),
            winner.uncertainty - UNCERTAINTY_STEP,
            winner.games_played + 1,
        );
        let new_loser = Self::new(
            loser.rating + loser.k_factor() * (0.0 - expected_loser),
            loser.uncertainty - UNCERTAINTY_STEP,
            loser.games_played + 1,
        );

        (new_winner, new_loser)
    }

    /// Less certain ratings widen the acceptable gap
    pub fn is_good_match_with(&self, other: &SkillRating, max_diff: f64) -> bool {
        let tolerance = max_diff + (self.uncertainty + other.uncertainty) / 2.0;
        (self.rating - other.rating).abs() <= tolerance
    }
}

fn rating_for_average(average: f64) -> f64 {
    let average = average.max(0.0);

    for pair in AVERAGE_ANCHORS.windows(2) {
        let (low_avg, low_rating) = pair[0];
        let (high_avg, high_rating) = pair[1];
        if average <= high_avg {
            let t = (average - low_avg) / (high_avg - low_avg);
            return low_rating + t * (high_rating - low_rating);
        }
    }

    let (top_avg, top_rating) = AVERAGE_ANCHORS[AVERAGE_ANCHORS.len() - 1];
    top_rating + (average - top_avg) * RATING_PER_POINT_ABOVE_TOP
}

fn uncertainty_for_games(games_played: u32) -> f64 {
    match games_played {
        0 => 350.0,
        1..=9 => 300.0,
        10..=24 => 200.0,
        25..=49 => 150.0,
        50..=99 => 100.0,
        _ => 50.0,
    }
}
