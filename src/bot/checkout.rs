//! Target selection: what a bot aims at given its remaining score.

use std::sync::LazyLock;
use strum::IntoEnumIterator;

use crate::game::{evaluate_dart, DartVerdict, InMode, Multiplier, OutMode, Score, BULL};

/// Doubles a bot would like to leave itself, best first
const PREFERRED_DOUBLE_LEAVES: [u32; 21] = [
    40, 32, 36, 24, 16, 20, 8, 12, 28, 38, 34, 30, 26, 22, 18, 14, 10, 6, 4, 2, 50,
];

fn target(segment: u8, multiplier: Multiplier) -> Option<Score> {
    Score::new(segment, multiplier).ok()
}

/// Every aimable bed, heaviest first. Equal points prefer the bigger multiplier.
fn scoring_targets() -> &'static [Score] {
    static TARGETS: LazyLock<Vec<Score>> = LazyLock::new(|| {
        let mut all: Vec<Score> = (1..=20)
            .chain([BULL])
            .flat_map(|segment| Multiplier::iter().filter_map(move |m| target(segment, m)))
            .collect();
        all.sort_by(|a, b| {
            b.points()
                .cmp(&a.points())
                .then(b.multiplier().cmp(&a.multiplier()))
        });
        all
    });
    &TARGETS
}

/// The dart that finishes exactly `remaining`, if one exists
pub fn finishing_dart(remaining: u32, out_mode: OutMode) -> Option<Score> {
    let double = || match remaining {
        50 => target(BULL, Multiplier::Double),
        2..=40 if remaining % 2 == 0 => target((remaining / 2) as u8, Multiplier::Double),
        _ => None,
    };
    let treble = || match remaining {
        3..=60 if remaining % 3 == 0 => target((remaining / 3) as u8, Multiplier::Triple),
        _ => None,
    };

    match out_mode {
        OutMode::DoubleOut => double(),
        OutMode::MasterOut => double().or_else(treble),
        OutMode::StraightOut => hittable(remaining),
    }
}

/// Easiest single bed worth exactly `points`
fn hittable(points: u32) -> Option<Score> {
    match points {
        1..=20 => target(points as u8, Multiplier::Single),
        25 => target(BULL, Multiplier::Single),
        50 => target(BULL, Multiplier::Double),
        _ if points % 3 == 0 && points <= 60 => target((points / 3) as u8, Multiplier::Triple),
        _ if points % 2 == 0 && points <= 40 => target((points / 2) as u8, Multiplier::Double),
        _ => None,
    }
}

/// A dart that leaves a one-dart finish
pub fn setup_dart(remaining: u32, out_mode: OutMode) -> Option<Score> {
    let leaves: Vec<u32> = match out_mode {
        OutMode::StraightOut => (1..=20).rev().collect(),
        OutMode::DoubleOut | OutMode::MasterOut => PREFERRED_DOUBLE_LEAVES.to_vec(),
    };

    leaves
        .into_iter()
        .filter(|leave| remaining > *leave)
        .find_map(|leave| hittable(remaining - leave))
}

fn finishable_in_two(remaining: u32, out_mode: OutMode) -> bool {
    finishing_dart(remaining, out_mode).is_some() || setup_dart(remaining, out_mode).is_some()
}

fn is_legal_leave(remaining: u32, out_mode: OutMode) -> bool {
    remaining > 1 || (remaining == 1 && !out_mode.requires_special_finish())
}

/// First dart of the shortest checkout path within `darts_left` darts
pub fn checkout_dart(remaining: u32, darts_left: u8, out_mode: OutMode) -> Option<Score> {
    if darts_left == 0 {
        return None;
    }
    if let Some(dart) = finishing_dart(remaining, out_mode) {
        return Some(dart);
    }
    if darts_left >= 2 {
        if let Some(dart) = setup_dart(remaining, out_mode) {
            return Some(dart);
        }
    }
    if darts_left >= 3 {
        return scoring_targets().iter().copied().find(|dart| {
            dart.points() < remaining && {
                let left = remaining - dart.points();
                is_legal_leave(left, out_mode) && finishable_in_two(left, out_mode)
            }
        });
    }
    None
}

/// Where a player who has not opened yet should aim
fn opening_target(remaining: u32, in_mode: InMode, out_mode: OutMode) -> Score {
    let mut candidates: Vec<Score> = Vec::new();
    if in_mode == InMode::MasterIn {
        candidates.extend(target(20, Multiplier::Triple));
    }
    candidates.extend((1..=20).rev().filter_map(|s| target(s, Multiplier::Double)));
    candidates.extend(target(BULL, Multiplier::Double));

    candidates
        .into_iter()
        .find(|dart| {
            !matches!(
                evaluate_dart(remaining, false, dart, in_mode, out_mode),
                DartVerdict::Bust | DartVerdict::NotOpened
            )
        })
        .unwrap_or_else(Score::miss)
}

/// Chooses the bed to aim the next dart at.
///
/// Never aims at a bed that would bust if hit cleanly, unless no such bed exists.
pub fn choose_target(
    remaining: u32,
    darts_left: u8,
    has_opened: bool,
    in_mode: InMode,
    out_mode: OutMode,
) -> Score {
    if !has_opened && in_mode != InMode::StraightIn {
        return opening_target(remaining, in_mode, out_mode);
    }

    if let Some(dart) = checkout_dart(remaining, darts_left, out_mode) {
        return dart;
    }
    if let Some(dart) = setup_dart(remaining, out_mode) {
        return dart;
    }

    scoring_targets()
        .iter()
        .copied()
        .find(|dart| {
            matches!(
                evaluate_dart(remaining, true, dart, in_mode, out_mode),
                DartVerdict::Scored { .. }
            )
        })
        .unwrap_or_else(Score::miss)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn score(segment: u8, multiplier: Multiplier) -> Score {
        Score::new(segment, multiplier).unwrap()
    }

    #[test]
    fn scoring_targets_are_heaviest_first() {
        let targets = scoring_targets();
        assert_eq!(targets.len(), 62);
        assert_eq!(targets[0], score(20, Multiplier::Triple));
        assert!(targets.windows(2).all(|w| w[0].points() >= w[1].points()));

        let position = |s: Score| targets.iter().position(|t| *t == s).unwrap();
        assert!(position(score(6, Multiplier::Triple)) < position(score(9, Multiplier::Double)));
        assert!(position(score(9, Multiplier::Double)) < position(score(18, Multiplier::Single)));
    }

    #[rstest]
    #[case(40, OutMode::DoubleOut, Some(score(20, Multiplier::Double)))]
    #[case(50, OutMode::DoubleOut, Some(score(25, Multiplier::Double)))]
    #[case(41, OutMode::DoubleOut, None)]
    #[case(57, OutMode::MasterOut, Some(score(19, Multiplier::Triple)))]
    #[case(19, OutMode::StraightOut, Some(score(19, Multiplier::Single)))]
    #[case(1, OutMode::DoubleOut, None)]
    fn finishing_dart_cases(
        #[case] remaining: u32,
        #[case] out_mode: OutMode,
        #[case] expected: Option<Score>,
    ) {
        assert_eq!(finishing_dart(remaining, out_mode), expected);
    }

    #[test]
    fn setup_prefers_leaving_double_twenty() {
        assert_eq!(
            setup_dart(60, OutMode::DoubleOut),
            Some(score(20, Multiplier::Single))
        );
        // S1 leaves 40
        assert_eq!(
            setup_dart(41, OutMode::DoubleOut),
            Some(score(1, Multiplier::Single))
        );
    }

    #[test]
    fn three_dart_checkout_starts_with_a_scoring_dart() {
        let first = checkout_dart(170, 3, OutMode::DoubleOut).unwrap();
        assert_eq!(first, score(20, Multiplier::Triple));
        assert!(checkout_dart(171, 3, OutMode::DoubleOut).is_none());
    }

    #[test]
    fn checkout_respects_darts_left() {
        assert!(checkout_dart(100, 1, OutMode::DoubleOut).is_none());
        assert!(checkout_dart(100, 2, OutMode::DoubleOut).is_some());
    }

    #[test]
    fn heavy_scoring_from_a_big_total() {
        assert_eq!(
            choose_target(501, 3, true, InMode::StraightIn, OutMode::DoubleOut),
            score(20, Multiplier::Triple)
        );
    }

    #[test]
    fn opening_targets_follow_in_mode() {
        assert_eq!(
            choose_target(501, 3, false, InMode::DoubleIn, OutMode::DoubleOut),
            score(20, Multiplier::Double)
        );
        assert_eq!(
            choose_target(501, 3, false, InMode::MasterIn, OutMode::DoubleOut),
            score(20, Multiplier::Triple)
        );
        assert_eq!(
            choose_target(501, 3, false, InMode::StraightIn, OutMode::DoubleOut),
            score(20, Multiplier::Triple)
        );
    }

    #[rstest]
    #[case(OutMode::StraightOut)]
    #[case(OutMode::DoubleOut)]
    #[case(OutMode::MasterOut)]
    fn chosen_target_never_busts_when_hit_cleanly(#[case] out_mode: OutMode) {
        for remaining in 2..=501 {
            for darts_left in 1..=3 {
                let aim = choose_target(remaining, darts_left, true, InMode::StraightIn, out_mode);
                let verdict = evaluate_dart(remaining, true, &aim, InMode::StraightIn, out_mode);
                assert_ne!(
                    verdict,
                    DartVerdict::Bust,
                    "aiming {} from {} with {} darts",
                    aim,
                    remaining,
                    darts_left
                );
            }
        }
    }
}
