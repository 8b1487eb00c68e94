use std::collections::HashMap;

use crate::game::{evaluate_dart, DartThrowRecord, DartVerdict, Game, GameStatus, DARTS_PER_TURN};
use crate::shared::PlayerId;

use super::{models::PlayerGameSummary, StatsError};

const MAXIMUM_TURN: u32 = 180;

/// One player's position while replaying the throw log
#[derive(Debug, Clone)]
struct Replay {
    score: u32,
    has_opened: bool,
    turn: Option<TurnReplay>,
    count_180s: u32,
    checkout_score: Option<u32>,
}

#[derive(Debug, Clone)]
struct TurnReplay {
    round: u32,
    start_score: u32,
    darts: u8,
    busted: bool,
}

impl Replay {
    fn new(starting_score: u32) -> Self {
        Self {
            score: starting_score,
            has_opened: false,
            turn: None,
            count_180s: 0,
            checkout_score: None,
        }
    }

    fn close_turn(&mut self) {
        if let Some(turn) = self.turn.take() {
            let scored = turn.start_score.saturating_sub(self.score);
            if turn.darts == DARTS_PER_TURN && !turn.busted && scored == MAXIMUM_TURN {
                self.count_180s += 1;
            }
        }
    }
}

/// Derives each player's contribution to the statistics from a finished game.
///
/// The throw log is replayed through the scoring rules so that darts thrown before
/// opening and busted turns never count toward a 180.
pub fn summarize_game(
    game: &Game,
    throws: &[DartThrowRecord],
) -> Result<Vec<PlayerGameSummary>, StatsError> {
    if game.status() != GameStatus::Finished {
        return Err(StatsError::Validation(format!(
            "game {} is not finished",
            game.id()
        )));
    }
    let winner_id = game
        .winner_id()
        .ok_or_else(|| StatsError::Validation(format!("game {} has no winner", game.id())))?;

    let mut replays: HashMap<PlayerId, Replay> = game
        .players()
        .iter()
        .map(|p| (p.player_id, Replay::new(game.starting_score())))
        .collect();

    for throw in throws.iter().filter(|t| t.game_id == game.id()) {
        let replay = replays.get_mut(&throw.player_id).ok_or_else(|| {
            StatsError::Validation(format!(
                "throw {} by player {} who is not in the game",
                throw.id, throw.player_id
            ))
        })?;

        if replay.turn.as_ref().map(|t| t.round) != Some(throw.round) {
            replay.close_turn();
            replay.turn = Some(TurnReplay {
                round: throw.round,
                start_score: replay.score,
                darts: 0,
                busted: false,
            });
        }

        let verdict = evaluate_dart(
            replay.score,
            replay.has_opened,
            &throw.score,
            game.in_mode(),
            game.out_mode(),
        );
        let Some(turn) = replay.turn.as_mut() else {
            continue;
        };
        turn.darts += 1;

        match verdict {
            DartVerdict::NotOpened => {}
            DartVerdict::Scored { remaining } => {
                replay.has_opened = true;
                replay.score = remaining;
            }
            DartVerdict::Bust => {
                turn.busted = true;
                replay.score = turn.start_score;
            }
            DartVerdict::Checkout => {
                replay.has_opened = true;
                replay.checkout_score = Some(turn.start_score);
                replay.score = 0;
            }
        }
    }

    let summaries = game
        .players()
        .iter()
        .map(|player| {
            let mut replay = replays
                .remove(&player.player_id)
                .unwrap_or_else(|| Replay::new(game.starting_score()));
            replay.close_turn();

            let is_win = player.player_id == winner_id;
            PlayerGameSummary {
                player_id: player.player_id,
                is_win,
                darts_thrown: player.darts_thrown,
                points_scored: game.starting_score().saturating_sub(player.current_score),
                checkout_score: if is_win { replay.checkout_score } else { None },
                count_180s: replay.count_180s,
            }
        })
        .collect();

    Ok(summaries)
}
