// A Game is one X01 leg: every player starts from the same score and races to exactly zero.
// Turn order is the order players joined in the lobby and never changes after the start.
// A turn is up to three darts; a bust voids the whole turn and hands over to the next player.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::score::Score;
use crate::event::GameEvent;
use crate::shared::{GameId, PlayerId, ThrowId};

pub const DARTS_PER_TURN: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameType {
    Standard301,
    Standard501,
    Standard701,
    Custom,
}

impl GameType {
    pub fn default_starting_score(self) -> Option<u32> {
        match self {
            GameType::Standard301 => Some(301),
            GameType::Standard501 => Some(501),
            GameType::Standard701 => Some(701),
            GameType::Custom => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InMode {
    StraightIn,
    DoubleIn,
    MasterIn,
}

impl InMode {
    /// Whether this dart lets a player who has not scored yet start scoring
    pub fn opens_with(self, score: &Score) -> bool {
        match self {
            InMode::StraightIn => true,
            InMode::DoubleIn => score.is_double(),
            InMode::MasterIn => score.is_double() || score.is_triple(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutMode {
    StraightOut,
    DoubleOut,
    MasterOut,
}

impl OutMode {
    /// Whether a dart that brings the score to exactly zero wins the leg
    pub fn accepts_finish(self, score: &Score) -> bool {
        match self {
            OutMode::StraightOut => true,
            OutMode::DoubleOut => score.is_double(),
            OutMode::MasterOut => score.is_double() || score.is_triple(),
        }
    }

    /// Double and master out can never finish from 1
    pub fn requires_special_finish(self) -> bool {
        !matches!(self, OutMode::StraightOut)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    Lobby,
    InProgress,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerGameState {
    pub player_id: PlayerId,
    pub current_score: u32,
    pub darts_thrown: u32,
    pub legs_won: u32,
    pub turn_order: usize,
    pub has_opened: bool,
}

/// One dart as recorded in the append-only throw log of a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DartThrowRecord {
    pub id: ThrowId,
    pub game_id: GameId,
    pub player_id: PlayerId,
    pub score: Score,
    pub round: u32,
    pub dart_number: u8,
    pub timestamp: DateTime<Utc>,
    pub is_bust: bool,
}

/// How a single dart affects the thrower's score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DartVerdict {
    /// The player has not opened yet and this dart does not open them
    NotOpened,
    Scored { remaining: u32 },
    Bust,
    Checkout,
}

/// Judges one dart against the X01 rules.
///
/// Shared by the engine and the bot simulator so both apply the same bust policy.
pub fn evaluate_dart(
    current_score: u32,
    has_opened: bool,
    score: &Score,
    in_mode: InMode,
    out_mode: OutMode,
) -> DartVerdict {
    if !has_opened && !in_mode.opens_with(score) {
        return DartVerdict::NotOpened;
    }

    let points = score.points();
    if points > current_score {
        return DartVerdict::Bust;
    }

    match current_score - points {
        0 if out_mode.accepts_finish(score) => DartVerdict::Checkout,
        0 => DartVerdict::Bust,
        1 if out_mode.requires_special_finish() => DartVerdict::Bust,
        remaining => DartVerdict::Scored { remaining },
    }
}

/// The result of registering a dart: the next state, the record to append and what happened
#[derive(Debug, Clone)]
pub struct ThrowOutcome {
    pub game: Game,
    pub record: DartThrowRecord,
    pub events: Vec<GameEvent>,
    pub turn_ended: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    id: GameId,
    game_type: GameType,
    starting_score: u32,
    in_mode: InMode,
    out_mode: OutMode,
    status: GameStatus,
    players: Vec<PlayerGameState>,
    current_player_index: usize,
    current_round: u32,
    darts_in_turn: u8,
    turn_start_score: u32,
    winner_id: Option<PlayerId>,
    created_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl Game {
    pub fn new(
        game_type: GameType,
        starting_score: u32,
        in_mode: InMode,
        out_mode: OutMode,
    ) -> Result<Self, GameError> {
        if starting_score == 0 {
            return Err(GameError::InvalidArgument(
                "starting score must be positive".to_string(),
            ));
        }

        Ok(Self {
            id: GameId::new(),
            game_type,
            starting_score,
            in_mode,
            out_mode,
            status: GameStatus::Lobby,
            players: vec![],
            current_player_index: 0,
            current_round: 0,
            darts_in_turn: 0,
            turn_start_score: starting_score,
            winner_id: None,
            created_at: Utc::now(),
            finished_at: None,
        })
    }

    pub fn add_player(&self, player_id: PlayerId) -> Result<(Game, Vec<GameEvent>), GameError> {
        if self.status != GameStatus::Lobby {
            return Err(GameError::InvalidState(
                "players can only join while the game is in the lobby".to_string(),
            ));
        }
        if self.player(player_id).is_some() {
            return Err(GameError::InvalidState(format!(
                "player {} already joined",
                player_id
            )));
        }

        let mut next = self.clone();
        next.players.push(PlayerGameState {
            player_id,
            current_score: self.starting_score,
            darts_thrown: 0,
            legs_won: 0,
            turn_order: self.players.len(),
            has_opened: self.in_mode == InMode::StraightIn,
        });

        let event = GameEvent::PlayerJoined {
            game_id: self.id,
            game_type: self.game_type,
            player_id,
            timestamp: Utc::now(),
        };

        Ok((next, vec![event]))
    }

    pub fn start(&self) -> Result<(Game, Vec<GameEvent>), GameError> {
        if self.status != GameStatus::Lobby {
            return Err(GameError::InvalidState("game already started".to_string()));
        }
        let first = self
            .players
            .first()
            .ok_or_else(|| GameError::InvalidState("cannot start without players".to_string()))?;

        let mut next = self.clone();
        next.status = GameStatus::InProgress;
        next.current_round = 1;
        next.current_player_index = 0;
        next.darts_in_turn = 0;
        next.turn_start_score = first.current_score;

        let event = GameEvent::GameStarted {
            game_id: self.id,
            game_type: self.game_type,
            first_player: first.player_id,
            timestamp: Utc::now(),
        };

        Ok((next, vec![event]))
    }

    /// Applies one dart of the current player.
    ///
    /// `self` is left untouched; on success the returned outcome carries the new state.
    pub fn register_throw(
        &self,
        player_id: PlayerId,
        score: Score,
        dart_number: u8,
    ) -> Result<ThrowOutcome, GameError> {
        if self.status != GameStatus::InProgress {
            return Err(GameError::InvalidState(format!(
                "cannot throw while game is {:?}",
                self.status
            )));
        }
        let current = &self.players[self.current_player_index];
        if current.player_id != player_id {
            return Err(GameError::InvalidState(format!(
                "it is not player {}'s turn",
                player_id
            )));
        }
        if !(1..=DARTS_PER_TURN).contains(&dart_number) {
            return Err(GameError::InvalidArgument(format!(
                "dart number must be 1-3, got {}",
                dart_number
            )));
        }
        if dart_number != self.darts_in_turn + 1 {
            return Err(GameError::InvalidState(format!(
                "expected dart {} of the turn, got {}",
                self.darts_in_turn + 1,
                dart_number
            )));
        }

        let now = Utc::now();
        let mut next = self.clone();
        let index = self.current_player_index;
        let verdict = evaluate_dart(
            current.current_score,
            current.has_opened,
            &score,
            self.in_mode,
            self.out_mode,
        );

        let player = &mut next.players[index];
        player.darts_thrown += 1;
        let is_bust = verdict == DartVerdict::Bust;
        let is_checkout = verdict == DartVerdict::Checkout;

        match verdict {
            DartVerdict::NotOpened => {}
            DartVerdict::Scored { remaining } => {
                player.has_opened = true;
                player.current_score = remaining;
            }
            DartVerdict::Bust => {
                player.current_score = self.turn_start_score;
            }
            DartVerdict::Checkout => {
                player.has_opened = true;
                player.current_score = 0;
                player.legs_won += 1;
            }
        }
        let remaining = player.current_score;
        let darts_thrown = player.darts_thrown;

        let record = DartThrowRecord {
            id: ThrowId::new(),
            game_id: self.id,
            player_id,
            score,
            round: self.current_round,
            dart_number,
            timestamp: now,
            is_bust,
        };

        let mut events = vec![GameEvent::ThrowRegistered {
            game_id: self.id,
            game_type: self.game_type,
            player_id,
            score,
            points: score.points(),
            remaining,
            round: self.current_round,
            dart_number,
            is_bust,
            timestamp: now,
        }];

        if is_bust {
            events.push(GameEvent::Busted {
                game_id: self.id,
                game_type: self.game_type,
                player_id,
                score,
                reverted_to: self.turn_start_score,
                timestamp: now,
            });
        }

        let turn_ended = is_bust || is_checkout || dart_number == DARTS_PER_TURN;

        if is_checkout {
            next.status = GameStatus::Finished;
            next.winner_id = Some(player_id);
            next.finished_at = Some(now);
            next.darts_in_turn = 0;
            events.push(GameEvent::GameWon {
                game_id: self.id,
                game_type: self.game_type,
                winner: player_id,
                checkout: self.turn_start_score,
                darts_thrown,
                timestamp: now,
            });
        } else if turn_ended {
            next.advance_turn();
            events.push(GameEvent::PlayerChanged {
                game_id: self.id,
                game_type: self.game_type,
                previous_player: player_id,
                next_player: next.players[next.current_player_index].player_id,
                round: next.current_round,
                timestamp: now,
            });
        } else {
            next.darts_in_turn += 1;
        }

        Ok(ThrowOutcome {
            game: next,
            record,
            events,
            turn_ended,
        })
    }

    fn advance_turn(&mut self) {
        self.current_player_index = (self.current_player_index + 1) % self.players.len();
        if self.current_player_index == 0 {
            self.current_round += 1;
        }
        self.darts_in_turn = 0;
        self.turn_start_score = self.players[self.current_player_index].current_score;
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    pub fn starting_score(&self) -> u32 {
        self.starting_score
    }

    pub fn in_mode(&self) -> InMode {
        self.in_mode
    }

    pub fn out_mode(&self) -> OutMode {
        self.out_mode
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == GameStatus::InProgress
    }

    pub fn players(&self) -> &[PlayerGameState] {
        &self.players
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&PlayerGameState> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    /// The player to throw next; `None` unless the game is in progress
    pub fn current_player(&self) -> Option<&PlayerGameState> {
        if self.is_in_progress() {
            self.players.get(self.current_player_index)
        } else {
            None
        }
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    /// Darts already thrown in the current turn (0-2)
    pub fn darts_in_turn(&self) -> u8 {
        self.darts_in_turn
    }

    pub fn turn_start_score(&self) -> u32 {
        self.turn_start_score
    }

    pub fn winner_id(&self) -> Option<PlayerId> {
        self.winner_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }
}
