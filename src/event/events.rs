use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::{GameType, Score};
use crate::shared::{GameId, PlayerId};

/// Events emitted by game transitions.
///
/// Events represent facts about things that have already happened. The engine
/// returns them alongside the new state; the service forwards them to the bus
/// once the state has been saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    GameCreated {
        game_id: GameId,
        game_type: GameType,
        starting_score: u32,
        timestamp: DateTime<Utc>,
    },

    PlayerJoined {
        game_id: GameId,
        game_type: GameType,
        player_id: PlayerId,
        timestamp: DateTime<Utc>,
    },

    /// The game left the lobby; `first_player` is to throw
    GameStarted {
        game_id: GameId,
        game_type: GameType,
        first_player: PlayerId,
        timestamp: DateTime<Utc>,
    },

    ThrowRegistered {
        game_id: GameId,
        game_type: GameType,
        player_id: PlayerId,
        score: Score,
        points: u32,
        remaining: u32,
        round: u32,
        dart_number: u8,
        is_bust: bool,
        timestamp: DateTime<Utc>,
    },

    /// The turn was voided; `reverted_to` is the score held at the start of it
    Busted {
        game_id: GameId,
        game_type: GameType,
        player_id: PlayerId,
        score: Score,
        reverted_to: u32,
        timestamp: DateTime<Utc>,
    },

    PlayerChanged {
        game_id: GameId,
        game_type: GameType,
        previous_player: PlayerId,
        next_player: PlayerId,
        round: u32,
        timestamp: DateTime<Utc>,
    },

    /// `checkout` is the score the winner finished from
    GameWon {
        game_id: GameId,
        game_type: GameType,
        winner: PlayerId,
        checkout: u32,
        darts_thrown: u32,
        timestamp: DateTime<Utc>,
    },
}

impl GameEvent {
    pub fn game_id(&self) -> GameId {
        match self {
            GameEvent::GameCreated { game_id, .. }
            | GameEvent::PlayerJoined { game_id, .. }
            | GameEvent::GameStarted { game_id, .. }
            | GameEvent::ThrowRegistered { game_id, .. }
            | GameEvent::Busted { game_id, .. }
            | GameEvent::PlayerChanged { game_id, .. }
            | GameEvent::GameWon { game_id, .. } => *game_id,
        }
    }

    /// Get a short name of the event type (for logging)
    pub fn event_type(&self) -> &'static str {
        match self {
            GameEvent::GameCreated { .. } => "game_created",
            GameEvent::PlayerJoined { .. } => "player_joined",
            GameEvent::GameStarted { .. } => "game_started",
            GameEvent::ThrowRegistered { .. } => "throw_registered",
            GameEvent::Busted { .. } => "busted",
            GameEvent::PlayerChanged { .. } => "player_changed",
            GameEvent::GameWon { .. } => "game_won",
        }
    }

    /// The player who has to throw next, if this event hands over the oche
    pub fn player_to_throw(&self) -> Option<PlayerId> {
        match self {
            GameEvent::GameStarted { first_player, .. } => Some(*first_player),
            GameEvent::PlayerChanged { next_player, .. } => Some(*next_player),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Multiplier;

    #[test]
    fn serializes_with_snake_case_tag() {
        let event = GameEvent::Busted {
            game_id: GameId::new(),
            game_type: GameType::Standard501,
            player_id: PlayerId::new(),
            score: Score::new(20, Multiplier::Triple).unwrap(),
            reverted_to: 40,
            timestamp: Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "busted");
        assert_eq!(json["reverted_to"], 40);
        assert_eq!(event.event_type(), "busted");
    }

    #[test]
    fn hand_over_events_name_the_next_thrower() {
        let next = PlayerId::new();
        let event = GameEvent::PlayerChanged {
            game_id: GameId::new(),
            game_type: GameType::Standard301,
            previous_player: PlayerId::new(),
            next_player: next,
            round: 2,
            timestamp: Utc::now(),
        };
        assert_eq!(event.player_to_throw(), Some(next));

        let created = GameEvent::GameCreated {
            game_id: GameId::new(),
            game_type: GameType::Custom,
            starting_score: 170,
            timestamp: Utc::now(),
        };
        assert_eq!(created.player_to_throw(), None);
    }
}
