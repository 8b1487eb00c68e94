use serde::{Deserialize, Serialize};

use super::core::{DartThrowRecord, Game, GameType, InMode, OutMode};
use crate::shared::{GameId, PlayerId};

/// Every operation a client can ask of the game service.
///
/// Dispatch is a plain `match` in [`GameService::execute`](super::GameService::execute),
/// so adding a command without a handler fails to compile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum GameCommand {
    CreateGame {
        game_type: GameType,
        starting_score: u32,
        in_mode: InMode,
        out_mode: OutMode,
    },
    AddPlayer {
        game_id: GameId,
        player_id: PlayerId,
    },
    StartGame {
        game_id: GameId,
    },
    SubmitThrow {
        game_id: GameId,
        player_id: PlayerId,
        segment: u8,
        multiplier: u8,
        dart_number: u8,
    },
}

#[derive(Debug, Clone)]
pub enum CommandOutcome {
    GameCreated(Game),
    PlayerAdded(Game),
    GameStarted(Game),
    ThrowRegistered(DartThrowRecord),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_deserialize_from_tagged_json() {
        let game_id = GameId::new();
        let player_id = PlayerId::new();
        let json = format!(
            r#"{{"command":"submit_throw","game_id":"{}","player_id":"{}","segment":20,"multiplier":3,"dart_number":1}}"#,
            game_id, player_id
        );

        let command: GameCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(
            command,
            GameCommand::SubmitThrow {
                game_id,
                player_id,
                segment: 20,
                multiplier: 3,
                dart_number: 1,
            }
        );
    }
}
