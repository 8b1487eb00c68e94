use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::bot::SkillLevel;
use crate::shared::{AppError, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub username: String,
    pub is_bot: bool,
    pub bot_skill_level: Option<SkillLevel>,
}

/// Read access to players, implemented by whoever owns the user accounts
#[async_trait]
pub trait PlayerLookup: Send + Sync {
    /// Fails with `NotFound` for unknown ids
    async fn get_by_id(&self, player_id: PlayerId) -> Result<PlayerProfile, AppError>;
}

/// In-memory player registry for humans and bots
/// Uses RwLock for concurrent access with read optimization
#[derive(Default)]
pub struct InMemoryPlayerDirectory {
    players: Arc<RwLock<HashMap<PlayerId, PlayerProfile>>>,
}

impl InMemoryPlayerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register_human(&self, username: impl Into<String>) -> PlayerProfile {
        let profile = PlayerProfile {
            id: PlayerId::new(),
            username: username.into(),
            is_bot: false,
            bot_skill_level: None,
        };

        info!(player_id = %profile.id, username = %profile.username, "Registered player");
        self.insert(profile).await
    }

    /// Registers a bot with a generated display name
    pub async fn register_bot(&self, skill: SkillLevel) -> PlayerProfile {
        let petname = petname::Petnames::default().generate_one(2, "-");
        let profile = PlayerProfile {
            id: PlayerId::new(),
            username: format!("{} Bot", petname),
            is_bot: true,
            bot_skill_level: Some(skill),
        };

        info!(
            player_id = %profile.id,
            username = %profile.username,
            skill = skill.value(),
            "Registered bot"
        );
        self.insert(profile).await
    }

    async fn insert(&self, profile: PlayerProfile) -> PlayerProfile {
        let mut players = self.players.write().await;
        players.insert(profile.id, profile.clone());
        profile
    }
}

#[async_trait]
impl PlayerLookup for InMemoryPlayerDirectory {
    async fn get_by_id(&self, player_id: PlayerId) -> Result<PlayerProfile, AppError> {
        let players = self.players.read().await;
        let result = players.get(&player_id).cloned();

        debug!(player_id = %player_id, found = result.is_some(), "Player lookup");

        result.ok_or_else(|| AppError::NotFound(format!("Player not found: {}", player_id)))
    }
}
