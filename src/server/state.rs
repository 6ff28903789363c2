use axum::extract::FromRef;

use crate::catalog::Catalog;
use crate::quest::{ListenRateLimiter, QuestBoard};
use crate::search::SearchVault;
use crate::server::auth::AuthManager;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::ServerConfig;

pub type SharedCatalog = Arc<Catalog>;
pub type GuardedQuestBoard = Arc<Mutex<QuestBoard>>;
pub type GuardedAuthManager = Arc<Mutex<AuthManager>>;
pub type SharedSearchVault = Arc<SearchVault>;
pub type SharedListenLimiter = Arc<ListenRateLimiter>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub catalog: SharedCatalog,
    pub quest_board: GuardedQuestBoard,
    pub auth_manager: GuardedAuthManager,
    pub search_vault: SharedSearchVault,
    pub listen_limiter: SharedListenLimiter,
    pub hash: String,
}

impl FromRef<ServerState> for SharedCatalog {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog.clone()
    }
}

impl FromRef<ServerState> for GuardedQuestBoard {
    fn from_ref(input: &ServerState) -> Self {
        input.quest_board.clone()
    }
}

impl FromRef<ServerState> for GuardedAuthManager {
    fn from_ref(input: &ServerState) -> Self {
        input.auth_manager.clone()
    }
}

impl FromRef<ServerState> for SharedSearchVault {
    fn from_ref(input: &ServerState) -> Self {
        input.search_vault.clone()
    }
}

impl FromRef<ServerState> for SharedListenLimiter {
    fn from_ref(input: &ServerState) -> Self {
        input.listen_limiter.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
