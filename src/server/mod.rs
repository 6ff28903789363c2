pub mod auth;
mod config;
mod http_layers;
mod server;
mod session;
mod state;

pub use auth::{
    AuthManager, AuthStore, AuthToken, AuthTokenValue, UserAuthCredentials, UserHandle,
};
pub use config::ServerConfig;
pub use http_layers::*;
pub use server::run_server;
pub use session::Session;
pub use state::ServerState;
