use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use questify_catalog_server::catalog::{load_catalog, Catalog};
use questify_catalog_server::quest::{
    FileQuestStore, ListenRateLimitConfig, ListenRateLimiter, QuestBoard,
};
use questify_catalog_server::server::{
    run_server, AuthManager, RequestsLoggingLevel, ServerConfig, ServerState,
};
use questify_catalog_server::FileAuthStore;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the catalog directory holding the content json files.
    #[clap(value_parser = parse_path)]
    pub catalog_dir: Option<PathBuf>,

    /// Path to the json file holding quest templates and quest progress.
    #[clap(long, default_value = "quest_store.json", value_parser = parse_path)]
    pub quest_store_file: PathBuf,

    /// Path to the json file holding login credentials and session tokens.
    #[clap(long, value_parser = parse_path)]
    pub auth_store_file: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Interval in seconds between quest persistence flushes. Set to 0 to
    /// disable the background flush task.
    #[clap(long, default_value_t = 10)]
    pub flush_interval_sec: u64,

    /// Maximum listen events accepted per user within the rate window.
    #[clap(long, default_value_t = 30)]
    pub listen_quota: u32,

    /// Length of the listen rate window in seconds.
    #[clap(long, default_value_t = 60)]
    pub listen_window_sec: u64,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let catalog_dir = match cli_args.catalog_dir {
        Some(path) => path,
        None => Catalog::infer_path()
            .with_context(|| "Could not infer catalog directory, please specify it explicitly.")?,
    };
    info!("Loading catalog at {:?}...", catalog_dir);
    let catalog = Arc::new(load_catalog(&catalog_dir)?);
    info!(
        "Catalog has {} artists, {} albums, {} recordings",
        catalog.get_artists_count(),
        catalog.get_albums_count(),
        catalog.get_recordings_count()
    );

    let quest_store = FileQuestStore::new(cli_args.quest_store_file);
    let quest_board = Arc::new(Mutex::new(QuestBoard::initialize(Box::new(quest_store))?));
    info!(
        "Quest board loaded with {} quests",
        quest_board.lock().unwrap().quests().len()
    );

    let auth_store_file = match cli_args.auth_store_file {
        Some(path) => path,
        None => FileAuthStore::infer_path().with_context(|| {
            "Could not infer auth store file path, please specify it explicitly."
        })?,
    };
    let auth_manager = AuthManager::initialize(Box::new(FileAuthStore::initialize(
        auth_store_file,
    )))?;

    let listen_limiter = ListenRateLimiter::new(ListenRateLimitConfig {
        quota: cli_args.listen_quota,
        window: Duration::from_secs(cli_args.listen_window_sec),
    });

    let state = ServerState::new(
        ServerConfig {
            requests_logging_level: cli_args.logging_level,
            port: cli_args.port,
            frontend_dir_path: cli_args.frontend_dir_path,
        },
        catalog,
        quest_board,
        auth_manager,
        listen_limiter,
    );

    // Batched persistence: quest progress is flushed on an interval rather
    // than on every listen event.
    if cli_args.flush_interval_sec > 0 {
        let flushing_board = state.quest_board.clone();
        let cleanup_limiter = state.listen_limiter.clone();
        let interval = Duration::from_secs(cli_args.flush_interval_sec);

        info!("Flushing quest progress every {:?}", interval);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);

            // Skip the first immediate tick, wait for the first interval
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let flushed = flushing_board.lock().unwrap().flush_if_dirty();
                match flushed {
                    Ok(true) => info!("Flushed quest progress"),
                    Ok(false) => {}
                    Err(e) => error!("Failed to flush quest progress: {}", e),
                }

                cleanup_limiter.cleanup_stale_entries();
            }
        });
    }

    info!("Ready to serve at port {}!", cli_args.port);
    run_server(state).await
}
