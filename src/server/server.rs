use anyhow::Result;
use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use crate::catalog::Catalog;
use crate::quest::{process_listen_event, ListenError, ListenRateLimiter, Quest, QuestBoard};
use crate::search::SearchVault;

use axum_extra::extract::cookie::{Cookie, SameSite};
use tower_http::services::ServeDir;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, response, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::auth::{AuthManager, AuthTokenValue};
use super::session::{Session, COOKIE_SESSION_TOKEN_KEY};
use super::{log_requests, state::*, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub session_token: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct LoginBody {
    pub user_handle: String,
    pub password: String,
}

#[derive(Serialize)]
struct LoginSuccessResponse {
    token: String,
}

#[derive(Deserialize, Debug)]
struct ListenBody {
    pub recording_id: String,
}

#[derive(Deserialize, Debug)]
struct SearchQuery {
    pub q: String,
    pub limit: Option<usize>,
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        session_token: session.map(|s| s.token),
    };
    Json(stats)
}

async fn login(
    State(auth_manager): State<GuardedAuthManager>,
    Json(body): Json<LoginBody>,
) -> Response {
    let mut locked_manager = auth_manager.lock().unwrap();
    match locked_manager.login(&body.user_handle, &body.password) {
        Ok(token) => {
            let cookie_value = Cookie::build(Cookie::new(COOKIE_SESSION_TOKEN_KEY, token.0.clone()))
                .path("/")
                .same_site(SameSite::Lax)
                .build();

            let body = serde_json::to_string(&LoginSuccessResponse { token: token.0 })
                .expect("Could not serialize login response.");
            response::Builder::new()
                .status(StatusCode::OK)
                .header(header::SET_COOKIE, cookie_value.to_string())
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap()
        }
        Err(_) => StatusCode::FORBIDDEN.into_response(),
    }
}

async fn logout(State(auth_manager): State<GuardedAuthManager>, session: Session) -> Response {
    let mut locked_manager = auth_manager.lock().unwrap();
    match locked_manager.delete_auth_token(&AuthTokenValue(session.token)) {
        Ok(()) => {
            let cookie_value = Cookie::build(Cookie::new(COOKIE_SESSION_TOKEN_KEY, ""))
                .path("/")
                .expires(time::OffsetDateTime::now_utc() - time::Duration::days(1)) // Expire it in the past
                .same_site(SameSite::Lax)
                .build();

            response::Builder::new()
                .status(StatusCode::OK)
                .header(header::SET_COOKIE, cookie_value.to_string())
                .body(Body::empty())
                .unwrap()
        }
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn get_artist(
    _session: Session,
    State(catalog): State<SharedCatalog>,
    Path(id): Path<String>,
) -> Response {
    match catalog.get_artist(&id) {
        Some(artist) => Json(artist).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn get_album(
    _session: Session,
    State(catalog): State<SharedCatalog>,
    Path(id): Path<String>,
) -> Response {
    match catalog.get_album(&id) {
        Some(album) => Json(album).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn get_genre(
    _session: Session,
    State(catalog): State<SharedCatalog>,
    Path(id): Path<String>,
) -> Response {
    match catalog.get_genre(&id) {
        Some(genre) => Json(genre).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn get_recording(
    _session: Session,
    State(catalog): State<SharedCatalog>,
    Path(id): Path<String>,
) -> Response {
    match catalog.get_recording(&id) {
        Some(recording) => Json(recording).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn search(
    _session: Session,
    State(search_vault): State<SharedSearchVault>,
    Query(query): Query<SearchQuery>,
) -> Response {
    let limit = query.limit.unwrap_or(20);
    Json(search_vault.search(&query.q, limit)).into_response()
}

async fn get_quest_board(_session: Session, State(state): State<ServerState>) -> Response {
    let board = state.quest_board.lock().unwrap();
    Json(board.quest_views(&state.catalog)).into_response()
}

async fn post_listen(
    session: Session,
    State(state): State<ServerState>,
    Json(body): Json<ListenBody>,
) -> Response {
    let identity = format!("user:{}", session.user_handle);
    match process_listen_event(
        &state.catalog,
        &state.quest_board,
        &state.listen_limiter,
        &identity,
        &body.recording_id,
    ) {
        Ok(report) => Json(report).into_response(),
        Err(ListenError::RecordingNotFound(_)) => StatusCode::NOT_FOUND.into_response(),
        Err(ListenError::RateLimited { retry_after_sec }) => (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, retry_after_sec.to_string())],
        )
            .into_response(),
    }
}

async fn get_recording_rewards(
    _session: Session,
    State(quest_board): State<GuardedQuestBoard>,
    Path(id): Path<String>,
) -> Response {
    let board = quest_board.lock().unwrap();
    let quests: Vec<Quest> = board
        .quests_granting_recording(&id)
        .into_iter()
        .cloned()
        .collect();
    Json(quests).into_response()
}

async fn post_quest_reset(
    _session: Session,
    State(quest_board): State<GuardedQuestBoard>,
) -> Response {
    let mut board = quest_board.lock().unwrap();
    board.reset_all();
    match board.flush_if_dirty() {
        Ok(_) => StatusCode::OK.into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, format!("{}", err)).into_response(),
    }
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        catalog: Arc<Catalog>,
        quest_board: Arc<Mutex<QuestBoard>>,
        auth_manager: AuthManager,
        listen_limiter: ListenRateLimiter,
    ) -> ServerState {
        let search_vault = Arc::new(SearchVault::new(&catalog));
        ServerState {
            config,
            start_time: Instant::now(),
            catalog,
            quest_board,
            auth_manager: Arc::new(Mutex::new(auth_manager)),
            search_vault,
            listen_limiter: Arc::new(listen_limiter),
            hash: env!("CARGO_PKG_VERSION").to_owned(),
        }
    }
}

fn make_app(state: ServerState) -> Router {
    let config = state.config.clone();

    let auth_routes: Router = Router::new()
        .route("/login", post(login))
        .route("/logout", get(logout))
        .with_state(state.clone());

    let content_routes: Router = Router::new()
        .route("/artist/{id}", get(get_artist))
        .route("/album/{id}", get(get_album))
        .route("/genre/{id}", get(get_genre))
        .route("/recording/{id}", get(get_recording))
        .route("/search", get(search))
        .with_state(state.clone());

    let quest_routes: Router = Router::new()
        .route("/board", get(get_quest_board))
        .route("/listen", post(post_listen))
        .route("/reward/{id}", get(get_recording_rewards))
        .route("/reset", post(post_quest_reset))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new().route("/", get(home)).with_state(state.clone()),
    };

    let app: Router = home_router
        .nest("/v1/auth", auth_routes)
        .nest("/v1/content", content_routes)
        .nest("/v1/quest", quest_routes);

    app.layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(state: ServerState) -> Result<()> {
    let port = state.config.port;
    let app = make_app(state);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::test_fixtures::artist_quest;
    use crate::quest::{
        ListenRateLimitConfig, MemoryQuestStore, QuestDump, QuestReward, QuestTemplate,
        QuestTemplateType,
    };
    use crate::server::auth::test_fixtures::MemoryAuthStore;
    use crate::server::auth::{AuthStore, AuthToken};
    use crate::server::RequestsLoggingLevel;
    use axum::http::Request;
    use std::time::SystemTime;
    use tower::ServiceExt; // for `oneshot`

    const TEST_TOKEN: &str = "test-token";

    fn test_state(listen_quota: u32) -> ServerState {
        let catalog = Arc::new(Catalog::dummy());

        let mut rewarded = artist_quest("qst_2", "art_1", 1);
        rewarded.reward = Some(QuestReward::Song {
            entity_id: "rec_3".to_owned(),
        });
        let dump = QuestDump {
            templates: vec![QuestTemplate {
                id: "tpl_count".to_owned(),
                template_type: QuestTemplateType::ListenCount,
            }],
            quests: vec![artist_quest("qst_1", "art_1", 2), rewarded],
        };
        let board = QuestBoard::initialize(Box::new(MemoryQuestStore::with_dump(dump))).unwrap();

        let auth_store = MemoryAuthStore::default();
        let now = SystemTime::now();
        auth_store
            .add_auth_token(&AuthToken {
                user_handle: "alice".to_owned(),
                created: now,
                last_used: now,
                value: AuthTokenValue(TEST_TOKEN.to_owned()),
            })
            .unwrap();
        let auth_manager = AuthManager::initialize(Box::new(auth_store)).unwrap();

        ServerState::new(
            ServerConfig {
                requests_logging_level: RequestsLoggingLevel::None,
                ..ServerConfig::default()
            },
            catalog,
            Arc::new(Mutex::new(board)),
            auth_manager,
            ListenRateLimiter::new(ListenRateLimitConfig {
                quota: listen_quota,
                window: Duration::from_secs(60),
            }),
        )
    }

    fn authed(request: axum::http::request::Builder) -> axum::http::request::Builder {
        request.header("Authorization", TEST_TOKEN)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn responds_forbidden_on_protected_routes() {
        let app = make_app(test_state(10));

        let protected_routes = vec![
            "/v1/content/artist/art_1",
            "/v1/content/album/alb_1",
            "/v1/content/genre/gen_1",
            "/v1/content/recording/rec_1",
            "/v1/content/search?q=a",
            "/v1/quest/board",
            "/v1/quest/reward/rec_3",
            "/v1/auth/logout",
        ];

        for route in protected_routes.into_iter() {
            println!("Trying route {}", route);
            let request = Request::builder().uri(route).body(Body::empty()).unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN);
        }

        let request = Request::builder()
            .method("POST")
            .uri("/v1/quest/listen")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"recording_id":"rec_1"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn content_lookup_responds_with_entity_or_not_found() {
        let app = make_app(test_state(10));

        let request = authed(Request::builder().uri("/v1/content/recording/rec_1"))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["id"], "rec_1");

        let request = authed(Request::builder().uri("/v1/content/recording/rec_404"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listen_flow_advances_and_completes_quests() {
        let app = make_app(test_state(10));

        let listen = |recording_id: &str| {
            authed(
                Request::builder()
                    .method("POST")
                    .uri("/v1/quest/listen")
                    .header("content-type", "application/json"),
            )
            .body(Body::from(format!(
                r#"{{"recording_id":"{}"}}"#,
                recording_id
            )))
            .unwrap()
        };

        let response = app.clone().oneshot(listen("rec_1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["quests"][0]["done"], 1);
        assert_eq!(json["quests"][0]["status"], "active");
        // The single-count quest completed on the first matching listen.
        assert_eq!(json["newly_completed"], serde_json::json!(["qst_2"]));

        // Same recording again: idempotent, nothing new completes.
        let response = app.clone().oneshot(listen("rec_1")).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json["quests"][0]["done"], 1);
        assert_eq!(json["newly_completed"], serde_json::json!([]));

        let response = app.clone().oneshot(listen("rec_2")).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json["quests"][0]["done"], 2);
        assert_eq!(json["quests"][0]["status"], "completed");
        assert_eq!(json["newly_completed"], serde_json::json!(["qst_1"]));

        let response = app.oneshot(listen("rec_404")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn listen_is_rate_limited_per_user() {
        let app = make_app(test_state(1));

        let listen = |recording_id: &str| {
            authed(
                Request::builder()
                    .method("POST")
                    .uri("/v1/quest/listen")
                    .header("content-type", "application/json"),
            )
            .body(Body::from(format!(
                r#"{{"recording_id":"{}"}}"#,
                recording_id
            )))
            .unwrap()
        };

        let response = app.clone().oneshot(listen("rec_1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(listen("rec_2")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(response.headers().contains_key(header::RETRY_AFTER));
    }

    #[tokio::test]
    async fn reward_lookup_returns_granting_quests() {
        let app = make_app(test_state(10));

        let request = authed(Request::builder().uri("/v1/quest/reward/rec_3"))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["id"], "qst_2");

        let request = authed(Request::builder().uri("/v1/quest/reward/rec_1"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn reset_restores_the_board() {
        let state = test_state(10);
        let app = make_app(state.clone());

        let listen = authed(
            Request::builder()
                .method("POST")
                .uri("/v1/quest/listen")
                .header("content-type", "application/json"),
        )
        .body(Body::from(r#"{"recording_id":"rec_1"}"#))
        .unwrap();
        app.clone().oneshot(listen).await.unwrap();
        assert_eq!(state.quest_board.lock().unwrap().quests()[0].done(), 1);

        let reset = authed(Request::builder().method("POST").uri("/v1/quest/reset"))
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(reset).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(state.quest_board.lock().unwrap().quests()[0].done(), 0);
    }
}
