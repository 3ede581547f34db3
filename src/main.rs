use axum::{
  body::Bytes,
  extract::rejection::JsonRejection,
  extract::{Path, Query, State, WebSocketUpgrade},
  http::{Method, StatusCode},
  response::{IntoResponse, Response},
  routing::{get, post},
  Json, Router,
};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod game;
mod preferences;
mod protocol;
mod scores;
mod share;
mod shared;
mod skins;
mod store;
mod transport;
mod wallet;

use app::session_name::sanitize_session_name;
use config::AppConfig;
use game::session::GameSession;
use preferences::Preferences;
use scores::{LeaderboardEntry, Scoreboard, TournamentEntry};
use skins::{PurchaseError, SkinOutcome, SkinShop, SkinView};
use store::{SqliteStore, Store};
use wallet::{ConnectError, JsonRpcWallet, PaymentFailure, TipError, WalletLink, WalletProvider};

struct AppState {
  games: DashMap<String, Arc<GameSession>>,
  scoreboard: Arc<Scoreboard>,
  skins: SkinShop,
  wallet: Arc<WalletLink>,
  preferences: Preferences,
  public_url: String,
}

#[derive(Debug, Serialize)]
struct OkResponse {
  ok: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
  ok: bool,
  error: String,
}

#[derive(Debug, Serialize)]
struct LeaderboardResponse {
  scores: Vec<LeaderboardEntry>,
}

#[derive(Debug, Serialize)]
struct TournamentResponse {
  #[serde(rename = "weekKey")]
  week_key: i64,
  scores: Vec<TournamentEntry>,
}

#[derive(Debug, Serialize)]
struct HighScoreResponse {
  #[serde(rename = "highScore")]
  high_score: u32,
}

#[derive(Debug, Serialize)]
struct SkinsResponse {
  current: String,
  skins: Vec<SkinView>,
}

#[derive(Debug, Serialize)]
struct SkinResponse {
  ok: bool,
  skin: String,
  status: &'static str,
  #[serde(rename = "txHash", skip_serializing_if = "Option::is_none")]
  tx_hash: Option<String>,
}

#[derive(Debug, Serialize)]
struct WalletResponse {
  connected: bool,
  address: Option<String>,
  label: String,
}

#[derive(Debug, Deserialize)]
struct TipRequest {
  amount: Decimal,
}

#[derive(Debug, Serialize)]
struct TxResponse {
  ok: bool,
  #[serde(rename = "txHash")]
  tx_hash: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct SoundSetting {
  #[serde(rename = "soundEnabled")]
  sound_enabled: Option<bool>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let config = AppConfig::from_env();
  let db = store::open_pool(&config.database_url).await?;
  let kv = Store::new(Arc::new(SqliteStore::new(db)));

  let provider: Option<Arc<dyn WalletProvider>> = match &config.wallet_rpc_url {
    Some(url) => {
      tracing::info!(%url, "wallet bridge configured");
      Some(Arc::new(JsonRpcWallet::new(url.clone(), config.wallet_timeout)?))
    }
    None => {
      tracing::warn!("WALLET_RPC_URL not set, purchases and tips are unavailable");
      None
    }
  };

  let state = build_state(kv, provider, &config).await;
  let app = router(state);

  let address = format!("0.0.0.0:{}", config.port);
  tracing::info!("listening on {address}");

  let listener = tokio::net::TcpListener::bind(&address).await?;
  axum::serve(listener, app).await?;

  Ok(())
}

async fn build_state(
  kv: Store,
  provider: Option<Arc<dyn WalletProvider>>,
  config: &AppConfig,
) -> Arc<AppState> {
  Arc::new(AppState {
    games: DashMap::new(),
    scoreboard: Arc::new(Scoreboard::load(kv.clone(), config.tournament_retention_weeks).await),
    skins: SkinShop::load(kv.clone()).await,
    wallet: Arc::new(WalletLink::new(provider)),
    preferences: Preferences::load(kv).await,
    public_url: config.public_url.clone(),
  })
}

fn router(state: Arc<AppState>) -> Router {
  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([Method::GET, Method::POST])
    .allow_headers(Any);

  Router::new()
    .route("/api/health", get(health))
    .route("/api/leaderboard", get(leaderboard_get))
    .route("/api/tournament", get(tournament_get))
    .route("/api/high-score", get(high_score_get))
    .route("/api/skins", get(skins_get))
    .route("/api/skins/:id/select", post(skin_select))
    .route("/api/skins/:id/purchase", post(skin_purchase))
    .route("/api/wallet", get(wallet_get))
    .route("/api/wallet/connect", post(wallet_connect))
    .route("/api/wallet/tip", post(wallet_tip))
    .route("/api/share", get(share_get))
    .route("/api/settings/sound", get(sound_get).post(sound_post))
    .route("/api/game/:session", get(ws_handler))
    .layer(cors)
    .with_state(state)
}

impl AppState {
  fn game(&self, name: String) -> Arc<GameSession> {
    match self.games.entry(name) {
      dashmap::mapref::entry::Entry::Occupied(entry) => entry.get().clone(),
      dashmap::mapref::entry::Entry::Vacant(entry) => {
        let session = Arc::new(GameSession::new(
          entry.key().clone(),
          Arc::clone(&self.scoreboard),
          Arc::clone(&self.wallet),
        ));
        tracing::info!(session = %session.name(), "game session created");
        entry.insert(session.clone());
        session
      }
    }
  }
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
  (
    status,
    Json(ErrorResponse {
      ok: false,
      error: error.into(),
    }),
  )
    .into_response()
}

fn payment_status(failure: &PaymentFailure) -> StatusCode {
  match failure {
    PaymentFailure::UserRejected => StatusCode::FORBIDDEN,
    PaymentFailure::NetworkError(_) | PaymentFailure::Unknown(_) => StatusCode::BAD_GATEWAY,
  }
}

async fn health() -> impl IntoResponse {
  Json(OkResponse { ok: true })
}

async fn leaderboard_get(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let scores = state.scoreboard.leaderboard().await;
  Json(LeaderboardResponse { scores })
}

async fn tournament_get(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let (week_key, scores) = state.scoreboard.weekly_board().await;
  Json(TournamentResponse { week_key, scores })
}

async fn high_score_get(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HighScoreResponse {
    high_score: state.scoreboard.high_score().await,
  })
}

async fn skins_get(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(SkinsResponse {
    current: state.skins.current().await,
    skins: state.skins.views().await,
  })
}

fn skin_result(skin_id: String, result: Result<SkinOutcome, PurchaseError>) -> Response {
  let (status, tx_hash) = match result {
    Ok(SkinOutcome::Selected) => ("selected", None),
    Ok(SkinOutcome::AlreadyOwned) => ("owned", None),
    Ok(SkinOutcome::Purchased { tx_hash }) => ("purchased", Some(tx_hash)),
    Err(error) => {
      let status = match &error {
        PurchaseError::NotConnected => StatusCode::UNAUTHORIZED,
        PurchaseError::InvalidSkin(_) => StatusCode::BAD_REQUEST,
        PurchaseError::PurchaseFailed(failure) => payment_status(failure),
      };
      return error_response(status, error.to_string());
    }
  };
  Json(SkinResponse {
    ok: true,
    skin: skin_id,
    status,
    tx_hash,
  })
  .into_response()
}

async fn skin_select(
  State(state): State<Arc<AppState>>,
  Path(skin_id): Path<String>,
) -> Response {
  let result = state.skins.select_skin(&skin_id, &state.wallet).await;
  skin_result(skin_id, result)
}

async fn skin_purchase(
  State(state): State<Arc<AppState>>,
  Path(skin_id): Path<String>,
) -> Response {
  let result = state.skins.purchase(&skin_id, &state.wallet).await;
  skin_result(skin_id, result)
}

fn wallet_view(wallet: &WalletLink) -> WalletResponse {
  let session = wallet.session();
  WalletResponse {
    connected: session.is_some(),
    address: session.map(|session| session.address),
    label: wallet.player_label(),
  }
}

async fn wallet_get(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(wallet_view(&state.wallet))
}

async fn wallet_connect(State(state): State<Arc<AppState>>) -> Response {
  match state.wallet.connect().await {
    Ok(_) => Json(wallet_view(&state.wallet)).into_response(),
    Err(error) => {
      tracing::warn!(%error, "wallet connect failed");
      let status = match &error {
        ConnectError::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ConnectError::Declined => StatusCode::FORBIDDEN,
        ConnectError::NoAccounts | ConnectError::Pending | ConnectError::WrongNetwork => {
          StatusCode::CONFLICT
        }
        ConnectError::ChainNotAdded(_) | ConnectError::Failed(_) => StatusCode::BAD_GATEWAY,
      };
      error_response(status, error.to_string())
    }
  }
}

async fn wallet_tip(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<TipRequest>, JsonRejection>,
) -> Response {
  let Ok(Json(payload)) = payload else {
    return error_response(StatusCode::BAD_REQUEST, "Invalid JSON");
  };
  match state.wallet.tip(payload.amount).await {
    Ok(tx_hash) => Json(TxResponse { ok: true, tx_hash }).into_response(),
    Err(error) => {
      let status = match &error {
        TipError::NotConnected => StatusCode::UNAUTHORIZED,
        TipError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
        TipError::Failed(failure) => payment_status(failure),
      };
      error_response(status, error.to_string())
    }
  }
}

async fn share_get(
  State(state): State<Arc<AppState>>,
  Query(params): Query<HashMap<String, String>>,
) -> Response {
  let Some(score) = params.get("score").and_then(|value| value.parse::<u32>().ok()) else {
    return error_response(StatusCode::BAD_REQUEST, "Score must be a non-negative integer");
  };
  Json(share::share_links(score, &state.public_url)).into_response()
}

async fn sound_get(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(SoundSetting {
    sound_enabled: Some(state.preferences.sound_enabled()),
  })
}

/// An explicit `soundEnabled` sets the value; an empty body toggles it.
async fn sound_post(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
  let requested = if body.iter().all(u8::is_ascii_whitespace) {
    None
  } else {
    match serde_json::from_slice::<SoundSetting>(&body) {
      Ok(setting) => setting.sound_enabled,
      Err(error) => {
        tracing::debug!(%error, "rejecting sound setting body");
        return error_response(StatusCode::BAD_REQUEST, "Invalid JSON");
      }
    }
  };
  let enabled = match requested {
    Some(enabled) => {
      state.preferences.set_sound_enabled(enabled).await;
      enabled
    }
    None => state.preferences.toggle_sound().await,
  };
  Json(SoundSetting {
    sound_enabled: Some(enabled),
  })
  .into_response()
}

async fn ws_handler(
  ws: WebSocketUpgrade,
  Path(session): Path<String>,
  State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
  let session = state.game(sanitize_session_name(&session));
  ws.on_upgrade(move |socket| transport::ws_session::handle_socket(socket, session))
}
