use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8787;
const DEFAULT_WALLET_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
  pub database_url: String,
  pub port: u16,
  pub wallet_rpc_url: Option<String>,
  pub wallet_timeout: Duration,
  pub public_url: String,
  pub tournament_retention_weeks: Option<usize>,
}

impl AppConfig {
  pub fn from_env() -> Self {
    Self::from_lookup(|name| env::var(name).ok())
  }

  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
    let var = |name: &str| {
      lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    };

    let database_url = var("DATABASE_URL").unwrap_or_else(|| {
      let base = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
      let default_path = base.join("data").join("arcade.db");
      format!("sqlite://{}", default_path.display())
    });
    let port = var("PORT")
      .and_then(|value| value.parse().ok())
      .unwrap_or(DEFAULT_PORT);
    let wallet_timeout = var("WALLET_TIMEOUT_SECS")
      .and_then(|value| value.parse().ok())
      .filter(|secs| *secs > 0)
      .unwrap_or(DEFAULT_WALLET_TIMEOUT_SECS);
    let public_url = var("PUBLIC_URL").unwrap_or_else(|| format!("http://localhost:{port}"));
    let tournament_retention_weeks = var("TOURNAMENT_RETENTION_WEEKS")
      .and_then(|value| value.parse().ok())
      .filter(|weeks| *weeks > 0);

    Self {
      database_url,
      port,
      wallet_rpc_url: var("WALLET_RPC_URL"),
      wallet_timeout: Duration::from_secs(wallet_timeout),
      public_url,
      tournament_retention_weeks,
    }
  }
}
