use super::*;
use crate::game::constants::{GRID_SIZE, GUEST_LABEL};
use crate::game::types::{Direction, Position};
use crate::store::Store;
use crate::wallet::testing::{connected_link, FakeWallet, ADDRESS};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};

async fn make_session(wallet: WalletLink) -> Arc<GameSession> {
  let scoreboard = Arc::new(Scoreboard::load(Store::memory(), None).await);
  Arc::new(GameSession::with_engine(
    "test".to_string(),
    Engine::with_seed(7),
    scoreboard,
    Arc::new(wallet),
  ))
}

async fn subscribe(session: &Arc<GameSession>) -> (String, UnboundedReceiver<String>) {
  let (tx, rx) = mpsc::unbounded_channel();
  let id = session.add_subscriber(tx).await;
  (id, rx)
}

/// Marks the tick loop as already running so commands never spawn one.
fn hold_loop(session: &GameSession) {
  session.running.store(true, Ordering::SeqCst);
}

fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<Value> {
  let mut messages = Vec::new();
  while let Ok(payload) = rx.try_recv() {
    messages.push(serde_json::from_str(&payload).expect("json"));
  }
  messages
}

/// Three cells against the right wall, moving right.
async fn park_at_wall(session: &GameSession, score: u32) {
  let x = GRID_SIZE - 1;
  let cells = [Position::new(x, 4), Position::new(x - 1, 4), Position::new(x - 2, 4)];
  let mut state = session.state.lock().await;
  state.engine.load_layout(&cells, Direction::Right, score);
  state.engine.set_food(Position::new(0, 0));
}

#[tokio::test]
async fn new_subscriber_receives_current_snapshot() {
  let session = make_session(WalletLink::new(None)).await;
  let (_, mut rx) = subscribe(&session).await;

  let messages = drain(&mut rx);
  assert_eq!(messages.len(), 1);
  assert_eq!(messages[0]["type"], "state");
  assert_eq!(messages[0]["phase"]["state"], "idle");
  assert_eq!(messages[0]["gridSize"], GRID_SIZE);
}

#[tokio::test]
async fn commands_broadcast_only_when_they_change_state() {
  let session = make_session(WalletLink::new(None)).await;
  hold_loop(&session);
  let (_, mut rx) = subscribe(&session).await;
  drain(&mut rx);

  session.handle_text_message(r#"{"type":"pause"}"#).await;
  assert!(drain(&mut rx).is_empty());

  session.handle_text_message(r#"{"type":"start"}"#).await;
  let messages = drain(&mut rx);
  assert_eq!(messages.len(), 1);
  assert_eq!(messages[0]["phase"]["state"], "running");

  session.handle_text_message(r#"{"type":"direction","direction":"left"}"#).await;
  assert!(drain(&mut rx).is_empty());

  session.handle_text_message(r#"{"type":"direction","direction":"w"}"#).await;
  let messages = drain(&mut rx);
  assert_eq!(messages[0]["direction"], "up");

  session.handle_text_message("garbage").await;
  assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn pause_toggles() {
  let session = make_session(WalletLink::new(None)).await;
  hold_loop(&session);
  session.handle_command(ClientMessage::Start).await;
  session.handle_command(ClientMessage::Pause).await;
  assert_eq!(session.phase().await, Phase::Paused);
  session.handle_command(ClientMessage::Pause).await;
  assert_eq!(session.phase().await, Phase::Running);
}

#[tokio::test]
async fn step_stops_without_subscribers() {
  let session = make_session(WalletLink::new(None)).await;
  hold_loop(&session);
  park_at_wall(&session, 0).await;

  assert!(matches!(session.step().await, LoopStep::Stop));
  assert!(!session.running.load(Ordering::SeqCst));
  assert_eq!(session.phase().await, Phase::Running);
}

#[tokio::test]
async fn step_stops_when_not_running() {
  let session = make_session(WalletLink::new(None)).await;
  let (_, _rx) = subscribe(&session).await;
  hold_loop(&session);

  assert!(matches!(session.step().await, LoopStep::Stop));
  assert!(!session.running.load(Ordering::SeqCst));
}

#[tokio::test]
async fn collision_ends_run_for_guest() {
  let session = make_session(WalletLink::new(None)).await;
  let (_, mut rx) = subscribe(&session).await;
  park_at_wall(&session, 4).await;
  drain(&mut rx);

  let LoopStep::Continue(Some(result)) = session.step().await else {
    panic!("expected a finished run");
  };
  assert_eq!(result.score, 4);
  assert!(!result.is_perfect);
  assert_eq!(result.player_label, GUEST_LABEL);

  let messages = drain(&mut rx);
  assert_eq!(messages.len(), 2);
  assert_eq!(messages[0]["phase"]["reason"], "collision");
  assert_eq!(messages[1]["type"], "ended");
  assert_eq!(messages[1]["score"], 4);
  assert_eq!(messages[1]["perfect"], false);

  assert!(matches!(session.step().await, LoopStep::Stop));
}

#[tokio::test]
async fn finished_run_carries_wallet_label() {
  let wallet = connected_link(Arc::new(FakeWallet::with_account())).await;
  let session = make_session(wallet).await;
  let (_, _rx) = subscribe(&session).await;
  park_at_wall(&session, 1).await;

  let LoopStep::Continue(Some(result)) = session.step().await else {
    panic!("expected a finished run");
  };
  assert_eq!(result.player_label, crate::shared::names::short_address(ADDRESS));
}

#[tokio::test]
async fn closed_subscribers_are_dropped() {
  let session = make_session(WalletLink::new(None)).await;
  hold_loop(&session);
  let (_, rx) = subscribe(&session).await;
  drop(rx);
  let (_, _kept) = subscribe(&session).await;

  session.handle_command(ClientMessage::Start).await;
  assert_eq!(session.subscriber_count().await, 1);
}

#[tokio::test]
async fn tick_loop_records_finished_run() {
  let session = make_session(WalletLink::new(None)).await;
  let (id, mut rx) = subscribe(&session).await;
  park_at_wall(&session, 6).await;
  session.ensure_loop();

  let ended = tokio::time::timeout(Duration::from_secs(2), async {
    while let Some(payload) = rx.recv().await {
      let value: Value = serde_json::from_str(&payload).expect("json");
      if value["type"] == "ended" {
        return value;
      }
    }
    panic!("channel closed");
  })
  .await
  .expect("run ends");
  assert_eq!(ended["score"], 6);

  let recorded = tokio::time::timeout(Duration::from_secs(2), async {
    loop {
      let board = session.scoreboard.leaderboard().await;
      if !board.is_empty() {
        return board;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
  })
  .await
  .expect("run recorded");
  assert_eq!(recorded[0].score, 6);
  assert_eq!(session.scoreboard.high_score().await, 6);

  session.remove_subscriber(&id).await;
  assert_eq!(session.subscriber_count().await, 0);
}

#[tokio::test]
async fn rejoining_a_running_session_resumes_ticks() {
  let session = make_session(WalletLink::new(None)).await;
  let (id, _rx) = subscribe(&session).await;
  session.handle_command(ClientMessage::Start).await;
  session.remove_subscriber(&id).await;

  tokio::time::timeout(Duration::from_secs(2), async {
    while session.running.load(Ordering::SeqCst) {
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
  })
  .await
  .expect("loop parks without subscribers");
  assert_eq!(session.phase().await, Phase::Running);
  let before = session.state.lock().await.engine.head();

  let (_, mut rx) = subscribe(&session).await;
  assert!(session.running.load(Ordering::SeqCst));
  let moved = tokio::time::timeout(Duration::from_secs(2), async {
    loop {
      let payload = rx.recv().await.expect("open channel");
      let value: Value = serde_json::from_str(&payload).expect("json");
      if value["snake"][0] != serde_json::to_value(before).expect("json") {
        return value;
      }
    }
  })
  .await
  .expect("snake moves after rejoin");
  assert_eq!(moved["phase"]["state"], "running");
}
