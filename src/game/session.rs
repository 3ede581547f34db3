use super::constants::TICK_MS;
use super::engine::{Engine, TickOutcome};
use super::types::{EndReason, Phase, RunResult};
use crate::app::time::now_millis;
use crate::protocol::{self, ClientMessage, ServerMessage};
use crate::scores::Scoreboard;
use crate::wallet::WalletLink;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Mutex;
use uuid::Uuid;

/// One snake run shared by every socket attached to the same session name.
pub struct GameSession {
  name: String,
  state: Mutex<SessionState>,
  running: AtomicBool,
  scoreboard: Arc<Scoreboard>,
  wallet: Arc<WalletLink>,
}

struct SessionState {
  engine: Engine,
  subscribers: HashMap<String, UnboundedSender<String>>,
}

#[derive(Debug)]
enum LoopStep {
  Stop,
  Continue(Option<RunResult>),
}

impl GameSession {
  pub fn new(name: String, scoreboard: Arc<Scoreboard>, wallet: Arc<WalletLink>) -> Self {
    Self::with_engine(name, Engine::new(), scoreboard, wallet)
  }

  pub fn with_engine(
    name: String,
    engine: Engine,
    scoreboard: Arc<Scoreboard>,
    wallet: Arc<WalletLink>,
  ) -> Self {
    Self {
      name,
      state: Mutex::new(SessionState {
        engine,
        subscribers: HashMap::new(),
      }),
      running: AtomicBool::new(false),
      scoreboard,
      wallet,
    }
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub async fn add_subscriber(self: &Arc<Self>, sender: UnboundedSender<String>) -> String {
    let subscriber_id = Uuid::new_v4().to_string();
    let mut state = self.state.lock().await;
    if let Some(payload) = protocol::encode_server_message(&ServerMessage::State(state.engine.snapshot())) {
      let _ = sender.send(payload);
    }
    state.subscribers.insert(subscriber_id.clone(), sender);
    let running = state.engine.phase() == Phase::Running;
    drop(state);
    tracing::debug!(session = %self.name, %subscriber_id, "subscriber joined");
    // The loop parks while nobody watches; a rejoin mid-run resumes it.
    if running {
      self.ensure_loop();
    }
    subscriber_id
  }

  pub async fn remove_subscriber(&self, subscriber_id: &str) {
    let mut state = self.state.lock().await;
    state.subscribers.remove(subscriber_id);
    tracing::debug!(session = %self.name, %subscriber_id, "subscriber left");
  }

  #[cfg(test)]
  pub async fn subscriber_count(&self) -> usize {
    self.state.lock().await.subscribers.len()
  }

  #[cfg(test)]
  pub async fn phase(&self) -> Phase {
    self.state.lock().await.engine.phase()
  }

  pub async fn handle_text_message(self: &Arc<Self>, text: &str) {
    let Some(message) = protocol::decode_client_message(text) else {
      tracing::debug!(session = %self.name, "ignoring malformed client message");
      return;
    };
    self.handle_command(message).await;
  }

  pub async fn handle_command(self: &Arc<Self>, message: ClientMessage) {
    let mut state = self.state.lock().await;
    let changed = match message {
      ClientMessage::Start => state.engine.start(),
      ClientMessage::Pause => state.engine.toggle_pause(),
      ClientMessage::Restart => {
        state.engine.restart();
        true
      }
      ClientMessage::Direction(direction) => state.engine.change_direction(direction),
    };
    if !changed {
      return;
    }
    state.broadcast_snapshot();
    let running = state.engine.phase() == Phase::Running;
    drop(state);
    if running {
      self.ensure_loop();
    }
  }

  fn ensure_loop(self: &Arc<Self>) {
    if self
      .running
      .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
      .is_err()
    {
      return;
    }

    let session = Arc::clone(self);
    tokio::spawn(async move {
      let mut interval = tokio::time::interval(std::time::Duration::from_millis(TICK_MS));
      // The first tick of an interval fires immediately.
      interval.tick().await;
      loop {
        interval.tick().await;
        match session.step().await {
          LoopStep::Stop => break,
          LoopStep::Continue(None) => {}
          LoopStep::Continue(Some(result)) => {
            let scoreboard = Arc::clone(&session.scoreboard);
            tokio::spawn(async move {
              scoreboard.record_run(result).await;
            });
          }
        }
      }
    });
  }

  async fn step(&self) -> LoopStep {
    let mut state = self.state.lock().await;
    if state.subscribers.is_empty() || state.engine.phase() != Phase::Running {
      self.running.store(false, Ordering::SeqCst);
      return LoopStep::Stop;
    }

    match state.engine.tick() {
      TickOutcome::Skipped => LoopStep::Continue(None),
      TickOutcome::Moved | TickOutcome::Ate => {
        state.broadcast_snapshot();
        LoopStep::Continue(None)
      }
      TickOutcome::Ended { reason, score } => {
        let is_perfect = reason == EndReason::Victory;
        state.broadcast_snapshot();
        state.broadcast(&ServerMessage::Ended {
          reason,
          score,
          perfect: is_perfect,
        });
        tracing::info!(session = %self.name, ?reason, score, "run ended");
        LoopStep::Continue(Some(RunResult {
          score,
          is_perfect,
          player_label: self.wallet.player_label(),
          timestamp_ms: now_millis(),
        }))
      }
    }
  }
}

impl SessionState {
  fn broadcast_snapshot(&mut self) {
    let message = ServerMessage::State(self.engine.snapshot());
    self.broadcast(&message);
  }

  fn broadcast(&mut self, message: &ServerMessage) {
    let Some(payload) = protocol::encode_server_message(message) else { return };
    self
      .subscribers
      .retain(|_, sender| sender.send(payload.clone()).is_ok());
  }
}

#[cfg(test)]
mod tests;
