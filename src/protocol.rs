use crate::game::input::parse_direction;
use crate::game::types::{Direction, EndReason, GameSnapshot};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessage {
  Start,
  Pause,
  Restart,
  Direction(Direction),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum JsonClientMessage {
  Start,
  Pause,
  Restart,
  Direction { direction: String },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
  State(GameSnapshot),
  Ended {
    reason: EndReason,
    score: u32,
    perfect: bool,
  },
}

pub fn decode_client_message(text: &str) -> Option<ClientMessage> {
  let message = serde_json::from_str::<JsonClientMessage>(text).ok()?;
  match message {
    JsonClientMessage::Start => Some(ClientMessage::Start),
    JsonClientMessage::Pause => Some(ClientMessage::Pause),
    JsonClientMessage::Restart => Some(ClientMessage::Restart),
    JsonClientMessage::Direction { direction } => {
      parse_direction(&direction).map(ClientMessage::Direction)
    }
  }
}

pub fn encode_server_message(message: &ServerMessage) -> Option<String> {
  match serde_json::to_string(message) {
    Ok(payload) => Some(payload),
    Err(error) => {
      tracing::warn!(?error, "failed to encode server message");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::game::engine::Engine;
  use serde_json::Value;

  #[test]
  fn decode_commands() {
    assert_eq!(decode_client_message(r#"{"type":"start"}"#), Some(ClientMessage::Start));
    assert_eq!(decode_client_message(r#"{"type":"pause"}"#), Some(ClientMessage::Pause));
    assert_eq!(
      decode_client_message(r#"{"type":"restart"}"#),
      Some(ClientMessage::Restart)
    );
  }

  #[test]
  fn decode_direction_with_key_alias() {
    let message = decode_client_message(r#"{"type":"direction","direction":"ArrowUp"}"#);
    assert_eq!(message, Some(ClientMessage::Direction(Direction::Up)));
  }

  #[test]
  fn reject_unknown_or_malformed_messages() {
    assert_eq!(decode_client_message(r#"{"type":"boost"}"#), None);
    assert_eq!(decode_client_message(r#"{"type":"direction","direction":"sideways"}"#), None);
    assert_eq!(decode_client_message("not json"), None);
  }

  #[test]
  fn encode_state_snapshot() {
    let engine = Engine::with_seed(1);
    let payload = encode_server_message(&ServerMessage::State(engine.snapshot())).expect("payload");
    let value: Value = serde_json::from_str(&payload).expect("json");
    assert_eq!(value["type"], "state");
    assert_eq!(value["phase"]["state"], "idle");
    assert_eq!(value["direction"], "right");
    assert_eq!(value["snake"].as_array().map(Vec::len), Some(1));
    assert_eq!(value["gridSize"], 18);
  }

  #[test]
  fn encode_ended_message() {
    let payload = encode_server_message(&ServerMessage::Ended {
      reason: EndReason::Victory,
      score: 324,
      perfect: true,
    })
    .expect("payload");
    let value: Value = serde_json::from_str(&payload).expect("json");
    assert_eq!(value["type"], "ended");
    assert_eq!(value["reason"], "victory");
    assert_eq!(value["perfect"], true);
  }
}
