use crate::game::session::GameSession;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

pub async fn handle_socket(socket: WebSocket, session: Arc<GameSession>) {
  let (mut sender, mut receiver) = socket.split();
  let (tx, mut rx) = mpsc::unbounded_channel::<String>();
  let subscriber_id = session.add_subscriber(tx).await;

  let send_task = tokio::spawn(async move {
    while let Some(payload) = rx.recv().await {
      if sender.send(Message::Text(payload)).await.is_err() {
        break;
      }
    }
  });

  while let Some(result) = receiver.next().await {
    let Ok(message) = result else { break };
    match message {
      Message::Text(text) => session.handle_text_message(&text).await,
      Message::Close(_) => break,
      _ => {}
    }
  }

  session.remove_subscriber(&subscriber_id).await;
  send_task.abort();
}
