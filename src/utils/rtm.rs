use futures::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::services::session_service::GameError;

pub type RtmStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub async fn connect(url: &str) -> Result<RtmStream, GameError> {
    let (ws, _response) = connect_async(url)
        .await
        .map_err(|e| GameError::Rtm(e.to_string()))?;
    info!("RTM connection established");
    Ok(ws)
}

/// RTMソケット越しのチャンネル投稿。ボタンを付けられないので、
/// 接続直後の挨拶にだけ使う
pub async fn send_channel_message(
    ws: &mut RtmStream,
    channel_id: &str,
    text: &str,
) -> Result<(), GameError> {
    let event = json!({
        "type": "message",
        "channel": channel_id,
        "text": text,
    });
    info!("Send: {}", event);
    ws.send(Message::Text(event.to_string()))
        .await
        .map_err(|e| GameError::Rtm(e.to_string()))
}

/// 受信イベントのループ。ストリームが尽きる＝接続が切れるまで回り、
/// イベント単体の異常は致命傷にしない
pub async fn run_event_loop(mut ws: RtmStream) {
    while let Some(message) = ws.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                warn!("RTM read error: {}", e);
                break;
            }
        };
        if let Message::Text(text) = message {
            handle_event(&text);
        }
    }
    info!("RTM stream closed");
}

fn handle_event(raw: &str) {
    let event: serde_json::Value = match serde_json::from_str(raw) {
        Ok(event) => event,
        Err(e) => {
            warn!("Undecodable RTM event: {}", e);
            return;
        }
    };

    if let Some(error) = event.get("error") {
        warn!("Error: {}", error);
        return;
    }

    // 型ごとの固定テーブルでディスパッチ。知らない型はログに残して捨てる
    match event.get("type").and_then(|t| t.as_str()) {
        Some("hello") => info!("RTM says hello"),
        Some("message") => debug!("Chat message event (the night ignores chatter)"),
        Some(other) => debug!("Unhandled event: {}", other),
        None => debug!("Typeless RTM event: {}", raw),
    }
}
