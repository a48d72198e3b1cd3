use onenight_server::models::interaction::ActionTag;
use onenight_server::services::slack_service::SlackClient;
use onenight_server::state::AppState;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

fn test_state() -> AppState {
    // ディスパッチはネットワークに出ないので、届かない先で構わない
    AppState::with_slack(SlackClient::with_base_url("http://localhost:9".to_string()))
}

fn payload(callback_id: &str, user: &str, value: &str) -> String {
    json!({
        "callback_id": callback_id,
        "user": {"id": user, "name": "player"},
        "response_url": "http://localhost:9/respond",
        "actions": [{"name": "look", "type": "button", "value": value}],
    })
    .to_string()
}

#[tokio::test]
async fn test_dispatch_reaches_the_owning_session() {
    let state = test_state();
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.register_session("s-1", tx).await;

    state
        .dispatch_interaction(&payload("onenight:reveal:s-1", "U1", "look"))
        .await;

    let interaction = rx.try_recv().unwrap();
    assert_eq!(interaction.tag, ActionTag::Reveal);
    assert_eq!(interaction.session_id, "s-1");
    assert_eq!(interaction.user_id, "U1");
    assert_eq!(interaction.value.as_deref(), Some("look"));
}

#[tokio::test]
async fn test_unregistered_session_is_dropped() {
    let state = test_state();
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.register_session("s-1", tx).await;

    // 別セッション宛の押下は誰にも届かず、エラーにもならない
    state
        .dispatch_interaction(&payload("onenight:reveal:s-2", "U1", "look"))
        .await;
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_foreign_namespace_and_unknown_tag_are_dropped() {
    let state = test_state();
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.register_session("s-1", tx).await;

    state
        .dispatch_interaction(&payload("othergame:reveal:s-1", "U1", "look"))
        .await;
    state
        .dispatch_interaction(&payload("onenight:vote:s-1", "U1", "look"))
        .await;
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_malformed_payload_is_dropped() {
    let state = test_state();
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.register_session("s-1", tx).await;

    state.dispatch_interaction("this is not json").await;
    state.dispatch_interaction("{\"unexpected\": true}").await;
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_removed_session_no_longer_receives() {
    let state = test_state();
    let (tx, mut rx) = mpsc::unbounded_channel();
    state.register_session("s-1", tx).await;
    state.remove_session("s-1").await;

    state
        .dispatch_interaction(&payload("onenight:reveal:s-1", "U1", "look"))
        .await;
    assert!(matches!(
        rx.try_recv(),
        Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected)
    ));
}
