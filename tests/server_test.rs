use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use onenight_server::models::credential::BotCredential;
use onenight_server::routes::create_routes;
use onenight_server::services::slack_service::SlackClient;
use onenight_server::state::AppState;
use onenight_server::utils::test_setup::setup_test_env;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn form_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_index_page_links_the_install() {
    setup_test_env();
    let app = create_routes(AppState::new());

    let request = Request::builder()
        .method("GET")
        .uri("/")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_string(response).await;
    assert!(body.contains("Add to Slack"));
    assert!(body.contains("client_id="));
}

#[tokio::test]
async fn test_oauth_install_stores_the_credential() {
    setup_test_env();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth.access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "team_id": "T1",
            "bot": {"bot_user_id": "B1", "bot_access_token": "xoxb-1"},
        })))
        .mount(&server)
        .await;

    let state = AppState::with_slack(SlackClient::with_base_url(server.uri()));
    let app = create_routes(state.clone());

    let request = Request::builder()
        .method("GET")
        .uri("/oauth?code=abc123")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let credential = state.credential_for("T1").await.expect("credential stored");
    assert_eq!(credential.bot_user_id, "B1");
    assert_eq!(credential.bot_access_token, "xoxb-1");
}

#[tokio::test]
async fn test_foreign_slash_command_is_ignored() {
    setup_test_env();
    let app = create_routes(AppState::new());

    let response = app
        .oneshot(form_request(
            "/command",
            "command=/othergame&team_id=T1&channel_id=C1",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "");
}

#[tokio::test]
async fn test_slash_command_without_install_replies_visibly() {
    setup_test_env();
    let app = create_routes(AppState::new());

    let response = app
        .oneshot(form_request(
            "/command",
            "command=/onenight&team_id=T9&channel_id=C1",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("no GM installed"));
}

#[tokio::test]
async fn test_slash_command_acks_and_spawns_the_game() {
    setup_test_env();
    let server = MockServer::start().await;
    // RTMを落としてバックグラウンドのセッションをすぐ終わらせる
    Mock::given(method("POST"))
        .and(path("/rtm.connect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": false,
            "error": "invalid_auth",
        })))
        .mount(&server)
        .await;

    let state = AppState::with_slack(SlackClient::with_base_url(server.uri()));
    state
        .store_credential(BotCredential {
            team_id: "T1".to_string(),
            bot_user_id: "B1".to_string(),
            bot_access_token: "xoxb-1".to_string(),
        })
        .await;
    let app = create_routes(state);

    let response = app
        .oneshot(form_request(
            "/command",
            "command=/onenight&team_id=T1&channel_id=C1",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Summoning a GM...");
}

#[tokio::test]
async fn test_too_small_roster_cancels_the_game() {
    setup_test_env();
    let server = MockServer::start().await;

    // RTMの接続先にはローカルのWebSocketサーバーを立てておく
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let ws_addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                use futures::StreamExt;
                let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
                while let Some(Ok(_)) = ws.next().await {}
            });
        }
    });

    Mock::given(method("POST"))
        .and(path("/rtm.connect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "url": format!("ws://{}", ws_addr),
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat.postMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&server)
        .await;
    // ボット+2人しかいないチャンネル
    Mock::given(method("POST"))
        .and(path("/conversations.members"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "members": ["B1", "U1", "U2"],
        })))
        .mount(&server)
        .await;

    let state = AppState::with_slack(SlackClient::with_base_url(server.uri()));
    state
        .store_credential(BotCredential {
            team_id: "T1".to_string(),
            bot_user_id: "B1".to_string(),
            bot_access_token: "xoxb-1".to_string(),
        })
        .await;
    let app = create_routes(state.clone());

    let response = app
        .oneshot(form_request(
            "/command",
            "command=/onenight&team_id=T1&channel_id=C1",
        ))
        .await
        .unwrap();
    assert_eq!(body_string(response).await, "Summoning a GM...");

    // バックグラウンドのセッションが断りを入れて登録を外すまで待つ
    let mut rejected = false;
    for _ in 0..100 {
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        let requests = server.received_requests().await.unwrap();
        rejected = requests.iter().any(|request| {
            request.url.path() == "/chat.postMessage"
                && String::from_utf8_lossy(&request.body).contains("3+to+5+players")
        });
        if rejected && state.sessions.lock().await.is_empty() {
            break;
        }
    }
    assert!(rejected, "the channel should be told the game is off");
    assert!(state.sessions.lock().await.is_empty());
}

#[tokio::test]
async fn test_unroutable_button_press_returns_ok() {
    setup_test_env();
    let app = create_routes(AppState::new());

    let payload = serde_json::json!({
        "callback_id": "onenight:reveal:no-such-session",
        "user": {"id": "U1", "name": "player"},
        "response_url": "http://localhost:9/respond",
        "actions": [{"name": "look", "type": "button", "value": "look"}],
    })
    .to_string();

    let response = app
        .oneshot(form_request("/button", &format!("payload={}", payload)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
