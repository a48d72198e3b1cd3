use std::{collections::HashMap, sync::Arc};
use tokio::sync::{mpsc, Mutex};

use crate::models::credential::BotCredential;
use crate::models::interaction::{CallbackId, InboundInteraction, InteractionPayload};
use crate::services::slack_service::SlackClient;

#[derive(Clone)]
pub struct AppState {
    /// 進行中セッションへのルーティングテーブル。キーはsession_id。
    /// セッションをまたいで共有される可変状態はこれだけ
    pub sessions: Arc<Mutex<HashMap<String, mpsc::UnboundedSender<InboundInteraction>>>>,
    /// インストール済みワークスペースの資格情報。キーはteam_id
    pub credentials: Arc<Mutex<HashMap<String, BotCredential>>>,
    pub slack: SlackClient,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_slack(SlackClient::new())
    }

    pub fn with_slack(slack: SlackClient) -> Self {
        AppState {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            credentials: Arc::new(Mutex::new(HashMap::new())),
            slack,
        }
    }

    pub async fn register_session(
        &self,
        session_id: &str,
        tx: mpsc::UnboundedSender<InboundInteraction>,
    ) {
        self.sessions.lock().await.insert(session_id.to_string(), tx);
    }

    pub async fn remove_session(&self, session_id: &str) {
        self.sessions.lock().await.remove(session_id);
    }

    pub async fn store_credential(&self, credential: BotCredential) {
        self.credentials
            .lock()
            .await
            .insert(credential.team_id.clone(), credential);
    }

    pub async fn credential_for(&self, team_id: &str) -> Option<BotCredential> {
        self.credentials.lock().await.get(team_id).cloned()
    }

    /// ボタンWebhookのペイロードを持ち主のセッションへ届ける。届け先の
    /// ない押下は正当に古い可能性があるので、ログだけ残して黙って捨てる
    pub async fn dispatch_interaction(&self, raw_payload: &str) {
        let payload: InteractionPayload = match serde_json::from_str(raw_payload) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("Malformed interaction payload: {}", e);
                return;
            }
        };
        let callback = match CallbackId::parse(&payload.callback_id) {
            Some(callback) => callback,
            None => {
                log::warn!("Unroutable callback id: {}", payload.callback_id);
                return;
            }
        };

        let interaction = InboundInteraction {
            tag: callback.tag,
            session_id: callback.session_id.clone(),
            user_id: payload.user.id,
            response_url: payload.response_url,
            value: payload.actions.first().and_then(|action| action.value.clone()),
        };

        let sessions = self.sessions.lock().await;
        match sessions.get(&callback.session_id) {
            Some(tx) => {
                if tx.send(interaction).is_err() {
                    log::warn!(
                        "Session {} is gone; dropping interaction",
                        callback.session_id
                    );
                }
            }
            None => log::warn!(
                "No session registered for {}; dropping interaction",
                callback.session_id
            ),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
