use reqwest::Client;
use serde_json::{json, Value};

use crate::models::credential::BotCredential;

const SLACK_API_BASE: &str = "https://slack.com/api";

#[derive(Debug, thiserror::Error)]
pub enum SlackError {
    #[error("Slack APIへのリクエストに失敗しました: {0}")]
    RequestFailed(String),
    #[error("Slack API呼び出しがエラーを返しました: {method}: {error}")]
    ApiError { method: String, error: String },
    #[error("Slack APIの応答に{0}がありません")]
    MalformedResponse(&'static str),
}

/// Slack Web APIの薄いクライアント。ゲーム側から見た外向きの出口は
/// すべてここを通り、okでない応答はその場でエラーになる（リトライなし）
#[derive(Clone)]
pub struct SlackClient {
    client: Client,
    base_url: String,
}

impl SlackClient {
    pub fn new() -> Self {
        Self::with_base_url(SLACK_API_BASE.to_string())
    }

    /// テスト用にAPIのベースURLを差し替える
    pub fn with_base_url(base_url: String) -> Self {
        SlackClient {
            client: Client::new(),
            base_url,
        }
    }

    async fn call(&self, method: &str, form: &[(&str, &str)]) -> Result<Value, SlackError> {
        let url = format!("{}/{}", self.base_url, method);
        let response = self
            .client
            .post(&url)
            .form(form)
            .send()
            .await
            .map_err(|e| SlackError::RequestFailed(e.to_string()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| SlackError::RequestFailed(e.to_string()))?;

        if body["ok"].as_bool() != Some(true) {
            let error = body["error"].as_str().unwrap_or("unknown_error").to_string();
            return Err(SlackError::ApiError {
                method: method.to_string(),
                error,
            });
        }
        Ok(body)
    }

    /// OAuthのcodeをボット資格情報と交換する
    pub async fn oauth_access(
        &self,
        client_id: &str,
        client_secret: &str,
        code: &str,
    ) -> Result<BotCredential, SlackError> {
        let body = self
            .call(
                "oauth.access",
                &[
                    ("client_id", client_id),
                    ("client_secret", client_secret),
                    ("code", code),
                ],
            )
            .await?;

        let team_id = body["team_id"]
            .as_str()
            .ok_or(SlackError::MalformedResponse("team_id"))?
            .to_string();
        let bot = &body["bot"];
        let bot_user_id = bot["bot_user_id"]
            .as_str()
            .ok_or(SlackError::MalformedResponse("bot.bot_user_id"))?
            .to_string();
        let bot_access_token = bot["bot_access_token"]
            .as_str()
            .ok_or(SlackError::MalformedResponse("bot.bot_access_token"))?
            .to_string();

        Ok(BotCredential {
            team_id,
            bot_user_id,
            bot_access_token,
        })
    }

    /// リアルタイムイベントストリームのWebSocket URLを取得する
    pub async fn rtm_connect(&self, token: &str) -> Result<String, SlackError> {
        let body = self.call("rtm.connect", &[("token", token)]).await?;
        body["url"]
            .as_str()
            .map(str::to_string)
            .ok_or(SlackError::MalformedResponse("url"))
    }

    pub async fn post_message(
        &self,
        token: &str,
        channel_id: &str,
        text: &str,
    ) -> Result<(), SlackError> {
        self.call(
            "chat.postMessage",
            &[("token", token), ("channel", channel_id), ("text", text)],
        )
        .await
        .map(|_| ())
    }

    /// ボタン付きメッセージの投稿。attachmentsはJSON文字列として渡す
    pub async fn post_interactive(
        &self,
        token: &str,
        channel_id: &str,
        text: &str,
        attachments: &Value,
    ) -> Result<(), SlackError> {
        let attachments_json = attachments.to_string();
        self.call(
            "chat.postMessage",
            &[
                ("token", token),
                ("channel", channel_id),
                ("text", text),
                ("attachments", &attachments_json),
            ],
        )
        .await
        .map(|_| ())
    }

    /// response_urlへの本人だけに見える返信。応答はJSONとは限らないので
    /// HTTPステータスだけを見る
    pub async fn post_ephemeral(&self, response_url: &str, text: &str) -> Result<(), SlackError> {
        let response = self
            .client
            .post(response_url)
            .json(&json!({
                "text": text,
                "response_type": "ephemeral",
                "replace_original": false,
            }))
            .send()
            .await
            .map_err(|e| SlackError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SlackError::ApiError {
                method: "response_url".to_string(),
                error: response.status().to_string(),
            });
        }
        Ok(())
    }

    /// チャンネルの参加者ID一覧
    pub async fn channel_members(
        &self,
        token: &str,
        channel_id: &str,
    ) -> Result<Vec<String>, SlackError> {
        let body = self
            .call(
                "conversations.members",
                &[("token", token), ("channel", channel_id)],
            )
            .await?;

        let members = body["members"]
            .as_array()
            .ok_or(SlackError::MalformedResponse("members"))?
            .iter()
            .filter_map(|member| member.as_str().map(str::to_string))
            .collect();
        Ok(members)
    }
}

impl Default for SlackClient {
    fn default() -> Self {
        Self::new()
    }
}
