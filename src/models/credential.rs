use serde::{Deserialize, Serialize};

/// OAuthインストールで得られるボットの資格情報。team_id単位で保存される
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotCredential {
    pub team_id: String,
    pub bot_user_id: String,
    pub bot_access_token: String,
}
