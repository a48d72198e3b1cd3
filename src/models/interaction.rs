use serde::{Deserialize, Serialize};

/// コールバックIDの名前空間。Slack側に埋め込む識別子の先頭に付く
pub const CALLBACK_NAMESPACE: &str = "onenight";

/// ボタンが属する夜アクションの種別。ここにない種別は受け付けない
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionTag {
    Reveal,
    Werewolf,
    LoneWolf,
    Seer,
}

impl ActionTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionTag::Reveal => "reveal",
            ActionTag::Werewolf => "werewolf",
            ActionTag::LoneWolf => "lonewolf",
            ActionTag::Seer => "seer",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "reveal" => Some(ActionTag::Reveal),
            "werewolf" => Some(ActionTag::Werewolf),
            "lonewolf" => Some(ActionTag::LoneWolf),
            "seer" => Some(ActionTag::Seer),
            _ => None,
        }
    }
}

/// ボタンに埋め込まれる `onenight:{tag}:{session_id}` 形式のID。
/// 押下がどのセッションのどのアクションかをこれだけで判別できる
#[derive(Debug, Clone, PartialEq)]
pub struct CallbackId {
    pub tag: ActionTag,
    pub session_id: String,
}

impl CallbackId {
    pub fn new(tag: ActionTag, session_id: &str) -> Self {
        CallbackId {
            tag,
            session_id: session_id.to_string(),
        }
    }

    pub fn encode(&self) -> String {
        format!(
            "{}:{}:{}",
            CALLBACK_NAMESPACE,
            self.tag.as_str(),
            self.session_id
        )
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.splitn(3, ':');
        let namespace = parts.next()?;
        let tag = parts.next()?;
        let session_id = parts.next()?;
        if namespace != CALLBACK_NAMESPACE || session_id.is_empty() {
            return None;
        }
        Some(CallbackId {
            tag: ActionTag::parse(tag)?,
            session_id: session_id.to_string(),
        })
    }
}

/// ルーターからセッションへ渡す、デコード済みのボタン押下イベント
#[derive(Debug, Clone)]
pub struct InboundInteraction {
    pub tag: ActionTag,
    pub session_id: String,
    pub user_id: String,
    pub response_url: String,
    pub value: Option<String>,
}

/// SlackのインタラクティブメッセージWebhookのペイロード（読む部分だけ）
#[derive(Debug, Deserialize)]
pub struct InteractionPayload {
    pub callback_id: String,
    pub user: PayloadUser,
    pub response_url: String,
    #[serde(default)]
    pub actions: Vec<PayloadAction>,
}

#[derive(Debug, Deserialize)]
pub struct PayloadUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct PayloadAction {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}
