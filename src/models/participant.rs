use serde::{Deserialize, Serialize};
use std::fmt;

/// 配役マップのキー。ロスターのプレイヤーか、誰にも配られない中央カード
/// (0〜2) のどちらか。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticipantKey {
    Player(String),
    Center(u8),
}

impl fmt::Display for ParticipantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipantKey::Player(id) => write!(f, "{}", id),
            ParticipantKey::Center(slot) => write!(f, "center card {}", slot + 1),
        }
    }
}
