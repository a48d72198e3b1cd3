use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{participant::ParticipantKey, role::Role};
use crate::utils::gate::CompletionGate;

/// 1つの夜アクションの進行状態。確認済みメンバーの集合と、依存する
/// フェーズを起こすためのゲートを持つ
pub struct PhaseState {
    confirmed: Mutex<HashSet<String>>,
    pub gate: CompletionGate,
}

impl PhaseState {
    pub fn new() -> Self {
        PhaseState {
            confirmed: Mutex::new(HashSet::new()),
            gate: CompletionGate::new(),
        }
    }

    /// 確認を記録する。戻り値は新規追加だったかどうか。集合は増える
    /// 一方で、取り消しはない
    pub async fn record(&self, user_id: &str) -> bool {
        self.confirmed.lock().await.insert(user_id.to_string())
    }

    /// 期待される参加者が全員確認済みならゲートを開ける。判定は1つの
    /// ロック区間で行うので、ほぼ同時に届いた最後の2人が揃って完了を
    /// 見落とすことはない
    pub async fn evaluate(&self, expected: &[String]) {
        let confirmed = self.confirmed.lock().await;
        if expected.iter().all(|id| confirmed.contains(id)) {
            self.gate.fire();
        }
    }

    pub async fn confirmed_count(&self) -> usize {
        self.confirmed.lock().await.len()
    }
}

impl Default for PhaseState {
    fn default() -> Self {
        Self::new()
    }
}

/// 進行中のゲーム1つ分の状態。session_idは全ボタンのコールバックIDに
/// 埋め込まれ、押下をこのセッションへ引き戻すのに使われる
pub struct GameSession {
    pub session_id: String,
    pub channel_id: String,
    pub bot_user_id: String,
    pub token: String,
    roster: Mutex<Vec<String>>,
    roles: Mutex<Option<HashMap<ParticipantKey, Role>>>,
    pub reveal: PhaseState,
    pub werewolf: PhaseState,
    pub seer: PhaseState,
    lone_wolf_looked: Mutex<bool>,
}

impl GameSession {
    pub fn new(channel_id: String, bot_user_id: String, token: String) -> Self {
        GameSession {
            session_id: Uuid::new_v4().to_string(),
            channel_id,
            bot_user_id,
            token,
            roster: Mutex::new(Vec::new()),
            roles: Mutex::new(None),
            reveal: PhaseState::new(),
            werewolf: PhaseState::new(),
            seer: PhaseState::new(),
            lone_wolf_looked: Mutex::new(false),
        }
    }

    /// ロスターを確定する。以後の参加・離脱は反映しない
    pub async fn set_roster(&self, roster: Vec<String>) {
        *self.roster.lock().await = roster;
    }

    pub async fn roster(&self) -> Vec<String> {
        self.roster.lock().await.clone()
    }

    /// 配役を確定する。一度配ったら変更されない
    pub async fn deal(&self, assignment: HashMap<ParticipantKey, Role>) {
        *self.roles.lock().await = Some(assignment);
    }

    pub async fn is_dealt(&self) -> bool {
        self.roles.lock().await.is_some()
    }

    pub async fn role_of(&self, key: &ParticipantKey) -> Option<Role> {
        self.roles.lock().await.as_ref()?.get(key).copied()
    }

    /// 指定の役職を持つロスターメンバーをロスター順で返す。
    /// 中央カードは誰の手にもないので含まれない
    pub async fn holders_of(&self, role: Role) -> Vec<String> {
        let roster = self.roster.lock().await;
        let roles = self.roles.lock().await;
        let Some(roles) = roles.as_ref() else {
            return Vec::new();
        };
        roster
            .iter()
            .filter(|id| roles.get(&ParticipantKey::Player((*id).clone())) == Some(&role))
            .cloned()
            .collect()
    }

    pub async fn center_role(&self, slot: u8) -> Option<Role> {
        self.roles.lock().await.as_ref()?.get(&ParticipantKey::Center(slot)).copied()
    }

    /// 一匹狼ののぞき見ガード。trueを返すのは最初の一回だけで、チェックと
    /// セットは1つのロック区間で行われる
    pub async fn try_mark_lone_wolf_looked(&self) -> bool {
        let mut looked = self.lone_wolf_looked.lock().await;
        if *looked {
            false
        } else {
            *looked = true;
            true
        }
    }
}
