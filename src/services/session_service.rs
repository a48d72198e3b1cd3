use std::sync::Arc;
use tokio::sync::mpsc;

use crate::models::credential::BotCredential;
use crate::models::interaction::InboundInteraction;
use crate::models::participant::ParticipantKey;
use crate::models::role::Role;
use crate::models::session::GameSession;
use crate::services::{night_service, role_service, slack_service::SlackError};
use crate::state::AppState;
use crate::utils::rtm;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("プレイヤー数が範囲外です: {0}人")]
    InvalidRosterSize(usize),
    #[error("役職がまだ配られていません")]
    NotDealt,
    #[error("{0}にはこのゲームのカードがありません")]
    UnknownParticipant(String),
    #[error(transparent)]
    Slack(#[from] SlackError),
    #[error("RTM接続エラー: {0}")]
    Rtm(String),
    #[error("フェーズタスクの実行に失敗しました: {0}")]
    PhaseTaskFailed(String),
}

/// /onenightコマンドからゲームセッションを1つ起動する。ルーターへの
/// 登録を済ませてからセッション本体をバックグラウンドに送り出し、
/// session_idを返す
pub async fn launch_game(state: AppState, credential: BotCredential, channel_id: String) -> String {
    let session = Arc::new(GameSession::new(
        channel_id,
        credential.bot_user_id,
        credential.bot_access_token,
    ));
    let (tx, rx) = mpsc::unbounded_channel();
    state.register_session(&session.session_id, tx).await;

    let session_id = session.session_id.clone();
    tokio::spawn(async move {
        if let Err(e) = run_session(&state, session.clone(), rx).await {
            log::error!("Game session {} aborted: {}", session.session_id, e);
        }
        // 夜が明けても接続が切れても、必ずルーターから消す
        state.remove_session(&session.session_id).await;
        log::info!("Game session {} closed", session.session_id);
    });
    session_id
}

/// セッション1つ分の一生。RTM接続、ロスター解決、配役、夜フェーズ
async fn run_session(
    state: &AppState,
    session: Arc<GameSession>,
    interactions: mpsc::UnboundedReceiver<InboundInteraction>,
) -> Result<(), GameError> {
    let slack = state.slack.clone();

    let ws_url = slack.rtm_connect(&session.token).await?;
    let mut ws = rtm::connect(&ws_url).await?;
    rtm::send_channel_message(&mut ws, &session.channel_id, "Game started!").await?;

    slack
        .post_message(
            &session.token,
            &session.channel_id,
            "Checking who's in the channel...",
        )
        .await?;

    // ロスターの解決。ボット自身は数えない
    let members = slack
        .channel_members(&session.token, &session.channel_id)
        .await?;
    let roster: Vec<String> = members
        .into_iter()
        .filter(|id| *id != session.bot_user_id)
        .collect();

    let assignment = match role_service::assign_roles(&roster) {
        Ok(assignment) => assignment,
        Err(GameError::InvalidRosterSize(found)) => {
            // 人数が合わないのはエラー扱いにせず、伝えて店じまいする
            let text = format!(
                "One Night Werewolf needs {} to {} players, but this channel has {}. Game's off!",
                role_service::MIN_PLAYERS,
                role_service::MAX_PLAYERS,
                found
            );
            slack
                .post_message(&session.token, &session.channel_id, &text)
                .await?;
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    session.set_roster(roster).await;
    session.deal(assignment).await;
    log::info!(
        "Roles dealt for session {} in channel {}",
        session.session_id,
        session.channel_id
    );

    // 夜フェーズ一式と受信ループを並走させる。接続が切れたら夜は打ち切り
    tokio::select! {
        result = night_service::run_night(session.clone(), slack.clone(), interactions) => result?,
        _ = rtm::run_event_loop(ws) => {
            log::warn!("RTM connection closed mid-game for session {}", session.session_id);
        }
    }
    Ok(())
}

/// 配役後の参加者の役職を引く。配役前に呼ぶとNotDealt
pub async fn lookup_participant_role(
    session: &GameSession,
    key: &ParticipantKey,
) -> Result<Role, GameError> {
    if !session.is_dealt().await {
        return Err(GameError::NotDealt);
    }
    session
        .role_of(key)
        .await
        .ok_or_else(|| GameError::UnknownParticipant(key.to_string()))
}
