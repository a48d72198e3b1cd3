use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{sleep, Duration};

use crate::models::interaction::{ActionTag, CallbackId, InboundInteraction};
use crate::models::participant::ParticipantKey;
use crate::models::role::Role;
use crate::models::session::GameSession;
use crate::services::session_service::{self, GameError};
use crate::services::slack_service::SlackClient;

/// 起きる人が誰もいないフェーズを先へ進めるためのフォールバック待ち時間
const EMPTY_PHASE_FALLBACK_SECS: u64 = 10;

/// 夜フェーズ一式を起動して完了まで待つ。各フェーズは夜の開始時に
/// まとめてタスクとして走り出し、前提フェーズのゲートで待ち合わせる。
/// ボタン押下は受信ループがフェーズ別ハンドラへ振り分ける。
/// 外向きの呼び出しが1つでも失敗したらこの夜ごと終わる
pub async fn run_night(
    session: Arc<GameSession>,
    slack: SlackClient,
    mut interactions: mpsc::UnboundedReceiver<InboundInteraction>,
) -> Result<(), GameError> {
    let mut phases = JoinSet::new();
    phases.spawn(reveal_phase(session.clone(), slack.clone()));
    phases.spawn(werewolf_phase(session.clone(), slack.clone()));
    phases.spawn(seer_phase(session.clone(), slack.clone()));

    let interaction_loop = async {
        while let Some(interaction) = interactions.recv().await {
            handle_interaction(&session, &slack, interaction).await?;
        }
        // 送信側はセッションが登録から外れるまで生きている
        Ok::<(), GameError>(())
    };

    // どちらかがエラーになった時点で残りのフェーズタスクごと破棄される
    tokio::select! {
        result = drain_phases(&mut phases) => result?,
        result = interaction_loop => result?,
    }

    slack
        .post_message(
            &session.token,
            &session.channel_id,
            "The sun rises. Everyone, wake up and open your eyes!",
        )
        .await?;
    Ok(())
}

async fn drain_phases(phases: &mut JoinSet<Result<(), GameError>>) -> Result<(), GameError> {
    while let Some(joined) = phases.join_next().await {
        joined.map_err(|e| GameError::PhaseTaskFailed(e.to_string()))??;
    }
    Ok(())
}

/// 第1フェーズ: 全員が自分のカードを確認する
async fn reveal_phase(session: Arc<GameSession>, slack: SlackClient) -> Result<(), GameError> {
    let callback = CallbackId::new(ActionTag::Reveal, &session.session_id);
    slack
        .post_interactive(
            &session.token,
            &session.channel_id,
            "Night falls. Everyone, look at your own card.",
            &button_attachments(&callback, "look", "Look at your card"),
        )
        .await?;

    session.reveal.gate.wait().await;
    Ok(())
}

/// 第2フェーズ: 人狼が起きて相方を探す。全員の確認が済んでから始まる
async fn werewolf_phase(session: Arc<GameSession>, slack: SlackClient) -> Result<(), GameError> {
    session.reveal.gate.wait().await;

    let wolves = session.holders_of(Role::Werewolf).await;
    let attachments = if wolves.len() == 1 {
        // 一匹狼は相方探しの代わりに中央カードを1枚のぞける
        center_pick_attachments(&CallbackId::new(ActionTag::LoneWolf, &session.session_id))
    } else {
        button_attachments(
            &CallbackId::new(ActionTag::Werewolf, &session.session_id),
            "wake",
            "Wake up",
        )
    };
    slack
        .post_interactive(
            &session.token,
            &session.channel_id,
            "Werewolves, wake up and look for your partner.",
            &attachments,
        )
        .await?;

    if wolves.is_empty() {
        // 人狼カードが2枚とも中央に落ちた夜。誰も起きないので
        // タイマーだけがこのフェーズを進められる
        log::info!(
            "No human werewolf in session {}; falling back to the timer",
            session.session_id
        );
        sleep(Duration::from_secs(EMPTY_PHASE_FALLBACK_SECS)).await;
        session.werewolf.gate.fire();
    }

    session.werewolf.gate.wait().await;
    Ok(())
}

/// 第3フェーズ: 占い師が起きて中央カードを1枚見る。人狼フェーズの後
async fn seer_phase(session: Arc<GameSession>, slack: SlackClient) -> Result<(), GameError> {
    session.werewolf.gate.wait().await;

    let seers = session.holders_of(Role::Seer).await;
    slack
        .post_interactive(
            &session.token,
            &session.channel_id,
            "Seer, wake up. You may look at one card in the center.",
            &center_pick_attachments(&CallbackId::new(ActionTag::Seer, &session.session_id)),
        )
        .await?;

    if seers.is_empty() {
        // 占い師カードが中央にある夜
        log::info!(
            "Seer card is in the center for session {}; falling back to the timer",
            session.session_id
        );
        sleep(Duration::from_secs(EMPTY_PHASE_FALLBACK_SECS)).await;
        session.seer.gate.fire();
    }

    session.seer.gate.wait().await;
    Ok(())
}

/// 受信ループから呼ばれる入口。アクション種別ごとの固定テーブルで
/// フェーズ別ハンドラへ振り分ける
pub async fn handle_interaction(
    session: &GameSession,
    slack: &SlackClient,
    interaction: InboundInteraction,
) -> Result<(), GameError> {
    match interaction.tag {
        ActionTag::Reveal => handle_reveal(session, slack, interaction).await,
        ActionTag::Werewolf => handle_werewolf(session, slack, interaction).await,
        ActionTag::LoneWolf => handle_lone_wolf(session, slack, interaction).await,
        ActionTag::Seer => handle_seer(session, slack, interaction).await,
    }
}

async fn handle_reveal(
    session: &GameSession,
    slack: &SlackClient,
    interaction: InboundInteraction,
) -> Result<(), GameError> {
    let key = ParticipantKey::Player(interaction.user_id.clone());
    let role = match session_service::lookup_participant_role(session, &key).await {
        Ok(role) => role,
        Err(_) => {
            // ロスター外からの押下。状態は変えずに断るだけ
            slack
                .post_ephemeral(&interaction.response_url, "You are not in this game.")
                .await?;
            return Ok(());
        }
    };

    // 二度押しは同じ結果をもう一度見せるだけで、何も変わらない
    session.reveal.record(&interaction.user_id).await;
    slack
        .post_ephemeral(
            &interaction.response_url,
            &format!("You are the *{}*. Keep it to yourself.", role),
        )
        .await?;

    let roster = session.roster().await;
    session.reveal.evaluate(&roster).await;
    Ok(())
}

async fn handle_werewolf(
    session: &GameSession,
    slack: &SlackClient,
    interaction: InboundInteraction,
) -> Result<(), GameError> {
    let wolves = session.holders_of(Role::Werewolf).await;
    if !wolves.contains(&interaction.user_id) {
        slack
            .post_ephemeral(
                &interaction.response_url,
                "You are not a werewolf. Go back to sleep.",
            )
            .await?;
        return Ok(());
    }
    if wolves.len() < 2 {
        // 一匹狼はこちらではなく中央カードののぞき見に誘導される
        slack
            .post_ephemeral(
                &interaction.response_url,
                "You are the only werewolf tonight. Peek at a center card instead.",
            )
            .await?;
        return Ok(());
    }

    session.werewolf.record(&interaction.user_id).await;
    let partners: Vec<String> = wolves
        .iter()
        .filter(|id| **id != interaction.user_id)
        .map(|id| format!("<@{}>", id))
        .collect();
    slack
        .post_ephemeral(
            &interaction.response_url,
            &format!("Your fellow werewolf is {}.", partners.join(", ")),
        )
        .await?;

    session.werewolf.evaluate(&wolves).await;
    Ok(())
}

async fn handle_lone_wolf(
    session: &GameSession,
    slack: &SlackClient,
    interaction: InboundInteraction,
) -> Result<(), GameError> {
    let wolves = session.holders_of(Role::Werewolf).await;
    if wolves.len() != 1 || wolves[0] != interaction.user_id {
        slack
            .post_ephemeral(
                &interaction.response_url,
                "You are not the lone werewolf. Go back to sleep.",
            )
            .await?;
        return Ok(());
    }

    let Some(slot) = center_slot(&interaction) else {
        log::warn!(
            "Malformed center slot value in session {}; dropping",
            session.session_id
        );
        return Ok(());
    };

    // のぞき見は一度きり。チェックとセットは不可分なので、同時の
    // 二度押しが両方とも通ることはない
    if !session.try_mark_lone_wolf_looked().await {
        slack
            .post_ephemeral(
                &interaction.response_url,
                "You already peeked at a center card.",
            )
            .await?;
        return Ok(());
    }

    let role = session.center_role(slot).await.ok_or(GameError::NotDealt)?;
    session.werewolf.record(&interaction.user_id).await;
    slack
        .post_ephemeral(
            &interaction.response_url,
            &format!(
                "You are the only werewolf tonight. Center card {} is the *{}*.",
                slot + 1,
                role
            ),
        )
        .await?;

    session.werewolf.evaluate(&wolves).await;
    Ok(())
}

async fn handle_seer(
    session: &GameSession,
    slack: &SlackClient,
    interaction: InboundInteraction,
) -> Result<(), GameError> {
    let seers = session.holders_of(Role::Seer).await;
    if !seers.contains(&interaction.user_id) {
        slack
            .post_ephemeral(
                &interaction.response_url,
                "You are not the seer. Go back to sleep.",
            )
            .await?;
        return Ok(());
    }

    let Some(slot) = center_slot(&interaction) else {
        log::warn!(
            "Malformed center slot value in session {}; dropping",
            session.session_id
        );
        return Ok(());
    };

    // 確認集合がそのまま一度きりガードを兼ねる。挿入は不可分なので
    // 同時の二度押しが両方とも通ることはない
    if !session.seer.record(&interaction.user_id).await {
        slack
            .post_ephemeral(
                &interaction.response_url,
                "You already used your power tonight.",
            )
            .await?;
        return Ok(());
    }

    let role = session.center_role(slot).await.ok_or(GameError::NotDealt)?;
    slack
        .post_ephemeral(
            &interaction.response_url,
            &format!("Center card {} is the *{}*.", slot + 1, role),
        )
        .await?;

    session.seer.evaluate(&seers).await;
    Ok(())
}

fn center_slot(interaction: &InboundInteraction) -> Option<u8> {
    match interaction.value.as_deref().and_then(|v| v.parse().ok()) {
        Some(slot) if slot < 3 => Some(slot),
        _ => None,
    }
}

fn button_attachments(callback: &CallbackId, name: &str, label: &str) -> Value {
    json!([{
        "text": "",
        "callback_id": callback.encode(),
        "actions": [{
            "name": name,
            "text": label,
            "type": "button",
            "value": name,
        }],
    }])
}

fn center_pick_attachments(callback: &CallbackId) -> Value {
    let actions: Vec<Value> = (0..3)
        .map(|slot| {
            json!({
                "name": "center",
                "text": format!("Center card {}", slot + 1),
                "type": "button",
                "value": slot.to_string(),
            })
        })
        .collect();
    json!([{
        "text": "",
        "callback_id": callback.encode(),
        "actions": actions,
    }])
}
