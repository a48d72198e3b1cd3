use axum::{extract::State, http::StatusCode, response::IntoResponse, Form};
use serde::Deserialize;

use crate::services::session_service;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SlashCommand {
    pub command: String,
    pub team_id: String,
    pub channel_id: String,
}

/// /onenightでゲームを起動する。Webhookへの応答は同期で返し、
/// ゲーム本体はバックグラウンドで走る
pub async fn slash_command(
    State(state): State<AppState>,
    Form(form): Form<SlashCommand>,
) -> impl IntoResponse {
    if form.command != "/onenight" {
        return (StatusCode::OK, String::new());
    }

    let Some(credential) = state.credential_for(&form.team_id).await else {
        return (
            StatusCode::OK,
            "This workspace has no GM installed. Visit the install page first.".to_string(),
        );
    };

    let session_id =
        session_service::launch_game(state.clone(), credential, form.channel_id.clone()).await;
    log::info!(
        "Launched game session {} in channel {}",
        session_id,
        form.channel_id
    );

    (StatusCode::OK, "Summoning a GM...".to_string())
}
