use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use serde::Deserialize;

use crate::state::AppState;
use crate::utils::config::CONFIG;

pub async fn index() -> impl IntoResponse {
    Html(format!(
        "<a href=\"https://slack.com/oauth/authorize?scope=bot,commands&client_id={}\">Add to Slack</a>",
        CONFIG.slack_client_id
    ))
}

#[derive(Debug, Deserialize)]
pub struct OAuthQuery {
    code: String,
}

pub async fn oauth_callback(
    State(state): State<AppState>,
    Query(query): Query<OAuthQuery>,
) -> impl IntoResponse {
    match state
        .slack
        .oauth_access(
            &CONFIG.slack_client_id,
            &CONFIG.slack_client_secret,
            &query.code,
        )
        .await
    {
        Ok(credential) => {
            log::info!("Installed for team {}", credential.team_id);
            state.store_credential(credential).await;
            (
                StatusCode::OK,
                Html(
                    "One Night Werewolf is installed. Run /onenight in a channel to play."
                        .to_string(),
                ),
            )
        }
        Err(e) => {
            log::error!("OAuth exchange failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Html("The install handshake with Slack failed.".to_string()),
            )
        }
    }
}
