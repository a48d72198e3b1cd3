use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

mod command;
mod install;
mod interaction;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // インストールページ
        // curl http://localhost:8000/
        .route("/", get(install::index))
        // OAuthコールバック
        // curl 'http://localhost:8000/oauth?code=...'
        .route("/oauth", get(install::oauth_callback))
        // スラッシュコマンドWebhook
        // curl -X POST http://localhost:8000/command -d 'command=/onenight&team_id=T1&channel_id=C1'
        .route("/command", post(command::slash_command))
        // ボタンWebhook
        // curl -X POST http://localhost:8000/button -d 'payload={...}'
        .route("/button", post(interaction::button))
        .with_state(state)
}
