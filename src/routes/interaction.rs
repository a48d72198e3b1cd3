use axum::{extract::State, http::StatusCode, response::IntoResponse, Form};
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ButtonWebhook {
    pub payload: String,
}

/// ボタン押下のWebhook。ルーティングできない押下も200で受ける。
/// 古いメッセージのボタンが押されるのは異常ではない
pub async fn button(
    State(state): State<AppState>,
    Form(form): Form<ButtonWebhook>,
) -> impl IntoResponse {
    state.dispatch_interaction(&form.payload).await;
    StatusCode::OK
}
