use axum::http;
use dotenvy::dotenv;
use env_logger::Builder;
use log::LevelFilter;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

use onenight_server::app;

// ログ設定
fn init_logger() {
    let mut builder = Builder::new();
    builder
        .filter_level(LevelFilter::Info)
        .filter_module("onenight_server", LevelFilter::Debug)
        .format_timestamp(Some(env_logger::TimestampPrecision::Millis))
        .format_target(true)
        .init();
}

#[tokio::main]
async fn main() {
    // 環境変数をロード
    if let Err(e) = dotenv() {
        eprintln!("Warning: .envファイルの読み込みに失敗しました: {}", e);
    }

    init_logger();

    // 環境変数の存在確認
    for var in &["SLACK_CLIENT_ID", "SLACK_CLIENT_SECRET"] {
        if std::env::var(var).is_err() {
            eprintln!("Error: 環境変数 {} が設定されていません", var);
        }
    }

    let app = app::create_app().layer(
        TraceLayer::new_for_http().make_span_with(|request: &http::Request<_>| {
            tracing::info_span!(
                "HTTP request",
                method = %request.method(),
                uri = %request.uri(),
            )
        }),
    );

    let port = std::env::var("PORT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(8000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    println!("サーバーを起動しました: http://{}", addr);
    axum::serve(listener, app).await.unwrap();
}
