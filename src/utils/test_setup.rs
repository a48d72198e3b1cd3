use dotenvy::dotenv;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn setup_test_env() {
    INIT.call_once(|| {
        dotenv().ok();
        // バックアップ値を設定（.envファイルが存在しない場合のデフォルト値）
        if std::env::var("SLACK_CLIENT_ID").is_err() {
            std::env::set_var("SLACK_CLIENT_ID", "test-client-id");
        }
        if std::env::var("SLACK_CLIENT_SECRET").is_err() {
            std::env::set_var("SLACK_CLIENT_SECRET", "test-client-secret");
        }
    });
}
