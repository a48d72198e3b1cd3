use tokio::sync::watch;

/// 一度だけ開くゲート。フェーズの完了シグナルとして使い、待っている
/// タスク全員を同時に起こす。開いた後にもう一度fireしても何も起きず、
/// 閉じ直すこともできない
pub struct CompletionGate {
    tx: watch::Sender<bool>,
}

impl CompletionGate {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        CompletionGate { tx }
    }

    pub fn fire(&self) {
        self.tx.send_replace(true);
    }

    pub fn fired(&self) -> bool {
        *self.tx.borrow()
    }

    /// ゲートが開くまで待つ。既に開いていれば即座に戻る
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // 送信側はself自身が持っているので、待機中に閉じられることはない
        let _ = rx.wait_for(|fired| *fired).await;
    }
}

impl Default for CompletionGate {
    fn default() -> Self {
        Self::new()
    }
}
