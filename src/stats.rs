//! 接続とリクエストのタイミング

use std::time::Duration;

/// 1 ホップ分のタイミング
///
/// 計測していない区間は `None`。TLS は平文接続では常に `None`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestStats {
    /// 名前解決
    pub dns: Option<Duration>,
    /// TCP 接続 (名前解決を含まない)
    pub connect: Option<Duration>,
    /// TLS ハンドシェイク
    pub tls: Option<Duration>,
    /// リクエストの書き込み
    pub send: Option<Duration>,
    /// 書き込み完了から最初のバイトまで
    pub wait: Option<Duration>,
    /// 最初のバイトからレスポンス完了まで
    pub receive: Option<Duration>,
}

impl RequestStats {
    /// 計測済み区間の合計
    pub fn total(&self) -> Duration {
        [
            self.dns,
            self.connect,
            self.tls,
            self.send,
            self.wait,
            self.receive,
        ]
        .into_iter()
        .flatten()
        .sum()
    }

    /// 区間をミリ秒で並べる (dns, connect, tls, send, wait, receive)
    ///
    /// 計測していない区間は -1。
    pub fn as_millis(&self) -> [f64; 6] {
        [
            self.dns,
            self.connect,
            self.tls,
            self.send,
            self.wait,
            self.receive,
        ]
        .map(|d| d.map_or(-1.0, |d| d.as_secs_f64() * 1000.0))
    }
}
