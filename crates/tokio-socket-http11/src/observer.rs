//! リクエストのライフサイクル通知
//!
//! 通知は次の順で届く。
//!
//! 1. `load_start`
//! 2. `first_byte` (最初のレスポンスバイトを受け取ったとき、最大 1 回)
//! 3. `headers_received` / `before_redirect` (ホップごと、0 回以上)
//! 4. `load_end`
//! 5. `load` か `error` のどちらか一方だけ
//!
//! `headers_received` と `before_redirect` は `false` を返すとリクエストを中断する。

use socket_http11::{Headers, LoadResult, Response};
use tokio::sync::mpsc::UnboundedSender;

use crate::error::Error;

/// ライフサイクル通知を受け取るオブザーバー
///
/// すべてのメソッドに既定の実装があるので、必要なものだけ実装すればよい。
pub trait RequestObserver: Send {
    /// リクエスト開始
    fn load_start(&mut self, _url: &str) {}

    /// 最初のレスポンスバイトを受信
    fn first_byte(&mut self) {}

    /// ステータス行とヘッダーを受信 (`false` で中断)
    fn headers_received(&mut self, _status: u16, _headers: &Headers) -> bool {
        true
    }

    /// リダイレクトの直前 (`false` で中断)
    fn before_redirect(&mut self, _response: &Response, _location: &str) -> bool {
        true
    }

    /// リクエスト終了 (成功・失敗を問わない)
    fn load_end(&mut self) {}

    /// 成功
    fn load(&mut self, _result: &LoadResult) {}

    /// 失敗
    fn error(&mut self, _error: &Error) {}
}

/// 何もしないオブザーバー
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RequestObserver for NoopObserver {}

/// チャネルに流すライフサイクルイベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadEvent {
    /// リクエスト開始
    LoadStart { url: String },
    /// 最初のレスポンスバイト
    FirstByte,
    /// ヘッダー受信
    HeadersReceived { status: u16 },
    /// リダイレクト直前
    BeforeRedirect { status: u16, location: String },
    /// リクエスト終了
    LoadEnd,
    /// 成功 (最終ステータス)
    Load { status: u16 },
    /// 失敗
    Error { code: i32, message: String },
}

/// イベントをチャネルに送るオブザーバー
///
/// 受信側が閉じていても送信エラーは無視する。キャンセルはしない。
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: UnboundedSender<LoadEvent>,
}

impl ChannelObserver {
    /// 送信側から作成
    pub fn new(tx: UnboundedSender<LoadEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: LoadEvent) {
        let _ = self.tx.send(event);
    }
}

impl RequestObserver for ChannelObserver {
    fn load_start(&mut self, url: &str) {
        self.send(LoadEvent::LoadStart {
            url: url.to_string(),
        });
    }

    fn first_byte(&mut self) {
        self.send(LoadEvent::FirstByte);
    }

    fn headers_received(&mut self, status: u16, _headers: &Headers) -> bool {
        self.send(LoadEvent::HeadersReceived { status });
        true
    }

    fn before_redirect(&mut self, response: &Response, location: &str) -> bool {
        self.send(LoadEvent::BeforeRedirect {
            status: response.status,
            location: location.to_string(),
        });
        true
    }

    fn load_end(&mut self) {
        self.send(LoadEvent::LoadEnd);
    }

    fn load(&mut self, result: &LoadResult) {
        self.send(LoadEvent::Load {
            status: result.response.status,
        });
    }

    fn error(&mut self, error: &Error) {
        self.send(LoadEvent::Error {
            code: error.code(),
            message: error.to_string(),
        });
    }
}
