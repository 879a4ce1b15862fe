//! 受信したレスポンスと読み込み結果

use std::borrow::Cow;

use crate::decompress::decode_body;
use crate::error::Result;
use crate::headers::Headers;
use crate::parser::ParsedResponse;
use crate::redirect::RedirectSet;
use crate::stats::RequestStats;

/// HTTP レスポンス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// このレスポンスを返したリクエストの URL
    pub url: String,
    /// HTTP バージョン (HTTP/1.1 等)
    pub version: String,
    /// ステータスコード (200, 404, etc.)
    pub status: u16,
    /// ステータスフレーズ (OK, Not Found, etc.)
    pub status_text: String,
    /// ヘッダー (同じ名前は `"; "` で連結)
    pub headers: Headers,
    /// 受信したままのヘッダー行
    pub raw_headers: Vec<(String, String)>,
    /// ボディ (Content-Encoding 展開済み)
    pub body: Vec<u8>,
    /// タイミング
    pub stats: RequestStats,
}

impl Response {
    /// パース結果から組み立てる
    ///
    /// Content-Encoding が gzip / deflate ならここで展開する。
    pub fn from_parsed(parsed: ParsedResponse, url: &str, stats: RequestStats) -> Result<Self> {
        let body = decode_body(&parsed.headers, parsed.body)?;
        Ok(Self {
            url: url.to_string(),
            version: parsed.version,
            status: parsed.status,
            status_text: parsed.status_text,
            headers: parsed.headers,
            raw_headers: parsed.raw_headers,
            body,
            stats,
        })
    }

    /// ヘッダーを取得 (大文字小文字を区別しない)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Set-Cookie を 1 行ずつ取得
    pub fn set_cookies(&self) -> Vec<&str> {
        self.raw_headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case("Set-Cookie"))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// WWW-Authenticate を 1 行ずつ取得
    pub fn www_authenticate(&self) -> Vec<&str> {
        self.raw_headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case("WWW-Authenticate"))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Location ヘッダー
    pub fn location(&self) -> Option<&str> {
        self.header("Location")
    }

    /// Content-Type ヘッダー
    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    /// ボディを文字列として取得 (不正な UTF-8 は置換)
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// ステータスコードが成功 (2xx) か確認
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// ステータスコードがリダイレクト (3xx) か確認
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// ステータスコードがクライアントエラー (4xx) か確認
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// ステータスコードがサーバーエラー (5xx) か確認
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }
}

/// リクエスト完了時の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult {
    /// 最終レスポンス
    pub response: Response,
    /// 経由したリダイレクト (古い順)
    pub redirects: RedirectSet,
}
