//! HTTP/1.1 レスポンスパーサー
//!
//! Sans I/O 設計のインクリメンタルパーサー。
//! ソケットから届いた断片をそのまま [`ResponseParser::feed`] に渡すと、
//! `Status` → `Headers` → `Body` → `Done` と状態が進む。
//!
//! ## 使い方
//!
//! ```rust
//! use socket_http11::{ParserState, ResponseParser};
//!
//! let mut parser = ResponseParser::new();
//! assert_eq!(parser.feed(b"HTTP/1.1 200 OK\r\nTransfer-").unwrap(), ParserState::Headers);
//! assert_eq!(
//!     parser.feed(b"Encoding: chunked\r\n\r\n5\r\nhel").unwrap(),
//!     ParserState::Body
//! );
//! assert_eq!(parser.feed(b"lo\r\n0\r\n\r\n").unwrap(), ParserState::Done);
//!
//! let response = parser.take_response();
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body, b"hello");
//! ```
//!
//! ステータス行とヘッダーのエラーは致命的で `Err` を返す。
//! 不正なチャンクサイズ行はログに残して読み飛ばし、同じ断片の続きから読み続ける。
//! chunked の行長が上限を超えた場合はその断片を捨てて読み続ける。

mod chunked;
mod head;
mod state;

pub use chunked::ChunkedDecoder;
pub use head::{
    StatusLine, content_length, is_chunked, join_repeated, parse_header_block, parse_status_line,
};
pub use state::{BodyKind, ParserState};

use crate::byte_util::{find_headers_end, find_line_end};
use crate::error::{Error, Result};
use crate::headers::Headers;
use crate::limits::ParserLimits;

/// パース済みレスポンス (展開前)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedResponse {
    /// HTTP バージョン
    pub version: String,
    /// ステータスコード
    pub status: u16,
    /// ステータスフレーズ
    pub status_text: String,
    /// 同じ名前を `"; "` で連結したヘッダー
    pub headers: Headers,
    /// 受信したままのヘッダー行
    pub raw_headers: Vec<(String, String)>,
    /// ボディ (Content-Encoding は未適用)
    pub body: Vec<u8>,
}

/// HTTP レスポンスパーサー (Sans I/O)
#[derive(Debug)]
pub struct ResponseParser {
    state: ParserState,
    /// ステータス行とヘッダーの未処理バイト
    buf: Vec<u8>,
    version: String,
    status: u16,
    status_text: String,
    headers: Headers,
    raw_headers: Vec<(String, String)>,
    body_kind: BodyKind,
    chunked: ChunkedDecoder,
    body: Vec<u8>,
    /// HEAD リクエストへのレスポンスかどうか
    head_request: bool,
    bytes_received: usize,
    limits: ParserLimits,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseParser {
    /// 新しいパーサーを作成
    pub fn new() -> Self {
        Self::with_limits(ParserLimits::default())
    }

    /// 制限付きでパーサーを作成
    pub fn with_limits(limits: ParserLimits) -> Self {
        Self {
            state: ParserState::Status,
            buf: Vec::new(),
            version: String::new(),
            status: 0,
            status_text: String::new(),
            headers: Headers::new(),
            raw_headers: Vec::new(),
            body_kind: BodyKind::None,
            chunked: ChunkedDecoder::new(limits.max_chunk_line_size),
            body: Vec::new(),
            head_request: false,
            bytes_received: 0,
            limits,
        }
    }

    /// HEAD リクエストへのレスポンスとしてパースする (ボディなし)
    pub fn set_head_request(&mut self, head_request: bool) {
        self.head_request = head_request;
    }

    /// 制限設定を取得
    pub fn limits(&self) -> &ParserLimits {
        &self.limits
    }

    /// 現在の状態
    pub fn state(&self) -> ParserState {
        self.state
    }

    /// 完了したか
    pub fn is_done(&self) -> bool {
        self.state == ParserState::Done
    }

    /// ヘッダーまで読み終えたか
    pub fn has_head(&self) -> bool {
        self.state >= ParserState::Body
    }

    /// これまでに受け取ったバイト数
    pub fn bytes_received(&self) -> usize {
        self.bytes_received
    }

    /// ステータスコード
    pub fn status(&self) -> u16 {
        self.status
    }

    /// ステータスフレーズ
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// ヘッダー (ヘッダー受信後のみ有効)
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// 受信したままのヘッダー行
    pub fn raw_headers(&self) -> &[(String, String)] {
        &self.raw_headers
    }

    /// ボディの区切り方
    pub fn body_kind(&self) -> BodyKind {
        self.body_kind
    }

    /// これまでに受け取ったボディ
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// キープアライブ接続かどうかを判定
    ///
    /// close トークンがあれば false。HTTP/1.1 はデフォルトでキープアライブ。
    /// close-delimited のボディは接続を閉じないと終わらないので false。
    pub fn is_keep_alive(&self) -> bool {
        if self.body_kind == BodyKind::CloseDelimited {
            return false;
        }
        let mut has_keep_alive = false;
        for (name, value) in &self.raw_headers {
            if !name.eq_ignore_ascii_case("Connection") {
                continue;
            }
            for token in value.split(',') {
                let token = token.trim();
                if token.eq_ignore_ascii_case("close") {
                    return false;
                }
                if token.eq_ignore_ascii_case("keep-alive") {
                    has_keep_alive = true;
                }
            }
        }
        has_keep_alive || self.version.ends_with("/1.1")
    }

    /// 断片を投入する
    ///
    /// 断片を使い切るまで状態を進め、投入後の状態を返す。
    /// `Done` の後に届いたデータは無視する。
    pub fn feed(&mut self, data: &[u8]) -> Result<ParserState> {
        self.bytes_received += data.len();
        tracing::trace!(len = data.len(), state = ?self.state, "response fragment");
        match self.state {
            ParserState::Done => Ok(ParserState::Done),
            ParserState::Body => {
                self.feed_body(data)?;
                Ok(self.state)
            }
            ParserState::Status | ParserState::Headers => {
                self.buf.extend_from_slice(data);
                self.parse_head()
            }
        }
    }

    /// 接続が閉じたことを通知する
    ///
    /// close-delimited のボディはここで完了する。
    /// chunked は終端チャンクを読み終えていれば完了とみなす。
    pub fn finish(&mut self) -> ParserState {
        if self.state == ParserState::Body {
            let complete = match self.body_kind {
                BodyKind::CloseDelimited => true,
                BodyKind::Chunked => self.chunked.finish(),
                BodyKind::ContentLength(_) | BodyKind::None => false,
            };
            if complete {
                self.state = ParserState::Done;
            }
        }
        self.state
    }

    /// パース結果を取り出す
    ///
    /// ボディはムーブされるので、取り出した後のパーサーは [`Self::reset`] してから使う。
    pub fn take_response(&mut self) -> ParsedResponse {
        ParsedResponse {
            version: self.version.clone(),
            status: self.status,
            status_text: self.status_text.clone(),
            headers: self.headers.clone(),
            raw_headers: self.raw_headers.clone(),
            body: std::mem::take(&mut self.body),
        }
    }

    /// 次のホップに向けて状態を初期化する
    ///
    /// 制限設定は引き継ぐ。HEAD フラグは初期化されるので呼び出し側で設定し直す。
    pub fn reset(&mut self) {
        *self = Self::with_limits(self.limits.clone());
    }

    fn parse_head(&mut self) -> Result<ParserState> {
        loop {
            match self.state {
                ParserState::Status => {
                    let Some((end, term)) = find_line_end(&self.buf) else {
                        self.check_head_size()?;
                        return Ok(ParserState::Status);
                    };
                    let line = parse_status_line(&self.buf[..end])?;
                    self.buf.drain(..end + term);
                    tracing::debug!(status = line.status, reason = %line.status_text, "status line");
                    self.version = line.version;
                    self.status = line.status;
                    self.status_text = line.status_text;
                    self.state = ParserState::Headers;
                }
                ParserState::Headers => {
                    let Some((len, term)) = find_headers_end(&self.buf) else {
                        self.check_head_size()?;
                        return Ok(ParserState::Headers);
                    };
                    let rest = self.buf.split_off(len + term);
                    self.raw_headers = parse_header_block(&self.buf[..len]);
                    self.headers = join_repeated(&self.raw_headers);
                    self.buf.clear();

                    // 1xx (101 以外) は中間レスポンスなので読み捨てて次のステータス行へ
                    if (100..200).contains(&self.status) && self.status != 101 {
                        tracing::debug!(status = self.status, "skipping interim response");
                        self.headers = Headers::new();
                        self.raw_headers.clear();
                        self.buf = rest;
                        self.state = ParserState::Status;
                        continue;
                    }
                    return self.begin_body(&rest);
                }
                ParserState::Body | ParserState::Done => return Ok(self.state),
            }
        }
    }

    fn check_head_size(&self) -> Result<()> {
        if self.buf.len() > self.limits.max_header_size {
            return Err(Error::HeadersTooLarge {
                size: self.buf.len(),
                limit: self.limits.max_header_size,
            });
        }
        Ok(())
    }

    fn begin_body(&mut self, rest: &[u8]) -> Result<ParserState> {
        let length = content_length(&self.headers)?;
        let chunked = is_chunked(&self.headers);

        self.body_kind = if self.head_request || self.status == 204 || self.status == 304 {
            BodyKind::None
        } else if chunked {
            BodyKind::Chunked
        } else if let Some(n) = length {
            if n == 0 {
                BodyKind::None
            } else {
                BodyKind::ContentLength(n)
            }
        } else if rest.is_empty() {
            // Transfer-Encoding も Content-Length もなく、ヘッダー直後にデータがない
            BodyKind::None
        } else {
            BodyKind::CloseDelimited
        };
        tracing::debug!(body_kind = ?self.body_kind, "headers complete");

        if self.body_kind == BodyKind::None {
            self.state = ParserState::Done;
            return Ok(self.state);
        }
        self.state = ParserState::Body;
        if !rest.is_empty() {
            self.feed_body(rest)?;
        }
        Ok(self.state)
    }

    fn feed_body(&mut self, data: &[u8]) -> Result<()> {
        match self.body_kind {
            BodyKind::ContentLength(n) => {
                let take = (n - self.body.len()).min(data.len());
                self.body.extend_from_slice(&data[..take]);
                if self.body.len() >= n {
                    self.state = ParserState::Done;
                }
            }
            BodyKind::Chunked => match self.chunked.decode(data, &mut self.body) {
                Ok(true) => self.state = ParserState::Done,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "discarding malformed chunked data");
                }
            },
            BodyKind::CloseDelimited => self.body.extend_from_slice(data),
            BodyKind::None => {}
        }
        if self.body.len() > self.limits.max_body_size {
            return Err(Error::BodyTooLarge {
                size: self.body.len(),
                limit: self.limits.max_body_size,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_length_body() {
        let mut parser = ResponseParser::new();
        let state = parser
            .feed(b"HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello")
            .unwrap();
        assert_eq!(state, ParserState::Done);
        assert_eq!(parser.body(), b"hello");
        assert_eq!(parser.status_text(), "OK");
    }

    #[test]
    fn test_status_split_across_fragments() {
        let mut parser = ResponseParser::new();
        assert_eq!(parser.feed(b"HTTP/1.1 20").unwrap(), ParserState::Status);
        assert_eq!(parser.feed(b"1 Created\r").unwrap(), ParserState::Status);
        assert_eq!(parser.feed(b"\nContent-Length: 2\r\n").unwrap(), ParserState::Headers);
        assert_eq!(parser.feed(b"\r\nok").unwrap(), ParserState::Done);
        assert_eq!(parser.status(), 201);
        assert_eq!(parser.body(), b"ok");
    }

    #[test]
    fn test_content_length_zero_completes() {
        let mut parser = ResponseParser::new();
        let state = parser
            .feed(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n")
            .unwrap();
        assert_eq!(state, ParserState::Done);
        assert!(parser.body().is_empty());
    }

    #[test]
    fn test_head_request_completes() {
        let mut parser = ResponseParser::new();
        parser.set_head_request(true);
        let state = parser
            .feed(b"HTTP/1.1 200 OK\r\nContent-Length: 1000\r\n\r\n")
            .unwrap();
        assert_eq!(state, ParserState::Done);
    }

    #[test]
    fn test_no_framing_and_no_data_completes() {
        let mut parser = ResponseParser::new();
        assert_eq!(
            parser.feed(b"HTTP/1.1 200 OK\r\nX: y\r\n\r\n").unwrap(),
            ParserState::Done
        );
    }

    #[test]
    fn test_content_length_waits_for_body() {
        let mut parser = ResponseParser::new();
        assert_eq!(
            parser.feed(b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\n").unwrap(),
            ParserState::Body
        );
        assert_eq!(parser.feed(b"ab").unwrap(), ParserState::Body);
        assert_eq!(parser.feed(b"cdef").unwrap(), ParserState::Done);
        assert_eq!(parser.body(), b"abc");
    }

    #[test]
    fn test_close_delimited() {
        let mut parser = ResponseParser::new();
        assert_eq!(
            parser.feed(b"HTTP/1.0 200 OK\r\n\r\npart1").unwrap(),
            ParserState::Body
        );
        parser.feed(b"part2").unwrap();
        assert!(!parser.is_keep_alive());
        assert_eq!(parser.finish(), ParserState::Done);
        assert_eq!(parser.body(), b"part1part2");
    }

    #[test]
    fn test_finish_incomplete() {
        let mut parser = ResponseParser::new();
        parser
            .feed(b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nabc")
            .unwrap();
        assert_eq!(parser.finish(), ParserState::Body);
    }

    #[test]
    fn test_empty_header_block() {
        let mut parser = ResponseParser::new();
        parser.set_head_request(true);
        assert_eq!(parser.feed(b"HTTP/1.1 200 OK\r\n\r\n").unwrap(), ParserState::Done);
        assert!(parser.headers().is_empty());
    }

    #[test]
    fn test_lf_only_response() {
        let mut parser = ResponseParser::new();
        let state = parser
            .feed(b"HTTP/1.1 200 OK\nContent-Length: 2\n\nhi")
            .unwrap();
        assert_eq!(state, ParserState::Done);
        assert_eq!(parser.body(), b"hi");
    }

    #[test]
    fn test_interim_response_skipped() {
        let mut parser = ResponseParser::new();
        let state = parser
            .feed(b"HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 200 OK\r\nContent-Length: 1\r\n\r\nx")
            .unwrap();
        assert_eq!(state, ParserState::Done);
        assert_eq!(parser.status(), 200);
        assert_eq!(parser.body(), b"x");
    }

    #[test]
    fn test_no_content_status() {
        let mut parser = ResponseParser::new();
        let state = parser
            .feed(b"HTTP/1.1 204 No Content\r\nTransfer-Encoding: chunked\r\n\r\n")
            .unwrap();
        assert_eq!(state, ParserState::Done);
    }

    #[test]
    fn test_repeated_headers_joined() {
        let mut parser = ResponseParser::new();
        parser
            .feed(b"HTTP/1.1 200 OK\r\nSet-Cookie: a=1\r\nSet-Cookie: b=2\r\nContent-Length: 0\r\n\r\n")
            .unwrap();
        assert_eq!(parser.headers().get("set-cookie"), Some("a=1; b=2"));
        assert_eq!(parser.raw_headers().len(), 3);
    }

    #[test]
    fn test_invalid_status_line_is_fatal() {
        let mut parser = ResponseParser::new();
        assert!(matches!(
            parser.feed(b"SSH-2.0-OpenSSH\r\n"),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn test_invalid_content_length_is_fatal() {
        let mut parser = ResponseParser::new();
        assert!(parser
            .feed(b"HTTP/1.1 200 OK\r\nContent-Length: nope\r\n\r\n")
            .is_err());
    }

    #[test]
    fn test_chunk_error_is_not_fatal() {
        let mut parser = ResponseParser::new();
        parser
            .feed(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n")
            .unwrap();
        assert_eq!(parser.feed(b"xyz\r\n").unwrap(), ParserState::Body);
        assert_eq!(parser.feed(b"2\r\nok\r\n0\r\n\r\n").unwrap(), ParserState::Done);
        assert_eq!(parser.body(), b"ok");
    }

    #[test]
    fn test_chunk_error_keeps_rest_of_fragment() {
        let mut parser = ResponseParser::new();
        let state = parser
            .feed(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n2\r\nok\r\nzz\r\n3\r\nabc\r\n0\r\n\r\n")
            .unwrap();
        assert_eq!(state, ParserState::Done);
        assert_eq!(parser.body(), b"okabc");
    }

    #[test]
    fn test_headers_too_large() {
        let mut parser = ResponseParser::with_limits(ParserLimits {
            max_header_size: 16,
            ..ParserLimits::default()
        });
        parser.feed(b"HTTP/1.1 200 OK\r\n").unwrap();
        assert!(matches!(
            parser.feed(b"X-Long-Header: aaaaaaaaaaaa"),
            Err(Error::HeadersTooLarge { .. })
        ));
    }

    #[test]
    fn test_body_too_large() {
        let mut parser = ResponseParser::with_limits(ParserLimits {
            max_body_size: 4,
            ..ParserLimits::default()
        });
        assert!(matches!(
            parser.feed(b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\n0123456789"),
            Err(Error::BodyTooLarge { .. })
        ));
    }

    #[test]
    fn test_keep_alive() {
        let mut parser = ResponseParser::new();
        parser
            .feed(b"HTTP/1.1 401 Unauthorized\r\nContent-Length: 0\r\n\r\n")
            .unwrap();
        assert!(parser.is_keep_alive());

        let mut parser = ResponseParser::new();
        parser
            .feed(b"HTTP/1.1 401 Unauthorized\r\nConnection: close\r\nContent-Length: 0\r\n\r\n")
            .unwrap();
        assert!(!parser.is_keep_alive());
    }

    #[test]
    fn test_reset_for_next_hop() {
        let mut parser = ResponseParser::new();
        parser
            .feed(b"HTTP/1.1 302 Found\r\nLocation: /b\r\nContent-Length: 0\r\n\r\n")
            .unwrap();
        let first = parser.take_response();
        assert_eq!(first.status, 302);
        parser.reset();
        assert_eq!(parser.state(), ParserState::Status);
        assert_eq!(parser.feed(b"HTTP/1.1 200 OK\r\nContent-Length: 1\r\n\r\nz").unwrap(), ParserState::Done);
    }
}
