//! 接続切断と断片化のテスト
//!
//! ソケットから届く断片は任意の位置で切れる。ここでは 1 バイトずつ投入した場合と、
//! ボディの途中で接続が閉じた場合に [`ResponseParser`] がどう振る舞うかを確認する。
//!
//! 呼び出し側はループを抜けた後に必ず [`ResponseParser::finish`] を呼び、
//! `Done` に到達したかどうかで成功と失敗を判断する。

use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;
use socket_http11::{
    BodyKind, Error, ParserLimits, ParserState, RequestStats, Response, ResponseParser,
};

fn feed_bytewise(parser: &mut ResponseParser, data: &[u8]) -> ParserState {
    let mut state = parser.state();
    for byte in data {
        state = parser.feed(std::slice::from_ref(byte)).unwrap();
    }
    state
}

/// Content-Length に届かないまま閉じられると Done にならない
#[test]
fn incomplete_content_length_body() {
    let mut parser = ResponseParser::new();
    parser
        .feed(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n")
        .unwrap();
    parser.feed(&[0u8; 50]).unwrap();

    assert_eq!(parser.body_kind(), BodyKind::ContentLength(100));
    assert_eq!(parser.finish(), ParserState::Body);
    assert_eq!(parser.body().len(), 50);
}

/// 終端チャンクを受け取る前に閉じられると Done にならない
#[test]
fn incomplete_chunked_body() {
    let mut parser = ResponseParser::new();
    parser
        .feed(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n")
        .unwrap();

    assert_eq!(parser.finish(), ParserState::Body);
    assert_eq!(parser.body(), b"hello");
}

/// 終端チャンクまで届いていれば最後の空行がなくても完了とみなす
#[test]
fn chunked_without_final_crlf() {
    let mut parser = ResponseParser::new();
    parser
        .feed(b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n")
        .unwrap();
    assert_eq!(parser.finish(), ParserState::Done);
    assert_eq!(parser.body(), b"hello");
}

/// ヘッダーの途中で閉じられた場合
#[test]
fn incomplete_headers() {
    let mut parser = ResponseParser::new();
    parser.feed(b"HTTP/1.1 200 OK\r\nContent-Le").unwrap();
    assert_eq!(parser.finish(), ParserState::Headers);
    assert!(!parser.has_head());
}

/// 長さの指定がないボディは接続が閉じたところで完了する
#[test]
fn close_delimited_body() {
    let mut parser = ResponseParser::new();
    parser
        .feed(b"HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\n\r\nfirst ")
        .unwrap();
    assert_eq!(parser.body_kind(), BodyKind::CloseDelimited);
    assert!(!parser.is_keep_alive());
    parser.feed(b"second").unwrap();
    assert_eq!(parser.state(), ParserState::Body);
    assert_eq!(parser.finish(), ParserState::Done);
    assert_eq!(parser.body(), b"first second");
}

/// 1 バイトずつ届いても chunked を正しく組み立てる
#[test]
fn chunked_bytewise() {
    let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nX-Test: a\r\n\r\n\
                4;name=value\r\nWiki\r\n5\r\npedia\r\nE\r\n in\r\n\r\nchunks.\r\n\
                0\r\nExpires: never\r\n\r\n";
    let mut parser = ResponseParser::new();
    assert_eq!(feed_bytewise(&mut parser, raw), ParserState::Done);
    assert_eq!(parser.body(), b"Wikipedia in\r\n\r\nchunks.");
    assert_eq!(parser.headers().get("x-test"), Some("a"));
}

/// 中間レスポンス (100 Continue) を読み飛ばす
#[test]
fn interim_response_bytewise() {
    let raw = b"HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 201 Created\r\nContent-Length: 2\r\n\r\nok";
    let mut parser = ResponseParser::new();
    assert_eq!(feed_bytewise(&mut parser, raw), ParserState::Done);
    assert_eq!(parser.status(), 201);
    assert_eq!(parser.body(), b"ok");
}

/// gzip のボディは断片化していても完了後に展開できる
#[test]
fn gzip_body_fragmented() {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&b"compressed ".repeat(64)).unwrap();
    let compressed = encoder.finish().unwrap();

    let mut raw = format!(
        "HTTP/1.1 200 OK\r\nContent-Encoding: gzip\r\nContent-Length: {}\r\n\r\n",
        compressed.len()
    )
    .into_bytes();
    raw.extend_from_slice(&compressed);

    let mut parser = ResponseParser::new();
    for part in raw.chunks(7) {
        parser.feed(part).unwrap();
    }
    assert!(parser.is_done());

    let response = Response::from_parsed(
        parser.take_response(),
        "http://example.com/",
        RequestStats::default(),
    )
    .unwrap();
    assert_eq!(response.body, b"compressed ".repeat(64));
    assert_eq!(response.url, "http://example.com/");
}

/// 壊れた gzip はレスポンス組み立て時にエラーになる
#[test]
fn broken_gzip_is_error() {
    let mut parser = ResponseParser::new();
    parser
        .feed(b"HTTP/1.1 200 OK\r\nContent-Encoding: gzip\r\nContent-Length: 4\r\n\r\nnope")
        .unwrap();
    let result = Response::from_parsed(
        parser.take_response(),
        "http://example.com/",
        RequestStats::default(),
    );
    assert!(matches!(result, Err(Error::Decompression(_))));
}

/// ボディサイズの上限を超えたらエラー
#[test]
fn body_limit_exceeded() {
    let mut parser = ResponseParser::with_limits(ParserLimits::default().max_body_size(8));
    let result = parser.feed(b"HTTP/1.1 200 OK\r\nContent-Length: 16\r\n\r\n0123456789abcdef");
    assert!(matches!(result, Err(Error::BodyTooLarge { limit: 8, .. })));
}

/// 不正なステータス行は致命的
#[test]
fn malformed_status_line() {
    let mut parser = ResponseParser::new();
    assert!(matches!(parser.feed(b"ICY 200 OK\r\n"), Err(Error::Protocol(_))));
}
