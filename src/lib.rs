//! # socket_http11
//!
//! 生の TCP / TLS ソケット上で動く HTTP/1.1 クライアントのコア (Sans I/O)
//!
//! ## 特徴
//!
//! - **Sans I/O**: ソケット操作を持たず、バイト列の組み立てと解釈だけを行う
//! - **インクリメンタル**: 任意の位置で分割された受信データをそのまま食わせられる
//! - **認証**: Basic / Digest (MD5, MD5-sess, qop=auth/auth-int) / NTLMv2
//! - **リダイレクト**: ループ検出と Cookie の引き継ぎ
//!
//! I/O を伴う接続管理とリクエストの駆動は `tokio_socket_http11` が担う。
//!
//! ## 使い方
//!
//! ```rust
//! use socket_http11::{Headers, MessageBuilder, ParserState, Payload, ResponseParser, Url};
//!
//! // リクエストを組み立てる
//! let url = Url::parse("http://example.com/index.html").unwrap();
//! let headers = Headers::parse("Accept: */*");
//! let bytes = MessageBuilder::new("GET", &url, &headers, &Payload::None).encode();
//! assert!(bytes.starts_with(b"GET /index.html HTTP/1.1\r\n"));
//! // bytes を送信...
//!
//! // レスポンスを解釈する
//! let mut parser = ResponseParser::new();
//! parser.feed(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\n").unwrap();
//! assert_eq!(parser.feed(b"hi").unwrap(), ParserState::Done);
//! assert_eq!(parser.take_response().body, b"hi");
//! ```

pub mod auth;
pub mod byte_util;
mod config;
pub mod cookie;
pub mod decompress;
mod error;
mod headers;
pub mod host_rules;
mod limits;
mod message;
pub mod multipart;
pub mod net_error;
pub mod parser;
pub mod redirect;
mod request;
mod response;
mod stats;
mod url;

pub use auth::{AuthConfig, AuthDecision, AuthEngine, AuthEntropy, AuthError, AuthMethod};
pub use config::{ProxyConfig, RequestConfig};
pub use error::{Error, Result};
pub use headers::Headers;
pub use host_rules::HostRule;
pub use limits::ParserLimits;
pub use message::{MessageBuilder, RequestMessage, TargetForm, is_bodiless_method};
pub use multipart::{FormPart, MultipartBuilder};
pub use parser::{BodyKind, ParsedResponse, ParserState, ResponseParser};
pub use redirect::{Redirect, RedirectSet};
pub use request::{ClientCertificate, Payload, RequestDescriptor};
pub use response::{LoadResult, Response};
pub use stats::RequestStats;
pub use url::Url;

/// 既定のリダイレクト回数の上限
pub const MAX_REDIRECTS: usize = 20;
