//! tokio_socket_http11 - Tokio driver for socket_http11
//!
//! tokio と tokio-rustls を使い、socket_http11 の Sans I/O コアを 1 リクエスト 1 ソケットで駆動する。
//!
//! ## 特徴
//!
//! - **socket_http11 ベース**: メッセージ組み立てとレスポンス解釈はコアに任せる
//! - **非同期 I/O**: tokio による完全非同期対応
//! - **TLS 対応**: tokio-rustls による HTTPS 対応 (OS のルート証明書、クライアント証明書)
//! - **中断とタイムアウト**: 何度呼んでも安全な中断、接続後に動き出すタイマー
//! - **ライフサイクル通知**: オブザーバーまたはチャネルで進行状況を受け取る
//!
//! ## 使い方
//!
//! ```ignore
//! use std::time::Duration;
//! use tokio_socket_http11::{HostRule, RequestConfig, RequestDescriptor, SocketRequest};
//!
//! let config = RequestConfig::new()
//!     .timeout(Duration::from_secs(10))
//!     .host_rule(HostRule::new("domain.com", "127.0.0.1:8123"));
//! let descriptor = RequestDescriptor::get("http://domain.com/api").config(config);
//!
//! let (abort, mut events, handle) = SocketRequest::new(descriptor).spawn();
//! while let Some(event) = events.recv().await {
//!     println!("{:?}", event);
//! }
//! let result = handle.await??;
//! ```

pub mod abort;
pub mod client;
pub mod connection;
pub mod error;
pub mod observer;

pub use abort::AbortHandle;
pub use client::{SocketRequest, load};
pub use connection::{Connection, ProxyTarget, TlsSettings};
pub use error::{Error, Result};
pub use observer::{ChannelObserver, LoadEvent, NoopObserver, RequestObserver};

// socket_http11 の型を re-export
pub use socket_http11::{
    AuthConfig, AuthMethod, Headers, HostRule, LoadResult, Payload, ProxyConfig, RequestConfig,
    RequestDescriptor, RequestStats, Response,
};
