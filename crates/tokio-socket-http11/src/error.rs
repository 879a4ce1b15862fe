//! tokio-socket-http11 エラー型

use std::fmt;

use socket_http11::net_error;

/// tokio-socket-http11 エラー
#[derive(Debug)]
pub enum Error {
    /// I/O エラー
    Io(std::io::Error),
    /// HTTP エラー (パース、認証、リダイレクト、展開)
    Http(socket_http11::Error),
    /// TLS エラー
    Tls(String),
    /// タイムアウト (接続後に設定時間が経過した)
    Timeout,
    /// レスポンスが完了する前に接続が閉じられた
    ConnectionClosed,
    /// 不正な URL
    InvalidUrl(String),
    /// DNS 解決エラー
    DnsResolution(String),
    /// 呼び出し側またはオブザーバーによる中断
    Aborted,
    /// プロキシとのやりとりに失敗
    Proxy(String),
}

impl Error {
    /// 対応するネットワークエラーコード
    pub fn code(&self) -> i32 {
        match self {
            Error::Io(e) => net_error::from_io_kind(e.kind()),
            Error::Http(e) => e.code(),
            Error::Tls(_) => net_error::SSL_PROTOCOL_ERROR,
            Error::Timeout => net_error::TIMED_OUT,
            Error::ConnectionClosed => net_error::EMPTY_RESPONSE,
            Error::InvalidUrl(_) => net_error::INVALID_URL,
            Error::DnsResolution(_) => net_error::NAME_NOT_RESOLVED,
            Error::Aborted => net_error::ABORTED,
            Error::Proxy(_) => net_error::TUNNEL_CONNECTION_FAILED,
        }
    }

    /// エラーコード表の説明文
    pub fn net_message(&self) -> &'static str {
        net_error::message(self.code())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Http(e) => write!(f, "HTTP error: {}", e),
            Error::Tls(e) => write!(f, "TLS error: {}", e),
            Error::Timeout => write!(f, "request timeout"),
            Error::ConnectionClosed => write!(f, "connection closed"),
            Error::InvalidUrl(msg) => write!(f, "invalid URL: {}", msg),
            Error::DnsResolution(msg) => write!(f, "DNS resolution error: {}", msg),
            Error::Aborted => write!(f, "request aborted"),
            Error::Proxy(msg) => write!(f, "proxy error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<socket_http11::Error> for Error {
    fn from(e: socket_http11::Error) -> Self {
        match e {
            socket_http11::Error::InvalidUrl(msg) => Error::InvalidUrl(msg),
            e => Error::Http(e),
        }
    }
}

impl From<socket_http11::AuthError> for Error {
    fn from(e: socket_http11::AuthError) -> Self {
        Error::Http(e.into())
    }
}

impl From<rustls::Error> for Error {
    fn from(e: rustls::Error) -> Self {
        Error::Tls(e.to_string())
    }
}

impl From<rustls_pki_types::InvalidDnsNameError> for Error {
    fn from(e: rustls_pki_types::InvalidDnsNameError) -> Self {
        Error::Tls(e.to_string())
    }
}

impl From<rustls_pki_types::pem::Error> for Error {
    fn from(e: rustls_pki_types::pem::Error) -> Self {
        Error::Tls(format!("invalid client certificate: {}", e))
    }
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
