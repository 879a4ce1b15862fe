use std::fmt;

use crate::auth::AuthError;

/// socket_http11 エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// 不正なレスポンス (ステータス行やヘッダーが解釈できない)
    Protocol(String),
    /// 不正な URL
    InvalidUrl(String),
    /// リダイレクトループ (同じ URL を再訪した)
    RedirectLoop { url: String },
    /// リダイレクト回数の上限を超えた
    TooManyRedirects { limit: usize },
    /// 認証エラー
    Auth(AuthError),
    /// ボディの展開に失敗
    Decompression(String),
    /// ヘッダーブロックが大きすぎる
    HeadersTooLarge { size: usize, limit: usize },
    /// ボディサイズ超過
    BodyTooLarge { size: usize, limit: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Protocol(msg) => write!(f, "protocol error: {}", msg),
            Error::InvalidUrl(msg) => write!(f, "invalid URL: {}", msg),
            Error::RedirectLoop { url } => write!(f, "redirect loop detected at {}", url),
            Error::TooManyRedirects { limit } => write!(f, "more than {} redirects", limit),
            Error::Auth(e) => write!(f, "authentication error: {}", e),
            Error::Decompression(msg) => write!(f, "decompression error: {}", msg),
            Error::HeadersTooLarge { size, limit } => {
                write!(f, "response headers too large: {} > {}", size, limit)
            }
            Error::BodyTooLarge { size, limit } => {
                write!(f, "body too large: {} > {}", size, limit)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Auth(e) => Some(e),
            _ => None,
        }
    }
}

impl From<AuthError> for Error {
    fn from(e: AuthError) -> Self {
        Error::Auth(e)
    }
}

impl Error {
    /// 対応するネットワークエラーコード
    ///
    /// コードは [`crate::net_error`] の表で文字列に変換できる。
    pub fn code(&self) -> i32 {
        match self {
            Error::Protocol(_) => crate::net_error::INVALID_RESPONSE,
            Error::InvalidUrl(_) => crate::net_error::INVALID_URL,
            Error::RedirectLoop { .. } | Error::TooManyRedirects { .. } => {
                crate::net_error::TOO_MANY_REDIRECTS
            }
            Error::Auth(AuthError::CredentialsRejected) => {
                crate::net_error::INVALID_AUTH_CREDENTIALS
            }
            Error::Auth(_) => crate::net_error::UNSUPPORTED_AUTH_SCHEME,
            Error::Decompression(_) => crate::net_error::CONTENT_DECODING_FAILED,
            Error::HeadersTooLarge { .. } => crate::net_error::RESPONSE_HEADERS_TOO_BIG,
            Error::BodyTooLarge { .. } => crate::net_error::FILE_TOO_BIG,
        }
    }
}

/// Result 型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
