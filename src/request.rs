//! リクエスト記述子

use crate::auth::AuthConfig;
use crate::byte_util::normalize_line_endings;
use crate::config::RequestConfig;
use crate::error::Result;
use crate::headers::Headers;
use crate::multipart::MultipartBuilder;
use crate::url::Url;

/// リクエストボディ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Payload {
    /// ボディなし
    #[default]
    None,
    /// テキスト (改行は CRLF に正規化して送る)
    Text(String),
    /// バイナリ (そのまま送る)
    Binary(Vec<u8>),
    /// multipart/form-data
    Multipart(MultipartBuilder),
}

impl Payload {
    /// ボディがないか
    pub fn is_none(&self) -> bool {
        matches!(self, Payload::None)
    }

    /// 送信するバイト列に変換
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Payload::None => Vec::new(),
            Payload::Text(text) => normalize_line_endings(text.as_bytes()),
            Payload::Binary(data) => data.clone(),
            Payload::Multipart(builder) => builder.build(),
        }
    }
}

/// クライアント証明書 (PEM)
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCertificate {
    /// 証明書チェーン
    pub cert_pem: Vec<u8>,
    /// 秘密鍵
    pub key_pem: Vec<u8>,
}

impl std::fmt::Debug for ClientCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCertificate")
            .field("cert_pem_len", &self.cert_pem.len())
            .field("key_pem", &"<redacted>")
            .finish()
    }
}

/// リクエスト記述子
///
/// 呼び出し側が組み立て、クライアントに渡した時点で複製される。
/// 送信時のヘッダー (Host, Content-Length, Authorization, Cookie) は送信のたびに別に組み立て、
/// ここにあるヘッダーは書き換えない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// リクエスト URL
    pub url: String,
    /// HTTP メソッド (GET, POST, etc.)
    pub method: String,
    /// ヘッダー
    pub headers: Headers,
    /// ボディ
    pub payload: Payload,
    /// 認証
    pub auth: Option<AuthConfig>,
    /// クライアント証明書
    pub client_certificate: Option<ClientCertificate>,
    /// 設定
    pub config: RequestConfig,
}

impl RequestDescriptor {
    /// 新しいリクエストを作成
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            url: url.to_string(),
            method: method.to_ascii_uppercase(),
            headers: Headers::new(),
            payload: Payload::None,
            auth: None,
            client_certificate: None,
            config: RequestConfig::default(),
        }
    }

    /// GET リクエストを作成
    pub fn get(url: &str) -> Self {
        Self::new("GET", url)
    }

    /// URL をパース
    pub fn parsed_url(&self) -> Result<Url> {
        Url::parse(&self.url)
    }

    /// HEAD リクエストか
    pub fn is_head(&self) -> bool {
        self.method.eq_ignore_ascii_case("HEAD")
    }

    /// ヘッダーを追加 (ビルダーパターン)
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.append(name, value);
        self
    }

    /// テキスト形式のヘッダーをまとめて設定 (ビルダーパターン)
    pub fn headers_text(mut self, text: &str) -> Self {
        self.headers = Headers::parse(text);
        self
    }

    /// ボディを設定 (ビルダーパターン)
    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// テキストボディを設定 (ビルダーパターン)
    pub fn text(self, text: &str) -> Self {
        self.payload(Payload::Text(text.to_string()))
    }

    /// バイナリボディを設定 (ビルダーパターン)
    pub fn binary(self, data: Vec<u8>) -> Self {
        self.payload(Payload::Binary(data))
    }

    /// 認証を設定 (ビルダーパターン)
    pub fn auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    /// クライアント証明書を設定 (ビルダーパターン)
    pub fn client_certificate(mut self, cert_pem: Vec<u8>, key_pem: Vec<u8>) -> Self {
        self.client_certificate = Some(ClientCertificate { cert_pem, key_pem });
        self
    }

    /// 設定を置き換える (ビルダーパターン)
    pub fn config(mut self, config: RequestConfig) -> Self {
        self.config = config;
        self
    }
}
