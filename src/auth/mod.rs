//! HTTP 認証 (Basic / Digest / NTLM)
//!
//! ## 概要
//!
//! 1 リクエスト分の認証状態を [`AuthEngine`] が持つ。
//! 送信のたびに [`AuthEngine::authorization`] で Authorization ヘッダー値を求め、
//! 401 を受け取ったら [`AuthEngine::on_challenge`] で再送するかどうかを決める。
//!
//! 乱数 (cnonce、NTLM クライアントチャレンジ) と時刻は呼び出し側が [`AuthEntropy`] で渡す。
//!
//! ## 使い方
//!
//! ```rust
//! use socket_http11::auth::{AuthConfig, AuthDecision, AuthEngine, AuthEntropy, AuthMethod};
//!
//! let mut engine = AuthEngine::new(AuthConfig::new(AuthMethod::Digest, "user", "pass"));
//! // Digest は最初のリクエストでは何も付けない
//! assert_eq!(engine.authorization("GET", "/", b""), None);
//!
//! let entropy = AuthEntropy::new("0a4f113b", [0; 8], 0);
//! let decision = engine
//!     .on_challenge(&["Digest realm=\"r\", nonce=\"n\", qop=\"auth\""], "GET", "/", b"", &entropy)
//!     .unwrap();
//! assert!(matches!(decision, AuthDecision::Retry(h) if h.starts_with("Digest ")));
//! ```

mod basic;
pub mod digest;
pub mod ntlm;

use core::fmt;

pub use basic::basic_header;
pub use digest::{DigestAlgorithm, DigestChallenge, DigestState, Qop};
pub use ntlm::{NtlmChallenge, NtlmState};

/// 認証エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// 期待したスキームのチャレンジがない
    MissingChallenge,
    /// チャレンジの形式が不正
    InvalidChallenge(String),
    /// 対応していない Digest アルゴリズム
    UnsupportedAlgorithm(String),
    /// NTLM メッセージが不正
    InvalidNtlmMessage(String),
    /// ハンドシェイク完了後に再び 401 を受け取った
    CredentialsRejected,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingChallenge => write!(f, "missing authentication challenge"),
            AuthError::InvalidChallenge(msg) => write!(f, "invalid challenge: {}", msg),
            AuthError::UnsupportedAlgorithm(a) => write!(f, "unsupported digest algorithm: {}", a),
            AuthError::InvalidNtlmMessage(msg) => write!(f, "invalid NTLM message: {}", msg),
            AuthError::CredentialsRejected => write!(f, "credentials rejected"),
        }
    }
}

impl std::error::Error for AuthError {}

/// 認証方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// Basic
    Basic,
    /// Digest
    Digest,
    /// NTLM
    Ntlm,
}

impl AuthMethod {
    /// 名前から認証方式を求める (大文字小文字を区別しない)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "basic" => Some(AuthMethod::Basic),
            "digest" => Some(AuthMethod::Digest),
            "ntlm" => Some(AuthMethod::Ntlm),
            _ => None,
        }
    }
}

/// 認証設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// 認証方式
    pub method: AuthMethod,
    /// ユーザー名 (NTLM では `DOMAIN\user` 形式も可)
    pub username: String,
    /// パスワード
    pub password: String,
    /// NTLM ドメイン (ユーザー名のドメインより優先)
    pub domain: Option<String>,
    /// NTLM ワークステーション名
    pub workstation: Option<String>,
}

impl AuthConfig {
    /// 認証設定を作成
    pub fn new(method: AuthMethod, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            method,
            username: username.into(),
            password: password.into(),
            domain: None,
            workstation: None,
        }
    }

    /// NTLM ドメインを設定
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// NTLM ワークステーション名を設定
    pub fn workstation(mut self, workstation: impl Into<String>) -> Self {
        self.workstation = Some(workstation.into());
        self
    }
}

/// 認証に使う乱数と時刻
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEntropy {
    /// Digest のクライアント nonce
    pub cnonce: String,
    /// NTLMv2 のクライアントチャレンジ
    pub client_challenge: [u8; 8],
    /// NTLMv2 のタイムスタンプ (1601-01-01 からの 100ns 単位)
    pub timestamp: u64,
}

impl AuthEntropy {
    /// 作成
    pub fn new(cnonce: impl Into<String>, client_challenge: [u8; 8], timestamp: u64) -> Self {
        Self {
            cnonce: cnonce.into(),
            client_challenge,
            timestamp,
        }
    }
}

/// 401 を受け取った後の判断
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthDecision {
    /// この Authorization ヘッダー値で再送する
    Retry(String),
    /// 401 レスポンスをそのまま呼び出し側に返す
    Deliver,
}

/// 方式ごとの認証状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// Basic (ヘッダー値は最初に一度だけ計算する)
    Basic {
        /// Authorization ヘッダー値
        header: String,
    },
    /// Digest (チャレンジ受信前は None)
    Digest(Option<DigestState>),
    /// NTLM
    Ntlm(NtlmState),
}

/// 1 リクエスト分の認証エンジン
#[derive(Debug, Clone)]
pub struct AuthEngine {
    config: AuthConfig,
    context: AuthContext,
}

impl AuthEngine {
    /// 設定から作成
    pub fn new(config: AuthConfig) -> Self {
        let context = match config.method {
            AuthMethod::Basic => AuthContext::Basic {
                header: basic_header(&config.username, &config.password),
            },
            AuthMethod::Digest => AuthContext::Digest(None),
            AuthMethod::Ntlm => AuthContext::Ntlm(NtlmState::Initial),
        };
        Self { config, context }
    }

    /// 認証方式
    pub fn method(&self) -> AuthMethod {
        self.config.method
    }

    /// 現在の状態
    pub fn context(&self) -> &AuthContext {
        &self.context
    }

    /// NTLM の状態 (NTLM 以外は None)
    pub fn ntlm_state(&self) -> Option<NtlmState> {
        match self.context {
            AuthContext::Ntlm(state) => Some(state),
            _ => None,
        }
    }

    /// 次に送る Authorization ヘッダー値
    ///
    /// Digest はチャレンジ受信後に呼ぶたびに nonce-count が進む。
    /// NTLM は NEGOTIATE を送る段階でのみ値を返す。
    pub fn authorization(&mut self, method: &str, uri: &str, body: &[u8]) -> Option<String> {
        match &mut self.context {
            AuthContext::Basic { header } => Some(header.clone()),
            AuthContext::Digest(Some(state)) => Some(state.authorize(
                &self.config.username,
                &self.config.password,
                method,
                uri,
                body,
            )),
            AuthContext::Digest(None) => None,
            AuthContext::Ntlm(NtlmState::Initial) => {
                Some(ntlm::header_value(&ntlm::negotiate_message()))
            }
            AuthContext::Ntlm(_) => None,
        }
    }

    /// 401 の `WWW-Authenticate` を処理する
    ///
    /// `challenges` には WWW-Authenticate ヘッダーの値をすべて渡す。
    /// 使えないチャレンジしかなければ 401 をそのまま返す。
    /// `Err` になるのは NTLM ハンドシェイク完了後に再び 401 を受けた場合だけ。
    pub fn on_challenge(
        &mut self,
        challenges: &[&str],
        method: &str,
        uri: &str,
        body: &[u8],
        entropy: &AuthEntropy,
    ) -> Result<AuthDecision, AuthError> {
        match &mut self.context {
            AuthContext::Basic { .. } => Ok(AuthDecision::Deliver),
            AuthContext::Digest(current) => {
                let Some(value) = find_challenge(challenges, "Digest") else {
                    return Ok(AuthDecision::Deliver);
                };
                let challenge = match DigestChallenge::parse(value) {
                    Ok(challenge) => challenge,
                    Err(e) => {
                        tracing::debug!(error = %e, "unusable digest challenge");
                        return Ok(AuthDecision::Deliver);
                    }
                };
                // 一度送って拒否された場合は stale のときだけやり直す
                if current.is_some() && !challenge.stale {
                    return Ok(AuthDecision::Deliver);
                }
                let mut state = DigestState::new(challenge, entropy.cnonce.clone());
                let header = state.authorize(
                    &self.config.username,
                    &self.config.password,
                    method,
                    uri,
                    body,
                );
                tracing::debug!(realm = %state.challenge().realm, "digest challenge accepted");
                *current = Some(state);
                Ok(AuthDecision::Retry(header))
            }
            AuthContext::Ntlm(state) => match *state {
                NtlmState::ResponseSent => Err(AuthError::CredentialsRejected),
                NtlmState::Initial | NtlmState::ChallengeReceived => {
                    let parsed = find_challenge(challenges, "NTLM")
                        .filter(|v| strip_scheme(v, "NTLM").is_some())
                        .ok_or(AuthError::MissingChallenge)
                        .and_then(NtlmChallenge::from_header);
                    let challenge = match parsed {
                        Ok(challenge) => challenge,
                        Err(e) => {
                            tracing::debug!(error = %e, "unusable ntlm challenge");
                            return Ok(AuthDecision::Deliver);
                        }
                    };
                    *state = NtlmState::ChallengeReceived;
                    tracing::debug!(target_name = %challenge.target_name, "ntlm challenge received");

                    let (user_domain, username) = ntlm::split_domain(&self.config.username);
                    let credentials = ntlm::NtlmCredentials {
                        username,
                        password: &self.config.password,
                        domain: self
                            .config
                            .domain
                            .as_deref()
                            .or(user_domain)
                            .unwrap_or(""),
                        workstation: self.config.workstation.as_deref().unwrap_or(""),
                    };
                    let message = match ntlm::authenticate_message(
                        &credentials,
                        &challenge,
                        entropy.client_challenge,
                        entropy.timestamp,
                    ) {
                        Ok(message) => message,
                        Err(e) => {
                            tracing::debug!(error = %e, "cannot build ntlm authenticate message");
                            return Ok(AuthDecision::Deliver);
                        }
                    };
                    *state = NtlmState::ResponseSent;
                    Ok(AuthDecision::Retry(ntlm::header_value(&message)))
                }
            },
        }
    }
}

/// 指定スキームで始まるチャレンジを探す
fn find_challenge<'a>(challenges: &[&'a str], scheme: &str) -> Option<&'a str> {
    challenges.iter().copied().find(|value| {
        let value = value.trim_start();
        value
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
            && value[scheme.len()..]
                .chars()
                .next()
                .is_none_or(|c| c == ' ' || c == '\t')
    })
}

/// 認証スキームを取り除き、残りを返す
///
/// RFC 9110 Section 11.1: 認証スキームは case-insensitive
pub(crate) fn strip_scheme<'a>(input: &'a str, scheme: &str) -> Option<&'a str> {
    let input = input.trim_start();
    let prefix = input.get(..scheme.len())?;
    if !prefix.eq_ignore_ascii_case(scheme) {
        return None;
    }
    let rest = input.get(scheme.len()..)?;
    if !rest.starts_with(' ') && !rest.starts_with('\t') {
        return None;
    }
    let rest = rest.trim();
    if rest.is_empty() { None } else { Some(rest) }
}

/// カンマ区切りの `name=value` / `name="quoted"` をパース
///
/// 名前は小文字に正規化する。
pub(crate) fn parse_auth_params(input: &str) -> Result<Vec<(String, String)>, AuthError> {
    let mut params = Vec::new();
    let bytes = input.as_bytes();
    let mut i = 0;
    let invalid = |msg: &str| AuthError::InvalidChallenge(msg.to_string());

    while i < bytes.len() {
        while i < bytes.len() && (is_ows(bytes[i]) || bytes[i] == b',') {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }

        let name_start = i;
        while i < bytes.len() && is_token_char(bytes[i]) {
            i += 1;
        }
        if i == name_start {
            return Err(invalid("expected parameter name"));
        }
        let name = input[name_start..i].to_ascii_lowercase();

        while i < bytes.len() && is_ows(bytes[i]) {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'=' {
            return Err(invalid("expected '='"));
        }
        i += 1;
        while i < bytes.len() && is_ows(bytes[i]) {
            i += 1;
        }

        let value = if i < bytes.len() && bytes[i] == b'"' {
            i += 1;
            let mut value = Vec::new();
            let mut closed = false;
            while i < bytes.len() {
                match bytes[i] {
                    b'\\' if i + 1 < bytes.len() => {
                        value.push(bytes[i + 1]);
                        i += 2;
                    }
                    b'"' => {
                        i += 1;
                        closed = true;
                        break;
                    }
                    b => {
                        value.push(b);
                        i += 1;
                    }
                }
            }
            if !closed {
                return Err(invalid("unterminated quoted string"));
            }
            String::from_utf8_lossy(&value).into_owned()
        } else {
            let value_start = i;
            while i < bytes.len() && !is_ows(bytes[i]) && bytes[i] != b',' {
                i += 1;
            }
            input[value_start..i].to_string()
        };

        params.push((name, value));
    }

    Ok(params)
}

fn is_token_char(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' |
        b'0'..=b'9' | b'A'..=b'Z' | b'^' | b'_' | b'`' | b'a'..=b'z' | b'|' | b'~'
    )
}

fn is_ows(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entropy() -> AuthEntropy {
        AuthEntropy::new("cnonce", [1; 8], 0)
    }

    #[test]
    fn test_parse_auth_params() {
        let params = parse_auth_params("realm=\"a, b\", qop=auth,NONCE=\"x\\\"y\"").unwrap();
        assert_eq!(
            params,
            vec![
                ("realm".to_string(), "a, b".to_string()),
                ("qop".to_string(), "auth".to_string()),
                ("nonce".to_string(), "x\"y".to_string()),
            ]
        );
        assert!(parse_auth_params("realm=\"open").is_err());
        assert!(parse_auth_params("=x").is_err());
    }

    #[test]
    fn test_strip_scheme() {
        assert_eq!(strip_scheme("digest realm=x", "Digest"), Some("realm=x"));
        assert_eq!(strip_scheme("DigestX realm=x", "Digest"), None);
        assert_eq!(strip_scheme("NTLM", "NTLM"), None);
        assert_eq!(strip_scheme("NTLM  ", "NTLM"), None);
    }

    #[test]
    fn test_find_challenge() {
        let values = ["Negotiate", "NTLM", "Basic realm=\"x\""];
        assert_eq!(find_challenge(&values, "ntlm"), Some("NTLM"));
        assert_eq!(find_challenge(&values, "Basic"), Some("Basic realm=\"x\""));
        assert_eq!(find_challenge(&values, "Digest"), None);
    }

    #[test]
    fn test_method_from_name() {
        assert_eq!(AuthMethod::from_name("NTLM"), Some(AuthMethod::Ntlm));
        assert_eq!(AuthMethod::from_name("bearer"), None);
    }

    #[test]
    fn test_basic_engine() {
        let mut engine = AuthEngine::new(AuthConfig::new(AuthMethod::Basic, "user", "password"));
        let header = engine.authorization("GET", "/", b"");
        assert_eq!(header.as_deref(), Some("Basic dXNlcjpwYXNzd29yZA=="));
        assert_eq!(
            engine.on_challenge(&["Basic realm=\"x\""], "GET", "/", b"", &entropy()),
            Ok(AuthDecision::Deliver)
        );
    }

    #[test]
    fn test_digest_engine_resends_once() {
        let mut engine = AuthEngine::new(AuthConfig::new(AuthMethod::Digest, "u", "p"));
        assert_eq!(engine.authorization("GET", "/", b""), None);

        let challenge = ["Digest realm=\"r\", nonce=\"n\", qop=\"auth\""];
        let first = engine
            .on_challenge(&challenge, "GET", "/", b"", &entropy())
            .unwrap();
        let AuthDecision::Retry(header) = first else {
            panic!("expected retry");
        };
        assert!(header.contains("nc=00000001"));

        // 同じ nonce で再び 401 なら諦める
        assert_eq!(
            engine.on_challenge(&challenge, "GET", "/", b"", &entropy()),
            Ok(AuthDecision::Deliver)
        );

        // 次のホップでは nonce-count が進む
        let next = engine.authorization("GET", "/next", b"").unwrap();
        assert!(next.contains("nc=00000002"));
    }

    #[test]
    fn test_digest_engine_stale_retries() {
        let mut engine = AuthEngine::new(AuthConfig::new(AuthMethod::Digest, "u", "p"));
        engine
            .on_challenge(&["Digest realm=\"r\", nonce=\"n1\""], "GET", "/", b"", &entropy())
            .unwrap();
        let decision = engine
            .on_challenge(
                &["Digest realm=\"r\", nonce=\"n2\", stale=true"],
                "GET",
                "/",
                b"",
                &entropy(),
            )
            .unwrap();
        assert!(matches!(decision, AuthDecision::Retry(h) if h.contains("nonce=\"n2\"")));
    }

    #[test]
    fn test_digest_engine_without_digest_challenge() {
        let mut engine = AuthEngine::new(AuthConfig::new(AuthMethod::Digest, "u", "p"));
        assert_eq!(
            engine.on_challenge(&["Basic realm=\"x\""], "GET", "/", b"", &entropy()),
            Ok(AuthDecision::Deliver)
        );
    }

    #[test]
    fn test_ntlm_engine_handshake() {
        let mut engine = AuthEngine::new(
            AuthConfig::new(AuthMethod::Ntlm, "CORP\\alice", "secret").workstation("WS"),
        );
        assert_eq!(engine.ntlm_state(), Some(NtlmState::Initial));
        let negotiate = engine.authorization("GET", "/", b"").unwrap();
        assert!(negotiate.starts_with("NTLM TlRMTVNTUAAB"));

        // タイプ 2 メッセージ
        let mut msg = Vec::new();
        msg.extend_from_slice(b"NTLMSSP\0");
        msg.extend_from_slice(&2u32.to_le_bytes());
        msg.extend_from_slice(&[0, 0, 0, 0, 48, 0, 0, 0]);
        msg.extend_from_slice(&0u32.to_le_bytes());
        msg.extend_from_slice(&[9; 8]);
        msg.extend_from_slice(&[0; 8]);
        msg.extend_from_slice(&[0, 0, 0, 0, 48, 0, 0, 0]);
        let challenge = ntlm::header_value(&msg);

        let decision = engine
            .on_challenge(&[challenge.as_str()], "GET", "/", b"", &entropy())
            .unwrap();
        assert!(matches!(decision, AuthDecision::Retry(h) if h.starts_with("NTLM TlRMTVNTUAAD")));
        assert_eq!(engine.ntlm_state(), Some(NtlmState::ResponseSent));
        assert_eq!(engine.authorization("GET", "/", b""), None);

        // ハンドシェイク完了後の 401 は失敗
        assert_eq!(
            engine.on_challenge(&[challenge.as_str()], "GET", "/", b"", &entropy()),
            Err(AuthError::CredentialsRejected)
        );
    }

    #[test]
    fn test_ntlm_engine_missing_challenge() {
        let mut engine = AuthEngine::new(AuthConfig::new(AuthMethod::Ntlm, "u", "p"));
        assert_eq!(
            engine.on_challenge(&["NTLM", "Basic realm=\"x\""], "GET", "/", b"", &entropy()),
            Ok(AuthDecision::Deliver)
        );
        assert_eq!(engine.ntlm_state(), Some(NtlmState::Initial));

        assert_eq!(
            engine.on_challenge(&["NTLM !!!"], "GET", "/", b"", &entropy()),
            Ok(AuthDecision::Deliver)
        );
        assert_eq!(engine.ntlm_state(), Some(NtlmState::Initial));
    }

    #[test]
    fn test_digest_engine_unusable_challenge() {
        let mut engine = AuthEngine::new(AuthConfig::new(AuthMethod::Digest, "u", "p"));
        for challenge in [
            "Digest realm=\"r\", nonce=\"n\", qop=\"auth\", algorithm=SHA-256",
            "Digest nonce=\"n\"",
            "Digest realm=\"open",
        ] {
            assert_eq!(
                engine.on_challenge(&[challenge], "GET", "/", b"", &entropy()),
                Ok(AuthDecision::Deliver)
            );
        }
        assert_eq!(engine.context(), &AuthContext::Digest(None));
    }
}
