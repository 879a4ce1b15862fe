//! Digest 認証 (RFC 7616 / RFC 2617)
//!
//! MD5 と MD5-sess、qop の auth と auth-int、qop なしの旧形式に対応する。

use md5::{Digest, Md5};

use super::{AuthError, parse_auth_params, strip_scheme};

/// Digest のハッシュアルゴリズム
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    /// MD5
    Md5,
    /// MD5-sess
    Md5Sess,
}

impl DigestAlgorithm {
    fn as_str(self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::Md5Sess => "MD5-sess",
        }
    }
}

/// 保護品質 (quality of protection)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qop {
    /// 認証のみ
    Auth,
    /// ボディも含めた認証
    AuthInt,
}

impl Qop {
    fn as_str(self) -> &'static str {
        match self {
            Qop::Auth => "auth",
            Qop::AuthInt => "auth-int",
        }
    }
}

/// WWW-Authenticate の Digest チャレンジ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestChallenge {
    /// realm
    pub realm: String,
    /// サーバー nonce
    pub nonce: String,
    /// opaque
    pub opaque: Option<String>,
    /// 選択した qop (サーバーが提示しなければ None)
    pub qop: Option<Qop>,
    /// アルゴリズム
    pub algorithm: DigestAlgorithm,
    /// stale=true が付いていたか
    pub stale: bool,
}

impl DigestChallenge {
    /// WWW-Authenticate ヘッダー値をパース
    ///
    /// qop は auth を優先し、なければ auth-int を選ぶ。
    pub fn parse(input: &str) -> Result<Self, AuthError> {
        let params = strip_scheme(input, "Digest").ok_or(AuthError::MissingChallenge)?;
        let params = parse_auth_params(params)?;
        let get = |name: &str| {
            params
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str())
        };

        let realm = get("realm").ok_or_else(|| AuthError::InvalidChallenge("missing realm".into()))?;
        let nonce = get("nonce").ok_or_else(|| AuthError::InvalidChallenge("missing nonce".into()))?;

        let algorithm = match get("algorithm") {
            None => DigestAlgorithm::Md5,
            Some(a) if a.eq_ignore_ascii_case("MD5") => DigestAlgorithm::Md5,
            Some(a) if a.eq_ignore_ascii_case("MD5-sess") => DigestAlgorithm::Md5Sess,
            Some(a) => return Err(AuthError::UnsupportedAlgorithm(a.to_string())),
        };

        let qop = get("qop").and_then(|value| {
            let offered: Vec<&str> = value.split(',').map(str::trim).collect();
            if offered.iter().any(|q| q.eq_ignore_ascii_case("auth")) {
                Some(Qop::Auth)
            } else if offered.iter().any(|q| q.eq_ignore_ascii_case("auth-int")) {
                Some(Qop::AuthInt)
            } else {
                None
            }
        });

        Ok(Self {
            realm: realm.to_string(),
            nonce: nonce.to_string(),
            opaque: get("opaque").map(str::to_string),
            qop,
            algorithm,
            stale: get("stale").is_some_and(|s| s.eq_ignore_ascii_case("true")),
        })
    }
}

/// Digest 認証の状態
///
/// nonce-count は同じ nonce で Authorization を生成するたびに 1 ずつ増える。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestState {
    challenge: DigestChallenge,
    cnonce: String,
    nonce_count: u32,
}

impl DigestState {
    /// チャレンジとクライアント nonce から状態を作成
    pub fn new(challenge: DigestChallenge, cnonce: impl Into<String>) -> Self {
        Self {
            challenge,
            cnonce: cnonce.into(),
            nonce_count: 0,
        }
    }

    /// チャレンジを取得
    pub fn challenge(&self) -> &DigestChallenge {
        &self.challenge
    }

    /// 最後に使った nonce-count
    pub fn nonce_count(&self) -> u32 {
        self.nonce_count
    }

    /// Authorization ヘッダー値を生成
    ///
    /// 呼び出すたびに nonce-count を進める。
    pub fn authorize(
        &mut self,
        username: &str,
        password: &str,
        method: &str,
        uri: &str,
        body: &[u8],
    ) -> String {
        self.nonce_count += 1;
        let nc = format!("{:08x}", self.nonce_count);
        let c = &self.challenge;

        let mut ha1 = md5_hex(format!("{}:{}:{}", username, c.realm, password).as_bytes());
        if c.algorithm == DigestAlgorithm::Md5Sess {
            ha1 = md5_hex(format!("{}:{}:{}", ha1, c.nonce, self.cnonce).as_bytes());
        }

        let ha2 = match c.qop {
            Some(Qop::AuthInt) => md5_hex(format!("{}:{}:{}", method, uri, md5_hex(body)).as_bytes()),
            _ => md5_hex(format!("{}:{}", method, uri).as_bytes()),
        };

        let response = match c.qop {
            Some(qop) => md5_hex(
                format!(
                    "{}:{}:{}:{}:{}:{}",
                    ha1,
                    c.nonce,
                    nc,
                    self.cnonce,
                    qop.as_str(),
                    ha2
                )
                .as_bytes(),
            ),
            None => md5_hex(format!("{}:{}:{}", ha1, c.nonce, ha2).as_bytes()),
        };

        let mut header = format!(
            "Digest username=\"{}\", realm=\"{}\", nonce=\"{}\", uri=\"{}\", algorithm={}, response=\"{}\"",
            quote(username),
            quote(&c.realm),
            quote(&c.nonce),
            quote(uri),
            c.algorithm.as_str(),
            response
        );
        if let Some(opaque) = &c.opaque {
            header.push_str(&format!(", opaque=\"{}\"", quote(opaque)));
        }
        if let Some(qop) = c.qop {
            header.push_str(&format!(
                ", qop={}, nc={}, cnonce=\"{}\"",
                qop.as_str(),
                nc,
                quote(&self.cnonce)
            ));
        }
        header
    }
}

fn md5_hex(input: &[u8]) -> String {
    Md5::digest(input)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
