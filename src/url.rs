//! URL の解析と解決
//!
//! リクエスト先 URL を `scheme://[userinfo@]host[:port]/path?query#fragment` に分解し、
//! `Host` ヘッダー値やリクエストターゲットを組み立てる。
//! リダイレクトの `Location` は [`Url::join`] で現在の URL を基準に解決する。
//!
//! ```rust
//! use socket_http11::Url;
//!
//! let url = Url::parse("http://example.com:8080/a/b?x=1").unwrap();
//! assert_eq!(url.host(), "example.com");
//! assert_eq!(url.port_or_default(), 8080);
//! assert_eq!(url.host_header_value(), "example.com:8080");
//!
//! let next = url.join("../c").unwrap();
//! assert_eq!(next.to_string(), "http://example.com:8080/c");
//! ```

use core::fmt;

use crate::error::Error;

/// 解析済み URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    scheme: String,
    username: Option<String>,
    password: Option<String>,
    host: String,
    port: Option<u16>,
    path: String,
    query: Option<String>,
    fragment: Option<String>,
}

impl Url {
    /// URL 文字列をパース
    pub fn parse(input: &str) -> Result<Self, Error> {
        let input = input.trim();
        let (scheme, rest) = input
            .split_once("://")
            .ok_or_else(|| Error::InvalidUrl(format!("missing scheme: {}", input)))?;

        if !scheme
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
            || !scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        {
            return Err(Error::InvalidUrl(format!("invalid scheme: {}", scheme)));
        }

        let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
        let authority = &rest[..authority_end];
        let tail = &rest[authority_end..];

        let (userinfo, host_port) = match authority.rfind('@') {
            Some(pos) => (Some(&authority[..pos]), &authority[pos + 1..]),
            None => (None, authority),
        };
        let (username, password) = match userinfo {
            Some(info) => match info.split_once(':') {
                Some((user, pass)) => (Some(user.to_string()), Some(pass.to_string())),
                None => (Some(info.to_string()), None),
            },
            None => (None, None),
        };

        let (host, port) = split_host_port(host_port)?;
        if host.is_empty() {
            return Err(Error::InvalidUrl(format!("missing host: {}", input)));
        }

        let mut url = Url {
            scheme: scheme.to_ascii_lowercase(),
            username,
            password,
            host,
            port,
            path: String::new(),
            query: None,
            fragment: None,
        };
        url.set_tail(tail);
        Ok(url)
    }

    /// path / query / fragment を設定
    fn set_tail(&mut self, tail: &str) {
        let (before_fragment, fragment) = match tail.split_once('#') {
            Some((a, f)) => (a, Some(f.to_string())),
            None => (tail, None),
        };
        let (path, query) = match before_fragment.split_once('?') {
            Some((p, q)) => (p, Some(q.to_string())),
            None => (before_fragment, None),
        };
        self.path = if path.is_empty() {
            "/".to_string()
        } else {
            path.to_string()
        };
        self.query = query;
        self.fragment = fragment;
    }

    /// スキーム (小文字)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// ユーザー名 (userinfo)
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// パスワード (userinfo)
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// ホスト名 (IPv6 の場合は角括弧なし)
    pub fn host(&self) -> &str {
        &self.host
    }

    /// 明示されたポート
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// スキームの既定ポート
    pub fn default_port(&self) -> Option<u16> {
        match self.scheme.as_str() {
            "http" | "ws" => Some(80),
            "https" | "wss" => Some(443),
            _ => None,
        }
    }

    /// 明示されたポート、なければ既定ポート
    pub fn port_or_default(&self) -> u16 {
        self.port.or(self.default_port()).unwrap_or(80)
    }

    /// TLS を使うスキームか
    pub fn is_secure(&self) -> bool {
        matches!(self.scheme.as_str(), "https" | "wss")
    }

    /// パス (常に "/" で始まる)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// クエリ
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// フラグメント
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// `Host` ヘッダー値
    ///
    /// ポートが 80 / 443 の場合は省略する。
    pub fn host_header_value(&self) -> String {
        let host = self.bracketed_host();
        match self.port {
            Some(port) if port != 80 && port != 443 => format!("{}:{}", host, port),
            _ => host,
        }
    }

    /// リクエスト行に載せるターゲット (`path[?query][#fragment]`)
    pub fn request_target(&self) -> String {
        let mut target = self.path.clone();
        if let Some(query) = &self.query {
            target.push('?');
            target.push_str(query);
        }
        if let Some(fragment) = &self.fragment {
            target.push('#');
            target.push_str(fragment);
        }
        target
    }

    /// オリジン (`scheme://host[:port]`)
    pub fn origin(&self) -> String {
        let host = self.bracketed_host();
        match self.port {
            Some(port) if Some(port) != self.default_port() => {
                format!("{}://{}:{}", self.scheme, host, port)
            }
            _ => format!("{}://{}", self.scheme, host),
        }
    }

    /// 接続先 (`host:port`)
    pub fn authority(&self) -> String {
        format!("{}:{}", self.bracketed_host(), self.port_or_default())
    }

    fn bracketed_host(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        }
    }

    /// 参照を現在の URL を基準に解決する
    ///
    /// 絶対 URL、スキーム相対 (`//host/...`)、絶対パス、クエリのみ、
    /// フラグメントのみ、相対パスに対応する。
    pub fn join(&self, reference: &str) -> Result<Url, Error> {
        let reference = reference.trim();
        if reference.contains("://") {
            return Url::parse(reference);
        }
        if let Some(rest) = reference.strip_prefix("//") {
            return Url::parse(&format!("{}://{}", self.scheme, rest));
        }

        let mut url = self.clone();
        url.fragment = None;
        if reference.is_empty() {
            return Ok(url);
        }
        if let Some(fragment) = reference.strip_prefix('#') {
            url.fragment = Some(fragment.to_string());
            return Ok(url);
        }
        if reference.starts_with('?') {
            let path = url.path.clone();
            url.set_tail(&format!("{}{}", path, reference));
            return Ok(url);
        }
        if reference.starts_with('/') {
            url.set_tail(reference);
            url.path = remove_dot_segments(&url.path);
            return Ok(url);
        }

        let dir = match self.path.rfind('/') {
            Some(pos) => &self.path[..=pos],
            None => "/",
        };
        url.set_tail(&format!("{}{}", dir, reference));
        url.path = remove_dot_segments(&url.path);
        Ok(url)
    }
}

impl fmt::Display for Url {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://", self.scheme)?;
        if let Some(user) = &self.username {
            write!(f, "{}", user)?;
            if let Some(pass) = &self.password {
                write!(f, ":{}", pass)?;
            }
            write!(f, "@")?;
        }
        write!(f, "{}", self.bracketed_host())?;
        if let Some(port) = self.port {
            write!(f, ":{}", port)?;
        }
        write!(f, "{}", self.request_target())
    }
}

impl std::str::FromStr for Url {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Url::parse(s)
    }
}

/// `host[:port]` を分解
fn split_host_port(input: &str) -> Result<(String, Option<u16>), Error> {
    if let Some(rest) = input.strip_prefix('[') {
        let end = rest
            .find(']')
            .ok_or_else(|| Error::InvalidUrl(format!("unterminated IPv6 host: {}", input)))?;
        let host = rest[..end].to_string();
        let after = &rest[end + 1..];
        let port = match after.strip_prefix(':') {
            Some(p) => parse_port(p)?,
            None if after.is_empty() => None,
            None => return Err(Error::InvalidUrl(format!("invalid authority: {}", input))),
        };
        return Ok((host, port));
    }

    match input.rsplit_once(':') {
        Some((host, port)) => Ok((host.to_ascii_lowercase(), parse_port(port)?)),
        None => Ok((input.to_ascii_lowercase(), None)),
    }
}

fn parse_port(input: &str) -> Result<Option<u16>, Error> {
    if input.is_empty() {
        return Ok(None);
    }
    input
        .parse::<u16>()
        .map(Some)
        .map_err(|_| Error::InvalidUrl(format!("invalid port: {}", input)))
}

/// RFC 3986 Section 5.2.4 のドットセグメント除去
fn remove_dot_segments(path: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let segments: Vec<&str> = path.split('/').collect();
    let last = segments.len().saturating_sub(1);
    for (i, segment) in segments.iter().enumerate() {
        match *segment {
            "." => {
                if i == last {
                    out.push("");
                }
            }
            ".." => {
                if out.len() > 1 {
                    out.pop();
                }
                if i == last {
                    out.push("");
                }
            }
            s => out.push(s),
        }
    }
    let joined = out.join("/");
    if joined.starts_with('/') {
        joined
    } else {
        format!("/{}", joined)
    }
}
