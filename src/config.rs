//! リクエスト設定

use std::time::Duration;

use crate::host_rules::HostRule;

/// プロキシ設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// プロキシの URL (例: `http://proxy.local:3128`)
    pub url: String,
    /// Proxy-Authorization 用のユーザー名
    pub username: Option<String>,
    /// Proxy-Authorization 用のパスワード
    pub password: Option<String>,
}

impl ProxyConfig {
    /// 認証なしのプロキシ設定を作成
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: None,
            password: None,
        }
    }

    /// 認証情報を設定
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

/// リクエスト単位の設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
    /// タイムアウト (接続完了時点から計測、`None` で無制限)
    pub timeout: Option<Duration>,
    /// リダイレクトに従うか (デフォルト: true)
    pub follow_redirects: bool,
    /// ホスト書き換えルール
    pub hosts: Vec<HostRule>,
    /// サーバー証明書を検証するか (デフォルト: true)
    pub validate_certificates: bool,
    /// プロキシ
    pub proxy: Option<ProxyConfig>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            follow_redirects: true,
            hosts: Vec::new(),
            validate_certificates: true,
            proxy: None,
        }
    }
}

impl RequestConfig {
    /// デフォルト設定を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// タイムアウトを設定
    ///
    /// ゼロはタイムアウトなしとして扱う。
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = if timeout.is_zero() {
            None
        } else {
            Some(timeout)
        };
        self
    }

    /// ミリ秒でタイムアウトを設定 (0 でタイムアウトなし)
    pub fn timeout_ms(self, ms: u64) -> Self {
        self.timeout(Duration::from_millis(ms))
    }

    /// リダイレクトに従うかを設定
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    /// ホスト書き換えルールを追加
    pub fn host_rule(mut self, rule: HostRule) -> Self {
        self.hosts.push(rule);
        self
    }

    /// ホスト書き換えルールをまとめて設定
    pub fn hosts(mut self, rules: Vec<HostRule>) -> Self {
        self.hosts = rules;
        self
    }

    /// 証明書検証を設定
    pub fn validate_certificates(mut self, validate: bool) -> Self {
        self.validate_certificates = validate;
        self
    }

    /// プロキシを設定
    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RequestConfig::default();
        assert_eq!(config.timeout, None);
        assert!(config.follow_redirects);
        assert!(config.validate_certificates);
        assert!(config.hosts.is_empty());
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let config = RequestConfig::new().timeout_ms(0);
        assert_eq!(config.timeout, None);
        let config = RequestConfig::new().timeout_ms(1500);
        assert_eq!(config.timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_builder() {
        let config = RequestConfig::new()
            .follow_redirects(false)
            .host_rule(HostRule::new("a", "b"))
            .validate_certificates(false)
            .proxy(ProxyConfig::new("http://proxy:3128").credentials("u", "p"));
        assert!(!config.follow_redirects);
        assert_eq!(config.hosts.len(), 1);
        assert!(!config.validate_certificates);
        assert_eq!(
            config.proxy.and_then(|p| p.username),
            Some("u".to_string())
        );
    }
}
