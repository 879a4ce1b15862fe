//! ホスト書き換えルール
//!
//! 接続先だけを差し替えるためのルール。論理的なリクエスト URL と `Host` ヘッダーは変えない。
//!
//! `from` パターン中の `*` は任意長の文字列にマッチし、キャプチャになる。
//! `to` の中では `$1` から `$9` でキャプチャを参照できる。
//! 大文字小文字は区別しない。
//!
//! ```rust
//! use socket_http11::HostRule;
//!
//! let rules = vec![HostRule::new("domain.com", "127.0.0.1:8123")];
//! let rewritten = socket_http11::host_rules::rewrite(&rules, "http://domain.com/api");
//! assert_eq!(rewritten.as_deref(), Some("http://127.0.0.1:8123/api"));
//! ```

use crate::error::Result;
use crate::url::Url;

/// ホスト書き換えルール
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRule {
    /// マッチさせるパターン (`*` はワイルドカード)
    pub from: String,
    /// 置き換え先 (`$n` でキャプチャを参照)
    pub to: String,
}

impl HostRule {
    /// ルールを作成
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// ルールを適用
    ///
    /// パターンが入力中に現れなければ `None` を返す。
    /// 複数箇所に現れる場合は最も左の一箇所だけを置き換える。
    pub fn apply(&self, input: &str) -> Option<String> {
        if self.from.is_empty() {
            return None;
        }
        let pattern = self.from.as_bytes();
        for start in 0..=input.len() {
            if !input.is_char_boundary(start) {
                continue;
            }
            let mut captures = Vec::new();
            if let Some(end) = match_at(pattern, input, start, &mut captures) {
                let replacement = expand(&self.to, input, &captures);
                let mut out = String::with_capacity(input.len() + replacement.len());
                out.push_str(&input[..start]);
                out.push_str(&replacement);
                out.push_str(&input[end..]);
                return Some(out);
            }
        }
        None
    }
}

/// ルール列を URL 文字列に適用
///
/// 最初にマッチしたルールだけを使う。どれもマッチしなければ `None`。
pub fn rewrite(rules: &[HostRule], url: &str) -> Option<String> {
    rules.iter().find_map(|rule| rule.apply(url))
}

/// ルール列を適用して接続先 URL を求める
///
/// マッチしなければ元の URL をそのまま返す。
pub fn resolve(rules: &[HostRule], url: &Url) -> Result<Url> {
    match rewrite(rules, &url.to_string()) {
        Some(rewritten) => {
            tracing::debug!(from = %url, to = %rewritten, "host rule applied");
            Url::parse(&rewritten)
        }
        None => Ok(url.clone()),
    }
}

/// `start` からパターンをマッチさせ、マッチした終端位置を返す
///
/// `*` は貪欲にマッチし、失敗したら短くしてやり直す。
fn match_at(
    pattern: &[u8],
    text: &str,
    pos: usize,
    captures: &mut Vec<(usize, usize)>,
) -> Option<usize> {
    let Some((&first, rest)) = pattern.split_first() else {
        return Some(pos);
    };
    if first == b'*' {
        for end in (pos..=text.len()).rev() {
            if !text.is_char_boundary(end) {
                continue;
            }
            captures.push((pos, end));
            if let Some(matched) = match_at(rest, text, end, captures) {
                return Some(matched);
            }
            captures.pop();
        }
        return None;
    }
    let byte = *text.as_bytes().get(pos)?;
    if byte.eq_ignore_ascii_case(&first) {
        match_at(rest, text, pos + 1, captures)
    } else {
        None
    }
}

/// 置き換え先の `$n` をキャプチャで展開
fn expand(template: &str, text: &str, captures: &[(usize, usize)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('$') => {
                chars.next();
                out.push('$');
            }
            Some(d @ '1'..='9') => {
                chars.next();
                let index = d as usize - '1' as usize;
                if let Some(&(s, e)) = captures.get(index) {
                    out.push_str(&text[s..e]);
                }
            }
            _ => out.push('$'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_rule() {
        let rule = HostRule::new("domain.com", "127.0.0.1:8123");
        assert_eq!(
            rule.apply("http://domain.com/api").as_deref(),
            Some("http://127.0.0.1:8123/api")
        );
    }

    #[test]
    fn test_case_insensitive() {
        let rule = HostRule::new("Domain.COM", "localhost");
        assert_eq!(
            rule.apply("http://domain.com/").as_deref(),
            Some("http://localhost/")
        );
    }

    #[test]
    fn test_dot_is_literal() {
        let rule = HostRule::new("a.com", "b.com");
        assert_eq!(rule.apply("http://abcom/"), None);
    }

    #[test]
    fn test_wildcard_capture() {
        let rule = HostRule::new("*.example.com", "$1.test.local");
        assert_eq!(
            rule.apply("api.example.com").as_deref(),
            Some("api.test.local")
        );
    }

    #[test]
    fn test_wildcard_in_url() {
        let rule = HostRule::new("http://*.dev/", "http://127.0.0.1:9000/$1/");
        assert_eq!(
            rule.apply("http://app.dev/index").as_deref(),
            Some("http://127.0.0.1:9000/app/index")
        );
    }

    #[test]
    fn test_first_rule_wins() {
        let rules = vec![
            HostRule::new("nomatch.org", "x"),
            HostRule::new("domain.com", "first"),
            HostRule::new("domain.com", "second"),
        ];
        assert_eq!(
            rewrite(&rules, "http://domain.com/").as_deref(),
            Some("http://first/")
        );
    }

    #[test]
    fn test_no_match() {
        let rules = vec![HostRule::new("other.com", "x")];
        assert_eq!(rewrite(&rules, "http://domain.com/"), None);
        assert_eq!(rewrite(&[], "http://domain.com/"), None);
    }

    #[test]
    fn test_dollar_escape() {
        let rule = HostRule::new("a", "$$x$");
        assert_eq!(rule.apply("a").as_deref(), Some("$x$"));
    }

    #[test]
    fn test_resolve_url() {
        let rules = vec![HostRule::new("domain.com", "127.0.0.1:8123")];
        let url = Url::parse("http://domain.com/api?q=1").unwrap();
        let target = resolve(&rules, &url).unwrap();
        assert_eq!(target.host(), "127.0.0.1");
        assert_eq!(target.port_or_default(), 8123);
        assert_eq!(target.request_target(), "/api?q=1");
        // 元の URL は変わらない
        assert_eq!(url.host_header_value(), "domain.com");
    }
}
