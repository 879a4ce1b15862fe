//! Cookie の受け渡し (RFC 6265)
//!
//! ## 概要
//!
//! リダイレクトの各ホップで受け取った Set-Cookie を、次のホップの Cookie ヘッダーへ引き継ぐ。
//! 期限切れの Cookie は同名の既存 Cookie を削除する。
//!
//! ## 使い方
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use socket_http11::cookie::merge_cookie_header;
//!
//! let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
//! let merged = merge_cookie_header(
//!     Some("a=1; b=2"),
//!     &["b=3; Path=/", "a=; Max-Age=0", "c=4; HttpOnly"],
//!     now,
//! );
//! assert_eq!(merged.as_deref(), Some("b=3; c=4"));
//! ```

use core::fmt;

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

/// Cookie (name=value ペア)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie 名
    pub name: String,
    /// Cookie 値
    pub value: String,
}

impl Cookie {
    /// 新しい Cookie を作成
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Cookie ヘッダー文字列をパース
    ///
    /// `=` のないペアは読み飛ばす。
    pub fn parse_header(input: &str) -> Vec<Cookie> {
        input
            .split(';')
            .filter_map(|pair| {
                let (name, value) = pair.trim().split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some(Cookie::new(name, value.trim()))
            })
            .collect()
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Set-Cookie ヘッダー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetCookie {
    /// Cookie 本体
    pub cookie: Cookie,
    /// Expires 属性
    pub expires: Option<DateTime<Utc>>,
    /// Max-Age 属性 (秒)
    pub max_age: Option<i64>,
    /// Domain 属性
    pub domain: Option<String>,
    /// Path 属性
    pub path: Option<String>,
    /// Secure 属性
    pub secure: bool,
    /// HttpOnly 属性
    pub http_only: bool,
}

impl SetCookie {
    /// Set-Cookie ヘッダー文字列をパース
    ///
    /// 最初の `name=value` が読めなければ `None`。
    /// 解釈できない属性値は無視する。
    pub fn parse(input: &str) -> Option<Self> {
        let mut parts = input.split(';');
        let (name, value) = parts.next()?.trim().split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let mut set_cookie = SetCookie {
            cookie: Cookie::new(name, value.trim()),
            expires: None,
            max_age: None,
            domain: None,
            path: None,
            secure: false,
            http_only: false,
        };

        for part in parts {
            let part = part.trim();
            let (attr, attr_value) = match part.split_once('=') {
                Some((a, v)) => (a.trim(), v.trim()),
                None => (part, ""),
            };
            match attr.to_ascii_lowercase().as_str() {
                "expires" => set_cookie.expires = parse_cookie_date(attr_value),
                "max-age" => set_cookie.max_age = attr_value.parse().ok(),
                "domain" => set_cookie.domain = Some(attr_value.to_string()),
                "path" => set_cookie.path = Some(attr_value.to_string()),
                "secure" => set_cookie.secure = true,
                "httponly" => set_cookie.http_only = true,
                // 未知の属性は無視 (RFC 6265 の推奨)
                _ => {}
            }
        }

        Some(set_cookie)
    }

    /// `now` の時点で期限切れか
    ///
    /// Max-Age があれば Expires より優先する。
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        if let Some(max_age) = self.max_age {
            return max_age <= 0;
        }
        self.expires.is_some_and(|expires| expires <= now)
    }

    /// `received_at` に受け取った Cookie の有効期限
    pub fn expiry(&self, received_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self.max_age {
            Some(max_age) => received_at.checked_add_signed(TimeDelta::seconds(max_age)),
            None => self.expires,
        }
    }
}

/// Cookie の Expires 日付をパース
///
/// RFC 1123、RFC 850、asctime、Netscape 形式を受け付ける。
pub fn parse_cookie_date(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc2822(input) {
        return Some(date.with_timezone(&Utc));
    }
    const FORMATS: &[&str] = &[
        "%A, %d-%b-%y %H:%M:%S GMT",
        "%a, %d-%b-%Y %H:%M:%S GMT",
        "%a, %d %b %Y %H:%M:%S GMT",
        "%a %b %e %H:%M:%S %Y",
    ];
    FORMATS.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(input, format)
            .ok()
            .map(|naive| naive.and_utc())
    })
}

/// Set-Cookie を既存の Cookie ヘッダーにマージする
///
/// 同名の Cookie は値を置き換え、期限切れの Cookie は同名のものを削除する。
/// マージ後に Cookie が残らなければ `None` (ヘッダーを削除する)。
pub fn merge_cookie_header(
    existing: Option<&str>,
    set_cookies: &[&str],
    now: DateTime<Utc>,
) -> Option<String> {
    let mut jar = existing.map(Cookie::parse_header).unwrap_or_default();

    for value in set_cookies {
        let Some(set_cookie) = SetCookie::parse(value) else {
            tracing::debug!(value = %value, "ignoring malformed Set-Cookie");
            continue;
        };
        let position = jar.iter().position(|c| c.name == set_cookie.cookie.name);
        if set_cookie.is_expired(now) {
            jar.retain(|c| c.name != set_cookie.cookie.name);
            continue;
        }
        match position {
            Some(i) => jar[i].value = set_cookie.cookie.value,
            None => jar.push(set_cookie.cookie),
        }
    }

    if jar.is_empty() {
        return None;
    }
    Some(
        jar.iter()
            .map(Cookie::to_string)
            .collect::<Vec<_>>()
            .join("; "),
    )
}
