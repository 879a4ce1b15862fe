//! ヘッダーコレクション
//!
//! 挿入順を保持し、名前の大文字小文字を区別しないヘッダーの集合。
//! アプリケーション層が扱うテキスト形式 (`Name: value` を改行で区切ったもの) と相互変換できる。
//!
//! ```rust
//! use socket_http11::Headers;
//!
//! let mut headers = Headers::parse("Accept: */*\nX-Id: 1");
//! headers.set("x-id", "2");
//! assert_eq!(headers.get("X-ID"), Some("2"));
//! assert_eq!(headers.to_text(), "Accept: */*\nX-Id: 2");
//! ```

use core::fmt;

/// ヘッダーの集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// 空のヘッダーを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// テキスト形式のヘッダーをパース
    ///
    /// 空行とコロンのない行は無視する。
    pub fn parse(text: &str) -> Self {
        let entries = text
            .lines()
            .filter_map(|line| {
                let (name, value) = line.split_once(':')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some((name.to_string(), value.trim().to_string()))
            })
            .collect();
        Self { entries }
    }

    /// ヘッダー値を取得 (最初に一致したもの)
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// 指定した名前のヘッダー値をすべて取得
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// ヘッダーが存在するか確認
    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n.eq_ignore_ascii_case(name))
    }

    /// ヘッダーを設定
    ///
    /// 既存のヘッダーがあれば最初の位置で値を置き換え、残りは削除する。
    pub fn set(&mut self, name: &str, value: &str) {
        match self
            .entries
            .iter()
            .position(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(pos) => {
                self.entries[pos].1 = value.to_string();
                let mut index = 0;
                self.entries.retain(|(n, _)| {
                    let keep = index <= pos || !n.eq_ignore_ascii_case(name);
                    index += 1;
                    keep
                });
            }
            None => self.append(name, value),
        }
    }

    /// ヘッダーを末尾に追加
    pub fn append(&mut self, name: &str, value: &str) {
        self.entries.push((name.to_string(), value.to_string()));
    }

    /// ヘッダーを先頭に追加
    pub fn prepend(&mut self, name: &str, value: &str) {
        self.entries.insert(0, (name.to_string(), value.to_string()));
    }

    /// 指定した名前のヘッダーをすべて削除
    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
    }

    /// ヘッダーを順に列挙
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// ヘッダー数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 空かどうか
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// テキスト形式に変換
    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|(n, v)| format!("{}: {}", n, v))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// 内部のペア列を取得
    pub fn as_slice(&self) -> &[(String, String)] {
        &self.entries
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<Vec<(String, String)>> for Headers {
    fn from(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}
