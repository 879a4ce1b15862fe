//! リダイレクトの判断とループ検出

use crate::error::{Error, Result};
use crate::response::Response;
use crate::url::Url;

/// 追従するリダイレクト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// 次のリクエスト先 (Location を現在の URL に対して解決したもの)
    pub url: Url,
    /// 次のリクエストのメソッド
    pub method: String,
    /// ペイロードを捨てるか (303 で GET に変える場合)
    pub drop_payload: bool,
}

/// リダイレクトするかどうかを判断する
///
/// - 300 / 304 / 305 はリダイレクトしない
/// - 301 / 302 / 307 は元のメソッドが GET か HEAD のときだけ
/// - 303 は常にリダイレクトし、メソッドを GET にする
/// - 308 はメソッドとペイロードを保ったままリダイレクトする
///
/// Location がなければリダイレクトしない。
pub fn decide(
    status: u16,
    method: &str,
    location: Option<&str>,
    current: &Url,
) -> Result<Option<Redirect>> {
    let is_get_or_head = method.eq_ignore_ascii_case("GET") || method.eq_ignore_ascii_case("HEAD");
    let (method, drop_payload) = match status {
        301 | 302 | 307 if is_get_or_head => (method.to_ascii_uppercase(), false),
        303 => ("GET".to_string(), true),
        308 => (method.to_string(), false),
        _ => return Ok(None),
    };
    let Some(location) = location.map(str::trim).filter(|l| !l.is_empty()) else {
        return Ok(None);
    };
    let url = current.join(location)?;
    Ok(Some(Redirect {
        url,
        method,
        drop_payload,
    }))
}

/// 経由したレスポンスの記録
///
/// リクエストした URL ごとに 1 つだけ保持する。同じ URL を再訪したらループとみなす。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedirectSet {
    entries: Vec<(String, Response)>,
}

impl RedirectSet {
    /// 空の記録を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定 URL を既に記録しているか
    pub fn contains(&self, url: &str) -> bool {
        self.entries.iter().any(|(u, _)| u == url)
    }

    /// ホップのレスポンスを記録し、次の URL がループしていないか確かめる
    ///
    /// 記録済みの `url` のレスポンスを返す。
    pub fn record(&mut self, url: &str, response: Response, next: &str) -> Result<&Response> {
        let index = match self.entries.iter().position(|(u, _)| u == url) {
            Some(index) => index,
            None => {
                self.entries.push((url.to_string(), response));
                self.entries.len() - 1
            }
        };
        if self.contains(next) {
            return Err(Error::RedirectLoop {
                url: next.to_string(),
            });
        }
        Ok(&self.entries[index].1)
    }

    /// 記録数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 空かどうか
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 古い順に列挙
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Response)> {
        self.entries.iter().map(|(u, r)| (u.as_str(), r))
    }

    /// レスポンスだけを古い順に取り出す
    pub fn into_responses(self) -> Vec<Response> {
        self.entries.into_iter().map(|(_, r)| r).collect()
    }
}
