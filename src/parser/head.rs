//! ステータス行とヘッダーブロックのパース

use crate::error::{Error, Result};
use crate::headers::Headers;

/// ステータス行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    /// HTTP バージョン (HTTP/1.1 等)
    pub version: String,
    /// ステータスコード (数値でなければ 0)
    pub status: u16,
    /// ステータスフレーズ
    pub status_text: String,
}

/// ステータス行をパース
///
/// `HTTP/x.x ` の接頭辞を取り除き、残りをステータスコードとフレーズに分ける。
/// ステータスコードが数値として読めない場合は 0 になる。
pub fn parse_status_line(line: &[u8]) -> Result<StatusLine> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches('\r');

    let Some(rest) = line.strip_prefix("HTTP/") else {
        return Err(Error::Protocol(format!("invalid status line: {:?}", line)));
    };
    let (version, rest) = match rest.split_once(' ') {
        Some((v, rest)) => (v, rest.trim_start()),
        None => (rest, ""),
    };

    let (code, text) = rest.split_once(' ').unwrap_or((rest, ""));
    let status = code.parse::<u16>().unwrap_or(0);
    // フレーズは最初の LF までで打ち切る
    let text = text.split('\n').next().unwrap_or("").trim();

    Ok(StatusLine {
        version: format!("HTTP/{}", version),
        status,
        status_text: text.to_string(),
    })
}

/// ヘッダーブロックをパース
///
/// 空白で始まる行は直前のヘッダーの継続行として扱う。
/// コロンのない行は行全体を名前、値を空文字列として保持する。
/// 返り値は受信順のままで、重複もそのまま残す。
pub fn parse_header_block(block: &[u8]) -> Vec<(String, String)> {
    let text = String::from_utf8_lossy(block);
    let mut lines: Vec<String> = Vec::new();
    for raw in text.split('\n') {
        let raw = raw.trim_end_matches('\r');
        if raw.starts_with([' ', '\t']) {
            if let Some(last) = lines.last_mut() {
                let folded = raw.trim();
                if !folded.is_empty() {
                    last.push(' ');
                    last.push_str(folded);
                }
                continue;
            }
        }
        if raw.trim().is_empty() {
            continue;
        }
        lines.push(raw.to_string());
    }

    lines
        .into_iter()
        .map(|line| match line.split_once(':') {
            Some((name, value)) => (name.trim().to_string(), value.trim().to_string()),
            None => (line.trim().to_string(), String::new()),
        })
        .collect()
}

/// 同じ名前のヘッダーを `"; "` で連結する
///
/// 名前の大文字小文字と位置は最初に現れたものに合わせる。
pub fn join_repeated(raw: &[(String, String)]) -> Headers {
    let mut joined: Vec<(String, String)> = Vec::with_capacity(raw.len());
    for (name, value) in raw {
        match joined
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => {
                existing.push_str("; ");
                existing.push_str(value);
            }
            None => joined.push((name.clone(), value.clone())),
        }
    }
    Headers::from(joined)
}

/// Transfer-Encoding の最後のコーディングが chunked か
pub fn is_chunked(headers: &Headers) -> bool {
    headers
        .get("Transfer-Encoding")
        .and_then(|v| v.split([',', ';']).map(str::trim).filter(|t| !t.is_empty()).last())
        .is_some_and(|t| t.eq_ignore_ascii_case("chunked"))
}

/// Content-Length を取得
///
/// 重複して `"; "` で連結されている場合はすべて同じ値でなければならない。
pub fn content_length(headers: &Headers) -> Result<Option<usize>> {
    let Some(value) = headers.get("Content-Length") else {
        return Ok(None);
    };
    let mut parsed: Option<usize> = None;
    for part in value.split([',', ';']) {
        let part = part.trim();
        let n = part
            .parse::<usize>()
            .map_err(|_| Error::Protocol(format!("invalid Content-Length: {:?}", value)))?;
        if parsed.is_some_and(|p| p != n) {
            return Err(Error::Protocol(format!(
                "conflicting Content-Length: {:?}",
                value
            )));
        }
        parsed = Some(n);
    }
    Ok(parsed)
}
