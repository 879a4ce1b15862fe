//! バイト列ユーティリティ
//!
//! 改行コードの正規化、部分列検索、バッファの連結を提供する。

/// 改行コードを CRLF に正規化
///
/// 単独の `\n` と単独の `\r` を `\r\n` に変換する。
/// 既存の `\r\n` はそのまま残す (二重に正規化しない)。
pub fn normalize_line_endings(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len() + input.len() / 16);
    let mut i = 0;
    while i < input.len() {
        match input[i] {
            b'\r' => {
                out.extend_from_slice(b"\r\n");
                if input.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
            }
            b'\n' => out.extend_from_slice(b"\r\n"),
            b => out.push(b),
        }
        i += 1;
    }
    out
}

/// `from` 以降で `needle` が最初に現れる位置を返す
pub fn find_subsequence(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || from >= haystack.len() || haystack.len() - from < needle.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|pos| pos + from)
}

/// 行末を探す
///
/// 最初の LF を探し、直前が CR なら CRLF として扱う。
/// 戻り値は (行末の位置, 終端のバイト数)。
pub fn find_line_end(buf: &[u8]) -> Option<(usize, usize)> {
    let lf = buf.iter().position(|&b| b == b'\n')?;
    if lf > 0 && buf[lf - 1] == b'\r' {
        Some((lf - 1, 2))
    } else {
        Some((lf, 1))
    }
}

/// ヘッダーブロックの終端を探す
///
/// 先頭の改行は空のヘッダーブロックを意味する。
/// それ以外は `CRLFCRLF`、`LFLF` の順に探す。
/// 戻り値は (ヘッダーブロックの長さ, 終端のバイト数)。
pub fn find_headers_end(buf: &[u8]) -> Option<(usize, usize)> {
    if buf.starts_with(b"\r\n") {
        return Some((0, 2));
    }
    if buf.starts_with(b"\n") {
        return Some((0, 1));
    }
    if let Some(pos) = find_subsequence(buf, b"\r\n\r\n", 0) {
        return Some((pos, 4));
    }
    if let Some(pos) = find_subsequence(buf, b"\n\n", 0) {
        return Some((pos, 2));
    }
    None
}

/// 2 つのバッファを連結した新しいバッファを返す
pub fn concat(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_bare_lf() {
        assert_eq!(normalize_line_endings(b"a\nb"), b"a\r\nb");
    }

    #[test]
    fn test_normalize_bare_cr() {
        assert_eq!(normalize_line_endings(b"a\rb\r"), b"a\r\nb\r\n");
    }

    #[test]
    fn test_normalize_keeps_crlf() {
        assert_eq!(normalize_line_endings(b"a\r\nb\r\n"), b"a\r\nb\r\n");
        assert_eq!(normalize_line_endings(b"\r\n\n\r"), b"\r\n\r\n\r\n");
    }

    #[test]
    fn test_find_subsequence() {
        assert_eq!(find_subsequence(b"abcabc", b"bc", 0), Some(1));
        assert_eq!(find_subsequence(b"abcabc", b"bc", 2), Some(4));
        assert_eq!(find_subsequence(b"abc", b"x", 0), None);
        assert_eq!(find_subsequence(b"abc", b"", 0), None);
        assert_eq!(find_subsequence(b"ab", b"abc", 0), None);
    }

    #[test]
    fn test_find_line_end() {
        assert_eq!(find_line_end(b"HTTP/1.1 200 OK\r\nX"), Some((15, 2)));
        assert_eq!(find_line_end(b"HTTP/1.1 200 OK\nX"), Some((15, 1)));
        assert_eq!(find_line_end(b"HTTP/1.1 200"), None);
        assert_eq!(find_line_end(b"A\nB\r\n"), Some((1, 1)));
    }

    #[test]
    fn test_find_headers_end() {
        assert_eq!(find_headers_end(b"A: b\r\n\r\nbody"), Some((4, 4)));
        assert_eq!(find_headers_end(b"A: b\n\nbody"), Some((4, 2)));
        assert_eq!(find_headers_end(b"\r\nbody"), Some((0, 2)));
        // 空のヘッダーブロックの後ろのボディに CRLFCRLF があっても先頭を優先
        assert_eq!(find_headers_end(b"\r\n\r\n\r\nbody"), Some((0, 2)));
        assert_eq!(find_headers_end(b"A: b\r\n"), None);
    }

    #[test]
    fn test_concat() {
        assert_eq!(concat(b"ab", b"cd"), b"abcd");
    }
}
