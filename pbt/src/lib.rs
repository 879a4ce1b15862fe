//! PBT テスト共通ユーティリティ

use proptest::prelude::*;

// ========================================
// トークン / ヘッダー
// ========================================

/// token 文字 (英数字と `-` `_` `.`)
pub fn token_char() -> impl Strategy<Value = char> {
    prop_oneof![
        prop::char::range('a', 'z'),
        prop::char::range('A', 'Z'),
        prop::char::range('0', '9'),
        Just('-'),
        Just('_'),
        Just('.'),
    ]
}

/// token 文字列 (1..=max_len 文字)
pub fn token_string(max_len: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec(token_char(), 1..=max_len)
        .prop_map(|chars| chars.into_iter().collect())
}

/// ヘッダー値 (前後に空白を持たない可視 ASCII)
pub fn header_value() -> impl Strategy<Value = String> {
    "[!-~]([ -~]{0,30}[!-~])?".prop_map(|s| s)
}

// ========================================
// ホスト / URL
// ========================================

/// ホスト名 (小文字のラベル 1-3 個)
pub fn hostname() -> impl Strategy<Value = String> {
    proptest::collection::vec("[a-z][a-z0-9]{0,9}", 1..=3).prop_map(|labels| labels.join("."))
}

/// パス (`/` 始まり)
pub fn url_path() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/".to_string()),
        "/[a-zA-Z0-9_.-]{1,16}(/[a-zA-Z0-9_.-]{1,16}){0,3}".prop_map(|s| s),
    ]
}

/// http の URL
pub fn http_url() -> impl Strategy<Value = String> {
    (hostname(), proptest::option::of(1u16..=65535), url_path())
        .prop_map(|(host, port, path)| match port {
            Some(port) => format!("http://{}:{}{}", host, port, path),
            None => format!("http://{}{}", host, path),
        })
}

// ========================================
// メソッド / ボディ
// ========================================

/// リクエストメソッド
pub fn http_method() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("GET".to_string()),
        Just("HEAD".to_string()),
        Just("POST".to_string()),
        Just("PUT".to_string()),
        Just("DELETE".to_string()),
        Just("PATCH".to_string()),
        Just("OPTIONS".to_string()),
    ]
}

/// 任意のボディ
pub fn body() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..512)
}

// ========================================
// 分割
// ========================================

/// データを `cuts` の位置で分割する
///
/// `cuts` の値はデータ長で割った余りとして扱う。
pub fn split_at_points(data: &[u8], cuts: &[usize]) -> Vec<Vec<u8>> {
    if data.is_empty() {
        return vec![Vec::new()];
    }
    let mut points: Vec<usize> = cuts.iter().map(|c| c % data.len()).collect();
    points.sort_unstable();
    points.dedup();

    let mut pieces = Vec::new();
    let mut start = 0;
    for point in points {
        if point > start {
            pieces.push(data[start..point].to_vec());
            start = point;
        }
    }
    pieces.push(data[start..].to_vec());
    pieces
}

/// 分割位置
pub fn cut_points() -> impl Strategy<Value = Vec<usize>> {
    proptest::collection::vec(any::<usize>(), 0..16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_at_points_concat() {
        let data = b"0123456789";
        let pieces = split_at_points(data, &[3, 3, 7, 10, 25]);
        assert_eq!(pieces.concat(), data.to_vec());
        assert!(pieces.iter().all(|p| !p.is_empty()));
    }

    #[test]
    fn test_split_at_points_empty() {
        assert_eq!(split_at_points(b"", &[1, 2]), vec![Vec::<u8>::new()]);
    }
}
