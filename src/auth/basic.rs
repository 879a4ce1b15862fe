use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Basic 認証の Authorization ヘッダー値を生成
///
/// RFC 7617 Section 2
///
/// ```rust
/// use socket_http11::auth::basic_header;
///
/// assert_eq!(basic_header("user", "password"), "Basic dXNlcjpwYXNzd29yZA==");
/// ```
pub fn basic_header(username: &str, password: &str) -> String {
    let credentials = format!("{}:{}", username, password);
    format!("Basic {}", STANDARD.encode(credentials.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_header() {
        assert_eq!(basic_header("user", "password"), "Basic dXNlcjpwYXNzd29yZA==");
        assert_eq!(basic_header("", ""), "Basic Og==");
    }

    #[test]
    fn test_basic_header_utf8() {
        // "ユーザー:pw"
        let header = basic_header("ユーザー", "pw");
        let encoded = header.strip_prefix("Basic ").unwrap();
        let decoded = STANDARD.decode(encoded).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "ユーザー:pw");
    }
}
