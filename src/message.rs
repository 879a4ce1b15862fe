//! 送信するリクエストメッセージの組み立て
//!
//! 呼び出し側のヘッダーは書き換えず、送信のたびに複製へ Host / Content-Length /
//! Authorization / Cookie を足して 1 つのバイト列にする。

use crate::headers::Headers;
use crate::multipart::{content_type_for, extract_boundary};
use crate::request::Payload;
use crate::url::Url;

/// リクエストターゲットの形式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TargetForm {
    /// `path[?query]` (origin-form)
    #[default]
    Origin,
    /// `scheme://host[:port]path[?query]` (平文 HTTP プロキシ経由)
    Absolute,
}

/// 組み立て済みのリクエスト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMessage {
    /// メソッド
    pub method: String,
    /// リクエストターゲット
    pub target: String,
    /// 実際に送るヘッダー
    pub headers: Headers,
    /// 実際に送るボディ
    pub body: Vec<u8>,
}

impl RequestMessage {
    /// バイト列にエンコード
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(256 + self.body.len());

        // Request line: METHOD SP request-target SP HTTP/1.1 CRLF
        buf.extend_from_slice(self.method.as_bytes());
        buf.push(b' ');
        buf.extend_from_slice(self.target.as_bytes());
        buf.extend_from_slice(b" HTTP/1.1\r\n");

        for (name, value) in self.headers.iter() {
            buf.extend_from_slice(name.as_bytes());
            buf.extend_from_slice(b": ");
            buf.extend_from_slice(value.as_bytes());
            buf.extend_from_slice(b"\r\n");
        }

        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(&self.body);
        buf
    }
}

/// リクエストメッセージのビルダー
///
/// `url` は Host ヘッダーとリクエストターゲットに使う論理 URL。
/// ホスト書き換えルールで接続先が変わっても Host は元のホストのまま送る。
#[derive(Debug)]
pub struct MessageBuilder<'a> {
    method: &'a str,
    url: &'a Url,
    headers: &'a Headers,
    payload: &'a Payload,
    target_form: TargetForm,
    extra: Vec<(String, String)>,
}

impl<'a> MessageBuilder<'a> {
    /// 新しいビルダーを作成
    pub fn new(method: &'a str, url: &'a Url, headers: &'a Headers, payload: &'a Payload) -> Self {
        Self {
            method,
            url,
            headers,
            payload,
            target_form: TargetForm::Origin,
            extra: Vec::new(),
        }
    }

    /// ターゲット形式を設定
    pub fn target_form(mut self, target_form: TargetForm) -> Self {
        self.target_form = target_form;
        self
    }

    /// このメッセージだけに載せるヘッダーを設定 (同名の既存ヘッダーを置き換える)
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.extra.push((name.to_string(), value.to_string()));
        self
    }

    /// 値があればヘッダーを設定
    pub fn header_opt(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.header(name, value),
            None => self,
        }
    }

    /// 送るボディ
    ///
    /// GET / HEAD はボディを送らない。
    pub fn body(&self) -> Vec<u8> {
        if is_bodiless_method(self.method) {
            return Vec::new();
        }
        self.payload.to_bytes()
    }

    /// メッセージを組み立てる
    pub fn build(self) -> RequestMessage {
        let body = self.body();
        let mut headers = self.headers.clone();

        if matches!(self.payload, Payload::Multipart(_)) && !body.is_empty() {
            // 実際のボディの境界文字列で Content-Type を上書きする
            if let Some(boundary) = extract_boundary(&body) {
                headers.set("Content-Type", &content_type_for(&boundary));
            }
        }

        for (name, value) in &self.extra {
            headers.set(name, value);
        }

        if !headers.has("Host") {
            headers.prepend("Host", &self.url.host_header_value());
        }

        if !is_bodiless_method(self.method) && !headers.has("Content-Length") {
            headers.append("Content-Length", &body.len().to_string());
        }

        let target = match self.target_form {
            TargetForm::Origin => self.url.request_target(),
            TargetForm::Absolute => format!("{}{}", self.url.origin(), self.url.request_target()),
        };

        RequestMessage {
            method: self.method.to_string(),
            target,
            headers,
            body,
        }
    }

    /// 組み立ててバイト列にする
    pub fn encode(self) -> Vec<u8> {
        self.build().encode()
    }
}

/// Content-Length を付けずボディも送らないメソッドか
pub fn is_bodiless_method(method: &str) -> bool {
    method.eq_ignore_ascii_case("GET") || method.eq_ignore_ascii_case("HEAD")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multipart::MultipartBuilder;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_get_request() {
        let u = url("http://example.com/path?q=1");
        let headers = Headers::new();
        let bytes = MessageBuilder::new("GET", &u, &headers, &Payload::None).encode();
        assert_eq!(
            bytes,
            b"GET /path?q=1 HTTP/1.1\r\nHost: example.com\r\n\r\n".to_vec()
        );
    }

    #[test]
    fn test_host_includes_non_default_port() {
        let u = url("http://example.com:8080/");
        let headers = Headers::new();
        let message = MessageBuilder::new("GET", &u, &headers, &Payload::None).build();
        assert_eq!(message.headers.get("Host"), Some("example.com:8080"));
    }

    #[test]
    fn test_caller_host_kept() {
        let u = url("http://127.0.0.1:8123/");
        let headers = Headers::parse("host: domain.com");
        let message = MessageBuilder::new("GET", &u, &headers, &Payload::None).build();
        assert_eq!(message.headers.get_all("Host"), vec!["domain.com"]);
    }

    #[test]
    fn test_get_never_gets_content_length() {
        let u = url("http://a/");
        let headers = Headers::new();
        let payload = Payload::Text("ignored".to_string());
        for method in ["GET", "HEAD", "get"] {
            let message = MessageBuilder::new(method, &u, &headers, &payload).build();
            assert!(!message.headers.has("Content-Length"));
            assert!(message.body.is_empty());
        }
    }

    #[test]
    fn test_post_text_normalized() {
        let u = url("http://a/submit");
        let headers = Headers::parse("Content-Type: text/plain");
        let payload = Payload::Text("a\nb\r\nc".to_string());
        let message = MessageBuilder::new("POST", &u, &headers, &payload).build();
        assert_eq!(message.body, b"a\r\nb\r\nc");
        assert_eq!(message.headers.get("Content-Length"), Some("7"));
        let bytes = message.encode();
        assert!(bytes.starts_with(b"POST /submit HTTP/1.1\r\nHost: a\r\n"));
        assert!(bytes.ends_with(b"\r\n\r\na\r\nb\r\nc"));
    }

    #[test]
    fn test_post_empty_body_has_zero_length() {
        let u = url("http://a/");
        let headers = Headers::new();
        let message = MessageBuilder::new("DELETE", &u, &headers, &Payload::None).build();
        assert_eq!(message.headers.get("Content-Length"), Some("0"));
    }

    #[test]
    fn test_caller_content_length_kept() {
        let u = url("http://a/");
        let headers = Headers::parse("Content-Length: 3");
        let payload = Payload::Binary(b"abc".to_vec());
        let message = MessageBuilder::new("PUT", &u, &headers, &payload).build();
        assert_eq!(message.headers.get_all("content-length"), vec!["3"]);
    }

    #[test]
    fn test_multipart_content_type_rewritten() {
        let u = url("http://a/upload");
        let headers = Headers::parse("Content-Type: multipart/form-data; boundary=stale");
        let payload = Payload::Multipart(MultipartBuilder::with_boundary("fresh").text_field("k", "v"));
        let message = MessageBuilder::new("POST", &u, &headers, &payload).build();
        assert_eq!(
            message.headers.get("Content-Type"),
            Some("multipart/form-data; boundary=fresh")
        );
    }

    #[test]
    fn test_extra_headers_do_not_touch_caller() {
        let u = url("http://a/");
        let headers = Headers::parse("Authorization: old\nAccept: */*");
        let message = MessageBuilder::new("GET", &u, &headers, &Payload::None)
            .header("Authorization", "Basic xyz")
            .header_opt("Cookie", Some("a=1"))
            .header_opt("Proxy-Authorization", None)
            .build();
        assert_eq!(message.headers.get("Authorization"), Some("Basic xyz"));
        assert_eq!(message.headers.get("Cookie"), Some("a=1"));
        assert!(!message.headers.has("Proxy-Authorization"));
        assert_eq!(headers.get("Authorization"), Some("old"));
        assert!(!headers.has("Host"));
    }

    #[test]
    fn test_absolute_form() {
        let u = url("http://example.com:8080/a?b=c");
        let headers = Headers::new();
        let message = MessageBuilder::new("GET", &u, &headers, &Payload::None)
            .target_form(TargetForm::Absolute)
            .build();
        assert_eq!(message.target, "http://example.com:8080/a?b=c");
    }
}
