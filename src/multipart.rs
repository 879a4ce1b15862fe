//! multipart/form-data ボディ生成 (RFC 7578)
//!
//! ## 使い方
//!
//! ```rust
//! use socket_http11::multipart::{MultipartBuilder, extract_boundary};
//!
//! // 乱数は呼び出し側が用意する
//! let body = MultipartBuilder::new(42)
//!     .text_field("title", "hello")
//!     .file_field("file", "a.txt", "text/plain", b"content")
//!     .build();
//!
//! assert_eq!(extract_boundary(&body).as_deref(), Some("----FormBoundary42"));
//! ```

use crate::byte_util::find_subsequence;

/// フォームのパート
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    /// テキストフィールド
    Text {
        /// フィールド名
        name: String,
        /// 値
        value: String,
    },
    /// ファイルフィールド
    File {
        /// フィールド名
        name: String,
        /// ファイル名
        filename: String,
        /// Content-Type
        content_type: String,
        /// 内容
        data: Vec<u8>,
    },
}

impl FormPart {
    fn write_to(&self, boundary: &str, out: &mut Vec<u8>) {
        out.extend_from_slice(b"--");
        out.extend_from_slice(boundary.as_bytes());
        out.extend_from_slice(b"\r\n");
        match self {
            FormPart::Text { name, value } => {
                out.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
                        escape_quoted(name)
                    )
                    .as_bytes(),
                );
                out.extend_from_slice(value.as_bytes());
            }
            FormPart::File {
                name,
                filename,
                content_type,
                data,
            } => {
                out.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        escape_quoted(name),
                        escape_quoted(filename)
                    )
                    .as_bytes(),
                );
                out.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
                out.extend_from_slice(data);
            }
        }
        out.extend_from_slice(b"\r\n");
    }
}

/// multipart/form-data ボディのビルダー
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartBuilder {
    boundary: String,
    parts: Vec<FormPart>,
}

impl MultipartBuilder {
    /// 乱数値を受け取って境界を生成する
    ///
    /// Sans I/O の原則に従い、乱数生成は呼び出し側の責任となる。
    pub fn new(random_value: u64) -> Self {
        Self::with_boundary(&format!("----FormBoundary{}", random_value))
    }

    /// 境界を指定して作成
    pub fn with_boundary(boundary: &str) -> Self {
        Self {
            boundary: boundary.to_string(),
            parts: Vec::new(),
        }
    }

    /// 境界文字列を取得
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Content-Type ヘッダー値を取得
    pub fn content_type(&self) -> String {
        content_type_for(&self.boundary)
    }

    /// テキストフィールドを追加
    pub fn text_field(mut self, name: &str, value: &str) -> Self {
        self.parts.push(FormPart::Text {
            name: name.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// ファイルフィールドを追加
    pub fn file_field(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.parts.push(FormPart::File {
            name: name.to_string(),
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            data: data.to_vec(),
        });
        self
    }

    /// パートを追加
    pub fn part(mut self, part: FormPart) -> Self {
        self.parts.push(part);
        self
    }

    /// パート一覧
    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// ボディをビルド
    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for part in &self.parts {
            part.write_to(&self.boundary, &mut out);
        }
        out.extend_from_slice(b"--");
        out.extend_from_slice(self.boundary.as_bytes());
        out.extend_from_slice(b"--\r\n");
        out
    }
}

/// 境界から Content-Type ヘッダー値を作る
pub fn content_type_for(boundary: &str) -> String {
    format!("multipart/form-data; boundary={}", boundary)
}

/// 生成済みボディから境界を取り出す
///
/// 最初の `--` から次の CRLF までを境界とみなす。
pub fn extract_boundary(body: &[u8]) -> Option<String> {
    let start = find_subsequence(body, b"--", 0)? + 2;
    let end = find_subsequence(body, b"\r\n", start)?;
    let boundary = std::str::from_utf8(&body[start..end]).ok()?;
    if boundary.is_empty() {
        return None;
    }
    Some(boundary.to_string())
}

fn escape_quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
