//! Content-Encoding の展開 (gzip, deflate)
//!
//! 完成したボディを Content-Encoding に従って展開する。
//! gzip と deflate 以外、あるいは Content-Encoding がない場合はそのまま返す。

use std::io::Read;

use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};

use crate::error::{Error, Result};
use crate::headers::Headers;

/// 対応している Content-Encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCoding {
    /// gzip / x-gzip
    Gzip,
    /// deflate (zlib ラップ、生 deflate も受け付ける)
    Deflate,
}

impl ContentCoding {
    /// Content-Encoding ヘッダー値から展開方式を決める
    ///
    /// 値に gzip か deflate が含まれていればそれを使う。
    pub fn from_header(value: &str) -> Option<Self> {
        let value = value.to_ascii_lowercase();
        if value.contains("gzip") {
            Some(ContentCoding::Gzip)
        } else if value.contains("deflate") {
            Some(ContentCoding::Deflate)
        } else {
            None
        }
    }
}

/// ヘッダーに従ってボディを展開する
pub fn decode_body(headers: &Headers, body: Vec<u8>) -> Result<Vec<u8>> {
    let Some(coding) = headers
        .get("Content-Encoding")
        .and_then(ContentCoding::from_header)
    else {
        return Ok(body);
    };
    if body.is_empty() {
        return Ok(body);
    }
    let decoded = decompress(coding, &body)?;
    tracing::debug!(?coding, from = body.len(), to = decoded.len(), "body decompressed");
    Ok(decoded)
}

/// 指定の方式で展開する
pub fn decompress(coding: ContentCoding, data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    match coding {
        ContentCoding::Gzip => {
            GzDecoder::new(data)
                .read_to_end(&mut out)
                .map_err(|e| Error::Decompression(format!("gzip: {}", e)))?;
        }
        ContentCoding::Deflate => {
            // RFC 9110 の deflate は zlib 形式だが、生 deflate を送るサーバーもある
            if ZlibDecoder::new(data).read_to_end(&mut out).is_err() {
                out.clear();
                DeflateDecoder::new(data)
                    .read_to_end(&mut out)
                    .map_err(|e| Error::Decompression(format!("deflate: {}", e)))?;
            }
        }
    }
    Ok(out)
}
