//! chunked 転送エンコーディングのデコード
//!
//! 入力はどの位置で分割されていてもよい。チャンクサイズ行の途中で切れた場合は
//! 次の入力を待ち、チャンクデータ直後の CRLF が次の入力に回った場合は先頭で読み飛ばす。

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkPhase {
    /// チャンクサイズ行待ち
    Size,
    /// チャンクデータ読み取り中
    Data { remaining: usize },
    /// チャンクデータ後の CRLF 待ち (`saw_cr` は CR だけ読んだ状態)
    DataEnd { saw_cr: bool },
    /// 終端チャンク後のトレーラー
    Trailer,
    /// 完了
    Done,
}

/// chunked デコーダー
#[derive(Debug, Clone)]
pub struct ChunkedDecoder {
    phase: ChunkPhase,
    /// 途中で切れた行
    pending: Vec<u8>,
    max_line_size: usize,
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl ChunkedDecoder {
    /// 行長の上限を指定して作成
    pub fn new(max_line_size: usize) -> Self {
        Self {
            phase: ChunkPhase::Size,
            pending: Vec::new(),
            max_line_size,
        }
    }

    /// 終端チャンクまで読み終えたか
    pub fn is_done(&self) -> bool {
        self.phase == ChunkPhase::Done
    }

    /// 終端チャンクは読んだがトレーラーの終わりを待っているか
    pub fn is_in_trailer(&self) -> bool {
        self.phase == ChunkPhase::Trailer
    }

    /// 断片をデコードし、データを `out` に追加する
    ///
    /// 終端チャンクと空行まで読み終えたら `true` を返す。それ以降の入力は無視する。
    /// 不正なチャンクサイズ行は読み捨てて続きをデコードする。
    /// 行長の上限を超えた場合だけ `Err` を返し、次のチャンクサイズ行から読み直せる状態に戻る。
    pub fn decode(&mut self, data: &[u8], out: &mut Vec<u8>) -> Result<bool> {
        let mut pos = 0;
        loop {
            match self.phase {
                ChunkPhase::Done => return Ok(true),
                _ if pos >= data.len() => return Ok(false),
                ChunkPhase::Size => {
                    let Some(line) = self.take_line(data, &mut pos)? else {
                        return Ok(false);
                    };
                    let size = match parse_chunk_size(&line) {
                        Ok(size) => size,
                        Err(e) => {
                            // 不正な行だけを読み捨て、同じ断片の続きからサイズ行を探す
                            tracing::warn!(error = %e, "skipping malformed chunk size line");
                            continue;
                        }
                    };
                    tracing::trace!(size, "chunk");
                    self.phase = if size == 0 {
                        ChunkPhase::Trailer
                    } else {
                        ChunkPhase::Data { remaining: size }
                    };
                }
                ChunkPhase::Data { remaining } => {
                    let take = remaining.min(data.len() - pos);
                    out.extend_from_slice(&data[pos..pos + take]);
                    pos += take;
                    self.phase = if take == remaining {
                        ChunkPhase::DataEnd { saw_cr: false }
                    } else {
                        ChunkPhase::Data {
                            remaining: remaining - take,
                        }
                    };
                }
                ChunkPhase::DataEnd { saw_cr } => match data[pos] {
                    b'\r' if !saw_cr => {
                        pos += 1;
                        self.phase = ChunkPhase::DataEnd { saw_cr: true };
                    }
                    b'\n' => {
                        pos += 1;
                        self.phase = ChunkPhase::Size;
                    }
                    _ => {
                        tracing::warn!("missing CRLF after chunk data");
                        self.phase = ChunkPhase::Size;
                    }
                },
                ChunkPhase::Trailer => {
                    let Some(line) = self.take_line(data, &mut pos)? else {
                        return Ok(false);
                    };
                    // トレーラーヘッダーは読み捨てる
                    if line.is_empty() {
                        self.phase = ChunkPhase::Done;
                    }
                }
            }
        }
    }

    /// 入力の終端 (接続が閉じた) を通知
    ///
    /// 終端チャンクを読んだ後であれば最後の空行がなくても完了とみなす。
    pub fn finish(&mut self) -> bool {
        if self.phase == ChunkPhase::Trailer {
            self.phase = ChunkPhase::Done;
        }
        self.is_done()
    }

    /// LF までの 1 行を取り出す (末尾の CR は除く)
    ///
    /// LF が見つからなければ残りを保留して `None` を返す。
    fn take_line(&mut self, data: &[u8], pos: &mut usize) -> Result<Option<Vec<u8>>> {
        let rest = &data[*pos..];
        let (chunk, found) = match rest.iter().position(|&b| b == b'\n') {
            Some(i) => (&rest[..i], Some(i + 1)),
            None => (rest, None),
        };
        if self.pending.len() + chunk.len() > self.max_line_size {
            self.pending.clear();
            *pos = data.len();
            return Err(Error::Protocol("chunk size line too long".to_string()));
        }
        self.pending.extend_from_slice(chunk);
        match found {
            Some(advance) => {
                *pos += advance;
                let mut line = std::mem::take(&mut self.pending);
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                Ok(Some(line))
            }
            None => {
                *pos = data.len();
                Ok(None)
            }
        }
    }
}

/// チャンクサイズ行をパース (チャンク拡張は無視)
fn parse_chunk_size(line: &[u8]) -> Result<usize> {
    let text = String::from_utf8_lossy(line);
    let hex = text.split(';').next().unwrap_or("").trim();
    usize::from_str_radix(hex, 16)
        .map_err(|_| Error::Protocol(format!("invalid chunk size: {:?}", hex)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(parts: &[&[u8]]) -> (Vec<u8>, bool) {
        let mut decoder = ChunkedDecoder::default();
        let mut out = Vec::new();
        let mut done = false;
        for part in parts {
            done = decoder.decode(part, &mut out).unwrap();
        }
        (out, done)
    }

    #[test]
    fn test_single_fragment() {
        let (out, done) = decode_all(&[b"5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n"]);
        assert_eq!(out, b"hello world");
        assert!(done);
    }

    #[test]
    fn test_split_inside_size_line() {
        let (out, done) = decode_all(&[b"1", b"0\r", b"\n0123456789abcdef\r\n0\r\n\r\n"]);
        assert_eq!(out, b"0123456789abcdef");
        assert!(done);
    }

    #[test]
    fn test_split_inside_data() {
        let (out, done) = decode_all(&[b"a\r\n01234", b"56789\r\n0\r\n\r\n"]);
        assert_eq!(out, b"0123456789");
        assert!(done);
    }

    #[test]
    fn test_dangling_crlf() {
        // データ直後で切れ、CRLF が次の断片の先頭に来る
        let (out, done) = decode_all(&[b"3\r\nabc", b"\r\n3\r\ndef\r\n0\r\n\r\n"]);
        assert_eq!(out, b"abcdef");
        assert!(done);

        // CR と LF の間で切れる
        let (out, done) = decode_all(&[b"3\r\nabc\r", b"\n0\r\n\r\n"]);
        assert_eq!(out, b"abc");
        assert!(done);
    }

    #[test]
    fn test_byte_by_byte() {
        let input = b"4;ext=1\r\nwiki\r\n5\r\npedia\r\n0\r\nX-Trailer: v\r\n\r\n";
        let mut decoder = ChunkedDecoder::default();
        let mut out = Vec::new();
        let mut done = false;
        for b in input.iter() {
            done = decoder.decode(std::slice::from_ref(b), &mut out).unwrap();
        }
        assert_eq!(out, b"wikipedia");
        assert!(done);
    }

    #[test]
    fn test_lf_only() {
        let (out, done) = decode_all(&[b"3\nabc\n0\n\n"]);
        assert_eq!(out, b"abc");
        assert!(done);
    }

    #[test]
    fn test_waits_for_final_empty_line() {
        let mut decoder = ChunkedDecoder::default();
        let mut out = Vec::new();
        assert!(!decoder.decode(b"1\r\nx\r\n0\r\n", &mut out).unwrap());
        assert!(decoder.is_in_trailer());
        assert!(decoder.decode(b"\r\n", &mut out).unwrap());
    }

    #[test]
    fn test_finish_after_terminal_chunk() {
        let mut decoder = ChunkedDecoder::default();
        let mut out = Vec::new();
        decoder.decode(b"0\r\n", &mut out).unwrap();
        assert!(decoder.finish());

        let mut decoder = ChunkedDecoder::default();
        decoder.decode(b"5\r\nab", &mut out).unwrap();
        assert!(!decoder.finish());
    }

    #[test]
    fn test_invalid_size_recovers() {
        let mut decoder = ChunkedDecoder::default();
        let mut out = Vec::new();
        assert!(!decoder.decode(b"zz\r\n", &mut out).unwrap());
        assert!(decoder.decode(b"2\r\nok\r\n0\r\n\r\n", &mut out).unwrap());
        assert_eq!(out, b"ok");
    }

    #[test]
    fn test_invalid_size_between_chunks() {
        let (out, done) = decode_all(&[b"2\r\nok\r\nzz\r\n3\r\nabc\r\n0\r\n\r\n"]);
        assert_eq!(out, b"okabc");
        assert!(done);
    }

    #[test]
    fn test_line_too_long() {
        let mut decoder = ChunkedDecoder::new(4);
        let mut out = Vec::new();
        assert!(decoder.decode(b"00000001\r\n", &mut out).is_err());
    }

    #[test]
    fn test_ignores_data_after_done() {
        let mut decoder = ChunkedDecoder::default();
        let mut out = Vec::new();
        assert!(decoder.decode(b"0\r\n\r\ngarbage", &mut out).unwrap());
        assert!(decoder.decode(b"more", &mut out).unwrap());
        assert!(out.is_empty());
    }
}
