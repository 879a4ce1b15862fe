/// レスポンスパーサーの制限設定
///
/// どれかを超えた時点でパースは失敗し、そのリクエストはエラーで終わる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserLimits {
    /// ステータス行とヘッダーブロックの合計最大サイズ (デフォルト: 256KB)
    pub max_header_size: usize,
    /// 最大ボディサイズ (デフォルト: 100MB)
    ///
    /// 展開前のサイズで判定する。
    pub max_body_size: usize,
    /// chunked のサイズ行とトレーラー行の最大長 (デフォルト: 1KB)
    pub max_chunk_line_size: usize,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            max_header_size: 256 * 1024,
            max_body_size: 100 * 1024 * 1024,
            max_chunk_line_size: 1024,
        }
    }
}

impl ParserLimits {
    /// ヘッダーの上限を設定
    pub fn max_header_size(mut self, size: usize) -> Self {
        self.max_header_size = size;
        self
    }

    /// ボディの上限を設定
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// chunked の行長の上限を設定
    pub fn max_chunk_line_size(mut self, size: usize) -> Self {
        self.max_chunk_line_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let limits = ParserLimits::default()
            .max_header_size(1024)
            .max_body_size(10)
            .max_chunk_line_size(16);
        assert_eq!(limits.max_header_size, 1024);
        assert_eq!(limits.max_body_size, 10);
        assert_eq!(limits.max_chunk_line_size, 16);
    }
}
