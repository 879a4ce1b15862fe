//! パース状態の定義

/// レスポンスパーサーの状態
///
/// `Status` → `Headers` → `Body` → `Done` の順に一方向に進む。
/// 戻るのは [`super::ResponseParser::reset`] でホップをやり直すときだけ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ParserState {
    /// ステータス行待ち
    Status,
    /// ヘッダーブロック待ち
    Headers,
    /// ボディ読み取り中
    Body,
    /// 完了
    Done,
}

/// ボディの区切り方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// ボディなし
    None,
    /// Content-Length で指定された固定長
    ContentLength(usize),
    /// Transfer-Encoding: chunked
    Chunked,
    /// 接続が閉じるまでがボディ
    CloseDelimited,
}
