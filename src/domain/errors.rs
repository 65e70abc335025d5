use thiserror::Error;

/// 入力値の検証エラー
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 空文字列または空白のみ
    #[error("is required and must be a non-empty string")]
    Blank,
    /// 0以下のID
    #[error("must be a positive integer")]
    NotPositive,
}

/// 返却のエラー
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnBookError {
    /// 既に返却済み
    AlreadyReturned,
}
