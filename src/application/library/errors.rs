use crate::domain::{BookId, LoanId, MemberId};
use thiserror::Error;

/// 呼び出し側に公開するエラー種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 参照されたIDが存在しない
    NotFound,
    /// 貸出中の記録があるため削除できない
    Conflict,
    /// 書籍が貸出中
    AlreadyBorrowed,
    /// 貸出記録が既に返却済み
    NotActive,
    /// ストア障害
    Internal,
}

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LibraryError {
    /// 書籍が存在しない
    #[error("Book {0} not found")]
    BookNotFound(BookId),

    /// 会員が存在しない
    #[error("Member {0} not found")]
    MemberNotFound(MemberId),

    /// 貸出記録が存在しない
    #[error("Borrowing record {0} not found")]
    LoanNotFound(LoanId),

    /// 書籍が貸出中
    #[error("Book {0} is not available")]
    BookNotAvailable(BookId),

    /// 貸出記録が既に返却済み
    #[error("Borrowing record {0} is already returned")]
    LoanNotActive(LoanId),

    /// 貸出中の書籍は削除できない
    #[error("Cannot delete a borrowed book ({0})")]
    BookOnLoan(BookId),

    /// 貸出中の記録を持つ会員は削除できない
    #[error("Cannot delete member {0} with borrowed books")]
    MemberHasActiveLoans(MemberId),

    /// ストアのエラー
    #[error("Store error")]
    StoreError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl LibraryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LibraryError::BookNotFound(_)
            | LibraryError::MemberNotFound(_)
            | LibraryError::LoanNotFound(_) => ErrorKind::NotFound,
            LibraryError::BookNotAvailable(_) => ErrorKind::AlreadyBorrowed,
            LibraryError::LoanNotActive(_) => ErrorKind::NotActive,
            LibraryError::BookOnLoan(_) | LibraryError::MemberHasActiveLoans(_) => {
                ErrorKind::Conflict
            }
            LibraryError::StoreError(_) => ErrorKind::Internal,
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LibraryError>;
