use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    Book, BookId, Loan, LoanId, Member, MemberId, RequiredText, commands::*, positive_id,
};
use crate::ports::ActiveLoanView;

use super::error::ApiError;

// ============================================================================
// 境界での入力検証
// ============================================================================

/// 必須文字列フィールドを検証する（前後の空白は除去される）
pub fn required_text(field: &'static str, value: Option<String>) -> Result<RequiredText, ApiError> {
    value
        .ok_or(crate::domain::ValidationError::Blank)
        .and_then(RequiredText::try_from)
        .map_err(|e| ApiError::validation(field, e))
}

/// 正の整数IDフィールドを検証する
pub fn required_id(field: &'static str, value: Option<i64>) -> Result<i64, ApiError> {
    value
        .ok_or(crate::domain::ValidationError::NotPositive)
        .and_then(positive_id)
        .map_err(|e| ApiError::validation(field, e))
}

// ============================================================================
// Requests
// ============================================================================

/// POST /books, PUT /books/:id のリクエスト
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
}

impl BookRequest {
    pub fn to_create_command(self) -> Result<CreateBook, ApiError> {
        Ok(CreateBook {
            title: required_text("title", self.title)?,
            author: required_text("author", self.author)?,
        })
    }

    pub fn to_update_command(self, book_id: BookId) -> Result<UpdateBook, ApiError> {
        Ok(UpdateBook {
            book_id,
            title: required_text("title", self.title)?,
            author: required_text("author", self.author)?,
        })
    }
}

/// POST /members, PUT /members/:id のリクエスト
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MemberRequest {
    pub name: Option<String>,
    pub contact: Option<String>,
}

impl MemberRequest {
    pub fn to_add_command(self) -> Result<AddMember, ApiError> {
        Ok(AddMember {
            name: required_text("name", self.name)?,
            contact: required_text("contact", self.contact)?,
        })
    }

    pub fn to_update_command(self, member_id: MemberId) -> Result<UpdateMember, ApiError> {
        Ok(UpdateMember {
            member_id,
            name: required_text("name", self.name)?,
            contact: required_text("contact", self.contact)?,
        })
    }
}

/// POST /borrow のリクエスト
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BorrowRequest {
    pub book_id: Option<i64>,
    pub member_id: Option<i64>,
}

impl BorrowRequest {
    pub fn to_command(self, borrowed_at: DateTime<Utc>) -> Result<BorrowBook, ApiError> {
        Ok(BorrowBook {
            book_id: BookId::from_i64(required_id("book_id", self.book_id)?),
            member_id: MemberId::from_i64(required_id("member_id", self.member_id)?),
            borrowed_at,
        })
    }
}

/// POST /return のリクエスト
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ReturnRequest {
    pub borrowing_id: Option<i64>,
}

impl ReturnRequest {
    pub fn to_command(self, returned_at: DateTime<Utc>) -> Result<ReturnBook, ApiError> {
        Ok(ReturnBook {
            loan_id: LoanId::from_i64(required_id("borrowing_id", self.borrowing_id)?),
            returned_at,
        })
    }
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub available: bool,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.book_id.value(),
            title: book.title,
            author: book.author,
            available: book.available,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberResponse {
    pub id: i64,
    pub name: String,
    pub contact: String,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            id: member.member_id.value(),
            name: member.name,
            contact: member.contact,
        }
    }
}

/// 貸出記録レスポンス（POST /borrow, POST /return, GET /loans/:id）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanResponse {
    pub borrowing_id: i64,
    pub book_id: i64,
    pub member_id: i64,
    /// YYYY-MM-DD
    pub borrowing_date: String,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: String,
}

impl From<Loan> for LoanResponse {
    fn from(loan: Loan) -> Self {
        Self {
            borrowing_id: loan.loan_id.value(),
            book_id: loan.book_id.value(),
            member_id: loan.member_id.value(),
            borrowing_date: format_borrowing_date(loan.borrowed_at),
            borrowed_at: loan.borrowed_at,
            returned_at: loan.returned_at,
            status: loan.status().as_str().to_string(),
        }
    }
}

/// 貸出中の書籍レスポンス（GET /borrowed）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowedBookResponse {
    pub borrowing_id: i64,
    pub book_id: i64,
    pub book_title: String,
    pub member_id: i64,
    pub member_name: String,
    pub borrowing_date: String,
}

impl From<ActiveLoanView> for BorrowedBookResponse {
    fn from(view: ActiveLoanView) -> Self {
        Self {
            borrowing_id: view.loan_id.value(),
            book_id: view.book_id.value(),
            book_title: view.book_title,
            member_id: view.member_id.value(),
            member_name: view.member_name,
            borrowing_date: format_borrowing_date(view.borrowed_at),
        }
    }
}

/// 削除成功レスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// エラーレスポンス
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

pub fn format_borrowing_date(borrowed_at: DateTime<Utc>) -> String {
    borrowed_at.format("%Y-%m-%d").to_string()
}
