use chrono::{DateTime, Utc};

use super::{BookId, LoanId, MemberId, RequiredText};

/// コマンド：書籍を登録する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateBook {
    pub title: RequiredText,
    pub author: RequiredText,
}

/// コマンド：書籍のタイトル・著者を更新する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBook {
    pub book_id: BookId,
    pub title: RequiredText,
    pub author: RequiredText,
}

/// コマンド：会員を登録する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddMember {
    pub name: RequiredText,
    pub contact: RequiredText,
}

/// コマンド：会員の氏名・連絡先を更新する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateMember {
    pub member_id: MemberId,
    pub name: RequiredText,
    pub contact: RequiredText,
}

/// コマンド：書籍を貸し出す
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowBook {
    pub book_id: BookId,
    pub member_id: MemberId,
    pub borrowed_at: DateTime<Utc>,
}

/// コマンド：書籍を返却する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnBook {
    pub loan_id: LoanId,
    pub returned_at: DateTime<Utc>,
}
