use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, LoanId, MemberId, ReturnBookError};

/// 貸出の状態
///
/// 状態遷移は Active → Returned の一方向のみ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// 貸出中
    Active,
    /// 返却済み
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Returned => "returned",
        }
    }
}

/// 貸出記録 - 1冊の書籍の1回の貸出
///
/// 状態は returned_at から導出する。返却済みの記録は履歴として
/// 残るが、以降は変更されない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,

    // 他の集約への参照（IDのみ）
    pub book_id: BookId,
    pub member_id: MemberId,

    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl Loan {
    pub fn status(&self) -> LoanStatus {
        if self.returned_at.is_some() {
            LoanStatus::Returned
        } else {
            LoanStatus::Active
        }
    }

    pub fn is_active(&self) -> bool {
        self.returned_at.is_none()
    }
}

/// 純粋関数：書籍を返却する
///
/// ビジネスルール：
/// - 返却済みの貸出は再返却できない
///
/// 副作用なし。返却済みの新しいLoanを返す。
pub fn return_loan(loan: &Loan, returned_at: DateTime<Utc>) -> Result<Loan, ReturnBookError> {
    if !loan.is_active() {
        return Err(ReturnBookError::AlreadyReturned);
    }

    Ok(Loan {
        returned_at: Some(returned_at),
        ..loan.clone()
    })
}

/// 純粋関数：書籍が貸出可能か判定する
///
/// 不変条件：書籍は、その書籍を参照する貸出中の記録がない場合に限り貸出可能。
pub fn is_book_available<'a>(book_id: BookId, loans: impl IntoIterator<Item = &'a Loan>) -> bool {
    !loans
        .into_iter()
        .any(|loan| loan.book_id == book_id && loan.is_active())
}

/// 純粋関数：会員が貸出中の記録を持っているか判定する
pub fn has_active_loans<'a>(
    member_id: MemberId,
    loans: impl IntoIterator<Item = &'a Loan>,
) -> bool {
    loans
        .into_iter()
        .any(|loan| loan.member_id == member_id && loan.is_active())
}
