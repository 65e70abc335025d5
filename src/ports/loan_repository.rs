use crate::domain::{BookId, Loan, LoanId, MemberId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出記録作成の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenOutcome {
    /// 貸出記録を作成した
    Opened(Loan),
    /// 書籍は既に貸出中
    BookOnLoan,
    /// 書籍または会員が存在しない
    MissingReference,
}

/// 貸出中の書籍ビュー（Read Model）
///
/// 貸出一覧表示用に書籍タイトルと会員氏名を結合した非正規化ビュー。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveLoanView {
    pub loan_id: LoanId,
    pub book_id: BookId,
    pub book_title: String,
    pub member_id: MemberId,
    pub member_name: String,
    pub borrowed_at: DateTime<Utc>,
}

/// 貸出記録リポジトリポート
///
/// 「書籍ごとに貸出中の記録は最大1件」という不変条件は
/// `open`の内部で不可分に保証される。
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// 書籍が貸出中でなく、書籍・会員が存在する場合に限り貸出記録を作成する
    ///
    /// 同じ書籍への同時呼び出しのうち成功するのは高々1件。
    async fn open(
        &self,
        book_id: BookId,
        member_id: MemberId,
        borrowed_at: DateTime<Utc>,
    ) -> Result<OpenOutcome>;

    /// 貸出中の記録を返却済みにする
    ///
    /// 記録が存在しない、または既に返却済みの場合は`None`を返す。
    async fn close(&self, loan_id: LoanId, returned_at: DateTime<Utc>) -> Result<Option<Loan>>;

    /// IDで貸出記録を取得する（返却済みを含む）
    async fn get(&self, loan_id: LoanId) -> Result<Option<Loan>>;

    /// 貸出中の記録をID順で取得する
    async fn list_active(&self) -> Result<Vec<ActiveLoanView>>;

    /// 会員の全貸出記録をID順で取得する
    ///
    /// 会員の貸出履歴表示に使用される。
    async fn find_by_member_id(&self, member_id: MemberId) -> Result<Vec<Loan>>;
}
