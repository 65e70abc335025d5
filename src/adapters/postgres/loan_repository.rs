use crate::domain::{BookId, Loan, LoanId, MemberId};
use crate::ports::loan_repository::{
    ActiveLoanView, LoanRepository as LoanRepositoryTrait, OpenOutcome, Result,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row, postgres::PgRow};

fn map_row_to_loan(row: &PgRow) -> Loan {
    Loan {
        loan_id: LoanId::from_i64(row.get("id")),
        book_id: BookId::from_i64(row.get("book_id")),
        member_id: MemberId::from_i64(row.get("member_id")),
        borrowed_at: row.get("borrowed_at"),
        returned_at: row.get("returned_at"),
    }
}

/// LoanRepositoryのPostgreSQL実装
///
/// 部分ユニークインデックス loans_one_active_per_book により、
/// 書籍ごとに貸出中の記録は最大1件に制限される。
pub struct LoanRepository {
    pool: PgPool,
}

impl LoanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanRepositoryTrait for LoanRepository {
    /// 貸出記録を作成
    ///
    /// ON CONFLICT DO NOTHING で「貸出可能の確認と作成」を1文で行う。
    /// 同時に作成しようとした側はインデックスで待機し、先行側のコミット後に
    /// 行を返さずに終わる。
    async fn open(
        &self,
        book_id: BookId,
        member_id: MemberId,
        borrowed_at: DateTime<Utc>,
    ) -> Result<OpenOutcome> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO loans (book_id, member_id, borrowed_at)
            SELECT $1, $2, $3
            WHERE EXISTS (SELECT 1 FROM books WHERE id = $1)
              AND EXISTS (SELECT 1 FROM members WHERE id = $2)
            ON CONFLICT (book_id) WHERE returned_at IS NULL DO NOTHING
            RETURNING id, book_id, member_id, borrowed_at, returned_at
            "#,
        )
        .bind(book_id.value())
        .bind(member_id.value())
        .bind(borrowed_at)
        .fetch_optional(&self.pool)
        .await;

        let row = match inserted {
            Ok(row) => row,
            // 確認後に書籍または会員が削除された
            Err(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {
                return Ok(OpenOutcome::MissingReference);
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(row) = row {
            return Ok(OpenOutcome::Opened(map_row_to_loan(&row)));
        }

        // 行が返らなかった理由を判別する
        let references_exist: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (SELECT 1 FROM books WHERE id = $1)
               AND EXISTS (SELECT 1 FROM members WHERE id = $2)
            "#,
        )
        .bind(book_id.value())
        .bind(member_id.value())
        .fetch_one(&self.pool)
        .await?;

        if references_exist {
            Ok(OpenOutcome::BookOnLoan)
        } else {
            Ok(OpenOutcome::MissingReference)
        }
    }

    async fn close(&self, loan_id: LoanId, returned_at: DateTime<Utc>) -> Result<Option<Loan>> {
        let row = sqlx::query(
            r#"
            UPDATE loans
            SET returned_at = $2
            WHERE id = $1 AND returned_at IS NULL
            RETURNING id, book_id, member_id, borrowed_at, returned_at
            "#,
        )
        .bind(loan_id.value())
        .bind(returned_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_loan))
    }

    async fn get(&self, loan_id: LoanId) -> Result<Option<Loan>> {
        let row = sqlx::query(
            r#"
            SELECT id, book_id, member_id, borrowed_at, returned_at
            FROM loans
            WHERE id = $1
            "#,
        )
        .bind(loan_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_loan))
    }

    /// 貸出中の記録を書籍タイトル・会員氏名と結合して取得
    async fn list_active(&self) -> Result<Vec<ActiveLoanView>> {
        let rows = sqlx::query(
            r#"
            SELECT
                l.id,
                l.book_id,
                b.title AS book_title,
                l.member_id,
                m.name AS member_name,
                l.borrowed_at
            FROM loans l
            JOIN books b ON b.id = l.book_id
            JOIN members m ON m.id = l.member_id
            WHERE l.returned_at IS NULL
            ORDER BY l.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| ActiveLoanView {
                loan_id: LoanId::from_i64(row.get("id")),
                book_id: BookId::from_i64(row.get("book_id")),
                book_title: row.get("book_title"),
                member_id: MemberId::from_i64(row.get("member_id")),
                member_name: row.get("member_name"),
                borrowed_at: row.get("borrowed_at"),
            })
            .collect())
    }

    async fn find_by_member_id(&self, member_id: MemberId) -> Result<Vec<Loan>> {
        let rows = sqlx::query(
            r#"
            SELECT id, book_id, member_id, borrowed_at, returned_at
            FROM loans
            WHERE member_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(member_id.value())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_loan).collect())
    }
}
