use crate::domain::{Book, BookId, RequiredText};
use crate::ports::book_repository::{BookRepository as BookRepositoryTrait, DeleteOutcome, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

/// PostgreSQLの行データをBookに変換する
///
/// available列は貸出中の記録の有無から導出されたもの。
fn map_row_to_book(row: &PgRow) -> Book {
    Book {
        book_id: BookId::from_i64(row.get("id")),
        title: row.get("title"),
        author: row.get("author"),
        available: row.get("available"),
    }
}

/// BookRepositoryのPostgreSQL実装
///
/// 貸出可否は列として持たず、loansテーブルから毎回導出する。
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    /// PostgreSQLコネクションプールから新しいBookRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn insert(&self, title: RequiredText, author: RequiredText) -> Result<Book> {
        let row = sqlx::query(
            r#"
            INSERT INTO books (title, author)
            VALUES ($1, $2)
            RETURNING id, title, author, TRUE AS available
            "#,
        )
        .bind(title.as_str())
        .bind(author.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(map_row_to_book(&row))
    }

    async fn get(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT
                b.id,
                b.title,
                b.author,
                NOT EXISTS (
                    SELECT 1 FROM loans l
                    WHERE l.book_id = b.id AND l.returned_at IS NULL
                ) AS available
            FROM books b
            WHERE b.id = $1
            "#,
        )
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    async fn update(
        &self,
        book_id: BookId,
        title: RequiredText,
        author: RequiredText,
    ) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            UPDATE books
            SET title = $2, author = $3, updated_at = now()
            WHERE id = $1
            RETURNING
                id,
                title,
                author,
                NOT EXISTS (
                    SELECT 1 FROM loans l
                    WHERE l.book_id = books.id AND l.returned_at IS NULL
                ) AS available
            "#,
        )
        .bind(book_id.value())
        .bind(title.as_str())
        .bind(author.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_book))
    }

    /// 貸出中でない場合に限り書籍を削除
    ///
    /// 書籍行をFOR UPDATEでロックしてから貸出中の記録を確認する。
    /// 貸出記録の作成は外部キー検査で同じ行をロックするため、確認と削除の間に
    /// 新しい貸出が割り込むことはない。返却済みの履歴はCASCADEで削除される。
    async fn delete_if_available(&self, book_id: BookId) -> Result<DeleteOutcome> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM books WHERE id = $1 FOR UPDATE")
                .bind(book_id.value())
                .fetch_optional(&mut *tx)
                .await?;

        if locked.is_none() {
            return Ok(DeleteOutcome::Missing);
        }

        let on_loan: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM loans
                WHERE book_id = $1 AND returned_at IS NULL
            )
            "#,
        )
        .bind(book_id.value())
        .fetch_one(&mut *tx)
        .await?;

        if on_loan {
            return Ok(DeleteOutcome::Blocked);
        }

        sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(book_id.value())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(DeleteOutcome::Deleted)
    }

    async fn list(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(
            r#"
            SELECT
                b.id,
                b.title,
                b.author,
                NOT EXISTS (
                    SELECT 1 FROM loans l
                    WHERE l.book_id = b.id AND l.returned_at IS NULL
                ) AS available
            FROM books b
            ORDER BY b.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_book).collect())
    }

    async fn list_available(&self) -> Result<Vec<Book>> {
        let rows = sqlx::query(
            r#"
            SELECT b.id, b.title, b.author, TRUE AS available
            FROM books b
            WHERE NOT EXISTS (
                SELECT 1 FROM loans l
                WHERE l.book_id = b.id AND l.returned_at IS NULL
            )
            ORDER BY b.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_book).collect())
    }
}
