use crate::domain::{Member, MemberId, RequiredText};
use crate::ports::book_repository::DeleteOutcome;
use crate::ports::member_repository::{MemberRepository as MemberRepositoryTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

fn map_row_to_member(row: &PgRow) -> Member {
    Member {
        member_id: MemberId::from_i64(row.get("id")),
        name: row.get("name"),
        contact: row.get("contact"),
    }
}

/// MemberRepositoryのPostgreSQL実装
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepositoryTrait for MemberRepository {
    async fn insert(&self, name: RequiredText, contact: RequiredText) -> Result<Member> {
        let row = sqlx::query(
            r#"
            INSERT INTO members (name, contact)
            VALUES ($1, $2)
            RETURNING id, name, contact
            "#,
        )
        .bind(name.as_str())
        .bind(contact.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(map_row_to_member(&row))
    }

    async fn get(&self, member_id: MemberId) -> Result<Option<Member>> {
        let row = sqlx::query("SELECT id, name, contact FROM members WHERE id = $1")
            .bind(member_id.value())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(map_row_to_member))
    }

    async fn update(
        &self,
        member_id: MemberId,
        name: RequiredText,
        contact: RequiredText,
    ) -> Result<Option<Member>> {
        let row = sqlx::query(
            r#"
            UPDATE members
            SET name = $2, contact = $3, updated_at = now()
            WHERE id = $1
            RETURNING id, name, contact
            "#,
        )
        .bind(member_id.value())
        .bind(name.as_str())
        .bind(contact.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_member))
    }

    /// 貸出中の記録がない場合に限り会員を削除
    ///
    /// 書籍の削除と同じく、会員行をロックしてから貸出中の記録を確認する。
    async fn delete_if_idle(&self, member_id: MemberId) -> Result<DeleteOutcome> {
        let mut tx = self.pool.begin().await?;

        let locked: Option<i64> =
            sqlx::query_scalar("SELECT id FROM members WHERE id = $1 FOR UPDATE")
                .bind(member_id.value())
                .fetch_optional(&mut *tx)
                .await?;

        if locked.is_none() {
            return Ok(DeleteOutcome::Missing);
        }

        let has_active: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM loans
                WHERE member_id = $1 AND returned_at IS NULL
            )
            "#,
        )
        .bind(member_id.value())
        .fetch_one(&mut *tx)
        .await?;

        if has_active {
            return Ok(DeleteOutcome::Blocked);
        }

        sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(member_id.value())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(DeleteOutcome::Deleted)
    }

    async fn list(&self) -> Result<Vec<Member>> {
        let rows = sqlx::query("SELECT id, name, contact FROM members ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(map_row_to_member).collect())
    }
}
