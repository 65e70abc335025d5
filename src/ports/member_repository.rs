use crate::domain::{Member, MemberId, RequiredText};
use async_trait::async_trait;

use super::book_repository::DeleteOutcome;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 会員リポジトリポート
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// 会員を登録し、採番済みの会員を返す
    async fn insert(&self, name: RequiredText, contact: RequiredText) -> Result<Member>;

    /// IDで会員を取得する
    async fn get(&self, member_id: MemberId) -> Result<Option<Member>>;

    /// 氏名と連絡先を更新する
    ///
    /// 会員が存在しない場合は`None`を返す。
    async fn update(
        &self,
        member_id: MemberId,
        name: RequiredText,
        contact: RequiredText,
    ) -> Result<Option<Member>>;

    /// 貸出中の記録がない場合に限り会員を削除する
    async fn delete_if_idle(&self, member_id: MemberId) -> Result<DeleteOutcome>;

    /// 全会員をID順で取得する
    async fn list(&self) -> Result<Vec<Member>>;
}
