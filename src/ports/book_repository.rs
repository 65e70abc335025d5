use crate::domain::{Book, BookId, RequiredText};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 条件付き削除の結果
///
/// 前提条件の確認と削除はストア内で不可分に行われる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// 削除した
    Deleted,
    /// 対象が存在しない
    Missing,
    /// 貸出中の記録が参照しているため削除できない
    Blocked,
}

/// 書籍リポジトリポート
///
/// 書籍の永続化を抽象化する。available は貸出記録から導出される。
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// 書籍を登録し、採番済みの書籍を返す
    async fn insert(&self, title: RequiredText, author: RequiredText) -> Result<Book>;

    /// IDで書籍を取得する
    async fn get(&self, book_id: BookId) -> Result<Option<Book>>;

    /// タイトルと著者を更新する
    ///
    /// 書籍が存在しない場合は`None`を返す。貸出状態には触れない。
    async fn update(
        &self,
        book_id: BookId,
        title: RequiredText,
        author: RequiredText,
    ) -> Result<Option<Book>>;

    /// 貸出中でない場合に限り書籍を削除する
    async fn delete_if_available(&self, book_id: BookId) -> Result<DeleteOutcome>;

    /// 全書籍をID順で取得する
    async fn list(&self) -> Result<Vec<Book>>;

    /// 貸出可能な書籍をID順で取得する
    async fn list_available(&self) -> Result<Vec<Book>>;
}
