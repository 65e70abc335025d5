use crate::domain::{Book, BookId, commands::*};

use super::borrowing_service::{ServiceDependencies, require_book};
use super::errors::{LibraryError, Result};

/// 書籍を登録する
///
/// 登録直後の書籍は貸出可能。
pub async fn create_book(deps: &ServiceDependencies, cmd: CreateBook) -> Result<Book> {
    let book = deps
        .book_repository
        .insert(cmd.title, cmd.author)
        .await
        .map_err(LibraryError::StoreError)?;

    tracing::info!(book_id = %book.book_id, title = %book.title, "Created book");
    Ok(book)
}

/// 書籍のタイトル・著者を更新する
///
/// 貸出状態は変更しない。
pub async fn update_book(deps: &ServiceDependencies, cmd: UpdateBook) -> Result<Book> {
    let book = deps
        .book_repository
        .update(cmd.book_id, cmd.title, cmd.author)
        .await
        .map_err(LibraryError::StoreError)?
        .ok_or(LibraryError::BookNotFound(cmd.book_id))?;

    tracing::info!(book_id = %book.book_id, "Updated book");
    Ok(book)
}

pub async fn get_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    require_book(deps, book_id).await
}

/// 全書籍の一覧（ID順）
pub async fn list_books(deps: &ServiceDependencies) -> Result<Vec<Book>> {
    deps.book_repository
        .list()
        .await
        .map_err(LibraryError::StoreError)
}
