use crate::domain::{
    self, Book, BookId, Loan, LoanId, MemberId,
    commands::{BorrowBook, ReturnBook},
};
use crate::ports::{
    ActiveLoanView, BookRepository, DeleteOutcome, LoanRepository, MemberRepository, OpenOutcome,
};
use std::sync::Arc;

use super::errors::{LibraryError, Result};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、純粋な関数に依存関係を渡す。
/// サービス自身は状態を持たず、呼び出しごとにストアの現在の状態に対して動作する。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub book_repository: Arc<dyn BookRepository>,
    pub member_repository: Arc<dyn MemberRepository>,
    pub loan_repository: Arc<dyn LoanRepository>,
}

/// 書籍を取得するヘルパー関数（存在しなければBookNotFound）
pub(super) async fn require_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    deps.book_repository
        .get(book_id)
        .await
        .map_err(LibraryError::StoreError)?
        .ok_or(LibraryError::BookNotFound(book_id))
}

/// 会員を取得するヘルパー関数（存在しなければMemberNotFound）
pub(super) async fn require_member(
    deps: &ServiceDependencies,
    member_id: MemberId,
) -> Result<domain::Member> {
    deps.member_repository
        .get(member_id)
        .await
        .map_err(LibraryError::StoreError)?
        .ok_or(LibraryError::MemberNotFound(member_id))
}

async fn require_loan(deps: &ServiceDependencies, loan_id: LoanId) -> Result<Loan> {
    deps.loan_repository
        .get(loan_id)
        .await
        .map_err(LibraryError::StoreError)?
        .ok_or(LibraryError::LoanNotFound(loan_id))
}

/// 書籍を貸し出す
///
/// ビジネスルール：
/// - 書籍と会員が存在すること
/// - 書籍が貸出中でないこと
///
/// # 一貫性保証
///
/// 事前確認はエラー種別を決めるためのもの。「貸出可能の確認と記録の作成」は
/// `LoanRepository::open`が不可分に行うため、同じ書籍への同時貸出は
/// 1件だけが成功し、残りは`BookNotAvailable`になる。
pub async fn borrow_book(deps: &ServiceDependencies, cmd: BorrowBook) -> Result<Loan> {
    // 1. 書籍・会員の存在確認
    let book = require_book(deps, cmd.book_id).await?;
    require_member(deps, cmd.member_id).await?;

    // 2. 貸出可能性確認
    if !book.available {
        tracing::debug!(book_id = %cmd.book_id, "Borrow rejected: book already on loan");
        return Err(LibraryError::BookNotAvailable(cmd.book_id));
    }

    // 3. 条件付きで貸出記録を作成
    let outcome = deps
        .loan_repository
        .open(cmd.book_id, cmd.member_id, cmd.borrowed_at)
        .await
        .map_err(LibraryError::StoreError)?;

    match outcome {
        OpenOutcome::Opened(loan) => {
            tracing::info!(
                book_id = %loan.book_id,
                member_id = %loan.member_id,
                borrowing_id = %loan.loan_id,
                "Book borrowed"
            );
            Ok(loan)
        }
        OpenOutcome::BookOnLoan => {
            tracing::debug!(book_id = %cmd.book_id, "Borrow lost race: book already on loan");
            Err(LibraryError::BookNotAvailable(cmd.book_id))
        }
        // 確認後に書籍または会員が削除された
        OpenOutcome::MissingReference => {
            require_book(deps, cmd.book_id).await?;
            Err(LibraryError::MemberNotFound(cmd.member_id))
        }
    }
}

/// 書籍を返却する
///
/// ビジネスルール：
/// - 貸出記録が存在すること
/// - 貸出中であること（返却済みは再返却不可）
///
/// 返却済みの記録は削除せず履歴として残す。貸出中一覧には現れなくなる。
pub async fn return_book(deps: &ServiceDependencies, cmd: ReturnBook) -> Result<Loan> {
    // 1. 貸出記録を取得
    let loan = require_loan(deps, cmd.loan_id).await?;

    // 2. ドメイン層の純粋関数で状態遷移を検証
    domain::loan::return_loan(&loan, cmd.returned_at).map_err(|e| match e {
        domain::ReturnBookError::AlreadyReturned => LibraryError::LoanNotActive(cmd.loan_id),
    })?;

    // 3. 条件付きで返却済みにする
    let closed = deps
        .loan_repository
        .close(cmd.loan_id, cmd.returned_at)
        .await
        .map_err(LibraryError::StoreError)?
        .ok_or(LibraryError::LoanNotActive(cmd.loan_id))?;

    tracing::info!(
        book_id = %closed.book_id,
        member_id = %closed.member_id,
        borrowing_id = %closed.loan_id,
        "Book returned"
    );

    Ok(closed)
}

/// 書籍を削除する
///
/// ビジネスルール：
/// - 書籍が存在すること
/// - 貸出中でないこと
pub async fn delete_book(deps: &ServiceDependencies, book_id: BookId) -> Result<()> {
    let book = require_book(deps, book_id).await?;
    if !book.available {
        return Err(LibraryError::BookOnLoan(book_id));
    }

    let outcome = deps
        .book_repository
        .delete_if_available(book_id)
        .await
        .map_err(LibraryError::StoreError)?;

    match outcome {
        DeleteOutcome::Deleted => {
            tracing::info!(book_id = %book_id, "Deleted book");
            Ok(())
        }
        DeleteOutcome::Missing => Err(LibraryError::BookNotFound(book_id)),
        DeleteOutcome::Blocked => Err(LibraryError::BookOnLoan(book_id)),
    }
}

/// 会員を削除する
///
/// ビジネスルール：
/// - 会員が存在すること
/// - 貸出中の記録を持たないこと
pub async fn delete_member(deps: &ServiceDependencies, member_id: MemberId) -> Result<()> {
    require_member(deps, member_id).await?;

    let loans = deps
        .loan_repository
        .find_by_member_id(member_id)
        .await
        .map_err(LibraryError::StoreError)?;

    if domain::loan::has_active_loans(member_id, &loans) {
        return Err(LibraryError::MemberHasActiveLoans(member_id));
    }

    let outcome = deps
        .member_repository
        .delete_if_idle(member_id)
        .await
        .map_err(LibraryError::StoreError)?;

    match outcome {
        DeleteOutcome::Deleted => {
            tracing::info!(member_id = %member_id, "Deleted member");
            Ok(())
        }
        DeleteOutcome::Missing => Err(LibraryError::MemberNotFound(member_id)),
        DeleteOutcome::Blocked => Err(LibraryError::MemberHasActiveLoans(member_id)),
    }
}

/// 貸出可能な書籍の一覧
pub async fn list_available_books(deps: &ServiceDependencies) -> Result<Vec<Book>> {
    deps.book_repository
        .list_available()
        .await
        .map_err(LibraryError::StoreError)
}

/// 貸出中の記録の一覧（書籍タイトル・会員氏名付き）
pub async fn list_active_loans(deps: &ServiceDependencies) -> Result<Vec<ActiveLoanView>> {
    deps.loan_repository
        .list_active()
        .await
        .map_err(LibraryError::StoreError)
}

/// IDで貸出記録を取得
pub async fn get_loan(deps: &ServiceDependencies, loan_id: LoanId) -> Result<Loan> {
    require_loan(deps, loan_id).await
}
