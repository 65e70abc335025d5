use library_borrowing::application::library::{self, ErrorKind, LibraryError};
use library_borrowing::domain::commands::*;
use library_borrowing::domain::{BookId, LoanId, LoanStatus, MemberId};

mod common;

use common::*;

// ============================================================================
// 貸出
// ============================================================================

#[tokio::test]
async fn test_borrow_book_success() {
    let deps = memory_deps();
    let book = create_book(&deps, "X", "Y").await;
    let member = add_member(&deps, "A").await;

    let loan = borrow(&deps, book.book_id, member.member_id).await;

    assert_eq!(loan.loan_id.value(), 1);
    assert_eq!(loan.book_id, book.book_id);
    assert_eq!(loan.member_id, member.member_id);
    assert_eq!(loan.status(), LoanStatus::Active);

    let book = library::get_book(&deps, book.book_id).await.unwrap();
    assert!(!book.available);
    assert_availability_matches_active_loans(&deps).await;
}

#[tokio::test]
async fn test_borrow_fails_when_book_missing() {
    let deps = memory_deps();
    let member = add_member(&deps, "A").await;

    let result =
        library::borrow_book(&deps, borrow_cmd(BookId::from_i64(1), member.member_id)).await;

    assert!(matches!(result, Err(LibraryError::BookNotFound(id)) if id.value() == 1));
}

#[tokio::test]
async fn test_borrow_fails_when_member_missing() {
    let deps = memory_deps();
    let book = create_book(&deps, "X", "Y").await;

    let result = library::borrow_book(&deps, borrow_cmd(book.book_id, MemberId::from_i64(5))).await;

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(matches!(err, LibraryError::MemberNotFound(_)));

    // 失敗時に状態は変化しない
    assert!(library::list_active_loans(&deps).await.unwrap().is_empty());
    assert!(library::get_book(&deps, book.book_id).await.unwrap().available);
}

#[tokio::test]
async fn test_borrow_already_borrowed_book_leaves_state_unchanged() {
    let deps = memory_deps();
    let book = create_book(&deps, "X", "Y").await;
    let first = add_member(&deps, "A").await;
    let second = add_member(&deps, "B").await;
    let loan = borrow(&deps, book.book_id, first.member_id).await;

    let result = library::borrow_book(&deps, borrow_cmd(book.book_id, second.member_id)).await;

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyBorrowed);

    let active = library::list_active_loans(&deps).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].loan_id, loan.loan_id);
    assert_eq!(active[0].member_id, first.member_id);
    assert!(
        library::list_member_loans(&deps, second.member_id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_borrows_of_one_book_succeed_once() {
    let deps = memory_deps();
    let book = create_book(&deps, "X", "Y").await;

    let mut members = Vec::new();
    for i in 0..16 {
        members.push(add_member(&deps, &format!("M{}", i)).await);
    }

    let handles: Vec<_> = members
        .iter()
        .map(|member| {
            let deps = deps.clone();
            let cmd = borrow_cmd(book.book_id, member.member_id);
            tokio::spawn(async move { library::borrow_book(&deps, cmd).await })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) => assert_eq!(e.kind(), ErrorKind::AlreadyBorrowed),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(library::list_active_loans(&deps).await.unwrap().len(), 1);
    assert_availability_matches_active_loans(&deps).await;
}

// ============================================================================
// 返却
// ============================================================================

#[tokio::test]
async fn test_return_book_success() {
    let deps = memory_deps();
    let book = create_book(&deps, "X", "Y").await;
    let member = add_member(&deps, "A").await;
    let loan = borrow(&deps, book.book_id, member.member_id).await;

    let returned = library::return_book(&deps, return_cmd(loan.loan_id)).await.unwrap();

    assert_eq!(returned.status(), LoanStatus::Returned);
    assert!(returned.returned_at.is_some());
    assert!(library::get_book(&deps, book.book_id).await.unwrap().available);
    assert!(library::list_active_loans(&deps).await.unwrap().is_empty());
    assert_availability_matches_active_loans(&deps).await;
}

#[tokio::test]
async fn test_return_twice_fails_with_not_active() {
    let deps = memory_deps();
    let book = create_book(&deps, "X", "Y").await;
    let member = add_member(&deps, "A").await;
    let loan = borrow(&deps, book.book_id, member.member_id).await;

    library::return_book(&deps, return_cmd(loan.loan_id)).await.unwrap();
    let result = library::return_book(&deps, return_cmd(loan.loan_id)).await;

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotActive);
    assert!(matches!(err, LibraryError::LoanNotActive(id) if id == loan.loan_id));
}

#[tokio::test]
async fn test_return_unknown_loan_fails_with_not_found() {
    let deps = memory_deps();

    let result = library::return_book(&deps, return_cmd(LoanId::from_i64(1))).await;

    assert!(matches!(result, Err(LibraryError::LoanNotFound(_))));
}

#[tokio::test]
async fn test_returned_loan_is_kept_in_member_history() {
    let deps = memory_deps();
    let book = create_book(&deps, "X", "Y").await;
    let member = add_member(&deps, "A").await;
    let first = borrow(&deps, book.book_id, member.member_id).await;
    library::return_book(&deps, return_cmd(first.loan_id)).await.unwrap();
    let second = borrow(&deps, book.book_id, member.member_id).await;

    let history = library::list_member_loans(&deps, member.member_id).await.unwrap();

    assert_eq!(history.len(), 2);
    assert_eq!(history[0].loan_id, first.loan_id);
    assert_eq!(history[0].status(), LoanStatus::Returned);
    assert_eq!(history[1].loan_id, second.loan_id);
    assert_eq!(history[1].status(), LoanStatus::Active);

    let active = library::list_active_loans(&deps).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].loan_id, second.loan_id);
}

#[tokio::test]
async fn test_member_history_requires_existing_member() {
    let deps = memory_deps();

    let result = library::list_member_loans(&deps, MemberId::from_i64(3)).await;

    assert!(matches!(result, Err(LibraryError::MemberNotFound(_))));
}

// ============================================================================
// 削除
// ============================================================================

#[tokio::test]
async fn test_delete_book_blocked_while_borrowed() {
    let deps = memory_deps();
    let book = create_book(&deps, "X", "Y").await;
    let member = add_member(&deps, "A").await;
    let loan = borrow(&deps, book.book_id, member.member_id).await;

    let err = library::delete_book(&deps, book.book_id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(library::get_book(&deps, book.book_id).await.is_ok());

    library::return_book(&deps, return_cmd(loan.loan_id)).await.unwrap();
    library::delete_book(&deps, book.book_id).await.unwrap();

    assert!(matches!(
        library::get_book(&deps, book.book_id).await,
        Err(LibraryError::BookNotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_missing_book_fails_with_not_found() {
    let deps = memory_deps();

    let err = library::delete_book(&deps, BookId::from_i64(10)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_delete_member_with_active_loan_conflicts() {
    let deps = memory_deps();
    let book = create_book(&deps, "X", "Y").await;
    let member = add_member(&deps, "A").await;
    let loan = borrow(&deps, book.book_id, member.member_id).await;

    let err = library::delete_member(&deps, member.member_id).await.unwrap_err();
    assert!(matches!(err, LibraryError::MemberHasActiveLoans(id) if id == member.member_id));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    library::return_book(&deps, return_cmd(loan.loan_id)).await.unwrap();
    library::delete_member(&deps, member.member_id).await.unwrap();

    assert!(library::list_members(&deps).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_missing_member_fails_with_not_found() {
    let deps = memory_deps();

    let err = library::delete_member(&deps, MemberId::from_i64(1)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
}

// ============================================================================
// カタログ・会員管理
// ============================================================================

#[tokio::test]
async fn test_update_book_keeps_availability() {
    let deps = memory_deps();
    let book = create_book(&deps, "X", "Y").await;
    let member = add_member(&deps, "A").await;
    borrow(&deps, book.book_id, member.member_id).await;

    let updated = library::update_book(
        &deps,
        UpdateBook {
            book_id: book.book_id,
            title: text("X (2nd edition)"),
            author: text("Y"),
        },
    )
    .await
    .unwrap();

    assert_eq!(updated.title, "X (2nd edition)");
    assert!(!updated.available);

    let active = library::list_active_loans(&deps).await.unwrap();
    assert_eq!(active[0].book_title, "X (2nd edition)");
}

#[tokio::test]
async fn test_update_missing_entities_fail_with_not_found() {
    let deps = memory_deps();

    let book = library::update_book(
        &deps,
        UpdateBook {
            book_id: BookId::from_i64(1),
            title: text("X"),
            author: text("Y"),
        },
    )
    .await;
    assert!(matches!(book, Err(LibraryError::BookNotFound(_))));

    let member = library::update_member(
        &deps,
        UpdateMember {
            member_id: MemberId::from_i64(1),
            name: text("A"),
            contact: text("a"),
        },
    )
    .await;
    assert!(matches!(member, Err(LibraryError::MemberNotFound(_))));
}

#[tokio::test]
async fn test_list_available_books_excludes_borrowed() {
    let deps = memory_deps();
    let b1 = create_book(&deps, "One", "A").await;
    let b2 = create_book(&deps, "Two", "B").await;
    let b3 = create_book(&deps, "Three", "C").await;
    let member = add_member(&deps, "A").await;
    borrow(&deps, b2.book_id, member.member_id).await;

    let available: Vec<_> = library::list_available_books(&deps)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.book_id)
        .collect();
    assert_eq!(available, vec![b1.book_id, b3.book_id]);

    let all = library::list_books(&deps).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_active_loans_view_includes_titles_and_names() {
    let deps = memory_deps();
    let book = create_book(&deps, "Dune", "Frank Herbert").await;
    let member = add_member(&deps, "Alice").await;
    let loan = borrow(&deps, book.book_id, member.member_id).await;

    let active = library::list_active_loans(&deps).await.unwrap();

    assert_eq!(active.len(), 1);
    assert_eq!(active[0].loan_id, loan.loan_id);
    assert_eq!(active[0].book_title, "Dune");
    assert_eq!(active[0].member_name, "Alice");
    assert_eq!(active[0].borrowed_at, loan.borrowed_at);
}

// ============================================================================
// シナリオ
// ============================================================================

#[tokio::test]
async fn test_full_borrowing_scenario() {
    let deps = memory_deps();
    let book = create_book(&deps, "X", "Y").await;
    let member = add_member(&deps, "A").await;
    assert_eq!(book.book_id.value(), 1);
    assert_eq!(member.member_id.value(), 1);
    assert!(book.available);

    // BorrowBook(1,1) → Loan#1, Book#1 は貸出不可
    let loan = borrow(&deps, book.book_id, member.member_id).await;
    assert_eq!(loan.loan_id.value(), 1);
    assert!(!library::get_book(&deps, book.book_id).await.unwrap().available);

    // 2回目の BorrowBook(1,1) → AlreadyBorrowed
    let err = library::borrow_book(&deps, borrow_cmd(book.book_id, member.member_id))
        .await
        .unwrap_err();
    assert!(matches!(err, LibraryError::BookNotAvailable(_)));

    // ReturnBook(1) → Book#1 は貸出可能
    library::return_book(&deps, return_cmd(loan.loan_id)).await.unwrap();
    assert!(library::get_book(&deps, book.book_id).await.unwrap().available);

    // DeleteBook(1) は成功する
    library::delete_book(&deps, book.book_id).await.unwrap();
    assert!(library::list_books(&deps).await.unwrap().is_empty());
}
