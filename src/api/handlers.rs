use crate::application::library::{self, ServiceDependencies};
use crate::domain::{BookId, LoanId, MemberId};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use std::sync::Arc;

use super::{
    error::ApiError,
    types::{
        BookRequest, BookResponse, BorrowRequest, BorrowedBookResponse, LoanResponse,
        MemberRequest, MemberResponse, ReturnRequest, SuccessResponse, required_id,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

/// パスの `:id` セグメント。整数として解釈できない場合も検証エラーとして扱う
type IdPath = Result<Path<i64>, PathRejection>;

fn id_from_path(path: IdPath) -> Result<i64, ApiError> {
    let Path(id) = path?;
    required_id("id", Some(id))
}

fn book_id_from_path(path: IdPath) -> Result<BookId, ApiError> {
    id_from_path(path).map(BookId::from_i64)
}

fn member_id_from_path(path: IdPath) -> Result<MemberId, ApiError> {
    id_from_path(path).map(MemberId::from_i64)
}

// ============================================================================
// Book handlers
// ============================================================================

/// POST /books - 書籍を登録
pub async fn create_book(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BookRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let Json(req) = payload?;
    let cmd = req.to_create_command()?;

    let book = library::create_book(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(BookResponse::from(book))))
}

/// GET /books - 全書籍の一覧
pub async fn list_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let books = library::list_books(&state.service_deps).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// GET /books/:id - 書籍をIDで取得
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    path: IdPath,
) -> Result<Json<BookResponse>, ApiError> {
    let book = library::get_book(&state.service_deps, book_id_from_path(path)?).await?;
    Ok(Json(BookResponse::from(book)))
}

/// PUT /books/:id - タイトル・著者を更新
///
/// 貸出状態は変更されない。
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    path: IdPath,
    payload: Result<Json<BookRequest>, JsonRejection>,
) -> Result<Json<BookResponse>, ApiError> {
    let book_id = book_id_from_path(path)?;
    let Json(req) = payload?;
    let cmd = req.to_update_command(book_id)?;

    let book = library::update_book(&state.service_deps, cmd).await?;
    Ok(Json(BookResponse::from(book)))
}

/// DELETE /books/:id - 書籍を削除
///
/// 強制されるビジネスルール:
/// - 書籍が存在すること
/// - 貸出中でないこと
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    path: IdPath,
) -> Result<Json<SuccessResponse>, ApiError> {
    library::delete_book(&state.service_deps, book_id_from_path(path)?).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// GET /availablebooks - 貸出可能な書籍の一覧
pub async fn list_available_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let books = library::list_available_books(&state.service_deps).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

// ============================================================================
// Member handlers
// ============================================================================

/// POST /members - 会員を登録
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MemberRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MemberResponse>), ApiError> {
    let Json(req) = payload?;
    let cmd = req.to_add_command()?;

    let member = library::add_member(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(MemberResponse::from(member))))
}

/// GET /members - 全会員の一覧
pub async fn list_members(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MemberResponse>>, ApiError> {
    let members = library::list_members(&state.service_deps).await?;
    Ok(Json(members.into_iter().map(MemberResponse::from).collect()))
}

/// GET /members/:id - 会員をIDで取得
pub async fn get_member(
    State(state): State<Arc<AppState>>,
    path: IdPath,
) -> Result<Json<MemberResponse>, ApiError> {
    let member = library::get_member(&state.service_deps, member_id_from_path(path)?).await?;
    Ok(Json(MemberResponse::from(member)))
}

/// PUT /members/:id - 氏名・連絡先を更新
pub async fn update_member(
    State(state): State<Arc<AppState>>,
    path: IdPath,
    payload: Result<Json<MemberRequest>, JsonRejection>,
) -> Result<Json<MemberResponse>, ApiError> {
    let member_id = member_id_from_path(path)?;
    let Json(req) = payload?;
    let cmd = req.to_update_command(member_id)?;

    let member = library::update_member(&state.service_deps, cmd).await?;
    Ok(Json(MemberResponse::from(member)))
}

/// DELETE /members/:id - 会員を削除
///
/// 強制されるビジネスルール:
/// - 会員が存在すること
/// - 貸出中の記録を持たないこと
pub async fn delete_member(
    State(state): State<Arc<AppState>>,
    path: IdPath,
) -> Result<Json<SuccessResponse>, ApiError> {
    library::delete_member(&state.service_deps, member_id_from_path(path)?).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// GET /members/:id/loans - 会員の貸出履歴
pub async fn list_member_loans(
    State(state): State<Arc<AppState>>,
    path: IdPath,
) -> Result<Json<Vec<LoanResponse>>, ApiError> {
    let member_id = member_id_from_path(path)?;
    let loans = library::list_member_loans(&state.service_deps, member_id).await?;
    Ok(Json(loans.into_iter().map(LoanResponse::from).collect()))
}

// ============================================================================
// Borrowing handlers
// ============================================================================

/// POST /borrow - 書籍を貸し出す
///
/// 強制されるビジネスルール:
/// - 書籍と会員が存在すること
/// - 書籍が貸出中でないこと
pub async fn borrow_book(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BorrowRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LoanResponse>), ApiError> {
    let Json(req) = payload?;
    let cmd = req.to_command(chrono::Utc::now())?;

    let loan = library::borrow_book(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(LoanResponse::from(loan))))
}

/// POST /return - 書籍を返却する
///
/// 強制されるビジネスルール:
/// - 貸出記録が存在すること
/// - 既に返却済みでないこと
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReturnRequest>, JsonRejection>,
) -> Result<Json<LoanResponse>, ApiError> {
    let Json(req) = payload?;
    let cmd = req.to_command(chrono::Utc::now())?;

    let loan = library::return_book(&state.service_deps, cmd).await?;

    Ok(Json(LoanResponse::from(loan)))
}

/// GET /borrowed - 貸出中の書籍の一覧
pub async fn list_borrowed_books(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BorrowedBookResponse>>, ApiError> {
    let loans = library::list_active_loans(&state.service_deps).await?;
    Ok(Json(loans.into_iter().map(BorrowedBookResponse::from).collect()))
}

/// GET /loans/:id - 貸出記録をIDで取得（返却済みを含む）
pub async fn get_loan(
    State(state): State<Arc<AppState>>,
    path: IdPath,
) -> Result<Json<LoanResponse>, ApiError> {
    let loan_id = LoanId::from_i64(id_from_path(path)?);
    let loan = library::get_loan(&state.service_deps, loan_id).await?;
    Ok(Json(LoanResponse::from(loan)))
}
