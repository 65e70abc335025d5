use crate::application::library::{ErrorKind, LibraryError};
use crate::domain::ValidationError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーと境界での検証エラーをラップし、
/// HTTPレスポンスへのマッピングを提供する。
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Library(#[from] LibraryError),

    /// 必須フィールドの欠落や不正なJSON
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    pub fn validation(field: &str, err: ValidationError) -> Self {
        ApiError::Validation(format!("{} {}", field, err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// NotFound の場合はどのリソースが見つからないかをエラーコードで区別する
fn not_found_code(err: &LibraryError) -> &'static str {
    match err {
        LibraryError::BookNotFound(_) => "BOOK_NOT_FOUND",
        LibraryError::MemberNotFound(_) => "MEMBER_NOT_FOUND",
        LibraryError::LoanNotFound(_) => "BORROWING_NOT_FOUND",
        _ => "NOT_FOUND",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            ApiError::Library(err) => match err.kind() {
                // 404 Not Found - リクエストされたリソースが存在しない
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, not_found_code(err)),

                // 409 Conflict - 現在の貸出状態と矛盾する操作
                ErrorKind::AlreadyBorrowed => (StatusCode::CONFLICT, "ALREADY_BORROWED"),
                ErrorKind::NotActive => (StatusCode::CONFLICT, "NOT_ACTIVE"),
                ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT"),

                // 500 Internal Server Error - システム障害
                // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
                ErrorKind::Internal => {
                    tracing::error!("Store error: {:?}", err);
                    let body =
                        Json(ErrorResponse::new("STORE_ERROR", "Failed to access the store"));
                    return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
                }
            },

            // 400 Bad Request - 入力の検証エラー
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        };

        let body = Json(ErrorResponse::new(error_type, self.to_string()));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BookId, LoanId, MemberId};

    fn status_of(err: LibraryError) -> StatusCode {
        ApiError::from(err).into_response().status()
    }

    #[test]
    fn test_status_follows_error_kind() {
        assert_eq!(
            status_of(LibraryError::MemberNotFound(MemberId::from_i64(1))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(LibraryError::BookNotAvailable(BookId::from_i64(1))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(LibraryError::LoanNotActive(LoanId::from_i64(1))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(LibraryError::BookOnLoan(BookId::from_i64(1))),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(LibraryError::StoreError("connection refused".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_not_found_codes_name_the_resource() {
        assert_eq!(
            not_found_code(&LibraryError::LoanNotFound(LoanId::from_i64(2))),
            "BORROWING_NOT_FOUND"
        );
        assert_eq!(
            not_found_code(&LibraryError::MemberNotFound(MemberId::from_i64(2))),
            "MEMBER_NOT_FOUND"
        );
        assert_eq!(
            not_found_code(&LibraryError::BookNotFound(BookId::from_i64(2))),
            "BOOK_NOT_FOUND"
        );
    }
}
