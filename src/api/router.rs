use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, add_member, borrow_book, create_book, delete_book, delete_member, get_book,
    get_loan, get_member, list_available_books, list_books, list_borrowed_books,
    list_member_loans, list_members, return_book, update_book, update_member,
};

/// Creates the API router with all library endpoints
///
/// Books:
/// - POST /books, GET /books, GET|PUT|DELETE /books/:id
/// - GET /availablebooks
///
/// Members:
/// - POST /members, GET /members, GET|PUT|DELETE /members/:id
/// - GET /members/:id/loans - Borrowing history
///
/// Borrowing:
/// - POST /borrow, POST /return
/// - GET /borrowed - Active loans
/// - GET /loans/:id
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Books
        .route("/books", post(create_book).get(list_books))
        .route(
            "/books/:id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/availablebooks", get(list_available_books))
        // Members
        .route("/members", post(add_member).get(list_members))
        .route(
            "/members/:id",
            get(get_member).put(update_member).delete(delete_member),
        )
        .route("/members/:id/loans", get(list_member_loans))
        // Borrowing
        .route("/borrow", post(borrow_book))
        .route("/return", post(return_book))
        .route("/borrowed", get(list_borrowed_books))
        .route("/loans/:id", get(get_loan))
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
