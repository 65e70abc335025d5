mod borrowing_service;
mod catalog_service;
mod errors;
mod membership_service;

pub use borrowing_service::{
    ServiceDependencies, borrow_book, delete_book, delete_member, get_loan, list_active_loans,
    list_available_books, return_book,
};
pub use catalog_service::{create_book, get_book, list_books, update_book};
pub use errors::{ErrorKind, LibraryError, Result};
pub use membership_service::{
    add_member, get_member, list_member_loans, list_members, update_member,
};
