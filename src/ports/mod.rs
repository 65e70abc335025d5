pub mod book_repository;
pub mod loan_repository;
pub mod member_repository;

pub use book_repository::{BookRepository, DeleteOutcome};
pub use loan_repository::{ActiveLoanView, LoanRepository, OpenOutcome};
pub use member_repository::MemberRepository;
