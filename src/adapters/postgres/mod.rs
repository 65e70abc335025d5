pub mod book_repository;
pub mod loan_repository;
pub mod member_repository;

use crate::application::library::ServiceDependencies;
use sqlx::PgPool;
use std::sync::Arc;

// パブリックに型を再エクスポート
pub use book_repository::BookRepository as PostgresBookRepository;
pub use loan_repository::LoanRepository as PostgresLoanRepository;
pub use member_repository::MemberRepository as PostgresMemberRepository;

/// アプリケーションとテストで共有するマイグレーション
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// コネクションプールから3つのリポジトリを組み立てる
pub fn service_dependencies(pool: PgPool) -> ServiceDependencies {
    ServiceDependencies {
        book_repository: Arc::new(PostgresBookRepository::new(pool.clone())),
        member_repository: Arc::new(PostgresMemberRepository::new(pool.clone())),
        loan_repository: Arc::new(PostgresLoanRepository::new(pool)),
    }
}
