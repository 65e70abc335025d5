use crate::application::library::ServiceDependencies;
use crate::domain::{self, Book, BookId, Loan, LoanId, Member, MemberId, RequiredText};
use crate::ports::book_repository::{self, BookRepository, DeleteOutcome};
use crate::ports::loan_repository::{self, ActiveLoanView, LoanRepository, OpenOutcome};
use crate::ports::member_repository::{self, MemberRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct BookRecord {
    title: String,
    author: String,
}

#[derive(Debug, Default)]
struct State {
    books: BTreeMap<BookId, BookRecord>,
    members: BTreeMap<MemberId, Member>,
    loans: BTreeMap<LoanId, Loan>,
    last_book_id: i64,
    last_member_id: i64,
    last_loan_id: i64,
}

impl State {
    fn book(&self, book_id: BookId, record: &BookRecord) -> Book {
        Book {
            book_id,
            title: record.title.clone(),
            author: record.author.clone(),
            available: domain::loan::is_book_available(book_id, self.loans.values()),
        }
    }
}

/// インメモリのエンティティストア
///
/// 書籍・会員・貸出記録を1つのロックで保護する。
/// 条件付き書き込みはすべて同じ書き込みロックの中で確認と更新を行うため、
/// 同じ書籍への同時貸出は1件だけが成功する。
/// IDは種別ごとに1から採番する。
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// このストアを3つのリポジトリポートとして使う依存関係を組み立てる
    pub fn into_dependencies(self: Arc<Self>) -> ServiceDependencies {
        ServiceDependencies {
            book_repository: self.clone(),
            member_repository: self.clone(),
            loan_repository: self,
        }
    }
}

#[async_trait]
impl BookRepository for MemoryStore {
    async fn insert(
        &self,
        title: RequiredText,
        author: RequiredText,
    ) -> book_repository::Result<Book> {
        let mut state = self.state.write().await;
        state.last_book_id += 1;
        let book_id = BookId::from_i64(state.last_book_id);
        let record = BookRecord {
            title: title.into_inner(),
            author: author.into_inner(),
        };
        let book = state.book(book_id, &record);
        state.books.insert(book_id, record);
        Ok(book)
    }

    async fn get(&self, book_id: BookId) -> book_repository::Result<Option<Book>> {
        let state = self.state.read().await;
        Ok(state
            .books
            .get(&book_id)
            .map(|record| state.book(book_id, record)))
    }

    async fn update(
        &self,
        book_id: BookId,
        title: RequiredText,
        author: RequiredText,
    ) -> book_repository::Result<Option<Book>> {
        let mut state = self.state.write().await;
        let Some(record) = state.books.get_mut(&book_id) else {
            return Ok(None);
        };
        record.title = title.into_inner();
        record.author = author.into_inner();
        let record = record.clone();
        Ok(Some(state.book(book_id, &record)))
    }

    async fn delete_if_available(&self, book_id: BookId) -> book_repository::Result<DeleteOutcome> {
        let mut state = self.state.write().await;
        if !state.books.contains_key(&book_id) {
            return Ok(DeleteOutcome::Missing);
        }
        if !domain::loan::is_book_available(book_id, state.loans.values()) {
            return Ok(DeleteOutcome::Blocked);
        }
        state.books.remove(&book_id);
        // 返却済みの履歴も書籍と一緒に消える
        state.loans.retain(|_, loan| loan.book_id != book_id);
        Ok(DeleteOutcome::Deleted)
    }

    async fn list(&self) -> book_repository::Result<Vec<Book>> {
        let state = self.state.read().await;
        Ok(state
            .books
            .iter()
            .map(|(book_id, record)| state.book(*book_id, record))
            .collect())
    }

    async fn list_available(&self) -> book_repository::Result<Vec<Book>> {
        let state = self.state.read().await;
        Ok(state
            .books
            .iter()
            .map(|(book_id, record)| state.book(*book_id, record))
            .filter(|book| book.available)
            .collect())
    }
}

#[async_trait]
impl MemberRepository for MemoryStore {
    async fn insert(
        &self,
        name: RequiredText,
        contact: RequiredText,
    ) -> member_repository::Result<Member> {
        let mut state = self.state.write().await;
        state.last_member_id += 1;
        let member = Member {
            member_id: MemberId::from_i64(state.last_member_id),
            name: name.into_inner(),
            contact: contact.into_inner(),
        };
        state.members.insert(member.member_id, member.clone());
        Ok(member)
    }

    async fn get(&self, member_id: MemberId) -> member_repository::Result<Option<Member>> {
        Ok(self.state.read().await.members.get(&member_id).cloned())
    }

    async fn update(
        &self,
        member_id: MemberId,
        name: RequiredText,
        contact: RequiredText,
    ) -> member_repository::Result<Option<Member>> {
        let mut state = self.state.write().await;
        Ok(state.members.get_mut(&member_id).map(|member| {
            member.name = name.into_inner();
            member.contact = contact.into_inner();
            member.clone()
        }))
    }

    async fn delete_if_idle(
        &self,
        member_id: MemberId,
    ) -> member_repository::Result<DeleteOutcome> {
        let mut state = self.state.write().await;
        if !state.members.contains_key(&member_id) {
            return Ok(DeleteOutcome::Missing);
        }
        if domain::loan::has_active_loans(member_id, state.loans.values()) {
            return Ok(DeleteOutcome::Blocked);
        }
        state.members.remove(&member_id);
        state.loans.retain(|_, loan| loan.member_id != member_id);
        Ok(DeleteOutcome::Deleted)
    }

    async fn list(&self) -> member_repository::Result<Vec<Member>> {
        Ok(self.state.read().await.members.values().cloned().collect())
    }
}

#[async_trait]
impl LoanRepository for MemoryStore {
    async fn open(
        &self,
        book_id: BookId,
        member_id: MemberId,
        borrowed_at: DateTime<Utc>,
    ) -> loan_repository::Result<OpenOutcome> {
        let mut state = self.state.write().await;
        if !state.books.contains_key(&book_id) || !state.members.contains_key(&member_id) {
            return Ok(OpenOutcome::MissingReference);
        }
        if !domain::loan::is_book_available(book_id, state.loans.values()) {
            return Ok(OpenOutcome::BookOnLoan);
        }

        state.last_loan_id += 1;
        let loan = Loan {
            loan_id: LoanId::from_i64(state.last_loan_id),
            book_id,
            member_id,
            borrowed_at,
            returned_at: None,
        };
        state.loans.insert(loan.loan_id, loan.clone());
        Ok(OpenOutcome::Opened(loan))
    }

    async fn close(
        &self,
        loan_id: LoanId,
        returned_at: DateTime<Utc>,
    ) -> loan_repository::Result<Option<Loan>> {
        let mut state = self.state.write().await;
        let Some(loan) = state.loans.get_mut(&loan_id) else {
            return Ok(None);
        };
        match domain::loan::return_loan(loan, returned_at) {
            Ok(returned) => {
                *loan = returned.clone();
                Ok(Some(returned))
            }
            Err(_) => Ok(None),
        }
    }

    async fn get(&self, loan_id: LoanId) -> loan_repository::Result<Option<Loan>> {
        Ok(self.state.read().await.loans.get(&loan_id).cloned())
    }

    async fn list_active(&self) -> loan_repository::Result<Vec<ActiveLoanView>> {
        let state = self.state.read().await;
        let views = state
            .loans
            .values()
            .filter(|loan| loan.is_active())
            .filter_map(|loan| {
                let book = state.books.get(&loan.book_id)?;
                let member = state.members.get(&loan.member_id)?;
                Some(ActiveLoanView {
                    loan_id: loan.loan_id,
                    book_id: loan.book_id,
                    book_title: book.title.clone(),
                    member_id: loan.member_id,
                    member_name: member.name.clone(),
                    borrowed_at: loan.borrowed_at,
                })
            })
            .collect();
        Ok(views)
    }

    async fn find_by_member_id(&self, member_id: MemberId) -> loan_repository::Result<Vec<Loan>> {
        let state = self.state.read().await;
        Ok(state
            .loans
            .values()
            .filter(|loan| loan.member_id == member_id)
            .cloned()
            .collect())
    }
}
