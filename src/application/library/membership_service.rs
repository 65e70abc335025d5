use crate::domain::{Loan, Member, MemberId, commands::*};

use super::borrowing_service::{ServiceDependencies, require_member};
use super::errors::{LibraryError, Result};

/// 会員を登録する
pub async fn add_member(deps: &ServiceDependencies, cmd: AddMember) -> Result<Member> {
    let member = deps
        .member_repository
        .insert(cmd.name, cmd.contact)
        .await
        .map_err(LibraryError::StoreError)?;

    tracing::info!(member_id = %member.member_id, member_name = %member.name, "Created member");
    Ok(member)
}

/// 会員の氏名・連絡先を更新する
pub async fn update_member(deps: &ServiceDependencies, cmd: UpdateMember) -> Result<Member> {
    let member = deps
        .member_repository
        .update(cmd.member_id, cmd.name, cmd.contact)
        .await
        .map_err(LibraryError::StoreError)?
        .ok_or(LibraryError::MemberNotFound(cmd.member_id))?;

    tracing::info!(member_id = %member.member_id, "Updated member");
    Ok(member)
}

pub async fn get_member(deps: &ServiceDependencies, member_id: MemberId) -> Result<Member> {
    require_member(deps, member_id).await
}

/// 全会員の一覧（ID順）
pub async fn list_members(deps: &ServiceDependencies) -> Result<Vec<Member>> {
    deps.member_repository
        .list()
        .await
        .map_err(LibraryError::StoreError)
}

/// 会員の貸出履歴（貸出中・返却済みの両方、ID順）
///
/// 会員が存在しない場合は`MemberNotFound`。
pub async fn list_member_loans(
    deps: &ServiceDependencies,
    member_id: MemberId,
) -> Result<Vec<Loan>> {
    require_member(deps, member_id).await?;

    deps.loan_repository
        .find_by_member_id(member_id)
        .await
        .map_err(LibraryError::StoreError)
}
