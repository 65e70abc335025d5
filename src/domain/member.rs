use serde::{Deserialize, Serialize};

use super::MemberId;

/// 会員
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: MemberId,
    pub name: String,
    pub contact: String,
}
