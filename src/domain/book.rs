use serde::{Deserialize, Serialize};

use super::BookId;

/// 書籍
///
/// available はストアが貸出記録から導出する値であり、
/// タイトル・著者の更新では変化しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub available: bool,
}
