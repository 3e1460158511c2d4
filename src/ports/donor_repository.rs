use crate::domain::{BloodGroup, DonorId, DonorRecord};
use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

/// リポジトリのエラー
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// 連絡先の一意制約違反
    #[error("Contact is already registered")]
    DuplicateContact,

    /// バックエンド（DB等）のエラー
    #[error("Storage backend error")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// 献血者一覧の絞り込み条件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonorFilter {
    pub blood_group: Option<BloodGroup>,
    pub available: Option<bool>,
    /// 氏名の部分一致（大文字小文字を区別しない）、または連絡先の数字の部分一致
    pub search: Option<String>,
}

impl DonorFilter {
    /// インメモリ実装用の判定
    pub fn matches(&self, donor: &DonorRecord) -> bool {
        if self.blood_group.is_some_and(|group| group != donor.blood_group) {
            return false;
        }
        if self.available.is_some_and(|available| available != donor.available) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term_lower = term.to_lowercase();
                let term_digits = crate::domain::eligibility::normalize_contact(term);
                donor.name.to_lowercase().contains(&term_lower)
                    || (!term_digits.is_empty() && donor.contact.contains(&term_digits))
            }
        }
    }
}

/// 血液型ごとの件数（ストレージ側の集計結果）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloodGroupCount {
    pub blood_group: BloodGroup,
    pub total: i64,
    pub available: i64,
}

/// 献血者リポジトリポート
///
/// 永続化の能力（作成・取得・更新・一覧・集計）を抽象化する。
/// 判定ポリシーはバックエンドに依存せず、アダプターを差し替えるだけでよい。
#[async_trait]
pub trait DonorRepository: Send + Sync {
    /// 新しい献血者を保存する
    ///
    /// 連絡先が既に登録済みの場合は `RepositoryError::DuplicateContact`。
    async fn create(&self, donor: DonorRecord) -> Result<()>;

    /// IDで献血者を取得する
    async fn get_by_id(&self, id: DonorId) -> Result<Option<DonorRecord>>;

    /// 献血者の全項目を置き換える（created_atは変更しない）
    ///
    /// 対象が存在しない場合は `Ok(false)`。
    async fn update(&self, donor: DonorRecord) -> Result<bool>;

    /// 条件に一致する献血者を作成日時の新しい順に返す
    async fn list(&self, filter: &DonorFilter) -> Result<Vec<DonorRecord>>;

    /// 血液型ごとの総数と献血可能数
    ///
    /// 登録のない血液型は含まれなくてよい。
    async fn count_by_blood_group(&self) -> Result<Vec<BloodGroupCount>>;

    /// すべての献血者をストリーム配信する（レポート出力用）
    fn stream_all(&self) -> BoxStream<'_, Result<DonorRecord>>;
}
