use crate::domain::ValidationErrors;
use crate::ports::donor_repository::RepositoryError;
use thiserror::Error;

/// 献血者管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum DonorApplicationError {
    /// 入力値の検証エラー（項目ごとの詳細を含む）
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// 献血者が見つからない
    #[error("Donor not found")]
    DonorNotFound,

    /// 連絡先が既に登録されている
    #[error("Contact is already registered")]
    DuplicateContact,

    /// リポジトリのエラー
    #[error("Repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<RepositoryError> for DonorApplicationError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateContact => DonorApplicationError::DuplicateContact,
            RepositoryError::Backend(source) => DonorApplicationError::RepositoryError(source),
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, DonorApplicationError>;
