use crate::application::donor::DonorApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::{ErrorResponse, FieldErrorResponse};

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(DonorApplicationError);

impl From<DonorApplicationError> for ApiError {
    fn from(err: DonorApplicationError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            // 422 Unprocessable Entity - 入力値の形式エラー・ビジネスルール違反
            DonorApplicationError::Validation(ref errors) => {
                let details: Vec<FieldErrorResponse> =
                    errors.errors().iter().map(FieldErrorResponse::from).collect();
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorResponse::new("VALIDATION_FAILED", "Donor record is invalid")
                        .with_details(details),
                )
            }

            // 404 Not Found - リクエストされたリソースが存在しない
            DonorApplicationError::DonorNotFound => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("DONOR_NOT_FOUND", "Donor not found"),
            ),

            // 409 Conflict - 連絡先の一意制約違反
            DonorApplicationError::DuplicateContact => (
                StatusCode::CONFLICT,
                ErrorResponse::new(
                    "DUPLICATE_CONTACT",
                    "A donor with this contact is already registered",
                ),
            ),

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            DonorApplicationError::RepositoryError(ref e) => {
                tracing::error!("Repository error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("REPOSITORY_ERROR", "Failed to access donor records"),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
