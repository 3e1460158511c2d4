use crate::application::donor::{
    BloodGroupSummary, DonorApplicationError, ServiceDependencies, donation_window,
    export_csv as execute_export_csv, get_donor as execute_get_donor,
    list_donors as execute_list_donors, register_donor as execute_register_donor,
    summarize_by_blood_group as execute_summarize, update_donor as execute_update_donor,
};
use crate::domain::DonorId;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    error::ApiError,
    types::{DonorRequest, DonorResponse, EligibilityWindowResponse, ErrorResponse, ListDonorsQuery},
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

// ============================================================================
// Command handlers (POST / PUT)
// ============================================================================

/// POST /donors - 献血者を登録
///
/// 強制されるビジネスルール:
/// - 氏名は2文字以上
/// - 連絡先は7〜15桁の数字
/// - 血液型は8種類のいずれか
/// - 最終献血日は過去2年以内
/// - 献血可否の申告があること
pub async fn create_donor(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DonorRequest>,
) -> Result<(StatusCode, Json<DonorResponse>), ApiError> {
    let deps = &state.service_deps;
    let record = execute_register_donor(deps, req.to_input()).await?;

    Ok((StatusCode::CREATED, Json(DonorResponse::new(record, &deps.policy))))
}

/// PUT /donors/:id - 献血者の情報を置き換える
///
/// 部分更新は不可。すべての項目を送信する必要がある。
pub async fn update_donor(
    State(state): State<Arc<AppState>>,
    Path(donor_id): Path<Uuid>,
    Json(req): Json<DonorRequest>,
) -> Result<Json<DonorResponse>, ApiError> {
    let deps = &state.service_deps;
    let record =
        execute_update_donor(deps, DonorId::from_uuid(donor_id), req.to_input()).await?;

    Ok(Json(DonorResponse::new(record, &deps.policy)))
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /donors/:id - 献血者をIDで取得
pub async fn get_donor_by_id(
    State(state): State<Arc<AppState>>,
    Path(donor_id): Path<Uuid>,
) -> Result<Json<DonorResponse>, ApiError> {
    let deps = &state.service_deps;
    let record = execute_get_donor(deps, DonorId::from_uuid(donor_id)).await?;

    Ok(Json(DonorResponse::new(record, &deps.policy)))
}

/// GET /donors - オプションフィルタ付き献血者一覧取得
///
/// クエリパラメータ:
/// - blood_group: 血液型でフィルタリング（大文字小文字を区別）
/// - available: 献血可否でフィルタリング（yes/no, true/false, 1/0 など）
/// - search: 氏名または連絡先の部分一致
///
/// 作成日時の新しい順に返す。
pub async fn list_donors(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListDonorsQuery>,
) -> Result<Json<Vec<DonorResponse>>, QueryError> {
    let deps = &state.service_deps;
    let filter = query.to_filter().map_err(QueryError::BadRequest)?;

    let donors = execute_list_donors(deps, &filter).await?;

    Ok(Json(
        donors
            .into_iter()
            .map(|record| DonorResponse::new(record, &deps.policy))
            .collect(),
    ))
}

/// GET /donors/summary - 血液型別の集計
pub async fn blood_group_summary(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<BloodGroupSummary>>, QueryError> {
    let summary = execute_summarize(&state.service_deps).await?;
    Ok(Json(summary))
}

/// GET /donors/export.csv - 全献血者のCSVレポート
pub async fn export_donors_csv(State(state): State<Arc<AppState>>) -> Result<Response, QueryError> {
    let csv = execute_export_csv(&state.service_deps).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"donors.csv\"",
            ),
        ],
        csv,
    )
        .into_response())
}

/// GET /eligibility/window - 最終献血日の許容範囲とクールダウン日数
pub async fn eligibility_window(
    State(state): State<Arc<AppState>>,
) -> Json<EligibilityWindowResponse> {
    let deps = &state.service_deps;
    Json(EligibilityWindowResponse::new(
        donation_window(deps),
        &deps.policy,
    ))
}

// ============================================================================
// Error types
// ============================================================================

/// クエリハンドラー用のエラー型
#[derive(Debug)]
pub enum QueryError {
    NotFound(String),
    BadRequest(String),
    InternalError(String),
}

impl From<DonorApplicationError> for QueryError {
    fn from(err: DonorApplicationError) -> Self {
        match err {
            DonorApplicationError::DonorNotFound => QueryError::NotFound(err.to_string()),
            DonorApplicationError::Validation(errors) => QueryError::BadRequest(errors.to_string()),
            DonorApplicationError::DuplicateContact => QueryError::BadRequest(err.to_string()),
            DonorApplicationError::RepositoryError(e) => QueryError::InternalError(e.to_string()),
        }
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            QueryError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            QueryError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            QueryError::InternalError(msg) => {
                // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
                tracing::error!("Internal error in query handler: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
