use crate::domain::eligibility::allowed_donation_window;
use crate::domain::{
    AvailabilityMode, DonationWindow, DonorId, DonorInput, DonorRecord, EligibilityPolicy,
    validate_donor,
};
use crate::ports::*;
use futures::TryStreamExt;
use std::sync::Arc;

use super::errors::{DonorApplicationError, Result};
use super::report::{self, BloodGroupSummary};

/// サービスの依存関係
///
/// 判定ポリシーと献血可否の決め方も起動時に構築して渡す。
/// グローバルな設定値は持たない。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub donor_repository: Arc<dyn DonorRepository>,
    pub clock: Arc<dyn Clock>,
    pub policy: EligibilityPolicy,
    pub availability_mode: AvailabilityMode,
}

/// 献血者を登録する
///
/// ビジネスルール：
/// - すべての項目がバリデーションを通過すること
/// - 連絡先が未登録であること（ストレージで強制）
///
/// # 戻り値
/// 保存されたレコード
pub async fn register_donor(deps: &ServiceDependencies, input: DonorInput) -> Result<DonorRecord> {
    let today = deps.clock.today();

    let donor = validate_donor(&deps.policy, &input, today, deps.availability_mode).inspect_err(
        |errors| tracing::debug!("Donor registration rejected: {:?}", errors.errors()),
    )?;

    let record = DonorRecord::create(donor, deps.clock.now());
    deps.donor_repository.create(record.clone()).await?;

    tracing::info!(
        donor_id = %record.id.value(),
        blood_group = %record.blood_group,
        "Donor registered"
    );

    Ok(record)
}

/// 献血者の情報を更新する
///
/// 部分更新はサポートしない。すべての項目を再検証して置き換える。
/// created_atは登録時の値を維持する。
pub async fn update_donor(
    deps: &ServiceDependencies,
    id: DonorId,
    input: DonorInput,
) -> Result<DonorRecord> {
    let today = deps.clock.today();

    let donor = validate_donor(&deps.policy, &input, today, deps.availability_mode).inspect_err(
        |errors| tracing::debug!("Donor update rejected: {:?}", errors.errors()),
    )?;

    let existing = deps
        .donor_repository
        .get_by_id(id)
        .await?
        .ok_or(DonorApplicationError::DonorNotFound)?;

    let updated = existing.replace(donor);
    if !deps.donor_repository.update(updated.clone()).await? {
        return Err(DonorApplicationError::DonorNotFound);
    }

    tracing::info!(donor_id = %id.value(), "Donor updated");

    Ok(updated)
}

/// IDで献血者を取得する
pub async fn get_donor(deps: &ServiceDependencies, id: DonorId) -> Result<DonorRecord> {
    deps.donor_repository
        .get_by_id(id)
        .await?
        .ok_or(DonorApplicationError::DonorNotFound)
}

/// 条件に一致する献血者の一覧
pub async fn list_donors(
    deps: &ServiceDependencies,
    filter: &DonorFilter,
) -> Result<Vec<DonorRecord>> {
    Ok(deps.donor_repository.list(filter).await?)
}

/// 血液型別の集計（8種類すべて、列挙順）
pub async fn summarize_by_blood_group(
    deps: &ServiceDependencies,
) -> Result<Vec<BloodGroupSummary>> {
    let counts = deps.donor_repository.count_by_blood_group().await?;
    Ok(report::summarize(&counts))
}

/// 全献血者をCSVとして出力する
pub async fn export_csv(deps: &ServiceDependencies) -> Result<String> {
    let donors: Vec<DonorRecord> = deps.donor_repository.stream_all().try_collect().await?;

    let rows: Vec<_> = donors
        .iter()
        .map(|donor| report::build_row(&deps.policy, donor))
        .collect();

    tracing::info!(rows = rows.len(), "Donor report exported");

    Ok(report::render_csv(&rows))
}

/// 現在の最終献血日の許容範囲
pub fn donation_window(deps: &ServiceDependencies) -> DonationWindow {
    allowed_donation_window(deps.clock.today())
}
