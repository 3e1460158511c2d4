use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::eligibility::{
    EligibilityPolicy, allowed_donation_window, matches_calendar_shape, normalize_contact,
    parse_calendar_date, parse_manual_availability_flag, validate_contact,
};
use super::{BloodGroup, DonorId, ValidationError, ValidationErrors};

/// 氏名の最小文字数（前後の空白を除いた後）
pub const NAME_MIN_CHARS: usize = 2;

/// 献血可否の決め方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AvailabilityMode {
    /// 登録・更新時に明示的な申告を必須とする
    #[default]
    RequireExplicit,
    /// 申告がない場合は最終献血日から算出する
    DeriveFromDate,
}

impl std::str::FromStr for AvailabilityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "explicit" => Ok(AvailabilityMode::RequireExplicit),
            "derive" => Ok(AvailabilityMode::DeriveFromDate),
            _ => Err(format!("Invalid availability mode: {}", s)),
        }
    }
}

/// リクエストから受け取った未検証の入力
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DonorInput {
    pub name: Option<String>,
    pub contact: Option<String>,
    pub blood_group: Option<String>,
    pub last_donation_date: Option<String>,
    pub available: Option<String>,
}

/// 検証・正規化済みの献血者データ（永続化可能）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedDonor {
    pub name: String,
    /// 数字のみに正規化済み
    pub contact: String,
    pub blood_group: BloodGroup,
    pub last_donation_date: Option<NaiveDate>,
    pub available: bool,
}

/// 永続化された献血者レコード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonorRecord {
    pub id: DonorId,
    pub name: String,
    pub contact: String,
    pub blood_group: BloodGroup,
    pub last_donation_date: Option<NaiveDate>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

impl DonorRecord {
    /// 新規登録用のレコードを作成する
    pub fn create(donor: ValidatedDonor, created_at: DateTime<Utc>) -> Self {
        Self {
            id: DonorId::new(),
            name: donor.name,
            contact: donor.contact,
            blood_group: donor.blood_group,
            last_donation_date: donor.last_donation_date,
            available: donor.available,
            created_at,
        }
    }

    /// 全項目を置き換える（idとcreated_atは維持）
    pub fn replace(self, donor: ValidatedDonor) -> Self {
        Self {
            id: self.id,
            name: donor.name,
            contact: donor.contact,
            blood_group: donor.blood_group,
            last_donation_date: donor.last_donation_date,
            available: donor.available,
            created_at: self.created_at,
        }
    }
}

/// 献血者データを検証する（登録・更新共通）
///
/// 各項目は独立して検証され、失敗はすべて収集される。
/// 部分更新はサポートしないため、更新時もすべての項目を再検証する。
pub fn validate_donor(
    policy: &EligibilityPolicy,
    input: &DonorInput,
    today: NaiveDate,
    mode: AvailabilityMode,
) -> Result<ValidatedDonor, ValidationErrors> {
    let mut errors = Vec::new();

    let name = input.name.as_deref().unwrap_or_default().trim();
    if name.chars().count() < NAME_MIN_CHARS {
        errors.push(ValidationError::NameTooShort);
    }

    let contact = input.contact.as_deref();
    if !validate_contact(contact) {
        errors.push(ValidationError::InvalidContact);
    }

    let blood_group = input
        .blood_group
        .as_deref()
        .and_then(|raw| raw.parse::<BloodGroup>().ok());
    if blood_group.is_none() {
        errors.push(ValidationError::InvalidBloodGroup);
    }

    let last_donation_date =
        match check_last_donation_date(input.last_donation_date.as_deref(), today) {
            Ok(date) => Some(date),
            Err(error) => {
                errors.push(error);
                None
            }
        };

    let available = match parse_manual_availability_flag(input.available.as_deref()) {
        Some(flag) => Some(flag),
        None => match mode {
            AvailabilityMode::RequireExplicit => {
                errors.push(ValidationError::MissingAvailability);
                None
            }
            AvailabilityMode::DeriveFromDate => {
                last_donation_date.map(|date| policy.compute_availability(Some(date), today))
            }
        },
    };

    match (blood_group, available) {
        (Some(blood_group), Some(available)) if errors.is_empty() => Ok(ValidatedDonor {
            name: name.to_string(),
            contact: normalize_contact(contact.unwrap_or_default()),
            blood_group,
            last_donation_date,
            available,
        }),
        _ => Err(ValidationErrors(errors)),
    }
}

/// 最終献血日の検証：必須、形式、暦上の妥当性、許容範囲
fn check_last_donation_date(
    raw: Option<&str>,
    today: NaiveDate,
) -> Result<NaiveDate, ValidationError> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(ValidationError::MissingLastDonationDate),
    };

    if !matches_calendar_shape(raw) {
        return Err(ValidationError::MalformedLastDonationDate);
    }

    let date = parse_calendar_date(Some(raw)).ok_or(ValidationError::InvalidCalendarDate)?;

    let window = allowed_donation_window(today);
    if !window.contains(date) {
        return Err(ValidationError::LastDonationOutOfWindow {
            min: window.min,
            max: window.max,
        });
    }

    Ok(date)
}
