use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::eligibility::parse_manual_availability_flag;
use crate::domain::{
    BloodGroup, DonationWindow, DonorInput, DonorRecord, EligibilityPolicy, ValidationError,
};
use crate::ports::donor_repository::DonorFilter;

/// 献血者の登録・更新リクエスト（POST /donors, PUT /donors/:id）
///
/// フォームやクライアントによって数値や真偽値で送られることがあるため、
/// 各項目は任意のJSON値として受け取り、文字列に変換してから検証する。
#[derive(Debug, Default, Deserialize)]
pub struct DonorRequest {
    pub name: Option<Value>,
    pub contact: Option<Value>,
    pub blood_group: Option<Value>,
    pub last_donation_date: Option<Value>,
    pub available: Option<Value>,
}

impl DonorRequest {
    pub fn to_input(self) -> DonorInput {
        DonorInput {
            name: value_to_string(self.name),
            contact: value_to_string(self.contact),
            blood_group: value_to_string(self.blood_group),
            last_donation_date: value_to_string(self.last_donation_date),
            available: value_to_string(self.available),
        }
    }
}

/// JSON値を検証用の文字列に変換する（nullは未指定）
fn value_to_string(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// 献血者一覧取得のクエリパラメータ
#[derive(Debug, Default, Deserialize)]
pub struct ListDonorsQuery {
    /// 血液型でフィルタリング
    pub blood_group: Option<String>,
    /// 献血可否でフィルタリング（yes/no 等）
    pub available: Option<String>,
    /// 氏名または連絡先で検索
    pub search: Option<String>,
}

impl ListDonorsQuery {
    /// クエリパラメータのパースとバリデーション
    ///
    /// 空文字のパラメータは未指定として扱う。
    pub fn to_filter(&self) -> Result<DonorFilter, String> {
        let blood_group = match non_empty(&self.blood_group) {
            Some(raw) => Some(raw.parse::<BloodGroup>()?),
            None => None,
        };

        let available = match non_empty(&self.available) {
            Some(raw) => Some(
                parse_manual_availability_flag(Some(raw))
                    .ok_or_else(|| format!("Invalid availability filter: {}", raw))?,
            ),
            None => None,
        };

        Ok(DonorFilter {
            blood_group,
            available,
            search: non_empty(&self.search).map(str::to_string),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// 献血者レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct DonorResponse {
    pub id: Uuid,
    pub name: String,
    pub contact: String,
    pub blood_group: BloodGroup,
    pub last_donation_date: Option<NaiveDate>,
    pub next_eligible_date: Option<NaiveDate>,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

impl DonorResponse {
    pub fn new(record: DonorRecord, policy: &EligibilityPolicy) -> Self {
        Self {
            id: record.id.value(),
            next_eligible_date: policy.next_eligible_date(record.last_donation_date),
            name: record.name,
            contact: record.contact,
            blood_group: record.blood_group,
            last_donation_date: record.last_donation_date,
            available: record.available,
            created_at: record.created_at,
        }
    }
}

/// 許容範囲レスポンス（GET /eligibility/window）
#[derive(Debug, Serialize, Deserialize)]
pub struct EligibilityWindowResponse {
    pub min_date: NaiveDate,
    pub max_date: NaiveDate,
    pub cooldown_days: u32,
}

impl EligibilityWindowResponse {
    pub fn new(window: DonationWindow, policy: &EligibilityPolicy) -> Self {
        Self {
            min_date: window.min,
            max_date: window.max,
            cooldown_days: policy.cooldown_days(),
        }
    }
}

/// 項目ごとのエラー詳細
#[derive(Debug, Serialize, Deserialize)]
pub struct FieldErrorResponse {
    pub field: String,
    pub code: String,
    pub message: String,
}

impl From<&ValidationError> for FieldErrorResponse {
    fn from(error: &ValidationError) -> Self {
        Self {
            field: error.field().to_string(),
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldErrorResponse>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn with_details(mut self, details: Vec<FieldErrorResponse>) -> Self {
        self.details = details;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_accepts_non_string_values() {
        let request: DonorRequest = serde_json::from_value(json!({
            "name": "Asha",
            "contact": 5551234567u64,
            "blood_group": "A+",
            "last_donation_date": null,
            "available": true,
        }))
        .unwrap();

        let input = request.to_input();

        assert_eq!(input.contact.as_deref(), Some("5551234567"));
        assert_eq!(input.available.as_deref(), Some("true"));
        assert_eq!(input.last_donation_date, None);
    }

    #[test]
    fn test_query_to_filter() {
        let query = ListDonorsQuery {
            blood_group: Some("O-".to_string()),
            available: Some("No".to_string()),
            search: Some("  ".to_string()),
        };

        let filter = query.to_filter().unwrap();

        assert_eq!(filter.blood_group, Some(BloodGroup::ONegative));
        assert_eq!(filter.available, Some(false));
        assert_eq!(filter.search, None);
    }

    #[test]
    fn test_query_with_invalid_values() {
        let query = ListDonorsQuery {
            blood_group: Some("o-".to_string()),
            ..ListDonorsQuery::default()
        };
        assert!(query.to_filter().is_err());

        let query = ListDonorsQuery {
            available: Some("sometimes".to_string()),
            ..ListDonorsQuery::default()
        };
        assert!(query.to_filter().is_err());
    }
}
