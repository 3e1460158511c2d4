use chrono::NaiveDate;
use thiserror::Error;

/// 献血者レコードのバリデーションエラー
///
/// 項目ごとに独立して報告される。形式エラー（連絡先、血液型、日付の形）と
/// ビジネスルール違反（許容範囲外の日付、献血可否の未申告）を区別する。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Name must be at least 2 characters")]
    NameTooShort,

    #[error("Contact must contain 7 to 15 digits")]
    InvalidContact,

    #[error("Blood group must be one of A+, A-, B+, B-, AB+, AB-, O+, O-")]
    InvalidBloodGroup,

    #[error("Last donation date is required")]
    MissingLastDonationDate,

    #[error("Last donation date must use the YYYY-MM-DD format")]
    MalformedLastDonationDate,

    #[error("Last donation date is not a real calendar date")]
    InvalidCalendarDate,

    #[error("Last donation date must be between {min} and {max}")]
    LastDonationOutOfWindow { min: NaiveDate, max: NaiveDate },

    #[error("Availability must be declared (yes/no)")]
    MissingAvailability,
}

impl ValidationError {
    /// 対象の項目名
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::NameTooShort => "name",
            ValidationError::InvalidContact => "contact",
            ValidationError::InvalidBloodGroup => "blood_group",
            ValidationError::MissingLastDonationDate
            | ValidationError::MalformedLastDonationDate
            | ValidationError::InvalidCalendarDate
            | ValidationError::LastDonationOutOfWindow { .. } => "last_donation_date",
            ValidationError::MissingAvailability => "available",
        }
    }

    /// 機械判読用のコード
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::NameTooShort => "name_too_short",
            ValidationError::InvalidContact => "invalid_contact",
            ValidationError::InvalidBloodGroup => "invalid_blood_group",
            ValidationError::MissingLastDonationDate => "missing_last_donation_date",
            ValidationError::MalformedLastDonationDate => "malformed_date",
            ValidationError::InvalidCalendarDate => "invalid_calendar_date",
            ValidationError::LastDonationOutOfWindow { .. } => "date_out_of_window",
            ValidationError::MissingAvailability => "missing_availability",
        }
    }
}

/// 1回のバリデーションで検出されたすべてのエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Donor validation failed with {} error(s)", .0.len())]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn contains(&self, error: &ValidationError) -> bool {
        self.0.contains(error)
    }
}
