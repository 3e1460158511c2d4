use chrono::{Days, Months, NaiveDate};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

use super::value_objects::BloodGroup;

/// 献血後のクールダウン日数（デフォルト）
pub const DEFAULT_COOLDOWN_DAYS: u32 = 90;

/// 最終献血日として受け付ける過去の範囲（月数）
///
/// 730日ではなく暦上の2年。うるう年の扱いはchronoの月演算に任せる。
pub const DONATION_WINDOW_MONTHS: u32 = 24;

/// 連絡先として有効な数字の桁数
pub const CONTACT_MIN_DIGITS: usize = 7;
pub const CONTACT_MAX_DIGITS: usize = 15;

/// 献血履歴がない場合の経過日数（無限大として扱う）
pub const NEVER_DONATED: i64 = i64::MAX;

const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

const AVAILABLE_TOKENS: [&str; 5] = ["1", "true", "yes", "y", "available"];
const UNAVAILABLE_TOKENS: [&str; 5] = ["0", "false", "no", "n", "unavailable"];

static CALENDAR_SHAPE_RE: OnceLock<Regex> = OnceLock::new();

fn calendar_shape_regex() -> &'static Regex {
    CALENDAR_SHAPE_RE.get_or_init(|| {
        Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$")
            .unwrap_or_else(|error| panic!("calendar date regex failed to compile: {error}"))
    })
}

/// 献血可能期間の判定ポリシー
///
/// 副作用を持たない純粋な計算のみを提供する。
/// 「今日」は常に引数として渡され、システム時計を直接読まない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityPolicy {
    cooldown_days: u32,
}

impl EligibilityPolicy {
    pub fn new(cooldown_days: u32) -> Self {
        Self { cooldown_days }
    }

    pub fn cooldown_days(&self) -> u32 {
        self.cooldown_days
    }

    /// 最終献血日から献血可能かを算出する
    ///
    /// 最終献血日がない場合、またはクールダウン日数以上経過している場合に true。
    /// 境界は含む（ちょうど90日経過で献血可能）。
    pub fn compute_availability(&self, last_donation: Option<NaiveDate>, today: NaiveDate) -> bool {
        days_since(last_donation, today) >= i64::from(self.cooldown_days)
    }

    /// 次回献血可能日 = 最終献血日 + クールダウン日数
    pub fn next_eligible_date(&self, last_donation: Option<NaiveDate>) -> Option<NaiveDate> {
        last_donation?.checked_add_days(Days::new(u64::from(self.cooldown_days)))
    }

    /// 文字列の最終献血日から次回献血可能日を算出する（解析不能ならNone）
    pub fn next_eligible_date_str(&self, raw: Option<&str>) -> Option<String> {
        self.next_eligible_date(parse_calendar_date(raw))
            .map(to_canonical_form)
    }
}

impl Default for EligibilityPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN_DAYS)
    }
}

/// 最終献血日として受け付ける範囲 [min, max]（両端を含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DonationWindow {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

impl DonationWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.min <= date && date <= self.max
    }
}

/// 連絡先の検証：数字以外を除去し、7〜15桁であること
pub fn validate_contact(raw: Option<&str>) -> bool {
    let digits = normalize_contact(raw.unwrap_or_default());
    (CONTACT_MIN_DIGITS..=CONTACT_MAX_DIGITS).contains(&digits.len())
}

/// 連絡先から数字以外を取り除く
pub fn normalize_contact(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// 血液型の検証（大文字小文字を区別する完全一致）
pub fn validate_blood_group(raw: Option<&str>) -> bool {
    raw.is_some_and(|value| value.parse::<BloodGroup>().is_ok())
}

/// `YYYY-MM-DD` の形をしているか（暦として正しいかは問わない）
///
/// 数字はASCIIのみ。全角数字などは形式エラーとする。
pub fn matches_calendar_shape(raw: &str) -> bool {
    calendar_shape_regex().is_match(raw)
}

/// `YYYY-MM-DD` 形式の日付を解析する
///
/// 形が一致しない入力はNone。形が一致しても暦上存在しない日付
/// （13月、2月30日など）は繰り上げずにNoneとする。
pub fn parse_calendar_date(raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw?;
    if !matches_calendar_shape(raw) {
        return None;
    }
    NaiveDate::parse_from_str(raw, CANONICAL_DATE_FORMAT).ok()
}

/// 正規形 `YYYY-MM-DD` に変換する
pub fn to_canonical_form(date: NaiveDate) -> String {
    date.format(CANONICAL_DATE_FORMAT).to_string()
}

/// `date` から `today` までの経過日数
///
/// 日付がない場合は `NEVER_DONATED`（常に献血可能として扱われる）。
pub fn days_since(date: Option<NaiveDate>, today: NaiveDate) -> i64 {
    match date {
        Some(date) => today.signed_duration_since(date).num_days(),
        None => NEVER_DONATED,
    }
}

/// 最終献血日の許容範囲 [today - 2年, today]
pub fn allowed_donation_window(today: NaiveDate) -> DonationWindow {
    let min = today
        .checked_sub_months(Months::new(DONATION_WINDOW_MONTHS))
        .unwrap_or(NaiveDate::MIN);
    DonationWindow { min, max: today }
}

pub fn is_within_allowed_window(date: Option<NaiveDate>, today: NaiveDate) -> bool {
    date.is_some_and(|date| allowed_donation_window(today).contains(date))
}

/// 手動指定の献血可否フラグを解析する
///
/// 大文字小文字を区別しない。どちらのトークンにも一致しなければNone（未指定）。
pub fn parse_manual_availability_flag(raw: Option<&str>) -> Option<bool> {
    let token = raw?.trim().to_ascii_lowercase();
    if AVAILABLE_TOKENS.contains(&token.as_str()) {
        Some(true)
    } else if UNAVAILABLE_TOKENS.contains(&token.as_str()) {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn today() -> NaiveDate {
        date("2024-06-15")
    }

    // 連絡先
    #[test]
    fn test_contact_with_punctuation_is_valid() {
        assert!(validate_contact(Some("+1 (555) 123-4567")));
        assert_eq!(normalize_contact("+1 (555) 123-4567"), "15551234567");
    }

    #[test]
    fn test_contact_too_short_is_invalid() {
        assert!(!validate_contact(Some("12345")));
    }

    #[test]
    fn test_contact_length_bounds() {
        assert!(validate_contact(Some("1234567")));
        assert!(!validate_contact(Some("123456")));
        assert!(validate_contact(Some("123456789012345")));
        assert!(!validate_contact(Some("1234567890123456")));
    }

    #[test]
    fn test_contact_missing_or_empty_is_invalid() {
        assert!(!validate_contact(None));
        assert!(!validate_contact(Some("")));
        assert!(!validate_contact(Some("call me")));
    }

    // 血液型
    #[test]
    fn test_blood_group_validation_is_case_sensitive() {
        assert!(validate_blood_group(Some("AB+")));
        assert!(!validate_blood_group(Some("ab+")));
        assert!(!validate_blood_group(None));
    }

    // 日付の解析
    #[test]
    fn test_parse_calendar_date_accepts_canonical_shape() {
        assert_eq!(parse_calendar_date(Some("2024-02-29")), Some(date("2024-02-29")));
    }

    #[test]
    fn test_parse_calendar_date_rejects_other_shapes() {
        for raw in ["", "2024-6-15", "24-06-15", "2024/06/15", "2024-06-15T00:00", " 2024-06-15"] {
            assert!(!matches_calendar_shape(raw), "{raw}");
            assert_eq!(parse_calendar_date(Some(raw)), None, "{raw}");
        }
        assert_eq!(parse_calendar_date(None), None);
    }

    #[test]
    fn test_non_ascii_digits_do_not_match_shape() {
        for raw in ["２０２４-０６-０１", "٢٠٢٤-٠٦-٠١", "2024-0６-01"] {
            assert!(!matches_calendar_shape(raw), "{raw}");
            assert_eq!(parse_calendar_date(Some(raw)), None, "{raw}");
        }
    }

    #[test]
    fn test_impossible_date_matches_shape_but_is_rejected() {
        assert!(matches_calendar_shape("2024-13-45"));
        assert_eq!(parse_calendar_date(Some("2024-13-45")), None);
        assert_eq!(parse_calendar_date(Some("2023-02-29")), None);
    }

    #[test]
    fn test_canonical_form_round_trip() {
        for raw in ["2024-01-01", "1999-12-31", "2024-02-29", "0001-01-01"] {
            let parsed = parse_calendar_date(Some(raw)).unwrap();
            assert_eq!(to_canonical_form(parsed), raw);
        }
    }

    // 経過日数と献血可否
    #[test]
    fn test_days_since() {
        assert_eq!(days_since(Some(date("2024-06-14")), today()), 1);
        assert_eq!(days_since(Some(today()), today()), 0);
        assert_eq!(days_since(None, today()), NEVER_DONATED);
    }

    #[test]
    fn test_availability_cooldown_boundary_is_inclusive() {
        let policy = EligibilityPolicy::new(90);
        let days_ago = |n: u64| today().checked_sub_days(Days::new(n));

        assert!(policy.compute_availability(days_ago(91), today()));
        assert!(!policy.compute_availability(days_ago(89), today()));
        assert!(policy.compute_availability(days_ago(90), today()));
    }

    #[test]
    fn test_availability_matches_days_since() {
        for cooldown in [0, 1, 56, 90, 120] {
            let policy = EligibilityPolicy::new(cooldown);
            for n in 0..200 {
                let last = today().checked_sub_days(Days::new(n));
                assert_eq!(
                    policy.compute_availability(last, today()),
                    days_since(last, today()) >= i64::from(cooldown)
                );
            }
        }
    }

    #[test]
    fn test_absent_last_donation_is_always_available() {
        let policy = EligibilityPolicy::default();
        for _ in 0..3 {
            assert!(policy.compute_availability(None, today()));
            assert_eq!(policy.next_eligible_date(None), None);
        }
    }

    // 次回献血可能日
    #[test]
    fn test_next_eligible_date_adds_cooldown() {
        let policy = EligibilityPolicy::new(90);
        assert_eq!(
            policy.next_eligible_date(Some(date("2024-01-01"))),
            Some(date("2024-03-31"))
        );
        assert_eq!(
            policy.next_eligible_date(Some(date("2023-12-01"))),
            date("2023-12-01").checked_add_days(Days::new(90))
        );
    }

    #[test]
    fn test_next_eligible_date_with_zero_cooldown_is_same_day() {
        let policy = EligibilityPolicy::new(0);
        assert_eq!(policy.next_eligible_date(Some(today())), Some(today()));
    }

    #[test]
    fn test_next_eligible_date_str() {
        let policy = EligibilityPolicy::new(90);
        assert_eq!(
            policy.next_eligible_date_str(Some("2024-01-01")),
            Some("2024-03-31".to_string())
        );
        assert_eq!(policy.next_eligible_date_str(Some("2024-13-01")), None);
        assert_eq!(policy.next_eligible_date_str(Some("yesterday")), None);
        assert_eq!(policy.next_eligible_date_str(None), None);
    }

    // 許容範囲
    #[test]
    fn test_allowed_window_uses_calendar_years() {
        let window = allowed_donation_window(today());
        assert_eq!(window.max, today());
        assert_eq!(window.min, date("2022-06-15"));
    }

    #[test]
    fn test_allowed_window_from_leap_day() {
        let window = allowed_donation_window(date("2024-02-29"));
        assert_eq!(window.min, date("2022-02-28"));
    }

    #[test]
    fn test_window_boundaries() {
        assert!(is_within_allowed_window(Some(today()), today()));
        assert!(is_within_allowed_window(Some(date("2022-06-15")), today()));
        assert!(!is_within_allowed_window(Some(date("2022-06-14")), today()));
        assert!(!is_within_allowed_window(Some(date("2024-06-16")), today()));
        assert!(!is_within_allowed_window(None, today()));
    }

    // 手動フラグ
    #[test]
    fn test_manual_flag_tokens() {
        assert_eq!(parse_manual_availability_flag(Some("Yes")), Some(true));
        assert_eq!(parse_manual_availability_flag(Some("no")), Some(false));
        assert_eq!(parse_manual_availability_flag(Some("")), None);
        assert_eq!(parse_manual_availability_flag(None), None);
    }

    #[test]
    fn test_manual_flag_all_token_sets() {
        for token in ["1", "TRUE", "yes", "Y", "Available"] {
            assert_eq!(parse_manual_availability_flag(Some(token)), Some(true), "{token}");
        }
        for token in ["0", "False", "NO", "n", "UNAVAILABLE"] {
            assert_eq!(parse_manual_availability_flag(Some(token)), Some(false), "{token}");
        }
        for token in ["maybe", "2", "on", "availableish"] {
            assert_eq!(parse_manual_availability_flag(Some(token)), None, "{token}");
        }
    }
}
