use crate::domain::eligibility::to_canonical_form;
use crate::domain::{BLOOD_GROUPS, BloodGroup, DonorRecord, EligibilityPolicy};
use crate::ports::donor_repository::BloodGroupCount;
use serde::Serialize;

/// CSVのヘッダー行
pub const CSV_HEADER: [&str; 8] = [
    "id",
    "name",
    "contact",
    "blood_group",
    "last_donation_date",
    "next_eligible_date",
    "availability",
    "created_at",
];

/// レポートの1行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonorReportRow {
    pub id: String,
    pub name: String,
    pub contact: String,
    pub blood_group: String,
    pub last_donation_date: String,
    pub next_eligible_date: String,
    pub availability: String,
    pub created_at: String,
}

impl DonorReportRow {
    fn fields(&self) -> [&str; 8] {
        [
            self.id.as_str(),
            self.name.as_str(),
            self.contact.as_str(),
            self.blood_group.as_str(),
            self.last_donation_date.as_str(),
            self.next_eligible_date.as_str(),
            self.availability.as_str(),
            self.created_at.as_str(),
        ]
    }
}

/// 血液型別の集計
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BloodGroupSummary {
    pub blood_group: BloodGroup,
    pub total: i64,
    pub available: i64,
    pub unavailable: i64,
}

/// 献血可否の表示ラベル
pub fn availability_label(available: bool) -> &'static str {
    if available { "Available" } else { "Unavailable" }
}

/// レコードからレポート行を作成する
///
/// 次回献血可能日はポリシーから算出し、日付がない場合は空欄とする。
pub fn build_row(policy: &EligibilityPolicy, donor: &DonorRecord) -> DonorReportRow {
    DonorReportRow {
        id: donor.id.value().to_string(),
        name: donor.name.clone(),
        contact: donor.contact.clone(),
        blood_group: donor.blood_group.as_str().to_string(),
        last_donation_date: donor
            .last_donation_date
            .map(to_canonical_form)
            .unwrap_or_default(),
        next_eligible_date: policy
            .next_eligible_date(donor.last_donation_date)
            .map(to_canonical_form)
            .unwrap_or_default(),
        availability: availability_label(donor.available).to_string(),
        created_at: donor.created_at.to_rfc3339(),
    }
}

/// 血液型別の件数を8種類すべての集計に展開する
///
/// 登録のない血液型も0件として列挙順に含める。
pub fn summarize(counts: &[BloodGroupCount]) -> Vec<BloodGroupSummary> {
    BLOOD_GROUPS
        .iter()
        .map(|&blood_group| {
            let (total, available) = counts
                .iter()
                .filter(|count| count.blood_group == blood_group)
                .fold((0, 0), |(total, available), count| {
                    (total + count.total, available + count.available)
                });
            BloodGroupSummary {
                blood_group,
                total,
                available,
                unavailable: total - available,
            }
        })
        .collect()
}

/// RFC 4180 形式のCSVを出力する
pub fn render_csv(rows: &[DonorReportRow]) -> String {
    let mut out = String::new();
    write_record(&mut out, &CSV_HEADER);
    for row in rows {
        write_record(&mut out, &row.fields());
    }
    out
}

fn write_record(out: &mut String, fields: &[&str]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(field));
    }
    out.push_str("\r\n");
}

/// カンマ、ダブルクォート、改行を含むフィールドをクォートする
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
