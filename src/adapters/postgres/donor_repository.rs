use crate::domain::{BloodGroup, DonorId, DonorRecord};
use crate::ports::donor_repository::{
    BloodGroupCount, DonorFilter, DonorRepository as DonorRepositoryTrait, RepositoryError, Result,
};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

const SELECT_DONOR_COLUMNS: &str = r#"
    SELECT
        id,
        name,
        contact,
        blood_group,
        last_donation_date,
        available,
        created_at
    FROM donors
"#;

/// sqlxのエラーをリポジトリのエラーに変換する
///
/// 一意制約違反（SQLSTATE 23505）は連絡先の重複として扱う。
/// donorsテーブルの一意制約はcontactのみ。
fn map_sqlx_error(err: sqlx::Error) -> RepositoryError {
    let is_unique_violation = err
        .as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation());

    if is_unique_violation {
        RepositoryError::DuplicateContact
    } else {
        RepositoryError::Backend(Box::new(err))
    }
}

fn invalid_data(message: String) -> RepositoryError {
    RepositoryError::Backend(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message,
    )))
}

/// PostgreSQLの行データをDonorRecordに変換する
fn map_row_to_donor(row: &PgRow) -> Result<DonorRecord> {
    let blood_group_str: &str = row.try_get("blood_group").map_err(map_sqlx_error)?;
    let blood_group = BloodGroup::from_str(blood_group_str).map_err(invalid_data)?;

    Ok(DonorRecord {
        id: DonorId::from_uuid(row.try_get("id").map_err(map_sqlx_error)?),
        name: row.try_get("name").map_err(map_sqlx_error)?,
        contact: row.try_get("contact").map_err(map_sqlx_error)?,
        blood_group,
        last_donation_date: row.try_get("last_donation_date").map_err(map_sqlx_error)?,
        available: row.try_get("available").map_err(map_sqlx_error)?,
        created_at: row.try_get("created_at").map_err(map_sqlx_error)?,
    })
}

/// LIKE パターン用に `\` `%` `_` をエスケープする
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// DonorRepositoryのPostgreSQL実装
pub struct DonorRepository {
    pool: PgPool,
}

impl DonorRepository {
    /// PostgreSQLコネクションプールから新しいDonorRepositoryを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DonorRepositoryTrait for DonorRepository {
    async fn create(&self, donor: DonorRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO donors (
                id,
                name,
                contact,
                blood_group,
                last_donation_date,
                available,
                created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(donor.id.value())
        .bind(&donor.name)
        .bind(&donor.contact)
        .bind(donor.blood_group.as_str())
        .bind(donor.last_donation_date)
        .bind(donor.available)
        .bind(donor.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn get_by_id(&self, id: DonorId) -> Result<Option<DonorRecord>> {
        let row = sqlx::query(&format!("{SELECT_DONOR_COLUMNS} WHERE id = $1"))
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.as_ref().map(map_row_to_donor).transpose()
    }

    /// 全項目を置き換える（created_atは更新対象に含めない）
    async fn update(&self, donor: DonorRecord) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE donors
            SET
                name = $2,
                contact = $3,
                blood_group = $4,
                last_donation_date = $5,
                available = $6
            WHERE id = $1
            "#,
        )
        .bind(donor.id.value())
        .bind(&donor.name)
        .bind(&donor.contact)
        .bind(donor.blood_group.as_str())
        .bind(donor.last_donation_date)
        .bind(donor.available)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    /// 条件付き一覧
    ///
    /// 未指定の条件はNULLとしてバインドし、SQL側で無視する。
    async fn list(&self, filter: &DonorFilter) -> Result<Vec<DonorRecord>> {
        let search = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty());
        let name_pattern = search.map(|term| format!("%{}%", escape_like(term)));
        let contact_pattern = search
            .map(crate::domain::eligibility::normalize_contact)
            .filter(|digits| !digits.is_empty())
            .map(|digits| format!("%{}%", digits));

        let rows = sqlx::query(&format!(
            r#"
            {SELECT_DONOR_COLUMNS}
            WHERE ($1::text IS NULL OR blood_group = $1)
              AND ($2::boolean IS NULL OR available = $2)
              AND ($3::text IS NULL OR name ILIKE $3 OR ($4::text IS NOT NULL AND contact LIKE $4))
            ORDER BY created_at DESC
            "#
        ))
        .bind(filter.blood_group.map(|group| group.as_str()))
        .bind(filter.available)
        .bind(name_pattern)
        .bind(contact_pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(map_row_to_donor).collect()
    }

    async fn count_by_blood_group(&self) -> Result<Vec<BloodGroupCount>> {
        let rows = sqlx::query(
            r#"
            SELECT
                blood_group,
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE available) AS available
            FROM donors
            GROUP BY blood_group
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter()
            .map(|row| {
                let blood_group_str: &str = row.try_get("blood_group").map_err(map_sqlx_error)?;
                Ok(BloodGroupCount {
                    blood_group: BloodGroup::from_str(blood_group_str).map_err(invalid_data)?,
                    total: row.try_get("total").map_err(map_sqlx_error)?,
                    available: row.try_get("available").map_err(map_sqlx_error)?,
                })
            })
            .collect()
    }

    /// 作成日時の古い順にストリーム配信する
    fn stream_all(&self) -> BoxStream<'_, Result<DonorRecord>> {
        let stream = sqlx::query(
            r#"
            SELECT
                id,
                name,
                contact,
                blood_group,
                last_donation_date,
                available,
                created_at
            FROM donors
            ORDER BY created_at ASC
            "#,
        )
        .fetch(&self.pool)
        .map(|row_result| {
            let row = row_result.map_err(map_sqlx_error)?;
            map_row_to_donor(&row)
        });

        Box::pin(stream)
    }
}
