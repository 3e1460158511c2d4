use crate::domain::{BLOOD_GROUPS, DonorId, DonorRecord};
use crate::ports::donor_repository::{
    BloodGroupCount, DonorFilter, DonorRepository as DonorRepositoryTrait, RepositoryError, Result,
};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// DonorRepositoryのインメモリ実装
///
/// 登録順にレコードを保持し、連絡先の一意制約もPostgreSQL実装と同様に強制する。
/// テストやデータベースなしでの動作確認に使用する。
pub struct DonorRepository {
    donors: Mutex<Vec<DonorRecord>>,
    failing: AtomicBool,
}

impl DonorRepository {
    pub fn new() -> Self {
        Self {
            donors: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// テスト用にバックエンド障害を発生させる
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// 保存済みの件数
    pub fn len(&self) -> usize {
        self.donors.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::Backend(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "in-memory repository is set to fail",
            ))));
        }
        Ok(())
    }

    fn snapshot(&self) -> Vec<DonorRecord> {
        self.donors.lock().unwrap().clone()
    }
}

impl Default for DonorRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DonorRepositoryTrait for DonorRepository {
    async fn create(&self, donor: DonorRecord) -> Result<()> {
        self.check_available()?;
        let mut donors = self.donors.lock().unwrap();
        if donors.iter().any(|existing| existing.contact == donor.contact) {
            return Err(RepositoryError::DuplicateContact);
        }
        donors.push(donor);
        Ok(())
    }

    async fn get_by_id(&self, id: DonorId) -> Result<Option<DonorRecord>> {
        self.check_available()?;
        let donors = self.donors.lock().unwrap();
        Ok(donors.iter().find(|donor| donor.id == id).cloned())
    }

    async fn update(&self, donor: DonorRecord) -> Result<bool> {
        self.check_available()?;
        let mut donors = self.donors.lock().unwrap();
        if donors
            .iter()
            .any(|existing| existing.id != donor.id && existing.contact == donor.contact)
        {
            return Err(RepositoryError::DuplicateContact);
        }
        match donors.iter_mut().find(|existing| existing.id == donor.id) {
            Some(existing) => {
                // created_atは保存済みの値を維持する
                let created_at = existing.created_at;
                *existing = DonorRecord { created_at, ..donor };
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// 作成日時の新しい順（同時刻の場合は後に登録したものが先）
    async fn list(&self, filter: &DonorFilter) -> Result<Vec<DonorRecord>> {
        self.check_available()?;
        let mut matched: Vec<DonorRecord> = self
            .snapshot()
            .into_iter()
            .rev()
            .filter(|donor| filter.matches(donor))
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    async fn count_by_blood_group(&self) -> Result<Vec<BloodGroupCount>> {
        self.check_available()?;
        let donors = self.snapshot();
        let counts = BLOOD_GROUPS
            .iter()
            .map(|&blood_group| {
                let group: Vec<&DonorRecord> = donors
                    .iter()
                    .filter(|donor| donor.blood_group == blood_group)
                    .collect();
                BloodGroupCount {
                    blood_group,
                    total: group.len() as i64,
                    available: group.iter().filter(|donor| donor.available).count() as i64,
                }
            })
            .filter(|count| count.total > 0)
            .collect();
        Ok(counts)
    }

    fn stream_all(&self) -> BoxStream<'_, Result<DonorRecord>> {
        if let Err(e) = self.check_available() {
            return stream::once(async move { Err(e) }).boxed();
        }
        let mut donors = self.snapshot();
        donors.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        stream::iter(donors.into_iter().map(Ok)).boxed()
    }
}
