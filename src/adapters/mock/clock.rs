use crate::ports::clock::Clock;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Mutex;

/// Clockのモック実装
///
/// テストから明示的に進められる固定時刻を返す。
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// 指定した日付の正午（UTC）に固定する
    pub fn on(date: NaiveDate) -> Self {
        let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc();
        Self {
            now: Mutex::new(noon),
        }
    }

    /// 時刻を変更する
    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
