use crate::ports::clock::Clock;
use chrono::{DateTime, Local, NaiveDate, Utc};

/// システム時計の実装
///
/// 「今日」はサーバーの現地カレンダーで判定する。
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
