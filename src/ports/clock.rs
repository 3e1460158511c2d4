use chrono::{DateTime, NaiveDate, Utc};

/// 時計ポート
///
/// 「今日」の取得元を抽象化する。献血可能期間の判定は呼び出し時点の日付に
/// 依存するため、テストでは固定日付を注入する。
pub trait Clock: Send + Sync {
    /// 現在時刻（レコードのcreated_atに使用）
    fn now(&self) -> DateTime<Utc>;

    /// 現地カレンダーでの今日の日付
    fn today(&self) -> NaiveDate;
}
