use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 献血者ID - 献血者レコードの識別子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DonorId(Uuid);

impl DonorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for DonorId {
    fn default() -> Self {
        Self::new()
    }
}

/// 血液型
///
/// 不変条件：8種類の固定値のみ。それ以外の値は型として表現できない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

/// 有効な血液型（順序付き）
///
/// バリデーションと血液型別集計のバケット割り当ての両方で使用される。
pub const BLOOD_GROUPS: [BloodGroup; 8] = [
    BloodGroup::APositive,
    BloodGroup::ANegative,
    BloodGroup::BPositive,
    BloodGroup::BNegative,
    BloodGroup::AbPositive,
    BloodGroup::AbNegative,
    BloodGroup::OPositive,
    BloodGroup::ONegative,
];

impl BloodGroup {
    /// 文字列表現を取得する
    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
        }
    }
}

impl std::fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 大文字小文字を区別し、正規化は行わない（"ab+" は不正）
impl std::str::FromStr for BloodGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BLOOD_GROUPS
            .iter()
            .copied()
            .find(|group| group.as_str() == s)
            .ok_or_else(|| format!("Invalid blood group: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_donor_id_creation() {
        let id1 = DonorId::new();
        let id2 = DonorId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_donor_id_from_uuid() {
        let uuid = Uuid::new_v4();
        let id = DonorId::from_uuid(uuid);
        assert_eq!(id.value(), uuid);
    }

    #[test]
    fn test_blood_group_round_trips_every_code() {
        for group in BLOOD_GROUPS {
            assert_eq!(BloodGroup::from_str(group.as_str()), Ok(group));
        }
    }

    #[test]
    fn test_blood_group_is_case_sensitive() {
        assert!(BloodGroup::from_str("ab+").is_err());
        assert!(BloodGroup::from_str(" AB+").is_err());
        assert!(BloodGroup::from_str("C+").is_err());
    }

    #[test]
    fn test_blood_group_serializes_as_code() {
        let json = serde_json::to_string(&BloodGroup::AbNegative).unwrap();
        assert_eq!(json, "\"AB-\"");
    }
}
