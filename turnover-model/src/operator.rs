use crate::ids::OperatorId;
use crate::macros::storage_labels;
use crate::property::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OperatorStatus {
    Active,
    Inactive,
}

storage_labels!(OperatorStatus, "operator status", {
    Active => "ACTIVE",
    Inactive => "INACTIVE",
});

/// Cleaning operator as exposed by the operator directory.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Operator {
    pub id: OperatorId,
    pub name: String,
    pub status: OperatorStatus,
    /// Historical rating on a 0-5 scale.
    pub rating: Option<f32>,
    pub last_known_location: Option<GeoPoint>,
}

impl Operator {
    pub fn is_active(&self) -> bool {
        self.status == OperatorStatus::Active
    }
}
