use crate::domain::model::{new_id, Entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    ShippingInstructionCreated,
    BillOfLadingCreated,
    BillOfLadingFinalized,
    BillOfLadingShared,
    BillOfLadingDelivered,
    BillOfLadingStatusUpdated,
    ShipmentCreated,
    ShipmentUpdated,
    TradeFinanceCreated,
    TradeFinanceUpdated,
    InsurancePolicyCreated,
    InsurancePolicyUpdated,
    InsuranceClaimSubmitted,
    InsuranceClaimReviewed,
    CustomsClearanceRequested,
    CustomsClearanceApproved,
    CustomsClearanceRejected,
    PortOperationRecorded,
    PortOperationUpdated,
    CoordinationCreated,
    CoordinationUpdated,
    UserRoleChanged,
}

/// One line of the append-only activity log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub user_id: String,
    pub details: String,
    pub related_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn new(
        kind: ActivityKind,
        user_id: &str,
        details: impl Into<String>,
        related_id: Option<&str>,
    ) -> Self {
        Self {
            id: new_id(),
            kind,
            user_id: user_id.to_string(),
            details: details.into(),
            related_id: related_id.map(str::to_string),
            timestamp: Utc::now(),
        }
    }
}

impl Entity for ActivityEntry {
    const TABLE: &'static str = "activity_log";

    fn id(&self) -> &str {
        &self.id
    }
}
