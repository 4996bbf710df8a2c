use crate::domain::model::{
    new_id, Anchored, AnchorState, Entity, EntityKind, FieldError, Validate,
};
use crate::domain::status::OperationStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    VesselArrival,
    VesselDeparture,
    BerthAllocation,
    TerminalUpdate,
    CargoHandling,
}

impl OperationType {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationType::VesselArrival => "vessel_arrival",
            OperationType::VesselDeparture => "vessel_departure",
            OperationType::BerthAllocation => "berth_allocation",
            OperationType::TerminalUpdate => "terminal_update",
            OperationType::CargoHandling => "cargo_handling",
        }
    }

    fn number_prefix(self) -> &'static str {
        match self {
            OperationType::VesselArrival => "ARR",
            OperationType::VesselDeparture => "DEP",
            OperationType::BerthAllocation => "BRT",
            OperationType::TerminalUpdate => "TRM",
            OperationType::CargoHandling => "CGO",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortOperation {
    pub id: String,
    pub operation_number: String,
    pub document_id: Option<String>,
    pub shipment_id: Option<String>,
    pub operation_type: OperationType,
    pub berth_number: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub status: OperationStatus,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub anchor: AnchorState,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for PortOperation {
    const TABLE: &'static str = "port_operations";

    fn id(&self) -> &str {
        &self.id
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.operation_number.clone())
    }
}

impl Anchored for PortOperation {
    fn entity_kind(&self) -> EntityKind {
        EntityKind::PortOperation
    }

    fn anchor(&self) -> &AnchorState {
        &self.anchor
    }

    fn anchor_mut(&mut self) -> &mut AnchorState {
        &mut self.anchor
    }

    fn created_by(&self) -> &str {
        &self.created_by
    }
}

/// Operations are always recorded as pending; a status in the body is ignored.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewPortOperation {
    pub operation_number: Option<String>,
    pub document_id: Option<String>,
    pub shipment_id: Option<String>,
    pub operation_type: OperationType,
    pub berth_number: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl NewPortOperation {
    pub fn into_operation(self, port_authority_id: &str) -> PortOperation {
        let now = Utc::now();
        let id = new_id();
        let operation_number = self
            .operation_number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| {
                format!(
                    "{}-{}",
                    self.operation_type.number_prefix(),
                    &id[..8].to_uppercase()
                )
            });
        PortOperation {
            id,
            operation_number,
            document_id: self.document_id,
            shipment_id: self.shipment_id,
            operation_type: self.operation_type,
            berth_number: self.berth_number,
            scheduled_at: self.scheduled_at,
            status: OperationStatus::Pending,
            notes: self.notes,
            anchor: AnchorState::default(),
            created_by: port_authority_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Validate for NewPortOperation {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.operation_type == OperationType::BerthAllocation
            && self
                .berth_number
                .as_deref()
                .map_or(true, |b| b.trim().is_empty())
        {
            errors.push(FieldError::new(
                "berthNumber",
                "is required for berth allocations",
            ));
        }
        errors
    }
}

/// Status patch shared by port operations and forwarder coordinations.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OperationStatusUpdate {
    pub status: OperationStatus,
    pub notes: Option<String>,
}
