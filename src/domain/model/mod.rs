//! Domain model definitions for ShipLedger records.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

pub mod activity;
pub mod customs;
pub mod document;
pub mod finance;
pub mod forwarder;
pub mod insurance;
pub mod ledger;
pub mod port;
pub mod shipment;
pub mod user;

pub use activity::{ActivityEntry, ActivityKind};
pub use customs::{CustomsClearance, NewCustomsClearance, ReviewNotes};
pub use document::{Document, DocumentKind, DocumentStatusUpdate, NewDocument, ShareRequest};
pub use finance::{NewTradeFinance, PaymentStatusUpdate, TradeFinance};
pub use forwarder::{ForwarderCoordination, NewCoordination};
pub use insurance::{
    ClaimReview, InsuranceClaim, InsurancePolicy, NewInsuranceClaim, NewInsurancePolicy,
    PolicyStatusUpdate,
};
pub use ledger::{BlockchainTransactionRecord, NetworkStatus, RecordReceipt};
pub use port::{NewPortOperation, OperationStatusUpdate, OperationType, PortOperation};
pub use shipment::{NewShipment, Shipment, ShipmentEvent, TrackingUpdate};
pub use user::{RoleChange, User};

/// Contract for anything persisted through the repository.
///
/// Each implementation names its table and exposes its id. Entities with a business
/// number that must be unique (B/L number, policy number, tx hash) return it from
/// `unique_key` so both store backends can reject duplicates.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Returns the name of the table holding this entity.
    const TABLE: &'static str;

    fn id(&self) -> &str;

    fn unique_key(&self) -> Option<String> {
        None
    }
}

/// Fields added to a record once its content hash has been anchored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnchorState {
    pub document_hash: Option<String>,
    pub blockchain_tx_hash: Option<String>,
    #[serde(default)]
    pub blockchain_verified: bool,
}

// Keys that change as a side effect of anchoring or bookkeeping; they never feed the hash.
const UNHASHED_FIELDS: &[&str] = &[
    "documentHash",
    "blockchainTxHash",
    "blockchainVerified",
    "updatedAt",
];

/// Entities whose content can be fingerprinted and recorded on the ledger.
pub trait Anchored: Entity {
    fn entity_kind(&self) -> EntityKind;

    fn anchor(&self) -> &AnchorState;

    fn anchor_mut(&mut self) -> &mut AnchorState;

    fn created_by(&self) -> &str;

    /// The JSON that gets hashed: the record minus anchoring and bookkeeping fields.
    fn anchor_payload(&self) -> JsonValue {
        let mut value = serde_json::to_value(self).unwrap_or(JsonValue::Null);
        if let Some(obj) = value.as_object_mut() {
            for key in UNHASHED_FIELDS {
                obj.remove(*key);
            }
        }
        value
    }
}

/// Back-reference type used on ledger records and in the verify route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    ShippingInstruction,
    BillOfLading,
    Shipment,
    TradeFinance,
    InsurancePolicy,
    InsuranceClaim,
    CustomsClearance,
    PortOperation,
    ForwarderCoordination,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::ShippingInstruction,
        EntityKind::BillOfLading,
        EntityKind::Shipment,
        EntityKind::TradeFinance,
        EntityKind::InsurancePolicy,
        EntityKind::InsuranceClaim,
        EntityKind::CustomsClearance,
        EntityKind::PortOperation,
        EntityKind::ForwarderCoordination,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::ShippingInstruction => "shipping_instruction",
            EntityKind::BillOfLading => "bill_of_lading",
            EntityKind::Shipment => "shipment",
            EntityKind::TradeFinance => "trade_finance",
            EntityKind::InsurancePolicy => "insurance_policy",
            EntityKind::InsuranceClaim => "insurance_claim",
            EntityKind::CustomsClearance => "customs_clearance",
            EntityKind::PortOperation => "port_operation",
            EntityKind::ForwarderCoordination => "forwarder_coordination",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        EntityKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == normalized)
            .ok_or_else(|| format!("unknown entity type '{}'", s))
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Semantic checks that run after a payload deserialized successfully.
pub trait Validate {
    fn validate(&self) -> Vec<FieldError>;
}

pub(crate) fn require_text(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "must not be empty"));
    }
}

pub(crate) fn require_amount(errors: &mut Vec<FieldError>, field: &str, value: &str) {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => {}
        _ => errors.push(FieldError::new(field, "must be a non-negative decimal amount")),
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
