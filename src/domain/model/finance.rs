use crate::domain::model::{
    new_id, require_amount, require_text, Anchored, AnchorState, Entity, EntityKind, FieldError,
    Validate,
};
use crate::domain::status::PaymentStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

/// Letter-of-credit style financing attached to a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TradeFinance {
    pub id: String,
    pub document_id: String,
    pub lc_number: Option<String>,
    pub bank: String,
    pub amount: String,
    pub currency: String,
    pub payment_status: PaymentStatus,
    #[schema(value_type = Object)]
    pub milestones: Option<JsonValue>,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub anchor: AnchorState,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for TradeFinance {
    const TABLE: &'static str = "trade_finance";

    fn id(&self) -> &str {
        &self.id
    }

    fn unique_key(&self) -> Option<String> {
        self.lc_number.clone()
    }
}

impl Anchored for TradeFinance {
    fn entity_kind(&self) -> EntityKind {
        EntityKind::TradeFinance
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

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTradeFinance {
    pub document_id: String,
    pub lc_number: Option<String>,
    pub bank: String,
    pub amount: String,
    pub currency: String,
    #[schema(value_type = Object)]
    pub milestones: Option<JsonValue>,
    pub notes: Option<String>,
}

impl NewTradeFinance {
    pub fn into_record(self, created_by: &str) -> TradeFinance {
        let now = Utc::now();
        TradeFinance {
            id: new_id(),
            document_id: self.document_id,
            lc_number: self.lc_number,
            bank: self.bank,
            amount: self.amount.trim().to_string(),
            currency: self.currency.trim().to_uppercase(),
            payment_status: PaymentStatus::Pending,
            milestones: self.milestones,
            notes: self.notes,
            anchor: AnchorState::default(),
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Validate for NewTradeFinance {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        require_text(&mut errors, "documentId", &self.document_id);
        require_text(&mut errors, "bank", &self.bank);
        require_amount(&mut errors, "amount", &self.amount);
        if self.currency.trim().len() != 3 {
            errors.push(FieldError::new("currency", "must be a 3-letter currency code"));
        }
        errors
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PaymentStatusUpdate {
    pub status: PaymentStatus,
    pub notes: Option<String>,
}
