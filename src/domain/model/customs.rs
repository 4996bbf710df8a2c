use crate::domain::model::{
    new_id, require_amount, require_text, Anchored, AnchorState, Entity, EntityKind, FieldError,
    Validate,
};
use crate::domain::status::ClearanceStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomsClearance {
    pub id: String,
    pub clearance_number: String,
    pub document_id: String,
    pub shipment_id: Option<String>,
    pub declaration_type: String,
    #[serde(default)]
    pub hs_codes: Vec<String>,
    pub declared_value: String,
    pub currency: String,
    pub status: ClearanceStatus,
    pub notes: Option<String>,
    pub reviewed_by: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub anchor: AnchorState,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for CustomsClearance {
    const TABLE: &'static str = "customs_clearances";

    fn id(&self) -> &str {
        &self.id
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.clearance_number.clone())
    }
}

impl Anchored for CustomsClearance {
    fn entity_kind(&self) -> EntityKind {
        EntityKind::CustomsClearance
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

impl CustomsClearance {
    /// Records the reviewing officer's decision.
    pub fn review(&mut self, status: ClearanceStatus, notes: Option<String>, officer: &str) {
        let now = Utc::now();
        self.status = status;
        if notes.is_some() {
            self.notes = notes;
        }
        self.reviewed_by = Some(officer.to_string());
        self.reviewed_at = Some(now);
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomsClearance {
    pub clearance_number: Option<String>,
    pub document_id: String,
    pub shipment_id: Option<String>,
    pub declaration_type: String,
    #[serde(default)]
    pub hs_codes: Vec<String>,
    pub declared_value: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    pub notes: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl NewCustomsClearance {
    pub fn into_clearance(self, requested_by: &str) -> CustomsClearance {
        let now = Utc::now();
        let id = new_id();
        let clearance_number = self
            .clearance_number
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| format!("CC-{}-{}", now.format("%Y"), &id[..8].to_uppercase()));
        CustomsClearance {
            id,
            clearance_number,
            document_id: self.document_id,
            shipment_id: self.shipment_id,
            declaration_type: self.declaration_type,
            hs_codes: self.hs_codes.into_iter().map(|c| c.trim().to_string()).collect(),
            declared_value: self.declared_value.trim().to_string(),
            currency: self.currency.trim().to_uppercase(),
            status: ClearanceStatus::Pending,
            notes: self.notes,
            reviewed_by: None,
            reviewed_at: None,
            anchor: AnchorState::default(),
            created_by: requested_by.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Validate for NewCustomsClearance {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        require_text(&mut errors, "documentId", &self.document_id);
        require_text(&mut errors, "declarationType", &self.declaration_type);
        require_amount(&mut errors, "declaredValue", &self.declared_value);
        if self.hs_codes.iter().any(|c| {
            let c = c.trim();
            c.len() < 4 || !c.chars().all(|ch| ch.is_ascii_digit() || ch == '.')
        }) {
            errors.push(FieldError::new("hsCodes", "HS codes must be at least 4 digits"));
        }
        errors
    }
}

/// Optional officer notes on approve / reject.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ReviewNotes {
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn malformed_hs_codes_are_rejected() {
        let c: NewCustomsClearance = serde_json::from_value(json!({
            "documentId": "doc-1",
            "declarationType": "import",
            "hsCodes": ["8542.31", "ab"],
            "declaredValue": "125000"
        }))
        .unwrap();
        let errors = c.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "hsCodes");
    }

    #[test]
    fn review_stamps_officer() {
        let c: NewCustomsClearance = serde_json::from_value(json!({
            "documentId": "doc-1",
            "declarationType": "import",
            "declaredValue": "10"
        }))
        .unwrap();
        let mut clearance = c.into_clearance("forwarder-1");
        assert!(clearance.clearance_number.starts_with("CC-"));
        clearance.review(ClearanceStatus::Approved, Some("cleared".into()), "customs-1");
        assert_eq!(clearance.reviewed_by.as_deref(), Some("customs-1"));
        assert_eq!(clearance.notes.as_deref(), Some("cleared"));
        assert_eq!(clearance.created_by, "forwarder-1");
    }
}
