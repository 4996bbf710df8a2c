//! Shipping instructions and bills of lading share one record shape.

use crate::domain::model::{
    new_id, require_text, Anchored, AnchorState, Entity, EntityKind, FieldError, Validate,
};
use crate::domain::status::DocumentStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    ShippingInstruction,
    BillOfLading,
}

impl DocumentKind {
    pub fn entity_kind(self) -> EntityKind {
        match self {
            DocumentKind::ShippingInstruction => EntityKind::ShippingInstruction,
            DocumentKind::BillOfLading => EntityKind::BillOfLading,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::ShippingInstruction => "shipping instruction",
            DocumentKind::BillOfLading => "B/L",
        }
    }

    fn reference_prefix(self) -> &'static str {
        match self {
            DocumentKind::ShippingInstruction => "SI",
            DocumentKind::BillOfLading => "BL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub kind: DocumentKind,
    pub reference_number: String,
    pub instruction_id: Option<String>,
    pub shipper: String,
    pub consignee: String,
    pub notify_party: Option<String>,
    pub vessel_name: Option<String>,
    pub voyage_number: Option<String>,
    pub port_of_loading: String,
    pub port_of_discharge: String,
    pub place_of_receipt: Option<String>,
    pub place_of_delivery: Option<String>,
    pub cargo_description: String,
    #[serde(default)]
    pub container_numbers: Vec<String>,
    pub gross_weight: Option<String>,
    pub measurement: Option<String>,
    pub number_of_packages: Option<u32>,
    pub freight_terms: Option<String>,
    pub status: DocumentStatus,
    #[serde(default)]
    pub shared_with_customs: bool,
    #[serde(default)]
    pub shared_with_port: bool,
    #[serde(flatten)]
    pub anchor: AnchorState,
    pub issued_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Document {
    const TABLE: &'static str = "documents";

    fn id(&self) -> &str {
        &self.id
    }

    fn unique_key(&self) -> Option<String> {
        Some(format!("{}:{}", self.kind.reference_prefix(), self.reference_number))
    }
}

impl Anchored for Document {
    fn entity_kind(&self) -> EntityKind {
        self.kind.entity_kind()
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

/// Create payload for both document kinds. Audit fields are not accepted from clients.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    /// B/L number or instruction number. Generated when omitted.
    pub reference_number: Option<String>,
    pub instruction_id: Option<String>,
    pub shipper: String,
    pub consignee: String,
    pub notify_party: Option<String>,
    pub vessel_name: Option<String>,
    pub voyage_number: Option<String>,
    pub port_of_loading: String,
    pub port_of_discharge: String,
    pub place_of_receipt: Option<String>,
    pub place_of_delivery: Option<String>,
    pub cargo_description: String,
    #[serde(default)]
    pub container_numbers: Vec<String>,
    pub gross_weight: Option<String>,
    pub measurement: Option<String>,
    pub number_of_packages: Option<u32>,
    pub freight_terms: Option<String>,
}

impl NewDocument {
    pub fn into_document(
        self,
        kind: DocumentKind,
        status: DocumentStatus,
        created_by: &str,
    ) -> Document {
        let now = Utc::now();
        let id = new_id();
        let reference_number = self
            .reference_number
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| {
                format!(
                    "{}-{}-{}",
                    kind.reference_prefix(),
                    now.format("%Y"),
                    &id[..8].to_uppercase()
                )
            });
        Document {
            id,
            kind,
            reference_number,
            instruction_id: self.instruction_id,
            shipper: self.shipper,
            consignee: self.consignee,
            notify_party: self.notify_party,
            vessel_name: self.vessel_name,
            voyage_number: self.voyage_number,
            port_of_loading: self.port_of_loading,
            port_of_discharge: self.port_of_discharge,
            place_of_receipt: self.place_of_receipt,
            place_of_delivery: self.place_of_delivery,
            cargo_description: self.cargo_description,
            container_numbers: self
                .container_numbers
                .into_iter()
                .map(|c| c.trim().to_uppercase())
                .collect(),
            gross_weight: self.gross_weight,
            measurement: self.measurement,
            number_of_packages: self.number_of_packages,
            freight_terms: self.freight_terms,
            status,
            shared_with_customs: false,
            shared_with_port: false,
            anchor: AnchorState::default(),
            issued_at: None,
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Validate for NewDocument {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        require_text(&mut errors, "shipper", &self.shipper);
        require_text(&mut errors, "consignee", &self.consignee);
        require_text(&mut errors, "portOfLoading", &self.port_of_loading);
        require_text(&mut errors, "portOfDischarge", &self.port_of_discharge);
        require_text(&mut errors, "cargoDescription", &self.cargo_description);
        if self
            .container_numbers
            .iter()
            .any(|c| c.trim().is_empty())
        {
            errors.push(FieldError::new("containerNumbers", "must not contain empty entries"));
        }
        let mut seen = HashSet::new();
        if !self
            .container_numbers
            .iter()
            .all(|c| seen.insert(c.trim().to_uppercase()))
        {
            errors.push(FieldError::new("containerNumbers", "must not list a container twice"));
        }
        if self.number_of_packages == Some(0) {
            errors.push(FieldError::new("numberOfPackages", "must be at least 1"));
        }
        errors
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    #[serde(default)]
    pub customs: bool,
    #[serde(default)]
    pub port: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DocumentStatusUpdate {
    pub status: DocumentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> NewDocument {
        serde_json::from_value(json!({
            "shipper": "Shanghai Exports Ltd.",
            "consignee": "Rotterdam Imports BV",
            "portOfLoading": "Shanghai",
            "portOfDischarge": "Rotterdam",
            "cargoDescription": "Electronic components",
            "containerNumbers": [" msku1234565 "],
            "createdBy": "someone-else"
        }))
        .unwrap()
    }

    #[test]
    fn server_stamps_author_and_generates_reference() {
        let doc = payload().into_document(
            DocumentKind::BillOfLading,
            DocumentStatus::Draft,
            "carrier-1",
        );
        assert_eq!(doc.created_by, "carrier-1");
        assert!(doc.reference_number.starts_with("BL-"));
        assert_eq!(doc.container_numbers, vec!["MSKU1234565".to_string()]);
        assert!(!doc.anchor.blockchain_verified);
    }

    #[test]
    fn anchor_payload_excludes_anchor_fields() {
        let mut doc = payload().into_document(
            DocumentKind::ShippingInstruction,
            DocumentStatus::Submitted,
            "shipper-1",
        );
        let before = doc.anchor_payload();
        doc.anchor.document_hash = Some("ab".into());
        doc.anchor.blockchain_verified = true;
        doc.updated_at = Utc::now();
        assert_eq!(before, doc.anchor_payload());
        assert!(before.get("documentHash").is_none());
        assert_eq!(before["shipper"], "Shanghai Exports Ltd.");
    }

    #[test]
    fn blank_required_fields_are_reported() {
        let mut p = payload();
        p.consignee = "  ".into();
        p.number_of_packages = Some(0);
        let fields: Vec<_> = p.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["consignee".to_string(), "numberOfPackages".to_string()]);
    }

    #[test]
    fn container_listed_twice_after_normalizing_is_rejected() {
        let mut p = payload();
        p.container_numbers = vec!["MSKU1234565".into(), " msku1234565".into()];
        let errors = p.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "containerNumbers");
    }
}
