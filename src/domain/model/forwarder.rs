use crate::domain::model::{
    new_id, require_text, Anchored, AnchorState, Entity, EntityKind, FieldError, Validate,
};
use crate::domain::status::OperationStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A forwarder's booking that ties a shipper to a carrier for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForwarderCoordination {
    pub id: String,
    pub coordination_number: String,
    pub document_id: Option<String>,
    pub shipper_id: Option<String>,
    pub carrier_id: Option<String>,
    pub status: OperationStatus,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub anchor: AnchorState,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for ForwarderCoordination {
    const TABLE: &'static str = "forwarder_coordinations";

    fn id(&self) -> &str {
        &self.id
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.coordination_number.clone())
    }
}

impl Anchored for ForwarderCoordination {
    fn entity_kind(&self) -> EntityKind {
        EntityKind::ForwarderCoordination
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
pub struct NewCoordination {
    pub coordination_number: Option<String>,
    pub document_id: Option<String>,
    pub shipper_id: Option<String>,
    pub carrier_id: Option<String>,
    pub notes: Option<String>,
}

impl NewCoordination {
    pub fn into_coordination(self, forwarder_id: &str) -> ForwarderCoordination {
        let now = Utc::now();
        let id = new_id();
        let coordination_number = self
            .coordination_number
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("FFC-{}-{}", now.format("%Y"), &id[..8].to_uppercase()));
        ForwarderCoordination {
            id,
            coordination_number,
            document_id: self.document_id,
            shipper_id: self.shipper_id,
            carrier_id: self.carrier_id,
            status: OperationStatus::Pending,
            notes: self.notes,
            anchor: AnchorState::default(),
            created_by: forwarder_id.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Validate for NewCoordination {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if let Some(doc) = &self.document_id {
            require_text(&mut errors, "documentId", doc);
        }
        if self.document_id.is_none() && self.shipper_id.is_none() && self.carrier_id.is_none() {
            errors.push(FieldError::new(
                "<body>",
                "one of documentId, shipperId or carrierId is required",
            ));
        }
        errors
    }
}
