use crate::domain::model::{
    new_id, require_text, Anchored, AnchorState, Entity, EntityKind, FieldError, Validate,
};
use crate::domain::status::{ShipmentStatus, StatusFlow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentEvent {
    pub timestamp: DateTime<Utc>,
    pub location: String,
    pub status: ShipmentStatus,
    pub description: String,
    pub recorded_by: String,
}

/// One movement of one container. `events` only ever grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub id: String,
    pub document_id: String,
    pub container_number: Option<String>,
    pub origin: String,
    pub destination: String,
    pub current_status: ShipmentStatus,
    pub current_location: String,
    pub progress: u8,
    pub estimated_arrival: Option<DateTime<Utc>>,
    pub actual_arrival: Option<DateTime<Utc>>,
    #[serde(default)]
    pub events: Vec<ShipmentEvent>,
    #[serde(flatten)]
    pub anchor: AnchorState,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Shipment {
    const TABLE: &'static str = "shipments";

    fn id(&self) -> &str {
        &self.id
    }

    fn unique_key(&self) -> Option<String> {
        self.container_number.clone()
    }
}

impl Anchored for Shipment {
    fn entity_kind(&self) -> EntityKind {
        EntityKind::Shipment
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

impl Shipment {
    /// Starts a shipment at `origin` with its first tracking event.
    #[allow(clippy::too_many_arguments)]
    pub fn start(
        document_id: &str,
        container_number: Option<String>,
        origin: &str,
        destination: &str,
        status: ShipmentStatus,
        estimated_arrival: Option<DateTime<Utc>>,
        description: String,
        created_by: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            document_id: document_id.to_string(),
            container_number,
            origin: origin.to_string(),
            destination: destination.to_string(),
            current_status: status,
            current_location: origin.to_string(),
            progress: 0,
            estimated_arrival,
            actual_arrival: None,
            events: vec![ShipmentEvent {
                timestamp: now,
                location: origin.to_string(),
                status,
                description,
                recorded_by: created_by.to_string(),
            }],
            anchor: AnchorState::default(),
            created_by: created_by.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a tracking update and appends the matching event.
    pub fn apply_tracking(&mut self, update: TrackingUpdate, recorded_by: &str) {
        let now = Utc::now();
        let status = update.status.unwrap_or(self.current_status);
        if let Some(location) = update.current_location.clone() {
            self.current_location = location;
        }
        if let Some(eta) = update.estimated_arrival {
            self.estimated_arrival = Some(eta);
        }
        if let Some(progress) = update.progress {
            self.progress = progress;
        }
        if status == ShipmentStatus::Delivered {
            self.progress = 100;
            self.actual_arrival = Some(now);
        }
        self.current_status = status;
        self.events.push(ShipmentEvent {
            timestamp: now,
            location: self.current_location.clone(),
            status,
            description: update
                .description
                .unwrap_or_else(|| format!("Status updated to {}", status.label())),
            recorded_by: recorded_by.to_string(),
        });
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewShipment {
    pub document_id: String,
    pub container_number: Option<String>,
    pub origin: String,
    pub destination: String,
    pub estimated_arrival: Option<DateTime<Utc>>,
}

impl Validate for NewShipment {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        require_text(&mut errors, "documentId", &self.document_id);
        require_text(&mut errors, "origin", &self.origin);
        require_text(&mut errors, "destination", &self.destination);
        if let Some(c) = &self.container_number {
            require_text(&mut errors, "containerNumber", c);
        }
        errors
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrackingUpdate {
    pub current_location: Option<String>,
    pub status: Option<ShipmentStatus>,
    pub progress: Option<u8>,
    pub estimated_arrival: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

impl Validate for TrackingUpdate {
    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if let Some(p) = self.progress {
            if p > 100 {
                errors.push(FieldError::new("progress", "must be between 0 and 100"));
            }
        }
        if let Some(location) = &self.current_location {
            require_text(&mut errors, "currentLocation", location);
        }
        if self.current_location.is_none()
            && self.status.is_none()
            && self.progress.is_none()
            && self.estimated_arrival.is_none()
            && self.description.is_none()
        {
            errors.push(FieldError::new("<body>", "at least one tracking field is required"));
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracking_updates_append_events_in_order() {
        let mut s = Shipment::start(
            "doc-1",
            Some("MSKU1234565".into()),
            "Shanghai",
            "Rotterdam",
            ShipmentStatus::InTransit,
            None,
            "Departed".into(),
            "carrier-1",
        );
        s.apply_tracking(
            TrackingUpdate {
                current_location: Some("Suez Canal".into()),
                progress: Some(55),
                ..Default::default()
            },
            "carrier-1",
        );
        s.apply_tracking(
            TrackingUpdate {
                current_location: Some("Rotterdam".into()),
                status: Some(ShipmentStatus::Delivered),
                ..Default::default()
            },
            "port-1",
        );
        assert_eq!(s.events.len(), 3);
        assert_eq!(s.events[1].location, "Suez Canal");
        assert_eq!(s.events[2].status, ShipmentStatus::Delivered);
        assert_eq!(s.progress, 100);
        assert!(s.actual_arrival.is_some());
        assert!(s.events.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn progress_over_one_hundred_is_invalid() {
        let update = TrackingUpdate {
            progress: Some(101),
            ..Default::default()
        };
        assert_eq!(update.validate()[0].field, "progress");
        assert_eq!(TrackingUpdate::default().validate().len(), 1);
    }
}
