//! Status enumerations and their allowed transitions.
//!
//! Every status type implements [`StatusFlow`]. A transition to the current status is
//! never allowed, so repeating an approval is rejected instead of silently re-applied.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use utoipa::ToSchema;

pub trait StatusFlow: Copy + Eq + Debug + Serialize {
    /// Edges of the state machine, excluding self-loops.
    fn can_transition_to(self, next: Self) -> bool;

    fn is_terminal(self) -> bool;

    fn label(self) -> String {
        serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| format!("{:?}", self))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot move from '{from}' to '{to}'")]
pub struct TransitionError {
    pub from: String,
    pub to: String,
}

pub fn transition<S: StatusFlow>(current: S, next: S) -> Result<S, TransitionError> {
    if current != next && !current.is_terminal() && current.can_transition_to(next) {
        Ok(next)
    } else {
        Err(TransitionError {
            from: current.label(),
            to: next.label(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Submitted,
    Finalized,
    Shared,
    Delivered,
}

impl StatusFlow for DocumentStatus {
    fn can_transition_to(self, next: Self) -> bool {
        use DocumentStatus::*;
        matches!(
            (self, next),
            (Draft, Submitted)
                | (Draft, Finalized)
                | (Submitted, Finalized)
                | (Submitted, Shared)
                | (Finalized, Shared)
                | (Finalized, Delivered)
                | (Shared, Delivered)
        )
    }

    fn is_terminal(self) -> bool {
        self == DocumentStatus::Delivered
    }
}

/// Tracking status. Any live status may follow any other; `delivered` closes the shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Booked,
    InTransit,
    AtPort,
    CustomsHold,
    Delivered,
}

impl StatusFlow for ShipmentStatus {
    fn can_transition_to(self, next: Self) -> bool {
        next != ShipmentStatus::Booked
    }

    fn is_terminal(self) -> bool {
        self == ShipmentStatus::Delivered
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
    Funded,
    Settled,
}

impl StatusFlow for PaymentStatus {
    fn can_transition_to(self, next: Self) -> bool {
        use PaymentStatus::*;
        matches!(
            (self, next),
            (Pending, Approved) | (Pending, Rejected) | (Approved, Funded) | (Funded, Settled)
        )
    }

    fn is_terminal(self) -> bool {
        matches!(self, PaymentStatus::Rejected | PaymentStatus::Settled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PolicyStatus {
    Active,
    Expired,
    Cancelled,
}

impl StatusFlow for PolicyStatus {
    fn can_transition_to(self, next: Self) -> bool {
        self == PolicyStatus::Active && next != PolicyStatus::Active
    }

    fn is_terminal(self) -> bool {
        self != PolicyStatus::Active
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    Paid,
}

impl StatusFlow for ClaimStatus {
    fn can_transition_to(self, next: Self) -> bool {
        use ClaimStatus::*;
        matches!(
            (self, next),
            (Submitted, UnderReview)
                | (Submitted, Approved)
                | (Submitted, Rejected)
                | (UnderReview, Approved)
                | (UnderReview, Rejected)
                | (Approved, Paid)
        )
    }

    fn is_terminal(self) -> bool {
        matches!(self, ClaimStatus::Rejected | ClaimStatus::Paid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClearanceStatus {
    Pending,
    Approved,
    Rejected,
}

impl StatusFlow for ClearanceStatus {
    fn can_transition_to(self, next: Self) -> bool {
        self == ClearanceStatus::Pending && next != ClearanceStatus::Pending
    }

    fn is_terminal(self) -> bool {
        self != ClearanceStatus::Pending
    }
}

/// Shared by port operations and forwarder coordination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl StatusFlow for OperationStatus {
    fn can_transition_to(self, next: Self) -> bool {
        use OperationStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress)
                | (Pending, Completed)
                | (Pending, Cancelled)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
        )
    }

    fn is_terminal(self) -> bool {
        matches!(self, OperationStatus::Completed | OperationStatus::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lifecycle_only_moves_forward() {
        assert!(transition(DocumentStatus::Draft, DocumentStatus::Finalized).is_ok());
        assert!(transition(DocumentStatus::Finalized, DocumentStatus::Shared).is_ok());
        assert!(transition(DocumentStatus::Shared, DocumentStatus::Delivered).is_ok());
        assert!(transition(DocumentStatus::Shared, DocumentStatus::Draft).is_err());
        assert!(transition(DocumentStatus::Delivered, DocumentStatus::Shared).is_err());
    }

    #[test]
    fn repeating_a_status_is_rejected() {
        let err = transition(ClearanceStatus::Approved, ClearanceStatus::Approved).unwrap_err();
        assert_eq!(err.from, "approved");
        assert_eq!(err.to, "approved");
        assert!(transition(DocumentStatus::Finalized, DocumentStatus::Finalized).is_err());
    }

    #[test]
    fn reviewed_clearances_are_immutable() {
        assert!(transition(ClearanceStatus::Rejected, ClearanceStatus::Approved).is_err());
        assert!(transition(ClearanceStatus::Pending, ClearanceStatus::Rejected).is_ok());
    }

    #[test]
    fn delivered_shipments_accept_no_more_updates() {
        assert!(transition(ShipmentStatus::InTransit, ShipmentStatus::AtPort).is_ok());
        assert!(transition(ShipmentStatus::AtPort, ShipmentStatus::InTransit).is_ok());
        assert!(transition(ShipmentStatus::Delivered, ShipmentStatus::AtPort).is_err());
        assert!(transition(ShipmentStatus::InTransit, ShipmentStatus::Booked).is_err());
    }

    #[test]
    fn labels_use_wire_names() {
        assert_eq!(OperationStatus::InProgress.label(), "in_progress");
        assert_eq!(ClaimStatus::UnderReview.label(), "under_review");
    }
}
