//! Authorization table: which roles may perform which mutating operation.
//!
//! Handlers call [`authorize`] once, before reading the request body or touching the store.

use crate::domain::role::Role;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateShippingInstruction,
    CreateBillOfLading,
    FinalizeBillOfLading,
    ShareBillOfLading,
    DeliverBillOfLading,
    UpdateBillOfLadingStatus,
    CreateShipment,
    UpdateShipmentTracking,
    CreateTradeFinance,
    UpdateTradeFinanceStatus,
    CreateInsurancePolicy,
    UpdateInsurancePolicyStatus,
    SubmitInsuranceClaim,
    ReviewInsuranceClaim,
    RequestCustomsClearance,
    ReviewCustomsClearance,
    RecordPortOperation,
    UpdatePortOperationStatus,
    CreateCoordination,
    UpdateCoordinationStatus,
    ManageUsers,
}

impl Operation {
    pub fn allowed_roles(self) -> &'static [Role] {
        use Operation::*;
        match self {
            CreateShippingInstruction => &[Role::Shipper],
            CreateBillOfLading
            | FinalizeBillOfLading
            | ShareBillOfLading
            | UpdateBillOfLadingStatus
            | CreateShipment => &[Role::Carrier],
            DeliverBillOfLading | UpdateShipmentTracking => &[Role::Carrier, Role::PortAuthority],
            CreateTradeFinance => &[Role::Shipper, Role::Bank],
            UpdateTradeFinanceStatus => &[Role::Bank],
            CreateInsurancePolicy | UpdateInsurancePolicyStatus | ReviewInsuranceClaim => {
                &[Role::Insurer]
            }
            SubmitInsuranceClaim => &[Role::Shipper, Role::Carrier],
            RequestCustomsClearance => &[Role::Shipper, Role::FreightForwarder],
            ReviewCustomsClearance => &[Role::Customs],
            RecordPortOperation | UpdatePortOperationStatus => &[Role::PortAuthority],
            CreateCoordination | UpdateCoordinationStatus => &[Role::FreightForwarder],
            ManageUsers => &[Role::Admin],
        }
    }

    pub fn permits(self, role: Role) -> bool {
        self.allowed_roles().contains(&role)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("role '{role}' is not permitted to perform {operation}")]
pub struct AccessDenied {
    pub role: Role,
    pub operation: Operation,
}

pub fn authorize(role: Role, operation: Operation) -> Result<(), AccessDenied> {
    if operation.permits(role) {
        Ok(())
    } else {
        Err(AccessDenied { role, operation })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reviewer_operations_belong_to_a_single_role() {
        assert_eq!(Operation::ReviewCustomsClearance.allowed_roles(), &[Role::Customs]);
        assert_eq!(Operation::ReviewInsuranceClaim.allowed_roles(), &[Role::Insurer]);
        assert_eq!(Operation::UpdateTradeFinanceStatus.allowed_roles(), &[Role::Bank]);
    }

    #[test]
    fn admin_is_not_implicitly_allowed_to_mutate_documents() {
        assert!(authorize(Role::Admin, Operation::CreateShippingInstruction).is_err());
        assert!(authorize(Role::Admin, Operation::ReviewCustomsClearance).is_err());
        assert!(authorize(Role::Admin, Operation::ManageUsers).is_ok());
    }

    #[test]
    fn shipper_cannot_approve_clearances() {
        let err = authorize(Role::Shipper, Operation::ReviewCustomsClearance).unwrap_err();
        assert_eq!(err.role, Role::Shipper);
        assert!(err.to_string().contains("ReviewCustomsClearance"));
    }
}
