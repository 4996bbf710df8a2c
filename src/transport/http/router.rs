use crate::domain::model::{
    ActivityEntry, ActivityKind, AnchorState, BlockchainTransactionRecord, ClaimReview,
    CustomsClearance, Document, DocumentKind, DocumentStatusUpdate, EntityKind, FieldError,
    ForwarderCoordination, InsuranceClaim, InsurancePolicy, NetworkStatus, NewCoordination,
    NewCustomsClearance, NewDocument, NewInsuranceClaim, NewInsurancePolicy, NewPortOperation,
    NewShipment, NewTradeFinance, OperationStatusUpdate, OperationType, PaymentStatusUpdate,
    PolicyStatusUpdate, PortOperation, ReviewNotes, RoleChange, ShareRequest, Shipment,
    ShipmentEvent, TrackingUpdate, TradeFinance, User,
};
use crate::domain::role::Role;
use crate::domain::status::{
    ClaimStatus, ClearanceStatus, DocumentStatus, OperationStatus, PaymentStatus, PolicyStatus,
    ShipmentStatus,
};
use crate::transport::http::handlers::{
    activity, blockchain, customs, documents, finance, forwarder, health, insurance, port,
    shipments, users,
};
use crate::transport::http::types::{AppState, ErrorBody, HealthResponse, VerifyResponse};
use axum::routing::{get, patch};
use axum::Router;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthcheck_handler,
        users::current_user_handler,
        users::choose_role_handler,
        users::list_users_handler,
        users::assign_role_handler,
        documents::list_shipping_instructions_handler,
        documents::create_shipping_instruction_handler,
        documents::get_shipping_instruction_handler,
        documents::list_bills_of_lading_handler,
        documents::create_bill_of_lading_handler,
        documents::get_bill_of_lading_handler,
        documents::finalize_bill_of_lading_handler,
        documents::share_bill_of_lading_handler,
        documents::deliver_bill_of_lading_handler,
        documents::update_bill_of_lading_status_handler,
        shipments::list_shipments_handler,
        shipments::create_shipment_handler,
        shipments::get_shipment_handler,
        shipments::get_shipment_by_container_handler,
        shipments::update_tracking_handler,
        finance::list_trade_finance_handler,
        finance::create_trade_finance_handler,
        finance::get_trade_finance_handler,
        finance::update_trade_finance_status_handler,
        insurance::list_policies_handler,
        insurance::create_policy_handler,
        insurance::get_policy_handler,
        insurance::update_policy_status_handler,
        insurance::list_claims_handler,
        insurance::submit_claim_handler,
        insurance::review_claim_handler,
        customs::list_clearances_handler,
        customs::request_clearance_handler,
        customs::approve_clearance_handler,
        customs::reject_clearance_handler,
        port::list_port_operations_handler,
        port::record_port_operation_handler,
        port::update_port_operation_status_handler,
        forwarder::list_coordinations_handler,
        forwarder::create_coordination_handler,
        forwarder::update_coordination_status_handler,
        activity::list_activity_handler,
        blockchain::network_status_handler,
        blockchain::list_transactions_handler,
        blockchain::get_transaction_handler,
        blockchain::verify_handler
    ),
    components(schemas(
        ErrorBody,
        FieldError,
        HealthResponse,
        VerifyResponse,
        Role,
        User,
        RoleChange,
        EntityKind,
        AnchorState,
        DocumentKind,
        DocumentStatus,
        Document,
        NewDocument,
        ShareRequest,
        DocumentStatusUpdate,
        documents::FinalizeResponse,
        ShipmentStatus,
        ShipmentEvent,
        Shipment,
        NewShipment,
        TrackingUpdate,
        PaymentStatus,
        TradeFinance,
        NewTradeFinance,
        PaymentStatusUpdate,
        PolicyStatus,
        InsurancePolicy,
        NewInsurancePolicy,
        PolicyStatusUpdate,
        ClaimStatus,
        InsuranceClaim,
        NewInsuranceClaim,
        ClaimReview,
        ClearanceStatus,
        CustomsClearance,
        NewCustomsClearance,
        ReviewNotes,
        OperationType,
        OperationStatus,
        PortOperation,
        NewPortOperation,
        OperationStatusUpdate,
        ForwarderCoordination,
        NewCoordination,
        ActivityKind,
        ActivityEntry,
        BlockchainTransactionRecord,
        NetworkStatus
    ))
)]
pub struct ApiDoc;

/// Everything served under `/api`, also mounted at `/api/v1`.
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/user", get(users::current_user_handler))
        .route("/auth/user/role", patch(users::choose_role_handler))
        .route("/users", get(users::list_users_handler))
        .route("/users/:id/role", patch(users::assign_role_handler))
        .route(
            "/shipping-instructions",
            get(documents::list_shipping_instructions_handler)
                .post(documents::create_shipping_instruction_handler),
        )
        .route(
            "/shipping-instructions/:id",
            get(documents::get_shipping_instruction_handler),
        )
        .route(
            "/bills-of-lading",
            get(documents::list_bills_of_lading_handler)
                .post(documents::create_bill_of_lading_handler),
        )
        .route("/bills-of-lading/:id", get(documents::get_bill_of_lading_handler))
        .route(
            "/bills-of-lading/:id/finalize",
            patch(documents::finalize_bill_of_lading_handler),
        )
        .route(
            "/bills-of-lading/:id/share",
            patch(documents::share_bill_of_lading_handler),
        )
        .route(
            "/bills-of-lading/:id/deliver",
            patch(documents::deliver_bill_of_lading_handler),
        )
        .route(
            "/bills-of-lading/:id/status",
            patch(documents::update_bill_of_lading_status_handler),
        )
        .route(
            "/shipments",
            get(shipments::list_shipments_handler).post(shipments::create_shipment_handler),
        )
        .route("/shipments/:id", get(shipments::get_shipment_handler))
        .route(
            "/shipments/container/:container",
            get(shipments::get_shipment_by_container_handler),
        )
        .route("/shipments/:id/tracking", patch(shipments::update_tracking_handler))
        .route(
            "/trade-finance",
            get(finance::list_trade_finance_handler).post(finance::create_trade_finance_handler),
        )
        .route("/trade-finance/:id", get(finance::get_trade_finance_handler))
        .route(
            "/trade-finance/:id/status",
            patch(finance::update_trade_finance_status_handler),
        )
        .route(
            "/insurance/policies",
            get(insurance::list_policies_handler).post(insurance::create_policy_handler),
        )
        .route("/insurance/policies/:id", get(insurance::get_policy_handler))
        .route(
            "/insurance/policies/:id/status",
            patch(insurance::update_policy_status_handler),
        )
        .route(
            "/insurance/claims",
            get(insurance::list_claims_handler).post(insurance::submit_claim_handler),
        )
        .route(
            "/insurance/claims/:id/status",
            patch(insurance::review_claim_handler),
        )
        .route(
            "/customs/clearances",
            get(customs::list_clearances_handler).post(customs::request_clearance_handler),
        )
        .route(
            "/customs/clearances/:id/approve",
            patch(customs::approve_clearance_handler),
        )
        .route(
            "/customs/clearances/:id/reject",
            patch(customs::reject_clearance_handler),
        )
        .route(
            "/port/operations",
            get(port::list_port_operations_handler).post(port::record_port_operation_handler),
        )
        .route(
            "/port/operations/:id/status",
            patch(port::update_port_operation_status_handler),
        )
        .route(
            "/freight-forwarder/coordination",
            get(forwarder::list_coordinations_handler)
                .post(forwarder::create_coordination_handler),
        )
        .route(
            "/freight-forwarder/coordination/:id/status",
            patch(forwarder::update_coordination_status_handler),
        )
        .route("/transactions", get(activity::list_activity_handler))
        .route("/blockchain/status", get(blockchain::network_status_handler))
        .route(
            "/blockchain/transactions",
            get(blockchain::list_transactions_handler),
        )
        .route(
            "/blockchain/transactions/:tx_hash",
            get(blockchain::get_transaction_handler),
        )
        .route(
            "/blockchain/verify/:entity_type/:id",
            get(blockchain::verify_handler),
        )
}

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::healthcheck_handler))
        .nest("/api", api_routes())
        .nest("/api/v1", api_routes())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route_family() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/bills-of-lading/{id}/finalize",
            "/api/customs/clearances/{id}/approve",
            "/api/blockchain/verify/{entityType}/{id}",
            "/api/transactions",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn error_responses_point_at_the_shared_error_schema() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        assert!(doc["components"]["schemas"]["ErrorBody"].is_object());
        for (path, method, status) in [
            ("/api/bills-of-lading/{id}/finalize", "patch", "403"),
            ("/api/trade-finance/{id}/status", "patch", "403"),
            ("/api/blockchain/transactions/{txHash}", "get", "404"),
        ] {
            let response = &doc["paths"][path][method]["responses"][status];
            assert_eq!(
                response["content"]["application/json"]["schema"]["$ref"],
                "#/components/schemas/ErrorBody",
                "{} {} {}",
                method,
                path,
                status
            );
        }
    }
}
